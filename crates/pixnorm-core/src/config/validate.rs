//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::output::OutputFormat;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    ///
    /// Reports the first violated rule.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let rules = [
            (
                self.processing.parallel_workers == 0,
                "processing.parallel_workers must be > 0",
            ),
            (
                self.processing.supported_formats.is_empty(),
                "processing.supported_formats must not be empty",
            ),
            (
                self.processing.supported_content_types.is_empty(),
                "processing.supported_content_types must not be empty",
            ),
            (
                self.limits.max_file_size_mb == 0,
                "limits.max_file_size_mb must be > 0",
            ),
            (
                self.limits.max_image_dimension == 0,
                "limits.max_image_dimension must be > 0",
            ),
            (
                self.limits.decode_timeout_ms == 0,
                "limits.decode_timeout_ms must be > 0",
            ),
            (
                self.retention.max_files == 0,
                "retention.max_files must be > 0",
            ),
            (
                OutputFormat::parse(&self.output.format).is_none(),
                "output.format must be \"json\" or \"jsonl\"",
            ),
        ];

        match rules.iter().find(|(violated, _)| *violated) {
            Some((_, message)) => Err(ConfigError::ValidationError(message.to_string())),
            None => Ok(()),
        }
    }
}
