//! CLI enum types for the process command.

use clap::ValueEnum;

/// Supported output formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object or array
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

impl From<OutputFormat> for pixnorm_core::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => pixnorm_core::OutputFormat::Json,
            OutputFormat::Jsonl => pixnorm_core::OutputFormat::JsonLines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trips_through_core_parse() {
        for format in [OutputFormat::Json, OutputFormat::Jsonl] {
            let core: pixnorm_core::OutputFormat = format.into();
            assert_eq!(pixnorm_core::OutputFormat::parse(&format.to_string()), Some(core));
        }
    }
}
