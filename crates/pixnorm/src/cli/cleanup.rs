//! The `pixnorm cleanup` command.

use clap::Args;
use pixnorm_core::{Config, ImageProcessor};

/// Arguments for the `cleanup` command.
#[derive(Args, Debug)]
pub struct CleanupArgs {
    /// Number of newest outputs to keep (defaults to `retention.max_files`)
    #[arg(short, long)]
    pub max_files: Option<usize>,
}

/// Evict the oldest outputs beyond the retention bound.
pub async fn execute(args: CleanupArgs, config: Config) -> anyhow::Result<()> {
    let processor = ImageProcessor::new(&config)?;
    let max_files = args.max_files.unwrap_or(processor.max_files());
    if max_files == 0 {
        anyhow::bail!("--max-files must be at least 1");
    }

    let report = processor.cleanup(max_files).await?;
    if !report.failures.is_empty() {
        tracing::warn!("{} output(s) could not be removed", report.failures.len());
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        args: CleanupArgs,
    }

    #[test]
    fn cleanup_args_default_to_config() {
        let cli = TestCli::parse_from(["pixnorm"]);
        assert!(cli.args.max_files.is_none());
    }

    #[test]
    fn cleanup_args_parse_max_files() {
        let cli = TestCli::parse_from(["pixnorm", "--max-files", "25"]);
        assert_eq!(cli.args.max_files, Some(25));
    }
}
