//! The `pixnorm inspect` command.

use clap::Args;
use pixnorm_core::{Config, ImageProcessor};
use std::path::PathBuf;

use super::read_upload;

/// Arguments for the `inspect` command.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Image file to describe
    pub file: PathBuf,
}

/// Describe an image without normalizing or storing it.
pub async fn execute(args: InspectArgs, config: Config) -> anyhow::Result<()> {
    let size = tokio::fs::metadata(&args.file).await?.len();
    let upload = read_upload(&args.file, size, config.limits.max_file_size_bytes()).await?;

    let processor = ImageProcessor::new(&config)?;
    let info = processor.inspect(upload).await?;

    if config.output.pretty {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("{}", serde_json::to_string(&info)?);
    }
    Ok(())
}
