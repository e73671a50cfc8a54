//! The `pixnorm list` command.

use pixnorm_core::{Config, ImageProcessor, ProcessedFileRecord};
use serde::Serialize;

/// Listing printed by `list`.
#[derive(Debug, Serialize)]
struct Listing {
    files: Vec<ProcessedFileRecord>,
    count: usize,
}

impl Listing {
    /// Storage lists oldest first; the listing shows newest first.
    fn newest_first(mut files: Vec<ProcessedFileRecord>) -> Self {
        files.reverse();
        let count = files.len();
        Self { files, count }
    }
}

/// Print every stored output, newest first.
pub async fn execute(config: Config) -> anyhow::Result<()> {
    let processor = ImageProcessor::new(&config)?;
    let listing = Listing::newest_first(processor.list_processed().await?);

    tracing::debug!("{} output(s) in {:?}", listing.count, processor.store().dir());
    if config.output.pretty {
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else {
        println!("{}", serde_json::to_string(&listing)?);
    }
    Ok(())
}
