//! The `pixnorm get` command.

use clap::Args;
use pixnorm_core::{Config, ImageProcessor};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Arguments for the `get` command.
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Name of a stored output (as printed by `process` or `list`)
    pub name: String,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Fetch one stored output by name.
pub async fn execute(args: GetArgs, config: Config) -> anyhow::Result<()> {
    let processor = ImageProcessor::new(&config)?;
    let bytes = processor.read_processed(&args.name).await?;
    deliver(&bytes, args.output.as_deref())?;
    tracing::debug!("Fetched {} ({} bytes)", args.name, bytes.len());
    Ok(())
}

fn deliver(bytes: &[u8], output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, bytes)?;
            tracing::info!("Output written to {:?}", path);
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &Path) -> Config {
        let mut config = Config::default();
        config.storage.output_dir = dir.to_path_buf();
        config
    }

    #[tokio::test]
    async fn get_copies_stored_output_to_file() {
        let store = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let name = "processed_20240101_000000_0123456789ab.jpg";
        std::fs::write(store.path().join(name), b"jpeg").unwrap();

        let target = out.path().join("copy.jpg");
        let args = GetArgs {
            name: name.to_string(),
            output: Some(target.clone()),
        };
        execute(args, config_in(store.path())).await.unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"jpeg");
    }

    #[tokio::test]
    async fn get_missing_or_escaping_name_fails() {
        let store = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        for name in ["processed_missing.jpg", "../config.toml"] {
            let args = GetArgs {
                name: name.to_string(),
                output: Some(out.path().join("x.jpg")),
            };
            let err = execute(args, config_in(store.path())).await.unwrap_err();
            assert!(err.to_string().contains("not found"), "{name}: {err}");
        }
        assert!(!out.path().join("x.jpg").exists());
    }
}
