//! Assembles the result record for a finished run.

use std::path::Path;

use crate::types::{Dimensions, Operation, ProcessingResult};

/// Build the result of a successful run from its parts.
pub fn report(
    original_filename: &str,
    original: Dimensions,
    processed: Dimensions,
    output_len: u64,
    operations: &[Operation],
    output_path: &Path,
) -> ProcessingResult {
    let processed_filename = output_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    ProcessingResult {
        original_filename: original_filename.to_string(),
        processed_filename,
        processed_path: output_path.to_path_buf(),
        original_size: original,
        processed_size: processed,
        file_size_bytes: output_len,
        processing_applied: operations.iter().map(|op| op.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_fields() {
        let result = report(
            "cat.png",
            Dimensions::new(1920, 1080),
            Dimensions::new(300, 300),
            12_345,
            &[Operation::Resize(300), Operation::ConvertToGrayscale],
            Path::new("/out/processed_20240101_000000_abcdefabcdef.jpg"),
        );

        assert_eq!(result.original_filename, "cat.png");
        assert_eq!(result.processed_filename, "processed_20240101_000000_abcdefabcdef.jpg");
        assert_eq!(result.original_size, Dimensions::new(1920, 1080));
        assert_eq!(result.processed_size, Dimensions::new(300, 300));
        assert_eq!(result.file_size_bytes, 12_345);
        assert_eq!(
            result.processing_applied,
            vec!["resize_to_300x300", "convert_to_grayscale"]
        );
    }

    #[test]
    fn test_report_serializes() {
        let result = report(
            "a.jpg",
            Dimensions::new(10, 20),
            Dimensions::new(300, 300),
            1,
            &[],
            Path::new("x.jpg"),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["original_size"]["width"], 10);
        assert_eq!(json["processed_filename"], "x.jpg");
    }
}
