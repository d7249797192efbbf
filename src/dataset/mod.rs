pub mod types;

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};

use types::McqaDataset;

/// Read a JSON-Lines file fully into memory.
///
/// Records are returned as raw JSON values; typed decoding happens per item so
/// that one malformed record does not abort the run. Lines that are not valid
/// JSON are logged and skipped.
pub fn load_jsonl(path: &Path) -> Result<Vec<serde_json::Value>> {
    if !path.exists() {
        bail!("input file not found: {}", path.display());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut records = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str(line) {
            Ok(value) => records.push(value),
            Err(e) => warn!(
                file = %path.display(),
                line = line_no + 1,
                "Skipping unparseable line: {}",
                e
            ),
        }
    }

    debug!(file = %path.display(), count = records.len(), "JSON-Lines file loaded");
    Ok(records)
}

pub fn read_dataset(path: &Path) -> Result<McqaDataset> {
    if !path.exists() {
        bail!("dataset not found: {}", path.display());
    }
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to parse dataset {}", path.display()))
}

/// Write a dataset as indented UTF-8 JSON. Returns the blake3 digest of the
/// bytes written so separate runs can be compared.
pub fn write_dataset(path: &Path, dataset: &McqaDataset) -> Result<blake3::Hash> {
    let mut bytes = serde_json::to_vec_pretty(dataset).context("serialize dataset")?;
    bytes.push(b'\n');
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    let digest = blake3::hash(&bytes);
    info!(
        path = %path.display(),
        total = dataset.total_samples(),
        size = bytes.len(),
        digest = %digest.to_hex(),
        "Dataset written"
    );
    Ok(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_jsonl_skips_blank_and_bad_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.jsonl");
        std::fs::write(&path, "{\"a\":1}\n\nnot json\n{\"a\":2}\n").unwrap();

        let records = load_jsonl(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["a"], 2);
    }

    #[test]
    fn test_load_jsonl_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_jsonl(&dir.path().join("absent.jsonl")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_write_then_read_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("dataset.json");
        let dataset = McqaDataset {
            name: "DialFact-MCQA".to_string(),
            description: "d".to_string(),
            version: "1.0".to_string(),
            calibration: vec![],
            test: vec![],
        };

        let first = write_dataset(&path, &dataset).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  \"name\": \"DialFact-MCQA\""));
        assert_eq!(read_dataset(&path).unwrap(), dataset);

        let second = write_dataset(&path, &dataset).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_non_ascii_written_unescaped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.json");
        let dataset = McqaDataset {
            name: "Zoë".to_string(),
            description: String::new(),
            version: "1.0".to_string(),
            calibration: vec![],
            test: vec![],
        };
        write_dataset(&path, &dataset).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("Zoë"));
    }
}
