use std::path::Path;

use anyhow::{bail, Result};
use tracing::info;

use crate::dataset;

/// Write a seeded calibration/test subset of `input` to `output`.
pub fn subset(input: &Path, output: &Path, calib_size: usize, test_size: usize, seed: u64) -> Result<()> {
    if same_file(input, output) {
        bail!("output must differ from input: {}", output.display());
    }

    info!(path = %input.display(), "Loading dataset...");
    let full = dataset::read_dataset(input)?;
    info!(
        total = full.total_samples(),
        calibration = full.calibration_samples(),
        test = full.test_samples(),
        "Original dataset"
    );

    let outcome = crate::subset::subset(full, calib_size, test_size, seed);
    if outcome.clamped {
        info!(
            requested_calibration = outcome.requested.0,
            requested_test = outcome.requested.1,
            "Subset sizes clamped to available samples"
        );
    }
    dataset::write_dataset(output, &outcome.dataset)?;

    if let Some(sample) = outcome.dataset.calibration.first() {
        let preview: String = sample.question.chars().take(200).collect();
        info!(
            id = sample.id,
            answer = %sample.correct_answer,
            evidence_pages = sample.search_results.len(),
            question = %preview,
            "Sample calibration question"
        );
    }
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
