use std::path::Path;

use anyhow::{bail, Result};
use tracing::{info, warn};

use crate::cache::UrlCache;
use crate::config::{ConvertOptions, FetchConfig};
use crate::dataset::{self, types::McqaDataset};
use crate::enrich::Enricher;
use crate::fetch::HttpFetcher;

/// Convert the test and validation splits into one MCQA dataset file.
pub async fn convert(
    test_file: &Path,
    valid_file: &Path,
    output: &Path,
    cache_dir: &Path,
    options: ConvertOptions,
) -> Result<()> {
    // Both inputs must exist before any work starts
    for path in [test_file, valid_file] {
        if !path.exists() {
            bail!("input file not found: {}", path.display());
        }
    }

    info!("Loading DialFact datasets...");
    let mut records = dataset::load_jsonl(test_file)?;
    records.extend(dataset::load_jsonl(valid_file)?);
    info!(total = records.len(), "Total items loaded");

    let fetch_config = FetchConfig::from_env();
    info!(
        timeout_secs = fetch_config.timeout.as_secs(),
        delay_ms = fetch_config.request_delay.as_millis() as u64,
        max_chars = fetch_config.max_content_chars,
        "Fetch configuration"
    );
    let fetcher = HttpFetcher::new(&fetch_config)?;
    let cache = UrlCache::load(cache_dir).await;
    if !cache.is_persistent() {
        warn!("Page cache is memory-only for this run; fetched pages will not be kept");
    }
    let mut enricher = Enricher::new(fetcher, cache, &fetch_config);

    let conversion = crate::convert::convert(&records, &mut enricher, &options).await;
    let cache = enricher.into_cache();
    info!(
        cache = %cache_dir.display(),
        entries = cache.len(),
        commits = cache.commits(),
        saves = conversion.stats.cache_saves,
        "Page cache saved"
    );
    cache.close().await;

    dataset::write_dataset(output, &conversion.dataset)?;
    log_sample(&conversion.dataset);
    Ok(())
}

fn log_sample(dataset: &McqaDataset) {
    let Some(sample) = dataset.calibration.first() else {
        return;
    };
    let context_preview: String = sample.context.chars().take(200).collect();
    info!(
        id = sample.id,
        claim = %sample.claim,
        answer = %sample.correct_answer,
        context = %context_preview,
        "Sample claim verification question"
    );
    if let Some(first) = sample.search_results.first() {
        info!(
            evidence_pages = sample.search_results.len(),
            first_page = %first.page_name,
            content_chars = first.page_result.chars().count(),
            "Sample evidence"
        );
    }
}
