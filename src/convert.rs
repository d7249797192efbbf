use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::ConvertOptions;
use crate::dataset::types::{
    AnswerOption, McqaDataset, McqaItem, SourceRecord, FACTUAL_LABEL, QUESTION_OPTIONS,
};
use crate::enrich::{ContentSource, Enricher};
use crate::fetch::PageFetcher;

pub const DATASET_NAME: &str = "DialFact-MCQA";
pub const DATASET_DESCRIPTION: &str =
    "DialFact dataset converted to Claim Verification MCQA format for evaluating RAG systems";
pub const DATASET_VERSION: &str = "1.0";

/// Claim verification question with the three options embedded.
pub fn build_question(claim: &str) -> String {
    format!(
        "Given the conversation context, evaluate this claim: '{}'\n\n\
         What is the verification status?\n\
         A. Supports\n\
         B. Refutes\n\
         C. Not Enough Information",
        claim
    )
}

/// Counters reported at the end of a conversion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertStats {
    pub records: usize,
    pub factual: usize,
    pub converted: usize,
    pub failed: usize,
    pub cache_hits: usize,
    pub fetched: usize,
    pub fetch_failed: usize,
    pub without_url: usize,
    /// Cache saves requested, the final one included.
    pub cache_saves: usize,
}

impl ConvertStats {
    fn record_source(&mut self, source: &ContentSource) {
        match source {
            ContentSource::NoUrl => self.without_url += 1,
            ContentSource::CacheHit => self.cache_hits += 1,
            ContentSource::Fetched => self.fetched += 1,
            ContentSource::FetchFailed(_) => self.fetch_failed += 1,
        }
    }
}

pub struct Conversion {
    pub dataset: McqaDataset,
    pub stats: ConvertStats,
}

/// Convert raw DialFact records into a claim verification MCQA dataset.
///
/// Only records labelled "factual" are used. IDs run from 1 in emission order;
/// the first `calibration_size` items form the calibration bucket and the rest
/// go to test. A record that cannot be decoded is logged and skipped without
/// consuming an ID. The cache is saved every `save_every` converted items and
/// once more at the end.
pub async fn convert<F: PageFetcher>(
    records: &[serde_json::Value],
    enricher: &mut Enricher<F>,
    options: &ConvertOptions,
) -> Conversion {
    let mut dataset = McqaDataset {
        name: DATASET_NAME.to_string(),
        description: DATASET_DESCRIPTION.to_string(),
        version: DATASET_VERSION.to_string(),
        calibration: Vec::new(),
        test: Vec::new(),
    };
    let mut stats = ConvertStats {
        records: records.len(),
        ..ConvertStats::default()
    };
    let mut next_id: u64 = 1;

    for (i, raw) in records.iter().enumerate() {
        if options.progress_every > 0 && i % options.progress_every == 0 {
            info!(
                item = i,
                total = records.len(),
                cache_size = enricher.cache().len(),
                "Processing"
            );
        }

        let is_factual = raw.get("type_label").and_then(|v| v.as_str()) == Some(FACTUAL_LABEL);
        if !is_factual {
            continue;
        }
        stats.factual += 1;

        let record = match decode_record(raw) {
            Ok(record) => record,
            Err(e) => {
                warn!(item = i, "Error processing item: {:#}", e);
                stats.failed += 1;
                continue;
            }
        };

        let item = build_item(&record, next_id, enricher, &mut stats).await;
        debug!(id = item.id, answer = %item.correct_answer, evidence = item.search_results.len(), "Item converted");
        next_id += 1;
        stats.converted += 1;

        if dataset.calibration.len() < options.calibration_size {
            dataset.calibration.push(item);
        } else {
            dataset.test.push(item);
        }

        if options.save_every > 0 && stats.converted % options.save_every == 0 {
            enricher.save_cache().await;
            stats.cache_saves += 1;
        }
    }

    enricher.save_cache().await;
    stats.cache_saves += 1;

    info!(
        factual = stats.factual,
        records = stats.records,
        converted = stats.converted,
        failed = stats.failed,
        "Conversion finished"
    );
    info!(
        cache_hits = stats.cache_hits,
        fetched = stats.fetched,
        fetch_failed = stats.fetch_failed,
        without_url = stats.without_url,
        cache_saves = stats.cache_saves,
        "Evidence enrichment summary"
    );
    info!(
        total = dataset.total_samples(),
        calibration = dataset.calibration_samples(),
        test = dataset.test_samples(),
        "Generated claim verification questions"
    );

    Conversion { dataset, stats }
}

fn decode_record(raw: &serde_json::Value) -> Result<SourceRecord> {
    SourceRecord::deserialize(raw).context("record does not match the DialFact schema")
}

async fn build_item<F: PageFetcher>(
    record: &SourceRecord,
    id: u64,
    enricher: &mut Enricher<F>,
    stats: &mut ConvertStats,
) -> McqaItem {
    let mut search_results = Vec::new();
    for evidence in record.usable_evidence() {
        let enrichment = enricher.enrich(&evidence).await;
        stats.record_source(&enrichment.source);
        search_results.push(enrichment.result);
    }

    McqaItem {
        id,
        question: build_question(&record.response),
        correct_answer: AnswerOption::from_response_label(&record.response_label),
        options: QUESTION_OPTIONS.to_vec(),
        context: record.context.join(" "),
        claim: record.response.clone(),
        search_results,
        extra: serde_json::Map::new(),
    }
}
