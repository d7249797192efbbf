use std::fmt;

use serde::{Deserialize, Serialize};

pub const QUESTION_OPTIONS: [AnswerOption; 3] = [AnswerOption::A, AnswerOption::B, AnswerOption::C];

/// One DialFact record as read from the JSON-Lines input.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceRecord {
    pub context: Vec<String>,
    /// The claim under verification.
    pub response: String,
    /// SUPPORTS | REFUTES | NOT ENOUGH INFO (not validated)
    pub response_label: String,
    /// "factual" or anything else
    pub type_label: String,
    /// Missing and `null` both mean no evidence.
    #[serde(default)]
    pub evidence_list: Option<Vec<serde_json::Value>>,
}

impl SourceRecord {
    /// Evidence entries with at least three positions, in input order.
    pub fn usable_evidence(&self) -> impl Iterator<Item = EvidenceRef> + '_ {
        self.evidence_list
            .iter()
            .flatten()
            .filter_map(EvidenceRef::from_entry)
    }
}

pub const FACTUAL_LABEL: &str = "factual";

/// A (title, URL, snippet) pointer to supporting material for a claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceRef {
    pub page_name: String,
    /// Empty when the record carries no URL.
    pub page_url: String,
    pub page_snippet: String,
}

impl EvidenceRef {
    /// Reads positions 0-2 of an evidence array; anything after is ignored.
    /// Returns `None` for non-arrays and arrays shorter than three.
    pub fn from_entry(raw: &serde_json::Value) -> Option<Self> {
        let raw = raw.as_array().filter(|a| a.len() >= 3)?;
        let field = |i: usize| match &raw[i] {
            serde_json::Value::Null => String::new(),
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Some(Self {
            page_name: field(0),
            page_url: field(1),
            page_snippet: field(2),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub page_name: String,
    pub page_url: String,
    pub page_snippet: String,
    /// Full page text, or the snippet when no content is available.
    pub page_result: String,
    /// Not provided by DialFact; kept for schema compatibility.
    #[serde(default)]
    pub page_last_modified: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AnswerOption {
    A,
    B,
    C,
}

impl AnswerOption {
    /// SUPPORTS -> A, REFUTES -> B, any other label -> C.
    pub fn from_response_label(label: &str) -> Self {
        match label {
            "SUPPORTS" => AnswerOption::A,
            "REFUTES" => AnswerOption::B,
            _ => AnswerOption::C,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerOption::A => "A",
            AnswerOption::B => "B",
            AnswerOption::C => "C",
        }
    }
}

impl fmt::Display for AnswerOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McqaItem {
    pub id: u64,
    pub question: String,
    pub correct_answer: AnswerOption,
    pub options: Vec<AnswerOption>,
    pub context: String,
    pub claim: String,
    pub search_results: Vec<SearchResult>,
    /// Fields written by other tools; carried through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A full MCQA dataset document. The count fields are derived from the
/// bucket lengths every time the document is built or serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct McqaDataset {
    pub name: String,
    pub description: String,
    pub version: String,
    pub calibration: Vec<McqaItem>,
    pub test: Vec<McqaItem>,
}

impl McqaDataset {
    pub fn calibration_samples(&self) -> usize {
        self.calibration.len()
    }

    pub fn test_samples(&self) -> usize {
        self.test.len()
    }

    pub fn total_samples(&self) -> usize {
        self.calibration_samples() + self.test_samples()
    }

    /// All items, calibration first.
    pub fn items(&self) -> impl Iterator<Item = &McqaItem> {
        self.calibration.iter().chain(self.test.iter())
    }
}

/// On-disk layout of [`McqaDataset`]. Stored counts are read and ignored.
#[derive(Deserialize)]
struct DatasetDocument {
    name: String,
    description: String,
    version: String,
    calibration: Vec<McqaItem>,
    test: Vec<McqaItem>,
}

#[derive(Serialize)]
struct DatasetDocumentRef<'a> {
    name: &'a str,
    description: &'a str,
    version: &'a str,
    total_samples: usize,
    calibration_samples: usize,
    test_samples: usize,
    calibration: &'a [McqaItem],
    test: &'a [McqaItem],
}

impl Serialize for McqaDataset {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        DatasetDocumentRef {
            name: &self.name,
            description: &self.description,
            version: &self.version,
            total_samples: self.total_samples(),
            calibration_samples: self.calibration_samples(),
            test_samples: self.test_samples(),
            calibration: &self.calibration,
            test: &self.test,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for McqaDataset {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let doc = DatasetDocument::deserialize(deserializer)?;
        Ok(Self {
            name: doc.name,
            description: doc.description,
            version: doc.version,
            calibration: doc.calibration,
            test: doc.test,
        })
    }
}

/// Count of items per answer letter within one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnswerDistribution {
    pub a: usize,
    pub b: usize,
    pub c: usize,
}

impl AnswerDistribution {
    pub fn of(items: &[McqaItem]) -> Self {
        let mut dist = Self::default();
        for item in items {
            match item.correct_answer {
                AnswerOption::A => dist.a += 1,
                AnswerOption::B => dist.b += 1,
                AnswerOption::C => dist.c += 1,
            }
        }
        dist
    }
}

impl fmt::Display for AnswerDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{A: {}, B: {}, C: {}}}", self.a, self.b, self.c)
    }
}
