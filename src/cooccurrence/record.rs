//! Paper records and their ingestion from wide-format rows.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::BTreeMap, fmt};

pub const MAX_METHODS: usize = 10;

pub const COL_PAPER_ID: &str = "paperId";
pub const COL_TITLE: &str = "title";
pub const COL_YEAR: &str = "year";
pub const COL_CITATIONS: &str = "citationCount";
pub const COL_PRIMARY_TOPIC: &str = "Primary_Topic_Index";
pub const COL_SECONDARY_TOPIC: &str = "Secondary_Topic_Index";
pub const COL_AUTHORS: &str = "authors";
pub const COL_DOI: &str = "doi";

pub fn method_column(slot: usize) -> String {
    format!("Method_{slot}")
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaperId(String);

impl PaperId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        PaperId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaperId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PaperId {
    fn from(id: &str) -> Self {
        PaperId(id.to_string())
    }
}

/// One ingested paper. Immutable once it enters a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub id: PaperId,
    pub title: String,
    pub year: i32,
    pub citation_count: u32,
    /// Raw mentions in slot order, at most [`MAX_METHODS`].
    pub methods: Vec<String>,
    pub primary_topic: Option<u32>,
    pub secondary_topic: Option<u32>,
    pub authors: Option<String>,
    pub doi: Option<String>,
}

impl PaperRecord {
    pub fn new<I, S>(id: &str, title: &str, year: i32, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PaperRecord {
            id: PaperId::from(id),
            title: title.to_string(),
            year,
            citation_count: 0,
            methods: methods.into_iter().map(Into::into).take(MAX_METHODS).collect(),
            primary_topic: None,
            secondary_topic: None,
            authors: None,
            doi: None,
        }
    }

    pub fn with_topics(mut self, primary: Option<u32>, secondary: Option<u32>) -> Self {
        self.primary_topic = primary;
        self.secondary_topic = secondary;
        self
    }

    pub fn with_citations(mut self, citation_count: u32) -> Self {
        self.citation_count = citation_count;
        self
    }

    /// Ranking used when listing the papers behind an edge.
    pub fn relevance(&self) -> i64 {
        self.year as i64 * 100 + (self.citation_count / 10) as i64
    }

    /// DOI when present, the paper id otherwise.
    pub fn doi_or_id(&self) -> &str {
        self.doi.as_deref().unwrap_or(self.id.as_str())
    }
}

/// Why a row did not make it into the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    MissingId,
    MissingYear,
    InvalidYear(String),
    DuplicateId,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MissingId => write!(f, "missing paper id"),
            RejectReason::MissingYear => write!(f, "missing year"),
            RejectReason::InvalidYear(raw) => write!(f, "invalid year '{raw}'"),
            RejectReason::DuplicateId => write!(f, "duplicate paper id"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRejection {
    /// Zero based position in the ingested sequence.
    pub row: usize,
    pub paper_id: Option<String>,
    pub reason: RejectReason,
}

/// A wide-format row keyed by column name, as decoded from a CSV or JSON export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaperRow(pub BTreeMap<String, Value>);

impl PaperRow {
    pub fn set<V: Into<Value>>(mut self, column: &str, value: V) -> Self {
        self.0.insert(column.to_string(), value.into());
        self
    }

    fn text(&self, column: &str) -> Option<String> {
        match self.0.get(column)? {
            Value::String(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// `Ok(None)` for an absent or blank cell, `Err(raw)` for a non-integral one.
    fn integer(&self, column: &str) -> Result<Option<i64>, String> {
        let Some(value) = self.0.get(column) else {
            return Ok(None);
        };
        match value {
            Value::Null => Ok(None),
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .map(Some)
                .ok_or_else(|| n.to_string()),
            Value::String(s) if s.trim().is_empty() => Ok(None),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| {
                        s.parse::<f64>()
                            .ok()
                            .filter(|f| f.fract() == 0.0)
                            .map(|f| f as i64)
                    })
                    .map(Some)
                    .ok_or_else(|| s.to_string())
            }
            other => Err(other.to_string()),
        }
    }

    fn topic(&self, id: &str, column: &str) -> Option<u32> {
        match self.integer(column) {
            Ok(idx) => idx.and_then(|idx| match u32::try_from(idx) {
                Ok(idx) => Some(idx),
                Err(_) => {
                    tracing::debug!("paper {id}: topic index {idx} in {column} is negative, ignoring");
                    None
                }
            }),
            Err(raw) => {
                tracing::debug!("paper {id}: unreadable topic '{raw}' in {column}, ignoring");
                None
            }
        }
    }

    /// Raw method mentions from `Method_1..Method_10`, blanks skipped.
    pub fn methods(&self) -> Vec<String> {
        (1..=MAX_METHODS)
            .filter_map(|slot| self.text(&method_column(slot)))
            .collect()
    }

    pub fn paper_id(&self) -> Option<String> {
        self.text(COL_PAPER_ID)
    }

    pub fn into_record(self) -> Result<PaperRecord, RejectReason> {
        let id = self.paper_id().ok_or(RejectReason::MissingId)?;
        let year = match self.integer(COL_YEAR) {
            Ok(Some(year)) => i32::try_from(year).map_err(|_| RejectReason::InvalidYear(year.to_string()))?,
            Ok(None) => return Err(RejectReason::MissingYear),
            Err(raw) => return Err(RejectReason::InvalidYear(raw)),
        };
        let citation_count = match self.integer(COL_CITATIONS) {
            Ok(Some(count)) => u32::try_from(count.max(0)).unwrap_or(u32::MAX),
            Ok(None) => 0,
            Err(raw) => {
                tracing::debug!("paper {id}: unreadable citation count '{raw}', using 0");
                0
            }
        };
        Ok(PaperRecord {
            title: self.text(COL_TITLE).unwrap_or_default(),
            year,
            citation_count,
            methods: self.methods(),
            primary_topic: self.topic(&id, COL_PRIMARY_TOPIC),
            secondary_topic: self.topic(&id, COL_SECONDARY_TOPIC),
            authors: self.text(COL_AUTHORS),
            doi: self.text(COL_DOI),
            id: PaperId(id),
        })
    }
}
