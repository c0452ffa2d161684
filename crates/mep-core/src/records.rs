use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Commit hash to free-text comment, kept in insertion order.
pub type CommentMap = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStatus {
    Useful,
    NotUseful,
}

impl From<bool> for FeedbackStatus {
    fn from(is_useful: bool) -> Self {
        if is_useful {
            FeedbackStatus::Useful
        } else {
            FeedbackStatus::NotUseful
        }
    }
}

/// One operator verdict on a generated or looked-up answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub query: String,
    pub response: String,
    pub status: FeedbackStatus,
    pub date: DateTime<Utc>,
}

impl FeedbackRecord {
    pub fn new(query: impl Into<String>, response: impl Into<String>, is_useful: bool) -> Self {
        Self {
            query: query.into(),
            response: response.into(),
            status: is_useful.into(),
            date: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitEntry {
    pub hash: String,
    pub author: String,
    /// Author date, `YYYY-MM-DD`
    pub date: String,
    pub message: String,
}

impl CommitEntry {
    pub fn short_hash(&self) -> &str {
        let end = self
            .hash
            .char_indices()
            .nth(7)
            .map(|(i, _)| i)
            .unwrap_or(self.hash.len());
        &self.hash[..end]
    }
}

/// Page reference of a manual snippet: a page number, or free text such as "N/A".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageRef {
    Number(u64),
    Text(String),
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageRef::Number(n) => write!(f, "{n}"),
            PageRef::Text(t) => f.write_str(t),
        }
    }
}

impl Default for PageRef {
    fn default() -> Self {
        PageRef::Text("N/A".into())
    }
}

/// A regulatory-manual snippet returned by the retrieval lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub content: String,
    #[serde(default = "unknown_source")]
    pub source: String,
    #[serde(default)]
    pub page: PageRef,
}

fn unknown_source() -> String {
    "Unknown Source".into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn feedback_status_serializes_snake_case() {
        let record = FeedbackRecord::new("low ach", "check dampers", false);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["status"], "not_useful");
        assert!(value["date"].is_string());
    }

    #[test]
    fn evidence_accepts_numeric_and_text_pages() {
        let hits: Vec<Evidence> = serde_json::from_value(json!([
            {"content": "Grade A zone", "source": "EU_GMP_Annex1.pdf", "page": 12},
            {"content": "Filter integrity", "page": "N/A"}
        ]))
        .unwrap();
        assert_eq!(hits[0].page, PageRef::Number(12));
        assert_eq!(hits[1].source, "Unknown Source");
        assert_eq!(hits[1].page.to_string(), "N/A");
    }

    #[test]
    fn short_hash_handles_short_input() {
        let commit = CommitEntry {
            hash: "abc".into(),
            author: "a".into(),
            date: "2025-01-01".into(),
            message: "m".into(),
        };
        assert_eq!(commit.short_hash(), "abc");
    }
}
