use serde::{Deserialize, Serialize};

/// A single backlog entry from the markdown export block.
///
/// The `feature` text is the canonical identity of the record: it becomes
/// the issue title, and two records with identical feature text are treated
/// as the same issue by the reconciler even if their categories differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub category: String,
    pub feature: String,
}

/// A title/number pair from the remote issue enumeration.
///
/// Pull requests are filtered out before these are produced, so the set of
/// `IssueRef`s is exactly the duplicate-detection universe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRef {
    pub title: String,
    pub number: u64,
}

/// Creation payload for a new issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    /// Milestone number. Absent when running in preview mode against a
    /// milestone that does not exist yet (it has no number to reference).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub assignees: Vec<String>,
}

/// Duplicate-detection key for an issue title: surrounding whitespace is
/// trimmed and the comparison is case-insensitive.
pub fn title_key(title: &str) -> String {
    title.trim().to_lowercase()
}
