use serde::Serialize;

/// What happened to one feature record during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum IssueOutcome {
    /// A new issue was created with this number.
    Created { number: u64 },
    /// An issue with the same title already exists; nothing was touched.
    SkippedExisting { number: u64 },
    /// Preview mode: a real run would have created this issue.
    WouldCreate,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureOutcome {
    pub title: String,
    pub tier: String,
    pub outcome: IssueOutcome,
}

/// Everything a run did (or, in preview mode, would have done).
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub labels_created: Vec<String>,
    pub milestones_created: Vec<String>,
    pub outcomes: Vec<FeatureOutcome>,
}

impl RunReport {
    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, IssueOutcome::Created { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, IssueOutcome::SkippedExisting { .. }))
    }

    pub fn would_create(&self) -> usize {
        self.count(|o| matches!(o, IssueOutcome::WouldCreate))
    }

    fn count(&self, pred: impl Fn(&IssueOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|f| pred(&f.outcome)).count()
    }
}
