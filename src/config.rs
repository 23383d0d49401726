//! Run configuration.

use crate::models::TierSet;

/// Everything one reconciliation run needs, built once in `main` from the
/// CLI and passed through explicitly — the tier definitions are part of the
/// configuration, not ambient constants, so tests can run with alternate
/// tier sets.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Target repository as `owner/repo`.
    pub repo: String,
    /// Username to assign to every created issue, if any.
    pub assignee: Option<String>,
    /// Preview mode: classify and detect duplicates, report every would-be
    /// mutation, perform none of them.
    pub dry_run: bool,
    pub tier_set: TierSet,
}

impl RunConfig {
    pub fn new(repo: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            assignee: None,
            dry_run: false,
            tier_set: TierSet::default(),
        }
    }

    pub fn assignee(mut self, assignee: Option<String>) -> Self {
        self.assignee = assignee;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn tier_set(mut self, tier_set: TierSet) -> Self {
        self.tier_set = tier_set;
        self
    }
}
