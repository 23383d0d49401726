//! The reconciliation engine.
//!
//! Takes the parsed backlog and drives the remote tracker toward it:
//! labels and milestones are ensured up front, then every feature record is
//! classified, checked against a snapshot of existing issue titles, and
//! created only if absent. Re-running against unchanged inputs is a no-op.
//!
//! Execution is strictly sequential — one feature is fully processed before
//! the next begins, and every mutation waits for its response. Any tracker
//! failure aborts the run; state already created stays created (there is no
//! rollback, only idempotent re-runs).

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use tracing::{debug, info};

use crate::classify::{classify, BulletMatcher, ContainsMatcher};
use crate::config::RunConfig;
use crate::github::{Tracker, TrackerError};
use crate::models::{
    title_key, FeatureOutcome, FeatureRecord, IssueOutcome, NewIssue, RunReport, TierBullets,
};

/// Pause after each successful issue creation to stay gentle on the remote
/// API's secondary rate limits.
const CREATE_PAUSE: Duration = Duration::from_millis(200);

/// Drives one reconciliation run against a tracker.
pub struct Reconciler<'a, T: Tracker> {
    tracker: &'a T,
    config: &'a RunConfig,
    matcher: Box<dyn BulletMatcher>,
}

impl<'a, T: Tracker> Reconciler<'a, T> {
    pub fn new(tracker: &'a T, config: &'a RunConfig) -> Self {
        Self {
            tracker,
            config,
            matcher: Box::new(ContainsMatcher),
        }
    }

    /// Swap in a different bullet-matching strategy.
    pub fn with_matcher(mut self, matcher: Box<dyn BulletMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    /// Reconcile the parsed backlog against the remote tracker.
    ///
    /// Features are processed in document order. Duplicate detection runs
    /// against a remote snapshot taken once up front, so two records with
    /// identical titles within the same document will both attempt creation
    /// — only cross-run duplicates are caught.
    pub async fn run(
        &self,
        features: &[FeatureRecord],
        bullets: &TierBullets,
    ) -> Result<RunReport, TrackerError> {
        let mut report = RunReport::default();

        let desired_labels = self.desired_labels(features);
        report.labels_created = self.ensure_labels(&desired_labels).await?;

        let milestones = self.ensure_milestones(&mut report).await?;
        let existing_issues = self.issue_index().await?;

        for record in features {
            let tier = classify(
                &record.feature,
                bullets,
                &self.config.tier_set,
                self.matcher.as_ref(),
            );
            let milestone = milestones.get(&tier.title).copied().flatten();

            let outcome = match existing_issues.get(&title_key(&record.feature)) {
                Some(&number) => {
                    info!(issue = number, title = %record.feature, "issue exists, skipping");
                    IssueOutcome::SkippedExisting { number }
                }
                None if self.config.dry_run => {
                    info!(
                        title = %record.feature,
                        milestone = %tier.title,
                        "dry run: would create issue"
                    );
                    IssueOutcome::WouldCreate
                }
                None => {
                    let issue = NewIssue {
                        title: record.feature.clone(),
                        body: render_body(&record.feature, &record.category, &tier.title),
                        labels: vec![record.category.clone(), tier.label.clone()],
                        milestone,
                        assignees: self.config.assignee.iter().cloned().collect(),
                    };
                    let number = self.tracker.create_issue(&issue).await?;
                    info!(issue = number, title = %record.feature, "created issue");
                    tokio::time::sleep(CREATE_PAUSE).await;
                    IssueOutcome::Created { number }
                }
            };

            report.outcomes.push(FeatureOutcome {
                title: record.feature.clone(),
                tier: tier.title.clone(),
                outcome,
            });
        }

        Ok(report)
    }

    /// Distinct categories (sorted) followed by the priority labels.
    fn desired_labels(&self, features: &[FeatureRecord]) -> Vec<String> {
        let categories: BTreeSet<&str> = features.iter().map(|f| f.category.as_str()).collect();
        categories
            .into_iter()
            .chain(self.config.tier_set.priority_labels())
            .map(str::to_string)
            .collect()
    }

    /// Create every desired label the repository lacks. Existing labels are
    /// never touched. Returns what was created (or would be, in dry run).
    async fn ensure_labels(&self, desired: &[String]) -> Result<Vec<String>, TrackerError> {
        let existing = self.tracker.list_labels().await?;
        let mut created = Vec::new();
        for name in desired {
            if existing.contains(name) {
                continue;
            }
            if !self.config.dry_run {
                self.tracker.create_label(name).await?;
            }
            debug!(label = %name, "label missing, ensured");
            created.push(name.clone());
        }
        Ok(created)
    }

    /// Resolve a milestone number for every tier title, creating missing
    /// milestones. In dry run a missing milestone resolves to `None` — it
    /// has no number to reference, and the issue payload omits it.
    async fn ensure_milestones(
        &self,
        report: &mut RunReport,
    ) -> Result<HashMap<String, Option<u64>>, TrackerError> {
        let existing = self.tracker.list_milestones().await?;
        let mut numbers = HashMap::new();
        for title in self.config.tier_set.milestone_titles() {
            let number = match existing.get(title) {
                Some(&number) => Some(number),
                None => {
                    report.milestones_created.push(title.to_string());
                    if self.config.dry_run {
                        None
                    } else {
                        let number = self.tracker.create_milestone(title).await?;
                        debug!(milestone = %title, number, "created milestone");
                        Some(number)
                    }
                }
            };
            numbers.insert(title.to_string(), number);
        }
        Ok(numbers)
    }

    /// Snapshot of existing issue titles, keyed for trimmed
    /// case-insensitive lookup. Built once per run; when the remote holds
    /// several issues with the same normalized title, the first one listed
    /// wins.
    async fn issue_index(&self) -> Result<HashMap<String, u64>, TrackerError> {
        let issues = self.tracker.list_issues().await?;
        debug!(count = issues.len(), "built remote issue index");
        let mut index = HashMap::new();
        for issue in issues {
            index.entry(title_key(&issue.title)).or_insert(issue.number);
        }
        Ok(index)
    }
}

/// Fixed issue body, interpolating the feature, its category, and the tier
/// it classified into.
fn render_body(feature: &str, category: &str, priority: &str) -> String {
    format!(
        "### Feature\n\
         {feature}\n\
         \n\
         **Category:** {category}\n\
         **Priority:** {priority}\n\
         \n\
         **Why**\n\
         - _What user problem does this solve?_\n\
         \n\
         **What (Acceptance Criteria)**\n\
         - [ ] Basic flow works end-to-end\n\
         - [ ] Telemetry added (success/failure)\n\
         - [ ] Edge cases documented\n\
         \n\
         **Notes**\n\
         - Source: FeatureIdeas.md\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_interpolates_all_three_fields() {
        let body = render_body("Auto timer", "Brewing", "Low-Lift Starters");
        assert!(body.starts_with("### Feature\nAuto timer\n"));
        assert!(body.contains("**Category:** Brewing"));
        assert!(body.contains("**Priority:** Low-Lift Starters"));
        assert!(body.ends_with("- Source: FeatureIdeas.md\n"));
    }
}
