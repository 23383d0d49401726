//! Domain models for backlog-sync.
//!
//! # Core Concepts
//!
//! ## Source-side
//!
//! - [`FeatureRecord`]: one backlog entry parsed out of the markdown export
//!   block. Its `feature` text doubles as the issue title.
//! - [`TierSet`] / [`TierSpec`]: the ordered priority tiers (plus fallback)
//!   a run operates with. Built once at startup and threaded through the
//!   parser, classifier, and reconciler.
//! - [`TierBullets`]: the raw bullet lines captured under each tier heading,
//!   in document order.
//!
//! ## Remote-side
//!
//! - [`IssueRef`]: a title/number pair from the remote issue enumeration,
//!   used for duplicate detection.
//! - [`NewIssue`]: the creation payload sent to the tracker.
//! - [`RunReport`]: per-feature outcomes plus the labels and milestones
//!   created during this run.

mod feature;
mod report;
mod tier;

pub use feature::*;
pub use report::*;
pub use tier::*;
