//! Reconcile a tiered markdown feature backlog against GitHub issues.
//!
//! The backlog document carries a feature export block (JSON or CSV) and
//! four bulleted priority-tier sections. A run parses the document,
//! classifies every feature into a tier, ensures the matching labels and
//! milestones exist remotely, and creates an issue for each feature that
//! does not already have one — so re-running never duplicates anything and
//! never deletes or rewrites what is already there.

pub mod backlog;
pub mod classify;
pub mod config;
pub mod github;
pub mod models;
pub mod reconcile;
