use std::collections::HashMap;

/// One priority tier: milestone title, the heading text that marks its
/// section in the backlog document, and the label applied to its issues.
///
/// `heading` may be a prefix of the full section heading ("Phase 3 /
/// Differentiators" matches "Phase 3 / Differentiators & ML"), which keeps
/// the lookup robust against trailing annotations in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierSpec {
    pub title: String,
    pub heading: String,
    pub label: String,
}

impl TierSpec {
    pub fn new(title: &str, heading: &str, label: &str) -> Self {
        Self {
            title: title.to_string(),
            heading: heading.to_string(),
            label: label.to_string(),
        }
    }
}

/// The ordered tier configuration for a run.
///
/// Order matters: the classifier consults tiers first-to-last and the first
/// tier with a matching bullet wins. The fallback tier catches everything
/// that matches no bullet list; it has no document section of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierSet {
    tiers: Vec<TierSpec>,
    fallback: TierSpec,
}

impl TierSet {
    pub fn new(tiers: Vec<TierSpec>, fallback: TierSpec) -> Self {
        Self { tiers, fallback }
    }

    /// Tiers in classification precedence order, excluding the fallback.
    pub fn tiers(&self) -> &[TierSpec] {
        &self.tiers
    }

    pub fn fallback(&self) -> &TierSpec {
        &self.fallback
    }

    /// Milestone titles to ensure, tiers first then the fallback.
    pub fn milestone_titles(&self) -> impl Iterator<Item = &str> {
        self.tiers
            .iter()
            .map(|t| t.title.as_str())
            .chain(std::iter::once(self.fallback.title.as_str()))
    }

    /// Priority labels in the same order as [`Self::milestone_titles`].
    pub fn priority_labels(&self) -> impl Iterator<Item = &str> {
        self.tiers
            .iter()
            .map(|t| t.label.as_str())
            .chain(std::iter::once(self.fallback.label.as_str()))
    }
}

impl Default for TierSet {
    fn default() -> Self {
        Self::new(
            vec![
                TierSpec::new(
                    "Low-Lift Starters",
                    "Low-Lift Starters",
                    "priority: low-lift",
                ),
                TierSpec::new(
                    "Next Higher-Impact Set",
                    "Next Higher-Impact Set",
                    "priority: next-set",
                ),
                TierSpec::new("Phase 2 / Advanced", "Phase 2 / Advanced", "priority: phase-2"),
                TierSpec::new(
                    "Phase 3 / Differentiators & ML",
                    "Phase 3 / Differentiators",
                    "priority: phase-3",
                ),
            ],
            TierSpec::new("Backlog", "Backlog", "priority: backlog"),
        )
    }
}

/// Raw bullet lines captured under each tier heading, in document order.
///
/// A tier whose section was not found in the document maps to an empty
/// list rather than being absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierBullets {
    bullets: HashMap<String, Vec<String>>,
}

impl TierBullets {
    pub fn insert(&mut self, tier_title: &str, bullets: Vec<String>) {
        self.bullets.insert(tier_title.to_string(), bullets);
    }

    pub fn get(&self, tier_title: &str) -> &[String] {
        self.bullets.get(tier_title).map_or(&[], Vec::as_slice)
    }
}
