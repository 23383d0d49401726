//! Priority classification.
//!
//! Maps a feature title onto one of the configured tiers by scanning each
//! tier's bullet list for a textual match. Tier order is precedence order:
//! the first tier containing any matching bullet wins, and a feature that
//! matches nothing lands in the fallback tier.

use crate::models::{TierBullets, TierSet, TierSpec};

/// Matching strategy between a feature title and a tier bullet.
///
/// Kept as an explicit seam so stricter matchers can be swapped in; the
/// default [`ContainsMatcher`] trades precision for zero missed
/// classifications.
pub trait BulletMatcher: Send + Sync {
    fn matches(&self, feature: &str, bullet: &str) -> bool;
}

/// Bidirectional case-insensitive substring containment.
///
/// Bullets and feature titles are hand-authored independently, so neither
/// is reliably a verbatim copy of the other: bullets carry trailing
/// annotations ("Multi-phase brew timer + Watch support"), and features may
/// be abbreviated forms of a bullet. Checking containment both ways covers
/// both cases. Known trade-off: a short generic feature title can match an
/// unrelated bullet.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContainsMatcher;

impl BulletMatcher for ContainsMatcher {
    fn matches(&self, feature: &str, bullet: &str) -> bool {
        let feature = feature.to_lowercase();
        let bullet = bullet.to_lowercase();
        bullet.contains(&feature) || feature.contains(&bullet)
    }
}

/// Classify one feature title into a tier.
///
/// Tiers are consulted in declaration order and bullets in document order;
/// the first match returns immediately, so a feature matching bullets in
/// several tiers gets the earliest-declared one.
pub fn classify<'a>(
    feature: &str,
    bullets: &TierBullets,
    tiers: &'a TierSet,
    matcher: &dyn BulletMatcher,
) -> &'a TierSpec {
    for tier in tiers.tiers() {
        if bullets
            .get(&tier.title)
            .iter()
            .any(|bullet| matcher.matches(feature, bullet))
        {
            return tier;
        }
    }
    tiers.fallback()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_matcher_is_bidirectional() {
        let m = ContainsMatcher;
        assert!(m.matches("Dark mode", "Dark mode for the app"));
        assert!(m.matches("Dark mode for the app and widgets", "dark mode"));
        assert!(!m.matches("Dark mode", "Brew timer"));
    }

    #[test]
    fn contains_matcher_ignores_case() {
        let m = ContainsMatcher;
        assert!(m.matches("DARK MODE", "dark mode (nice to have)"));
    }
}
