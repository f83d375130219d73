//! Access resolution logic.
//!
//! Classifies product purchases into access tiers and decides whether a
//! tier satisfies a resource's required level.

use super::tier::{AccessTier, ResourceAccessLevel};

/// Determine the access tier granted by a product purchase.
///
/// Case-insensitive substring match against keyword groups, first match wins:
/// 1. "pro", "private" or "upgrade" anywhere in the title grants pro
/// 2. "ebook generator" grants the flat ebook tier
/// 3. "mind care" / "mindcare" grants the flat mindcare tier
/// 4. anything else grants basic
///
/// This is the sole authority for tier assignment during automated ingestion.
/// Admin manual entry and CSV import bypass it and name the tier explicitly.
#[must_use]
pub fn classify_product(product_title: &str) -> AccessTier {
    let title = product_title.to_lowercase();

    if title.contains("pro") || title.contains("private") || title.contains("upgrade") {
        return AccessTier::Pro;
    }

    if title.contains("ebook generator") {
        return AccessTier::Ebook;
    }

    if title.contains("mind care") || title.contains("mindcare") {
        return AccessTier::Mindcare;
    }

    AccessTier::Basic
}

/// Decide whether a tier may view a resource gated at `level`.
///
/// Public resources are always visible, including to anonymous visitors.
/// Otherwise an anonymous visitor sees nothing, and an authenticated tier
/// must rank at least as high as the resource requires.
#[must_use]
pub fn can_access(tier: Option<AccessTier>, level: ResourceAccessLevel) -> bool {
    if level == ResourceAccessLevel::Public {
        return true;
    }

    match tier {
        None => false,
        Some(t) => t.rank() >= level.required_rank(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pro_keywords_win_regardless_of_other_matches() {
        assert_eq!(classify_product("Tools PRO Upgrade"), AccessTier::Pro);
        assert_eq!(classify_product("private coaching"), AccessTier::Pro);
        assert_eq!(classify_product("Upgrade Paket Lengkap"), AccessTier::Pro);
        // "pro" keyword takes precedence even when an ebook keyword is present
        assert_eq!(
            classify_product("Ebook Generator Pro Edition"),
            AccessTier::Pro
        );
        assert_eq!(classify_product("Mind Care Private"), AccessTier::Pro);
    }

    #[test]
    fn test_flat_tier_keywords() {
        assert_eq!(classify_product("Ebook Generator"), AccessTier::Ebook);
        assert_eq!(classify_product("paket EBOOK GENERATOR v2"), AccessTier::Ebook);
        assert_eq!(classify_product("Mind Care Bundle"), AccessTier::Mindcare);
        assert_eq!(classify_product("mindcare basic pack"), AccessTier::Mindcare);
    }

    #[test]
    fn test_unmatched_titles_default_to_basic() {
        assert_eq!(classify_product("Kelas Pemula"), AccessTier::Basic);
        assert_eq!(classify_product(""), AccessTier::Basic);
        // "ebook" alone is not enough; the keyword is "ebook generator"
        assert_eq!(classify_product("Ebook Bundle"), AccessTier::Basic);
    }

    #[test]
    fn test_public_is_always_accessible() {
        for tier in AccessTier::ALL {
            assert!(can_access(Some(tier), ResourceAccessLevel::Public));
        }
        assert!(can_access(None, ResourceAccessLevel::Public));
    }

    #[test]
    fn test_anonymous_cannot_access_gated_levels() {
        assert!(!can_access(None, ResourceAccessLevel::Basic));
        assert!(!can_access(None, ResourceAccessLevel::Pro));
    }

    #[test]
    fn test_flat_tiers_rank_below_basic() {
        // Regression guard: ebook and mindcare are sub-basic by design
        assert!(!can_access(Some(AccessTier::Ebook), ResourceAccessLevel::Basic));
        assert!(!can_access(Some(AccessTier::Mindcare), ResourceAccessLevel::Basic));
        assert!(!can_access(Some(AccessTier::Ebook), ResourceAccessLevel::Pro));
        assert!(!can_access(Some(AccessTier::Mindcare), ResourceAccessLevel::Pro));
    }

    #[test]
    fn test_hierarchy_comparisons() {
        assert!(can_access(Some(AccessTier::Pro), ResourceAccessLevel::Basic));
        assert!(can_access(Some(AccessTier::Pro), ResourceAccessLevel::Pro));
        assert!(can_access(Some(AccessTier::Basic), ResourceAccessLevel::Basic));
        assert!(!can_access(Some(AccessTier::Basic), ResourceAccessLevel::Pro));
    }

    #[test]
    fn test_tier_parse_round_trip() {
        for tier in AccessTier::ALL {
            assert_eq!(AccessTier::parse(tier.as_str()), Some(tier));
        }
        assert_eq!(AccessTier::parse("platinum"), None);
        assert_eq!(AccessTier::parse("Basic"), None); // storage form is lowercase
    }
}
