//! Tests for product classification and tier-based access resolution.
//!
//! Run with: `cargo test --test access_test`

use lokakelas_server::access::{can_access, classify_product, AccessTier, ResourceAccessLevel};

/// Pro keywords win anywhere in the title, case-insensitive, even when a
/// flat-tier keyword is also present.
#[test]
fn test_pro_keywords_take_precedence() {
    assert_eq!(classify_product("Kelas PRO Batch 3"), AccessTier::Pro);
    assert_eq!(classify_product("private mentoring"), AccessTier::Pro);
    assert_eq!(classify_product("Upgrade Paket"), AccessTier::Pro);
    // "pro" beats "ebook generator" when both appear
    assert_eq!(classify_product("Ebook Generator Pro"), AccessTier::Pro);
    assert_eq!(classify_product("Mind Care Upgrade"), AccessTier::Pro);
}

#[test]
fn test_flat_tier_keywords() {
    assert_eq!(classify_product("Ebook Generator Toolkit"), AccessTier::Ebook);
    assert_eq!(classify_product("Paket Mind Care"), AccessTier::Mindcare);
    assert_eq!(classify_product("kelas mindcare lanjutan"), AccessTier::Mindcare);
}

#[test]
fn test_unmatched_title_defaults_to_basic() {
    assert_eq!(classify_product("Kelas Pemula"), AccessTier::Basic);
    assert_eq!(classify_product(""), AccessTier::Basic);
}

/// Public resources are accessible to everyone, including anonymous.
#[test]
fn test_public_is_always_accessible() {
    assert!(can_access(None, ResourceAccessLevel::Public));
    for tier in AccessTier::ALL {
        assert!(can_access(Some(tier), ResourceAccessLevel::Public));
    }
}

/// Anonymous visitors reach nothing gated.
#[test]
fn test_anonymous_is_denied_gated_content() {
    assert!(!can_access(None, ResourceAccessLevel::Basic));
    assert!(!can_access(None, ResourceAccessLevel::Pro));
}

/// Pro sits above basic; ebook and mindcare sit below basic and are flat
/// peers of each other.
#[test]
fn test_tier_hierarchy() {
    assert!(can_access(Some(AccessTier::Pro), ResourceAccessLevel::Basic));
    assert!(can_access(Some(AccessTier::Pro), ResourceAccessLevel::Pro));

    assert!(can_access(Some(AccessTier::Basic), ResourceAccessLevel::Basic));
    assert!(!can_access(Some(AccessTier::Basic), ResourceAccessLevel::Pro));

    for flat in [AccessTier::Ebook, AccessTier::Mindcare] {
        assert!(!can_access(Some(flat), ResourceAccessLevel::Basic));
        assert!(!can_access(Some(flat), ResourceAccessLevel::Pro));
    }
}

/// The tier enumeration is closed: parsing rejects anything outside the four
/// known values instead of guessing a default.
#[test]
fn test_tier_parse_is_closed() {
    for tier in AccessTier::ALL {
        assert_eq!(AccessTier::parse(tier.as_str()), Some(tier));
    }
    assert_eq!(AccessTier::parse("premium"), None);
    assert_eq!(AccessTier::parse("PRO"), None);
    assert_eq!(AccessTier::parse(""), None);
}
