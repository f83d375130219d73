//! Access tier and resource level enumerations.

use serde::{Deserialize, Serialize};

/// The access category assigned to a buyer, derived from their purchase.
///
/// Hierarchy: pro > basic. `Ebook` and `Mindcare` are flat one-off product
/// tiers with equal rank below basic; a buyer holding only one of them can
/// view public resources but nothing gated at basic or above.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AccessTier {
    Basic,
    Pro,
    Ebook,
    Mindcare,
}

impl AccessTier {
    /// Numeric rank used for authorization comparisons.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Pro => 3,
            Self::Basic => 2,
            Self::Ebook | Self::Mindcare => 1,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Pro => "pro",
            Self::Ebook => "ebook",
            Self::Mindcare => "mindcare",
        }
    }

    /// Parse a stored tier string. `None` signals a value outside the closed
    /// set, which callers at deserialization boundaries must reject rather
    /// than default.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "basic" => Some(Self::Basic),
            "pro" => Some(Self::Pro),
            "ebook" => Some(Self::Ebook),
            "mindcare" => Some(Self::Mindcare),
            _ => None,
        }
    }

    /// All valid tiers, in display order. Used for CSV error messages.
    pub const ALL: [Self; 4] = [Self::Basic, Self::Pro, Self::Ebook, Self::Mindcare];
}

impl std::fmt::Display for AccessTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The minimum tier required to view a course.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResourceAccessLevel {
    Public,
    Basic,
    Pro,
}

impl ResourceAccessLevel {
    /// Minimum tier rank required to view a resource at this level.
    #[must_use]
    pub const fn required_rank(self) -> u8 {
        match self {
            Self::Public => 0,
            Self::Basic => 2,
            Self::Pro => 3,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Basic => "basic",
            Self::Pro => "pro",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "public" => Some(Self::Public),
            "basic" => Some(Self::Basic),
            "pro" => Some(Self::Pro),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResourceAccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
