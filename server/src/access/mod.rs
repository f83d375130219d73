//! Access control module.
//!
//! Maps buyer purchases to access tiers and evaluates whether a tier may
//! view a resource. Pure logic with no database or network dependencies;
//! every other feature module consults this one for authorization decisions.

mod resolver;
mod tier;

pub use resolver::{can_access, classify_product};
pub use tier::{AccessTier, ResourceAccessLevel};
