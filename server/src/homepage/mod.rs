//! Dynamic homepage module.
//!
//! The public landing page is assembled from ordered sections, each holding
//! ordered elements. Element content is a tagged union dispatched on a
//! `type` tag, with each variant's fields statically known; the union is
//! stored as one JSONB column.

pub(crate) mod handlers;
mod queries;
mod router;
mod types;

pub use router::{admin_router, public_router};
pub use types::{
    Background, CardContent, CreateElementRequest, CreateSectionRequest, Element, ElementContent,
    HomepageError, Section, SectionWithElements, UpdateElementRequest, UpdateSectionRequest,
};
