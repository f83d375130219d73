//! Course catalog module.
//!
//! Courses contain ordered modules, modules contain ordered materials. Every
//! sibling list keeps a dense zero-based `order_index`. Courses carry an
//! access level checked against the member's tier; a course the tier cannot
//! reach is surfaced as locked, never as a raw error.

pub(crate) mod handlers;
mod queries;
mod router;
mod types;
pub mod video;

pub use router::{admin_router, public_router};
pub use types::{
    CatalogError, Course, CourseRow, CourseWithModules, CreateCourseRequest,
    CreateMaterialRequest, CreateModuleRequest, ListedCourse, Material, MaterialKind, Module,
    ModuleWithMaterials, UpdateCourseRequest, UpdateMaterialRequest, UpdateModuleRequest,
};
