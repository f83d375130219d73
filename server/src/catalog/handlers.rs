//! API handlers for the course catalog.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::access::can_access;
use crate::api::AppState;
use crate::catalog::{
    queries, CatalogError, Course, CourseWithModules, CreateCourseRequest, CreateMaterialRequest,
    CreateModuleRequest, ListedCourse, Material, Module, ModuleWithMaterials, UpdateCourseRequest,
    UpdateMaterialRequest, UpdateModuleRequest,
};
use crate::member::MemberIdentity;
use crate::ordering::{apply_assignments, OrderedKind, ReorderRequest};

type CatalogResult<T> = Result<T, CatalogError>;

// ============================================================================
// Public / member surface
// ============================================================================

/// List published courses in display order, each flagged with whether the
/// requesting member's tier can open it.
#[utoipa::path(
    get,
    path = "/api/courses",
    tag = "catalog",
    responses(
        (status = 200, description = "Published courses", body = Vec<ListedCourse>),
    ),
)]
pub async fn list_published_courses(
    State(state): State<AppState>,
    identity: MemberIdentity,
) -> CatalogResult<Json<Vec<ListedCourse>>> {
    let rows = queries::list_courses(&state.db, true).await?;
    let courses = rows
        .into_iter()
        .map(|row| {
            let course = Course::try_from(row)?;
            let locked = !can_access(identity.tier(), course.access_level);
            Ok(ListedCourse { course, locked })
        })
        .collect::<Result<Vec<_>, CatalogError>>()?;
    Ok(Json(courses))
}

/// Get a published course with its modules. A course the member's tier
/// cannot reach returns a locked response, not the content.
#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    tag = "catalog",
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course with modules", body = CourseWithModules),
        (status = 403, description = "Course locked for this tier"),
        (status = 404, description = "Course not found"),
    ),
)]
pub async fn get_published_course(
    State(state): State<AppState>,
    identity: MemberIdentity,
    Path(id): Path<Uuid>,
) -> CatalogResult<Json<CourseWithModules>> {
    let row = queries::get_course(&state.db, id)
        .await?
        .ok_or(CatalogError::CourseNotFound)?;
    let course = Course::try_from(row)?;
    if !course.is_published {
        return Err(CatalogError::CourseNotFound);
    }
    if !can_access(identity.tier(), course.access_level) {
        return Err(CatalogError::Locked);
    }

    let modules = queries::list_modules(&state.db, course.id).await?;
    Ok(Json(CourseWithModules { course, modules }))
}

/// Get a module with its materials, gated by the parent course's access
/// level.
#[utoipa::path(
    get,
    path = "/api/modules/{id}",
    tag = "catalog",
    params(("id" = Uuid, Path, description = "Module id")),
    responses(
        (status = 200, description = "Module with materials", body = ModuleWithMaterials),
        (status = 403, description = "Course locked for this tier"),
        (status = 404, description = "Module not found"),
    ),
)]
pub async fn get_module_with_materials(
    State(state): State<AppState>,
    identity: MemberIdentity,
    Path(id): Path<Uuid>,
) -> CatalogResult<Json<ModuleWithMaterials>> {
    let module = queries::get_module(&state.db, id)
        .await?
        .ok_or(CatalogError::ModuleNotFound)?;
    let course_row = queries::get_course(&state.db, module.course_id)
        .await?
        .ok_or(CatalogError::ModuleNotFound)?;
    let course = Course::try_from(course_row)?;
    if !course.is_published {
        return Err(CatalogError::ModuleNotFound);
    }
    if !can_access(identity.tier(), course.access_level) {
        return Err(CatalogError::Locked);
    }

    let materials = queries::list_materials(&state.db, module.id)
        .await?
        .into_iter()
        .map(Material::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(ModuleWithMaterials { module, materials }))
}

// ============================================================================
// Admin: courses
// ============================================================================

/// List all courses including drafts.
#[utoipa::path(
    get,
    path = "/api/admin/courses",
    tag = "catalog",
    responses(
        (status = 200, description = "All courses", body = Vec<Course>),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn list_courses(State(state): State<AppState>) -> CatalogResult<Json<Vec<Course>>> {
    let courses = queries::list_courses(&state.db, false)
        .await?
        .into_iter()
        .map(Course::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(courses))
}

/// Create a course, appended at the end of the display order.
#[utoipa::path(
    post,
    path = "/api/admin/courses",
    tag = "catalog",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = Course),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn create_course(
    State(state): State<AppState>,
    Json(request): Json<CreateCourseRequest>,
) -> CatalogResult<(StatusCode, Json<Course>)> {
    request
        .validate()
        .map_err(|e| CatalogError::Validation(e.to_string()))?;

    let row = queries::create_course(
        &state.db,
        request.title.trim(),
        request.description.as_deref(),
        request.thumbnail_url.as_deref(),
        request.is_published,
        request.access_level,
    )
    .await?;

    info!(title = %request.title, "Created course");
    Ok((StatusCode::CREATED, Json(Course::try_from(row)?)))
}

#[utoipa::path(
    put,
    path = "/api/admin/courses/{id}",
    tag = "catalog",
    params(("id" = Uuid, Path, description = "Course id")),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Course updated", body = Course),
        (status = 404, description = "Course not found"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCourseRequest>,
) -> CatalogResult<Json<Course>> {
    request
        .validate()
        .map_err(|e| CatalogError::Validation(e.to_string()))?;

    let row = queries::update_course(
        &state.db,
        id,
        request.title.as_deref(),
        request.description.as_deref(),
        request.thumbnail_url.as_deref(),
        request.is_published,
        request.access_level,
    )
    .await?
    .ok_or(CatalogError::CourseNotFound)?;

    Ok(Json(Course::try_from(row)?))
}

#[utoipa::path(
    delete,
    path = "/api/admin/courses/{id}",
    tag = "catalog",
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 404, description = "Course not found"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> CatalogResult<StatusCode> {
    if !queries::delete_course(&state.db, id).await? {
        return Err(CatalogError::CourseNotFound);
    }
    info!(course_id = %id, "Deleted course");
    Ok(StatusCode::NO_CONTENT)
}

/// Reorder courses. Accepts either a single-element move or an explicit full
/// ordering; either way every sibling's index is rewritten densely.
#[utoipa::path(
    post,
    path = "/api/admin/courses/reorder",
    tag = "catalog",
    request_body = ReorderRequest,
    responses(
        (status = 204, description = "Order persisted"),
        (status = 400, description = "Invalid reorder request"),
        (status = 500, description = "Partially applied; refetch the list"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn reorder_courses(
    State(state): State<AppState>,
    Json(request): Json<ReorderRequest>,
) -> CatalogResult<StatusCode> {
    let courses = queries::list_courses(&state.db, false)
        .await?
        .into_iter()
        .map(Course::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    let assignments = request.assignments(&courses)?;
    apply_assignments(&state.db, OrderedKind::Course, &assignments).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Admin: modules
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/admin/courses/{course_id}/modules",
    tag = "catalog",
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Modules in display order", body = Vec<Module>),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn list_modules(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> CatalogResult<Json<Vec<Module>>> {
    ensure_course_exists(&state, course_id).await?;
    Ok(Json(queries::list_modules(&state.db, course_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/courses/{course_id}/modules",
    tag = "catalog",
    params(("course_id" = Uuid, Path, description = "Course id")),
    request_body = CreateModuleRequest,
    responses(
        (status = 201, description = "Module created", body = Module),
        (status = 404, description = "Course not found"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn create_module(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Json(request): Json<CreateModuleRequest>,
) -> CatalogResult<(StatusCode, Json<Module>)> {
    request
        .validate()
        .map_err(|e| CatalogError::Validation(e.to_string()))?;
    ensure_course_exists(&state, course_id).await?;

    let module = queries::create_module(
        &state.db,
        course_id,
        request.title.trim(),
        request.description.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(module)))
}

#[utoipa::path(
    put,
    path = "/api/admin/modules/{id}",
    tag = "catalog",
    params(("id" = Uuid, Path, description = "Module id")),
    request_body = UpdateModuleRequest,
    responses(
        (status = 200, description = "Module updated", body = Module),
        (status = 404, description = "Module not found"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn update_module(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateModuleRequest>,
) -> CatalogResult<Json<Module>> {
    request
        .validate()
        .map_err(|e| CatalogError::Validation(e.to_string()))?;

    let module = queries::update_module(
        &state.db,
        id,
        request.title.as_deref(),
        request.description.as_deref(),
    )
    .await?
    .ok_or(CatalogError::ModuleNotFound)?;
    Ok(Json(module))
}

#[utoipa::path(
    delete,
    path = "/api/admin/modules/{id}",
    tag = "catalog",
    params(("id" = Uuid, Path, description = "Module id")),
    responses(
        (status = 204, description = "Module deleted"),
        (status = 404, description = "Module not found"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn delete_module(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> CatalogResult<StatusCode> {
    if !queries::delete_module(&state.db, id).await? {
        return Err(CatalogError::ModuleNotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Reorder the modules of one course.
#[utoipa::path(
    post,
    path = "/api/admin/courses/{course_id}/modules/reorder",
    tag = "catalog",
    params(("course_id" = Uuid, Path, description = "Course id")),
    request_body = ReorderRequest,
    responses(
        (status = 204, description = "Order persisted"),
        (status = 400, description = "Invalid reorder request"),
        (status = 500, description = "Partially applied; refetch the list"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn reorder_modules(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Json(request): Json<ReorderRequest>,
) -> CatalogResult<StatusCode> {
    ensure_course_exists(&state, course_id).await?;
    let modules = queries::list_modules(&state.db, course_id).await?;
    let assignments = request.assignments(&modules)?;
    apply_assignments(&state.db, OrderedKind::Module, &assignments).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Admin: materials
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/admin/modules/{module_id}/materials",
    tag = "catalog",
    params(("module_id" = Uuid, Path, description = "Module id")),
    responses(
        (status = 200, description = "Materials in display order", body = Vec<Material>),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn list_materials(
    State(state): State<AppState>,
    Path(module_id): Path<Uuid>,
) -> CatalogResult<Json<Vec<Material>>> {
    ensure_module_exists(&state, module_id).await?;
    let materials = queries::list_materials(&state.db, module_id)
        .await?
        .into_iter()
        .map(Material::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(materials))
}

#[utoipa::path(
    post,
    path = "/api/admin/modules/{module_id}/materials",
    tag = "catalog",
    params(("module_id" = Uuid, Path, description = "Module id")),
    request_body = CreateMaterialRequest,
    responses(
        (status = 201, description = "Material created", body = Material),
        (status = 404, description = "Module not found"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn create_material(
    State(state): State<AppState>,
    Path(module_id): Path<Uuid>,
    Json(request): Json<CreateMaterialRequest>,
) -> CatalogResult<(StatusCode, Json<Material>)> {
    request
        .validate()
        .map_err(|e| CatalogError::Validation(e.to_string()))?;
    ensure_module_exists(&state, module_id).await?;

    let row = queries::create_material(
        &state.db,
        module_id,
        request.kind,
        request.title.trim(),
        request.content.as_deref(),
        request.media_url.as_deref(),
        request.button_text.as_deref(),
        request.button_url.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(Material::try_from(row)?)))
}

#[utoipa::path(
    get,
    path = "/api/admin/materials/{id}",
    tag = "catalog",
    params(("id" = Uuid, Path, description = "Material id")),
    responses(
        (status = 200, description = "Material", body = Material),
        (status = 404, description = "Material not found"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn get_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> CatalogResult<Json<Material>> {
    let row = queries::get_material(&state.db, id)
        .await?
        .ok_or(CatalogError::MaterialNotFound)?;
    Ok(Json(Material::try_from(row)?))
}

#[utoipa::path(
    put,
    path = "/api/admin/materials/{id}",
    tag = "catalog",
    params(("id" = Uuid, Path, description = "Material id")),
    request_body = UpdateMaterialRequest,
    responses(
        (status = 200, description = "Material updated", body = Material),
        (status = 404, description = "Material not found"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn update_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateMaterialRequest>,
) -> CatalogResult<Json<Material>> {
    request
        .validate()
        .map_err(|e| CatalogError::Validation(e.to_string()))?;

    let row = queries::update_material(
        &state.db,
        id,
        request.kind,
        request.title.as_deref(),
        request.content.as_deref(),
        request.media_url.as_deref(),
        request.button_text.as_deref(),
        request.button_url.as_deref(),
    )
    .await?
    .ok_or(CatalogError::MaterialNotFound)?;
    Ok(Json(Material::try_from(row)?))
}

#[utoipa::path(
    delete,
    path = "/api/admin/materials/{id}",
    tag = "catalog",
    params(("id" = Uuid, Path, description = "Material id")),
    responses(
        (status = 204, description = "Material deleted"),
        (status = 404, description = "Material not found"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn delete_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> CatalogResult<StatusCode> {
    if !queries::delete_material(&state.db, id).await? {
        return Err(CatalogError::MaterialNotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Reorder the materials of one module.
#[utoipa::path(
    post,
    path = "/api/admin/modules/{module_id}/materials/reorder",
    tag = "catalog",
    params(("module_id" = Uuid, Path, description = "Module id")),
    request_body = ReorderRequest,
    responses(
        (status = 204, description = "Order persisted"),
        (status = 400, description = "Invalid reorder request"),
        (status = 500, description = "Partially applied; refetch the list"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn reorder_materials(
    State(state): State<AppState>,
    Path(module_id): Path<Uuid>,
    Json(request): Json<ReorderRequest>,
) -> CatalogResult<StatusCode> {
    ensure_module_exists(&state, module_id).await?;
    let materials = queries::list_materials(&state.db, module_id)
        .await?
        .into_iter()
        .map(Material::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    let assignments = request.assignments(&materials)?;
    apply_assignments(&state.db, OrderedKind::Material, &assignments).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Helper Functions
// ============================================================================

async fn ensure_course_exists(state: &AppState, id: Uuid) -> CatalogResult<()> {
    queries::get_course(&state.db, id)
        .await?
        .ok_or(CatalogError::CourseNotFound)?;
    Ok(())
}

async fn ensure_module_exists(state: &AppState, id: Uuid) -> CatalogResult<()> {
    queries::get_module(&state.db, id)
        .await?
        .ok_or(CatalogError::ModuleNotFound)?;
    Ok(())
}
