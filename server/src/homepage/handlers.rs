//! API handlers for the dynamic homepage.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::api::AppState;
use crate::homepage::{
    queries, CreateElementRequest, CreateSectionRequest, Element, HomepageError, Section,
    SectionWithElements, UpdateElementRequest, UpdateSectionRequest,
};
use crate::ordering::{apply_assignments, OrderedKind, ReorderRequest};

type HomepageResult<T> = Result<T, HomepageError>;

// ============================================================================
// Public surface
// ============================================================================

/// The assembled homepage: visible sections in display order, each with its
/// visible elements in display order.
#[utoipa::path(
    get,
    path = "/api/homepage",
    tag = "homepage",
    responses(
        (status = 200, description = "Visible sections with elements", body = Vec<SectionWithElements>),
    ),
)]
pub async fn get_homepage(
    State(state): State<AppState>,
) -> HomepageResult<Json<Vec<SectionWithElements>>> {
    let rows = queries::list_sections(&state.db, true).await?;
    let mut sections = Vec::with_capacity(rows.len());
    for row in rows {
        let section = Section::try_from(row)?;
        let elements = queries::list_elements(&state.db, section.id, true)
            .await?
            .into_iter()
            .map(Element::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        sections.push(SectionWithElements { section, elements });
    }
    Ok(Json(sections))
}

// ============================================================================
// Admin: sections
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/admin/homepage/sections",
    tag = "homepage",
    responses(
        (status = 200, description = "All sections including hidden", body = Vec<Section>),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn list_sections(State(state): State<AppState>) -> HomepageResult<Json<Vec<Section>>> {
    let sections = queries::list_sections(&state.db, false)
        .await?
        .into_iter()
        .map(Section::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(sections))
}

#[utoipa::path(
    post,
    path = "/api/admin/homepage/sections",
    tag = "homepage",
    request_body = CreateSectionRequest,
    responses(
        (status = 201, description = "Section created", body = Section),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn create_section(
    State(state): State<AppState>,
    Json(request): Json<CreateSectionRequest>,
) -> HomepageResult<(StatusCode, Json<Section>)> {
    request
        .validate()
        .map_err(|e| HomepageError::Validation(e.to_string()))?;

    let row = queries::create_section(
        &state.db,
        request.name.trim(),
        request.title.as_deref(),
        request.subtitle.as_deref(),
        request.background,
        request.is_visible,
    )
    .await?;

    info!(name = %request.name, "Created homepage section");
    Ok((StatusCode::CREATED, Json(Section::try_from(row)?)))
}

#[utoipa::path(
    put,
    path = "/api/admin/homepage/sections/{id}",
    tag = "homepage",
    params(("id" = Uuid, Path, description = "Section id")),
    request_body = UpdateSectionRequest,
    responses(
        (status = 200, description = "Section updated", body = Section),
        (status = 404, description = "Section not found"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn update_section(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateSectionRequest>,
) -> HomepageResult<Json<Section>> {
    request
        .validate()
        .map_err(|e| HomepageError::Validation(e.to_string()))?;

    let row = queries::update_section(
        &state.db,
        id,
        request.name.as_deref(),
        request.title.as_deref(),
        request.subtitle.as_deref(),
        request.background,
        request.is_visible,
    )
    .await?
    .ok_or(HomepageError::SectionNotFound)?;
    Ok(Json(Section::try_from(row)?))
}

#[utoipa::path(
    delete,
    path = "/api/admin/homepage/sections/{id}",
    tag = "homepage",
    params(("id" = Uuid, Path, description = "Section id")),
    responses(
        (status = 204, description = "Section deleted"),
        (status = 404, description = "Section not found"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn delete_section(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> HomepageResult<StatusCode> {
    if !queries::delete_section(&state.db, id).await? {
        return Err(HomepageError::SectionNotFound);
    }
    info!(section_id = %id, "Deleted homepage section");
    Ok(StatusCode::NO_CONTENT)
}

/// Reorder sections globally.
#[utoipa::path(
    post,
    path = "/api/admin/homepage/sections/reorder",
    tag = "homepage",
    request_body = ReorderRequest,
    responses(
        (status = 204, description = "Order persisted"),
        (status = 400, description = "Invalid reorder request"),
        (status = 500, description = "Partially applied; refetch the list"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn reorder_sections(
    State(state): State<AppState>,
    Json(request): Json<ReorderRequest>,
) -> HomepageResult<StatusCode> {
    let sections = queries::list_sections(&state.db, false)
        .await?
        .into_iter()
        .map(Section::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    let assignments = request.assignments(&sections)?;
    apply_assignments(&state.db, OrderedKind::HomepageSection, &assignments).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Admin: elements
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/admin/homepage/sections/{section_id}/elements",
    tag = "homepage",
    params(("section_id" = Uuid, Path, description = "Section id")),
    responses(
        (status = 200, description = "Elements including hidden", body = Vec<Element>),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn list_elements(
    State(state): State<AppState>,
    Path(section_id): Path<Uuid>,
) -> HomepageResult<Json<Vec<Element>>> {
    ensure_section_exists(&state, section_id).await?;
    let elements = queries::list_elements(&state.db, section_id, false)
        .await?
        .into_iter()
        .map(Element::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(elements))
}

#[utoipa::path(
    post,
    path = "/api/admin/homepage/sections/{section_id}/elements",
    tag = "homepage",
    params(("section_id" = Uuid, Path, description = "Section id")),
    request_body = CreateElementRequest,
    responses(
        (status = 201, description = "Element created", body = Element),
        (status = 404, description = "Section not found"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn create_element(
    State(state): State<AppState>,
    Path(section_id): Path<Uuid>,
    Json(request): Json<CreateElementRequest>,
) -> HomepageResult<(StatusCode, Json<Element>)> {
    request.content.validate()?;
    ensure_section_exists(&state, section_id).await?;

    let content = serde_json::to_value(&request.content)
        .map_err(|e| HomepageError::Validation(e.to_string()))?;
    let row = queries::create_element(&state.db, section_id, &content, request.is_visible).await?;
    Ok((StatusCode::CREATED, Json(Element::try_from(row)?)))
}

#[utoipa::path(
    get,
    path = "/api/admin/homepage/elements/{id}",
    tag = "homepage",
    params(("id" = Uuid, Path, description = "Element id")),
    responses(
        (status = 200, description = "Element", body = Element),
        (status = 404, description = "Element not found"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn get_element(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> HomepageResult<Json<Element>> {
    let row = queries::get_element(&state.db, id)
        .await?
        .ok_or(HomepageError::ElementNotFound)?;
    Ok(Json(Element::try_from(row)?))
}

#[utoipa::path(
    put,
    path = "/api/admin/homepage/elements/{id}",
    tag = "homepage",
    params(("id" = Uuid, Path, description = "Element id")),
    request_body = UpdateElementRequest,
    responses(
        (status = 200, description = "Element updated", body = Element),
        (status = 404, description = "Element not found"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn update_element(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateElementRequest>,
) -> HomepageResult<Json<Element>> {
    let content = match &request.content {
        Some(content) => {
            content.validate()?;
            Some(
                serde_json::to_value(content)
                    .map_err(|e| HomepageError::Validation(e.to_string()))?,
            )
        }
        None => None,
    };

    let row = queries::update_element(&state.db, id, content.as_ref(), request.is_visible)
        .await?
        .ok_or(HomepageError::ElementNotFound)?;
    Ok(Json(Element::try_from(row)?))
}

#[utoipa::path(
    delete,
    path = "/api/admin/homepage/elements/{id}",
    tag = "homepage",
    params(("id" = Uuid, Path, description = "Element id")),
    responses(
        (status = 204, description = "Element deleted"),
        (status = 404, description = "Element not found"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn delete_element(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> HomepageResult<StatusCode> {
    if !queries::delete_element(&state.db, id).await? {
        return Err(HomepageError::ElementNotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Reorder the elements of one section.
#[utoipa::path(
    post,
    path = "/api/admin/homepage/sections/{section_id}/elements/reorder",
    tag = "homepage",
    params(("section_id" = Uuid, Path, description = "Section id")),
    request_body = ReorderRequest,
    responses(
        (status = 204, description = "Order persisted"),
        (status = 400, description = "Invalid reorder request"),
        (status = 500, description = "Partially applied; refetch the list"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn reorder_elements(
    State(state): State<AppState>,
    Path(section_id): Path<Uuid>,
    Json(request): Json<ReorderRequest>,
) -> HomepageResult<StatusCode> {
    ensure_section_exists(&state, section_id).await?;
    let elements = queries::list_elements(&state.db, section_id, false)
        .await?
        .into_iter()
        .map(Element::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    let assignments = request.assignments(&elements)?;
    apply_assignments(&state.db, OrderedKind::HomepageElement, &assignments).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Helper Functions
// ============================================================================

async fn ensure_section_exists(state: &AppState, id: Uuid) -> HomepageResult<()> {
    queries::get_section(&state.db, id)
        .await?
        .ok_or(HomepageError::SectionNotFound)?;
    Ok(())
}
