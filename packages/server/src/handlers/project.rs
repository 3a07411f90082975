use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::{info, instrument, warn};

use crate::entity::project;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::project::*;
use crate::state::AppState;
use crate::teardown::TeardownService;
use crate::utils::project::find_owned_project;

#[utoipa::path(
    get,
    path = "/api/v1/projects",
    tag = "Projects",
    operation_id = "listProjects",
    summary = "List the caller's projects",
    responses(
        (status = 200, description = "Projects, newest first", body = Vec<ProjectResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_projects(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectResponse>>, AppError> {
    let projects = project::Entity::find()
        .filter(project::Column::UserId.eq(auth_user.user_id))
        .order_by_desc(project::Column::CreatedAt)
        .order_by_desc(project::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(projects.into_iter().map(ProjectResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/projects",
    tag = "Projects",
    operation_id = "createProject",
    summary = "Create a project",
    description = "Creates the device farm project first. If the device farm is unavailable the project is still created, unlinked, and can be linked later.",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = ProjectResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, name = %payload.name))]
pub async fn create_project(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateProjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_project(&payload)?;
    let name = payload.name.trim().to_string();

    let vendor_project_arn = match state.vendor.create_project(&name).await {
        Ok(vendor_project) => Some(vendor_project.arn),
        Err(e) => {
            warn!(error = %e, "Device farm project creation failed, creating unlinked");
            None
        }
    };

    let now = chrono::Utc::now();
    let model = project::ActiveModel {
        user_id: Set(auth_user.user_id),
        name: Set(name),
        description: Set(payload.description),
        vendor_project_arn: Set(vendor_project_arn),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(ProjectResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}",
    tag = "Projects",
    operation_id = "getProject",
    summary = "Get a project",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project", body = ProjectResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_project(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProjectResponse>, AppError> {
    let project = find_owned_project(&state.db, auth_user.user_id, id).await?;
    Ok(Json(ProjectResponse::from(project)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}",
    tag = "Projects",
    operation_id = "deleteProject",
    summary = "Delete a project with its apps and runs",
    description = "Stops the project's live remote sessions, deletes the device farm project, then removes the project, its apps and its runs locally. If the device farm refuses the deletion nothing is removed locally.",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 204, description = "Project deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Device farm refused the deletion (UPSTREAM_ERROR) or local cleanup failed (PERSISTENCE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_project(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let project = find_owned_project(&state.db, auth_user.user_id, id).await?;

    TeardownService::new(&state.db, state.vendor.as_ref(), &state.config.teardown)
        .delete_project(auth_user.user_id, &project)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/link",
    tag = "Projects",
    operation_id = "linkProject",
    summary = "Create the device farm project for an unlinked project",
    description = "Retries device farm project creation. Already linked projects are returned unchanged.",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Linked project", body = ProjectResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Device farm request failed (UPSTREAM_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn link_project(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProjectResponse>, AppError> {
    let project = find_owned_project(&state.db, auth_user.user_id, id).await?;
    if project.is_linked() {
        return Ok(Json(ProjectResponse::from(project)));
    }

    let vendor_project = state.vendor.create_project(&project.name).await?;
    info!(arn = %vendor_project.arn, "Project linked");

    let mut active: project::ActiveModel = project.into();
    active.vendor_project_arn = Set(Some(vendor_project.arn));
    active.updated_at = Set(chrono::Utc::now());
    let model = active.update(&state.db).await?;

    Ok(Json(ProjectResponse::from(model)))
}
