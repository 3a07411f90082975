use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use devicefarm::DevicePool;
use tracing::{info, instrument};

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::extractors::query::AppQuery;
use crate::models::device_pool::*;
use crate::models::shared::{ArnQuery, ProjectQuery, require_arn};
use crate::state::AppState;
use crate::utils::project::{find_linked_project, find_project_for_vendor_arn};

#[utoipa::path(
    get,
    path = "/api/v1/device-pools",
    tag = "Device Pools",
    operation_id = "listDevicePools",
    summary = "List a project's device pools",
    description = "Curated and private pools, as reported by the device farm.",
    params(ProjectQuery),
    responses(
        (status = 200, description = "Device pools", body = Vec<DevicePool>),
        (status = 400, description = "Missing project_id (VALIDATION_ERROR) or project not linked (RESOURCE_NOT_LINKED)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Device farm request failed (UPSTREAM_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_device_pools(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ProjectQuery>,
) -> Result<Json<Vec<DevicePool>>, AppError> {
    let (_, project_arn) =
        find_linked_project(&state.db, auth_user.user_id, query.project_id).await?;
    let pools = state.vendor.list_device_pools(&project_arn).await?;
    Ok(Json(pools))
}

#[utoipa::path(
    post,
    path = "/api/v1/device-pools",
    tag = "Device Pools",
    operation_id = "createDevicePool",
    summary = "Create a private device pool",
    request_body = CreateDevicePoolRequest,
    responses(
        (status = 201, description = "Device pool created", body = DevicePool),
        (status = 400, description = "Validation error (VALIDATION_ERROR) or project not linked (RESOURCE_NOT_LINKED)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Device farm request failed (UPSTREAM_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, project_id = payload.project_id))]
pub async fn create_device_pool(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateDevicePoolRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_device_pool(&payload)?;
    let (_, project_arn) =
        find_linked_project(&state.db, auth_user.user_id, payload.project_id).await?;

    let pool = state
        .vendor
        .create_device_pool(
            &project_arn,
            payload.name.trim(),
            payload.description.as_deref(),
            &payload.rules,
        )
        .await?;

    info!(arn = %pool.arn, "Device pool created");
    Ok((StatusCode::CREATED, Json(pool)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/device-pools",
    tag = "Device Pools",
    operation_id = "updateDevicePool",
    summary = "Rename a device pool or replace its rules",
    request_body = UpdateDevicePoolRequest,
    responses(
        (status = 200, description = "Updated device pool", body = DevicePool),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Device pool not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Device farm request failed (UPSTREAM_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, arn = %payload.arn))]
pub async fn update_device_pool(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateDevicePoolRequest>,
) -> Result<Json<DevicePool>, AppError> {
    validate_update_device_pool(&payload)?;
    let arn = require_arn(Some(&payload.arn), "arn")?;
    find_project_for_vendor_arn(&state.db, auth_user.user_id, arn, "devicepool", "Device pool")
        .await?;

    let pool = state
        .vendor
        .update_device_pool(
            arn,
            payload.name.as_deref().map(str::trim),
            payload.rules.as_deref(),
        )
        .await?;
    Ok(Json(pool))
}

#[utoipa::path(
    delete,
    path = "/api/v1/device-pools",
    tag = "Device Pools",
    operation_id = "deleteDevicePool",
    summary = "Delete a private device pool",
    params(ArnQuery),
    responses(
        (status = 204, description = "Device pool deleted"),
        (status = 400, description = "Missing or malformed arn (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Device pool not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Device farm request failed (UPSTREAM_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_device_pool(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ArnQuery>,
) -> Result<impl IntoResponse, AppError> {
    let arn = require_arn(Some(&query.arn), "arn")?;
    find_project_for_vendor_arn(&state.db, auth_user.user_id, arn, "devicepool", "Device pool")
        .await?;

    state.vendor.delete_device_pool(arn).await?;
    info!(arn, "Device pool deleted");
    Ok(StatusCode::NO_CONTENT)
}
