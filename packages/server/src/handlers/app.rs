use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use devicefarm::arn::belongs_to_project;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{app, run};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::extractors::query::AppQuery;
use crate::models::app::*;
use crate::models::shared::ProjectQuery;
use crate::state::AppState;
use crate::utils::project::{find_linked_project, find_owned_project};

async fn find_owned_app<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    id: i32,
) -> Result<app::Model, AppError> {
    app::Entity::find_by_id(id)
        .filter(app::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("App not found".into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/apps",
    tag = "Apps",
    operation_id = "listApps",
    summary = "List a project's apps",
    params(ProjectQuery),
    responses(
        (status = 200, description = "Apps, newest first", body = Vec<AppResponse>),
        (status = 400, description = "Missing project_id (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_apps(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ProjectQuery>,
) -> Result<Json<Vec<AppResponse>>, AppError> {
    let project = find_owned_project(&state.db, auth_user.user_id, query.project_id).await?;

    let apps = app::Entity::find()
        .filter(app::Column::UserId.eq(auth_user.user_id))
        .filter(app::Column::ProjectId.eq(project.id))
        .order_by_desc(app::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(apps.into_iter().map(AppResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/apps",
    tag = "Apps",
    operation_id = "createApp",
    summary = "Request an upload slot or confirm an uploaded app",
    description = "Two-phase upload. With `action = \"get_upload_url\"` returns a device farm upload slot (200, `UploadSlotResponse`) and stores nothing. The client then PUTs the binary to `upload_url` and calls this endpoint again without `action` to store the app (201, `AppResponse`). A supplied `upload_arn` must belong to the project; the app's upload reference is never invented by the server. Byte transfer itself is not verified.",
    request_body = CreateAppRequest,
    responses(
        (status = 200, description = "Upload slot", body = UploadSlotResponse),
        (status = 201, description = "App stored", body = AppResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR) or project not linked (RESOURCE_NOT_LINKED)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Device farm request failed (UPSTREAM_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, project_id = payload.project_id))]
pub async fn create_app(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateAppRequest>,
) -> Result<Response, AppError> {
    validate_create_app(&payload)?;

    match payload.action.as_deref() {
        Some(GET_UPLOAD_URL) => request_upload_slot(auth_user, state, payload)
            .await
            .map(|slot| Json(slot).into_response()),
        None => confirm_app(auth_user, state, payload)
            .await
            .map(|app| (StatusCode::CREATED, Json(app)).into_response()),
        Some(other) => Err(AppError::Validation(format!(
            "Unknown action '{other}'. Valid values: {GET_UPLOAD_URL}"
        ))),
    }
}

async fn request_upload_slot(
    auth_user: AuthUser,
    state: AppState,
    payload: CreateAppRequest,
) -> Result<UploadSlotResponse, AppError> {
    let (_, project_arn) =
        find_linked_project(&state.db, auth_user.user_id, payload.project_id).await?;

    let upload_name = payload
        .file_name
        .as_deref()
        .map(str::trim)
        .unwrap_or_else(|| payload.name.trim());
    let upload = state
        .vendor
        .create_upload(&project_arn, upload_name, payload.app_type.upload_type())
        .await?;

    info!(upload_arn = %upload.arn, "Upload slot issued");
    Ok(UploadSlotResponse {
        upload_url: upload.url,
        upload_arn: upload.arn,
        status: upload.status,
    })
}

async fn confirm_app(
    auth_user: AuthUser,
    state: AppState,
    payload: CreateAppRequest,
) -> Result<AppResponse, AppError> {
    let (project, project_arn) =
        find_linked_project(&state.db, auth_user.user_id, payload.project_id).await?;

    let upload_arn = payload
        .upload_arn
        .as_deref()
        .map(str::trim)
        .filter(|arn| !arn.is_empty());

    let upload_status = match upload_arn {
        Some(arn) => {
            if !belongs_to_project(arn, "upload", &project_arn) {
                return Err(AppError::Validation(
                    "upload_arn does not belong to this project".into(),
                ));
            }
            state.vendor.get_upload(arn).await?.status
        }
        None => None,
    };

    let model = app::ActiveModel {
        user_id: Set(auth_user.user_id),
        project_id: Set(project.id),
        name: Set(payload.name.trim().to_string()),
        app_type: Set(payload.app_type),
        file_name: Set(payload.file_name.map(|f| f.trim().to_string())),
        file_size: Set(payload.file_size),
        upload_arn: Set(upload_arn.map(str::to_string)),
        upload_status: Set(upload_status),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok(AppResponse::from(model))
}

#[utoipa::path(
    get,
    path = "/api/v1/apps/{id}",
    tag = "Apps",
    operation_id = "getApp",
    summary = "Get an app",
    params(("id" = i32, Path, description = "App ID")),
    responses(
        (status = 200, description = "App", body = AppResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "App not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_app(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<AppResponse>, AppError> {
    let app = find_owned_app(&state.db, auth_user.user_id, id).await?;
    Ok(Json(AppResponse::from(app)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/apps/{id}",
    tag = "Apps",
    operation_id = "deleteApp",
    summary = "Delete an app",
    description = "Runs that used the app are kept and lose their app reference.",
    params(("id" = i32, Path, description = "App ID")),
    responses(
        (status = 204, description = "App deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "App not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_app(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let app = find_owned_app(&txn, auth_user.user_id, id).await?;

    run::Entity::update_many()
        .col_expr(run::Column::AppId, Expr::value(Option::<i32>::None))
        .filter(run::Column::UserId.eq(auth_user.user_id))
        .filter(run::Column::AppId.eq(app.id))
        .exec(&txn)
        .await?;
    app::Entity::delete_by_id(app.id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}
