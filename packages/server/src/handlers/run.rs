use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::RunStatus;
use devicefarm::arn::belongs_to_project;
use devicefarm::{Artifact, ScheduleRun};
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{app, run};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::extractors::query::AppQuery;
use crate::models::run::*;
use crate::models::shared::ProjectQuery;
use crate::state::AppState;
use crate::utils::project::{find_linked_project, find_owned_project};

async fn find_owned_run<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    id: i32,
) -> Result<run::Model, AppError> {
    run::Entity::find_by_id(id)
        .filter(run::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Run not found".into()))
}

fn require_run_arn(run: &run::Model) -> Result<&str, AppError> {
    run.run_arn
        .as_deref()
        .ok_or_else(|| AppError::Validation("Run was never scheduled on the device farm".into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/runs",
    tag = "Runs",
    operation_id = "listRuns",
    summary = "List a project's runs",
    params(ProjectQuery),
    responses(
        (status = 200, description = "Runs, newest first", body = Vec<RunResponse>),
        (status = 400, description = "Missing project_id (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_runs(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ProjectQuery>,
) -> Result<Json<Vec<RunResponse>>, AppError> {
    let project = find_owned_project(&state.db, auth_user.user_id, query.project_id).await?;

    let runs = run::Entity::find()
        .filter(run::Column::UserId.eq(auth_user.user_id))
        .filter(run::Column::ProjectId.eq(project.id))
        .order_by_desc(run::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(runs.into_iter().map(RunResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/runs",
    tag = "Runs",
    operation_id = "createRun",
    summary = "Schedule a test run",
    description = "Schedules a fuzz run of a confirmed app on a device pool. Without `device_pool_arn` the project's first device pool is used.",
    request_body = CreateRunRequest,
    responses(
        (status = 201, description = "Run scheduled", body = RunResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR) or project not linked (RESOURCE_NOT_LINKED)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project, app or device pool not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Device farm request failed (UPSTREAM_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, project_id = payload.project_id))]
pub async fn create_run(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateRunRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_run(&payload)?;
    let (project, project_arn) =
        find_linked_project(&state.db, auth_user.user_id, payload.project_id).await?;

    let app_id = payload
        .app_id
        .ok_or_else(|| AppError::Validation("app_id is required".into()))?;
    let app = app::Entity::find_by_id(app_id)
        .filter(app::Column::UserId.eq(auth_user.user_id))
        .filter(app::Column::ProjectId.eq(project.id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("App not found".into()))?;
    let app_arn = app.upload_arn.clone().ok_or_else(|| {
        AppError::Validation("App has no confirmed upload on the device farm".into())
    })?;

    let device_pool_arn = match payload
        .device_pool_arn
        .as_deref()
        .map(str::trim)
        .filter(|arn| !arn.is_empty())
    {
        Some(arn) => {
            if !belongs_to_project(arn, "devicepool", &project_arn) {
                return Err(AppError::NotFound("Device pool not found".into()));
            }
            arn.to_string()
        }
        None => state
            .vendor
            .list_device_pools(&project_arn)
            .await?
            .into_iter()
            .next()
            .map(|pool| pool.arn)
            .ok_or_else(|| AppError::Validation("Project has no device pool".into()))?,
    };

    let name = payload.name.trim().to_string();
    let vendor_run = state
        .vendor
        .schedule_run(&ScheduleRun {
            project_arn,
            app_arn,
            device_pool_arn: device_pool_arn.clone(),
            name: name.clone(),
        })
        .await?;
    info!(run_arn = %vendor_run.arn, "Run scheduled");

    let now = chrono::Utc::now();
    let model = run::ActiveModel {
        user_id: Set(auth_user.user_id),
        project_id: Set(project.id),
        app_id: Set(Some(app.id)),
        name: Set(name),
        status: Set(RunStatus::from_vendor(
            vendor_run.status.as_deref(),
            vendor_run.result.as_deref(),
        )),
        run_arn: Set(Some(vendor_run.arn)),
        device_pool_arn: Set(Some(device_pool_arn)),
        result: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(RunResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/api/v1/runs/{id}",
    tag = "Runs",
    operation_id = "getRun",
    summary = "Get a run",
    params(("id" = i32, Path, description = "Run ID")),
    responses(
        (status = 200, description = "Run", body = RunResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Run not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_run(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<RunResponse>, AppError> {
    let run = find_owned_run(&state.db, auth_user.user_id, id).await?;
    Ok(Json(RunResponse::from(run)))
}

#[utoipa::path(
    post,
    path = "/api/v1/runs/{id}/stop",
    tag = "Runs",
    operation_id = "stopRun",
    summary = "Stop a run",
    description = "Asks the device farm to stop the run and marks it `cancelled`.",
    params(("id" = i32, Path, description = "Run ID")),
    responses(
        (status = 200, description = "Cancelled run", body = RunResponse),
        (status = 400, description = "Run already finished (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Run not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Device farm request failed (UPSTREAM_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn stop_run(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<RunResponse>, AppError> {
    let run = find_owned_run(&state.db, auth_user.user_id, id).await?;
    if run.status.is_final() {
        return Err(AppError::Validation(format!(
            "Run is already {}",
            run.status
        )));
    }

    if let Some(arn) = &run.run_arn {
        state.vendor.stop_run(arn).await?;
        info!(run_arn = %arn, "Run stop requested");
    }

    let mut active: run::ActiveModel = run.into();
    active.status = Set(RunStatus::Cancelled);
    active.updated_at = Set(chrono::Utc::now());
    let model = active.update(&state.db).await?;

    Ok(Json(RunResponse::from(model)))
}

#[utoipa::path(
    post,
    path = "/api/v1/runs/{id}/sync",
    tag = "Runs",
    operation_id = "syncRun",
    summary = "Refresh a run from the device farm",
    description = "Reads the vendor run once, stores its snapshot as `result` and maps its status.",
    params(("id" = i32, Path, description = "Run ID")),
    responses(
        (status = 200, description = "Synced run", body = RunResponse),
        (status = 400, description = "Run was never scheduled (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Run not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Device farm request failed (UPSTREAM_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn sync_run(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<RunResponse>, AppError> {
    let run = find_owned_run(&state.db, auth_user.user_id, id).await?;
    let vendor_run = state.vendor.get_run(require_run_arn(&run)?).await?;

    let status = RunStatus::from_vendor(vendor_run.status.as_deref(), vendor_run.result.as_deref());
    let snapshot =
        serde_json::to_value(&vendor_run).map_err(|e| AppError::Internal(e.to_string()))?;

    let mut active: run::ActiveModel = run.into();
    active.status = Set(status);
    active.result = Set(Some(snapshot));
    active.updated_at = Set(chrono::Utc::now());
    let model = active.update(&state.db).await?;

    Ok(Json(RunResponse::from(model)))
}

#[utoipa::path(
    get,
    path = "/api/v1/runs/{id}/artifacts",
    tag = "Runs",
    operation_id = "listRunArtifacts",
    summary = "List a run's artifacts",
    params(("id" = i32, Path, description = "Run ID"), ArtifactQuery),
    responses(
        (status = 200, description = "Artifacts with download URLs", body = Vec<Artifact>),
        (status = 400, description = "Unknown type or run never scheduled (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Run not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Device farm request failed (UPSTREAM_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_run_artifacts(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppQuery(query): AppQuery<ArtifactQuery>,
) -> Result<Json<Vec<Artifact>>, AppError> {
    let category = query.category()?;
    let run = find_owned_run(&state.db, auth_user.user_id, id).await?;
    let artifacts = state
        .vendor
        .list_artifacts(require_run_arn(&run)?, category)
        .await?;
    Ok(Json(artifacts))
}
