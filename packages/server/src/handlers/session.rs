use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::extractors::query::AppQuery;
use crate::models::session::*;
use crate::models::shared::{ArnQuery, ProjectQuery};
use crate::session::{SessionManager, SessionStatus};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/sessions",
    tag = "Sessions",
    operation_id = "startSession",
    summary = "Start a remote-access session",
    description = "Requests an interactive session on one device. The session starts `PENDING`; poll `GET /sessions?arn=` until `done` is true.",
    request_body = StartSessionRequest,
    responses(
        (status = 201, description = "Session requested", body = SessionStatus),
        (status = 400, description = "Missing device_arn (VALIDATION_ERROR) or project not linked (RESOURCE_NOT_LINKED)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Device farm refused the session (UPSTREAM_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, project_id = payload.project_id))]
pub async fn start_session(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<StartSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = SessionManager::new(&state.db, state.vendor.as_ref(), &state.config.session)
        .start(
            auth_user.user_id,
            payload.project_id,
            payload.device_arn.as_deref(),
            payload.name.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[utoipa::path(
    get,
    path = "/api/v1/sessions",
    tag = "Sessions",
    operation_id = "pollSession",
    summary = "Poll a remote-access session",
    description = "One fresh read of the session. `done` turns true once the session is `RUNNING` with an endpoint, or has ended.",
    params(ArnQuery),
    responses(
        (status = 200, description = "Current session state", body = SessionStatus),
        (status = 400, description = "Missing or malformed arn (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Session not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Device farm request failed (UPSTREAM_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn poll_session(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ArnQuery>,
) -> Result<Json<SessionStatus>, AppError> {
    let session = SessionManager::new(&state.db, state.vendor.as_ref(), &state.config.session)
        .poll(auth_user.user_id, &query.arn)
        .await?;
    Ok(Json(session))
}

#[utoipa::path(
    delete,
    path = "/api/v1/sessions",
    tag = "Sessions",
    operation_id = "stopSession",
    summary = "Stop a remote-access session",
    description = "Best effort: succeeds even when the device farm rejects the stop, e.g. because the session already ended.",
    params(ArnQuery),
    responses(
        (status = 200, description = "Stop requested", body = StopSessionResponse),
        (status = 400, description = "Missing or malformed arn (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Session not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn stop_session(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ArnQuery>,
) -> Result<Json<StopSessionResponse>, AppError> {
    let response = SessionManager::new(&state.db, state.vendor.as_ref(), &state.config.session)
        .stop(auth_user.user_id, &query.arn)
        .await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/v1/sessions/list",
    tag = "Sessions",
    operation_id = "listSessions",
    summary = "List a project's remote-access sessions",
    params(ProjectQuery),
    responses(
        (status = 200, description = "Sessions as reported by the device farm", body = Vec<SessionStatus>),
        (status = 400, description = "Missing project_id (VALIDATION_ERROR) or project not linked (RESOURCE_NOT_LINKED)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Device farm request failed (UPSTREAM_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_sessions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ProjectQuery>,
) -> Result<Json<Vec<SessionStatus>>, AppError> {
    let sessions = SessionManager::new(&state.db, state.vendor.as_ref(), &state.config.session)
        .list(auth_user.user_id, query.project_id)
        .await?;
    Ok(Json(sessions))
}
