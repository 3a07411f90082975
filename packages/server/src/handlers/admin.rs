use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::admin::ResetReport;
use crate::state::AppState;
use crate::teardown::TeardownService;

#[utoipa::path(
    delete,
    path = "/api/v1/admin/reset",
    tag = "Admin",
    operation_id = "resetAccount",
    summary = "Tear down every project of the caller",
    description = "Runs the project teardown for all of the caller's projects concurrently. Projects the device farm refused to delete are kept and listed in `projects_failed`; the response is then 207.",
    responses(
        (status = 200, description = "All projects deleted", body = ResetReport),
        (status = 207, description = "Some projects could not be deleted", body = ResetReport),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 500, description = "Local cleanup failed (PERSISTENCE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn reset_account(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let report = TeardownService::new(&state.db, state.vendor.as_ref(), &state.config.teardown)
        .reset_account(auth_user.user_id)
        .await?;

    let status = if report.projects_failed.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::MULTI_STATUS
    };
    Ok((status, Json(report)))
}
