use axum::Json;
use axum::extract::State;
use devicefarm::Device;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::query::AppQuery;
use crate::models::device::DeviceQuery;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/devices",
    tag = "Devices",
    operation_id = "listDevices",
    summary = "List the device farm's device catalogue",
    params(DeviceQuery),
    responses(
        (status = 200, description = "Devices", body = Vec<Device>),
        (status = 400, description = "Unknown platform (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 500, description = "Device farm request failed (UPSTREAM_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_devices(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<DeviceQuery>,
) -> Result<Json<Vec<Device>>, AppError> {
    let platform = query.platform()?;
    let devices = state.vendor.list_devices(platform).await?;
    Ok(Json(devices))
}
