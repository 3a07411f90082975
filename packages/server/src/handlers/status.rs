use axum::Json;
use axum::extract::State;
use tracing::{instrument, warn};

use crate::error::ErrorBody;
use crate::extractors::auth::AuthUser;
use crate::models::status::VendorStatusResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/status/vendor",
    tag = "Status",
    operation_id = "vendorStatus",
    summary = "Check device farm connectivity",
    description = "Issues one cheap device farm read. Always answers 200; a failed read is reported as `disconnected`.",
    responses(
        (status = 200, description = "Connectivity", body = VendorStatusResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn vendor_status(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Json<VendorStatusResponse> {
    match state.vendor.list_projects().await {
        Ok(_) => Json(VendorStatusResponse::connected()),
        Err(e) => {
            warn!(error = %e, "Device farm unreachable");
            Json(VendorStatusResponse::disconnected(e.to_string()))
        }
    }
}
