use chrono::{DateTime, Utc};
use common::AppType;
use serde::{Deserialize, Serialize};

use crate::entity::app;
use crate::error::AppError;
use crate::models::shared::validate_name;

/// Value of `action` that turns `POST /apps` into an upload slot request.
pub const GET_UPLOAD_URL: &str = "get_upload_url";

/// Body of `POST /apps`.
///
/// With `action = "get_upload_url"` the server asks the device farm for an
/// upload slot and returns its write-once URL; nothing is stored. Without
/// `action` the body confirms a finished upload and persists the app.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateAppRequest {
    #[schema(example = "get_upload_url")]
    pub action: Option<String>,
    #[schema(example = 1)]
    pub project_id: i32,
    /// Display name (1-100 characters).
    #[schema(example = "Shop 2.3.1")]
    pub name: String,
    pub app_type: AppType,
    /// Binary file name, e.g. `shop.apk`. Used as the upload name when present.
    #[schema(example = "shop-2.3.1.apk")]
    pub file_name: Option<String>,
    #[schema(example = 48213504)]
    pub file_size: Option<i64>,
    /// Upload ARN returned by the slot request. Only meaningful on confirmation.
    pub upload_arn: Option<String>,
}

pub fn validate_create_app(payload: &CreateAppRequest) -> Result<(), AppError> {
    validate_name(&payload.name, "App name", 100)?;
    if let Some(file_name) = &payload.file_name {
        validate_name(file_name, "File name", 255)?;
    }
    if let Some(size) = payload.file_size
        && size <= 0
    {
        return Err(AppError::Validation("file_size must be positive".into()));
    }
    Ok(())
}

/// Upload slot handed back by `action = "get_upload_url"`.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadSlotResponse {
    /// Presigned URL to PUT the binary to.
    pub upload_url: Option<String>,
    pub upload_arn: String,
    #[schema(example = "INITIALIZED")]
    pub status: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AppResponse {
    #[schema(example = 3)]
    pub id: i32,
    pub project_id: i32,
    pub name: String,
    pub app_type: AppType,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    /// Present only when the confirmation supplied an upload ARN.
    pub upload_arn: Option<String>,
    /// Vendor upload state seen at confirmation, e.g. `INITIALIZED` or `SUCCEEDED`.
    pub upload_status: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<app::Model> for AppResponse {
    fn from(a: app::Model) -> Self {
        Self {
            id: a.id,
            project_id: a.project_id,
            name: a.name,
            app_type: a.app_type,
            file_name: a.file_name,
            file_size: a.file_size,
            upload_arn: a.upload_arn,
            upload_status: a.upload_status,
            created_at: a.created_at,
        }
    }
}
