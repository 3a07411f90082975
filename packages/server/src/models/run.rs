use chrono::{DateTime, Utc};
use common::{ArtifactCategory, ParseEnumError, RunStatus};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::entity::run;
use crate::error::AppError;
use crate::models::shared::validate_name;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateRunRequest {
    #[schema(example = 1)]
    pub project_id: i32,
    /// App to test. It must have a confirmed upload.
    #[schema(example = 3)]
    pub app_id: Option<i32>,
    /// Run name (1-100 characters).
    #[schema(example = "Nightly fuzz")]
    pub name: String,
    /// Target pool. Defaults to the project's first device pool.
    pub device_pool_arn: Option<String>,
}

pub fn validate_create_run(payload: &CreateRunRequest) -> Result<(), AppError> {
    validate_name(&payload.name, "Run name", 100)
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RunResponse {
    #[schema(example = 9)]
    pub id: i32,
    pub project_id: i32,
    pub app_id: Option<i32>,
    pub name: String,
    pub status: RunStatus,
    pub run_arn: Option<String>,
    pub device_pool_arn: Option<String>,
    /// Last vendor snapshot stored by sync.
    pub result: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<run::Model> for RunResponse {
    fn from(r: run::Model) -> Self {
        Self {
            id: r.id,
            project_id: r.project_id,
            app_id: r.app_id,
            name: r.name,
            status: r.status,
            run_arn: r.run_arn,
            device_pool_arn: r.device_pool_arn,
            result: r.result,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ArtifactQuery {
    /// `SCREENSHOT`, `FILE` or `LOG`. Default: `FILE`.
    #[serde(rename = "type")]
    pub category: Option<String>,
}

impl ArtifactQuery {
    pub fn category(&self) -> Result<ArtifactCategory, AppError> {
        match self.category.as_deref() {
            None => Ok(ArtifactCategory::default()),
            Some(value) => value
                .parse()
                .map_err(|e: ParseEnumError| AppError::Validation(e.to_string())),
        }
    }
}
