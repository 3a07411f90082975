use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::project;
use crate::error::AppError;
use crate::models::shared::validate_name;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateProjectRequest {
    /// Project name (1-128 characters). Also used for the device farm project.
    #[schema(example = "Checkout flow")]
    pub name: String,
    #[schema(example = "Smoke tests for the checkout screens")]
    pub description: Option<String>,
}

pub fn validate_create_project(payload: &CreateProjectRequest) -> Result<(), AppError> {
    validate_name(&payload.name, "Project name", 128)?;
    if let Some(description) = &payload.description
        && description.chars().count() > 2000
    {
        return Err(AppError::Validation(
            "Description must be at most 2000 characters".into(),
        ));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProjectResponse {
    #[schema(example = 1)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    /// Device farm project ARN; absent while the project is unlinked.
    #[schema(example = "arn:aws:devicefarm:us-west-2:123456789012:project:5e01a8c7")]
    pub vendor_project_arn: Option<String>,
    /// Whether uploads, runs, pools and sessions can be used with this project.
    pub linked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<project::Model> for ProjectResponse {
    fn from(p: project::Model) -> Self {
        Self {
            linked: p.is_linked(),
            id: p.id,
            name: p.name,
            description: p.description,
            vendor_project_arn: p.vendor_project_arn,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}
