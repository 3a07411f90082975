use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::AppError;

/// `?project_id=` filter used by every project-scoped listing.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ProjectQuery {
    /// Local project ID.
    pub project_id: i32,
}

/// `?arn=` selector for vendor-owned resources.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ArnQuery {
    /// Device farm ARN of the resource.
    pub arn: String,
}

/// Validate a trimmed display name (1..=`max` Unicode characters).
pub fn validate_name(value: &str, field: &str, max: usize) -> Result<(), AppError> {
    let value = value.trim();
    if value.is_empty() || value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{field} must be 1-{max} characters"
        )));
    }
    Ok(())
}

/// Reject a missing or blank vendor reference.
pub fn require_arn<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, AppError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{field} is required")))
}
