use devicefarm::arn::Arn;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::entity::project;
use crate::error::AppError;

/// Look up a project owned by `user_id`, returning 404 for missing and foreign ones alike.
pub async fn find_owned_project<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    id: i32,
) -> Result<project::Model, AppError> {
    project::Entity::find_by_id(id)
        .filter(project::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))
}

/// Vendor ARN of a linked project, or `ResourceNotLinked`.
pub fn require_linked(project: &project::Model) -> Result<&str, AppError> {
    project
        .vendor_project_arn
        .as_deref()
        .ok_or(AppError::NotLinked)
}

/// Owned project that is linked to the device farm, with its vendor ARN.
pub async fn find_linked_project<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    id: i32,
) -> Result<(project::Model, String), AppError> {
    let project = find_owned_project(db, user_id, id).await?;
    let arn = require_linked(&project)?.to_string();
    Ok((project, arn))
}

/// Resolve the caller's project that owns a vendor resource such as a session,
/// upload or device pool, from the project id embedded in the resource ARN.
///
/// A malformed ARN is a validation error; a well-formed ARN of the wrong kind,
/// or one under somebody else's project, is reported as not found.
pub async fn find_project_for_vendor_arn<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    resource_arn: &str,
    kind: &str,
    label: &str,
) -> Result<project::Model, AppError> {
    let parsed = Arn::parse(resource_arn)
        .map_err(|_| AppError::Validation(format!("Invalid {label} ARN")))?;
    let not_found = || AppError::NotFound(format!("{label} not found"));

    if parsed.kind != kind {
        return Err(not_found());
    }
    let project_arn = parsed.project_arn().ok_or_else(not_found)?;

    project::Entity::find()
        .filter(project::Column::UserId.eq(user_id))
        .filter(project::Column::VendorProjectArn.eq(project_arn))
        .one(db)
        .await?
        .ok_or_else(not_found)
}
