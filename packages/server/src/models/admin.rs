use serde::Serialize;

/// Outcome of an account-wide reset.
///
/// Projects whose device farm teardown failed are kept locally so the reset
/// can be retried for them.
#[derive(Debug, Default, Serialize, utoipa::ToSchema)]
pub struct ResetReport {
    /// Local IDs of the projects that were removed.
    pub projects_deleted: Vec<i32>,
    pub projects_failed: Vec<FailedProject>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct FailedProject {
    pub id: i32,
    pub name: String,
    /// Why the device farm refused the deletion.
    pub error: String,
}
