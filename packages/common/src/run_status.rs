#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ParseEnumError;

/// Local status of a scheduled test run.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Scheduled on the device farm, not started yet.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "pending"))]
    Pending,
    /// Executing on at least one device.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "running"))]
    Running,
    /// Finished and passed.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "completed"))]
    Completed,
    /// Finished with failures or errors.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "failed"))]
    Failed,
    /// Stopped by the user.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "cancelled"))]
    Cancelled,
}

impl RunStatus {
    /// Returns true once the run can no longer change on the vendor side.
    pub fn is_final(&self) -> bool {
        !matches!(self, Self::Pending | Self::Running)
    }

    /// All possible status values.
    pub const ALL: &'static [RunStatus] = &[
        Self::Pending,
        Self::Running,
        Self::Completed,
        Self::Failed,
        Self::Cancelled,
    ];

    const NAMES: &'static [&'static str] =
        &["pending", "running", "completed", "failed", "cancelled"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Map a vendor execution status and result onto the local vocabulary.
    ///
    /// The vendor reports `status` (PENDING, SCHEDULING, RUNNING, STOPPING,
    /// COMPLETED, ...) and, once completed, a `result` (PASSED, FAILED,
    /// ERRORED, STOPPED, ...).
    pub fn from_vendor(status: Option<&str>, result: Option<&str>) -> Self {
        match status {
            Some("COMPLETED") => match result {
                Some("PASSED") | Some("WARNED") | Some("SKIPPED") => Self::Completed,
                Some("STOPPED") => Self::Cancelled,
                _ => Self::Failed,
            },
            Some("RUNNING") | Some("STOPPING") => Self::Running,
            _ => Self::Pending,
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for RunStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl FromStr for RunStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseEnumError::new("run status", s, Self::NAMES)),
        }
    }
}
