//! Vendor-side resources, reduced to the fields the console uses.
//!
//! Every field is optional on the vendor side; only the ARN is treated as
//! mandatory and checked when a response is converted.

use chrono::{DateTime, Utc};
use common::SessionPhase;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Project {
    pub arn: String,
    pub name: Option<String>,
    pub created: Option<DateTime<Utc>>,
}

/// Single device pool rule, e.g. `PLATFORM EQUALS "ANDROID"`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PoolRule {
    #[schema(example = "PLATFORM")]
    pub attribute: String,
    #[schema(example = "EQUALS")]
    pub operator: String,
    /// JSON-encoded operand, as the vendor expects it.
    #[schema(example = "\"ANDROID\"")]
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DevicePool {
    pub arn: String,
    pub name: Option<String>,
    pub description: Option<String>,
    /// `CURATED` for vendor-provided pools, `PRIVATE` for user-defined ones.
    pub pool_type: Option<String>,
    pub rules: Vec<PoolRule>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Device {
    pub arn: String,
    pub name: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub os: Option<String>,
    pub platform: Option<String>,
    pub form_factor: Option<String>,
    pub remote_access_enabled: Option<bool>,
    pub availability: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Upload {
    pub arn: String,
    pub name: Option<String>,
    pub upload_type: Option<String>,
    /// `INITIALIZED`, `PROCESSING`, `SUCCEEDED` or `FAILED`.
    pub status: Option<String>,
    /// Write-once presigned URL the client PUTs the binary to.
    pub url: Option<String>,
    pub message: Option<String>,
}

/// Parameters of a run to schedule.
#[derive(Clone, Debug)]
pub struct ScheduleRun {
    pub project_arn: String,
    pub app_arn: String,
    pub device_pool_arn: String,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RunCounters {
    pub total: Option<i32>,
    pub passed: Option<i32>,
    pub failed: Option<i32>,
    pub errored: Option<i32>,
    pub stopped: Option<i32>,
    pub skipped: Option<i32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Run {
    pub arn: String,
    pub name: Option<String>,
    pub status: Option<String>,
    pub result: Option<String>,
    pub counters: Option<RunCounters>,
    pub created: Option<DateTime<Utc>>,
    pub started: Option<DateTime<Utc>>,
    pub stopped: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Artifact {
    pub arn: String,
    pub name: Option<String>,
    pub artifact_type: Option<String>,
    pub extension: Option<String>,
    pub url: Option<String>,
}

/// Interactive remote-access session on a single device.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RemoteSession {
    pub arn: String,
    pub name: Option<String>,
    pub status: SessionPhase,
    pub result: Option<String>,
    pub message: Option<String>,
    /// Remote-control URL, present once the device is reachable.
    pub endpoint: Option<String>,
    pub device_arn: Option<String>,
    pub created: Option<DateTime<Utc>>,
}
