use serde::{Deserialize, Serialize};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct StartSessionRequest {
    /// Local ID of a linked project.
    #[schema(example = 1)]
    pub project_id: i32,
    #[schema(example = "arn:aws:devicefarm:us-west-2::device:5F20BBED05F74D6288D51236B0FB9895")]
    pub device_arn: Option<String>,
    /// Defaults to `Session-<unix millis>`.
    pub name: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct StopSessionResponse {
    pub arn: String,
    /// Whether the device farm accepted the stop request. A rejected stop
    /// usually means the session had already ended.
    pub stop_accepted: bool,
}
