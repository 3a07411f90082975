use serde::Serialize;

#[derive(Serialize, utoipa::ToSchema)]
pub struct VendorStatusResponse {
    /// `connected` or `disconnected`.
    #[schema(example = "connected")]
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VendorStatusResponse {
    pub fn connected() -> Self {
        Self {
            status: "connected",
            error: None,
        }
    }

    pub fn disconnected(error: String) -> Self {
        Self {
            status: "disconnected",
            error: Some(error),
        }
    }
}
