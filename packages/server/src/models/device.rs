use common::{DevicePlatform, ParseEnumError};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::AppError;

#[derive(Debug, Deserialize, IntoParams)]
pub struct DeviceQuery {
    /// `ANDROID` or `IOS`, case-insensitive. All devices when absent.
    pub platform: Option<String>,
}

impl DeviceQuery {
    pub fn platform(&self) -> Result<Option<DevicePlatform>, AppError> {
        match self.platform.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(p) => p
                .parse()
                .map(Some)
                .map_err(|e: ParseEnumError| AppError::Validation(e.to_string())),
        }
    }
}
