#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ParseEnumError;

/// Declared platform of an uploaded application binary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum AppType {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "android"))]
    Android,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "ios"))]
    Ios,
}

impl AppType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
        }
    }

    /// Upload type the device farm expects for this binary (`ANDROID_APP`, `IOS_APP`).
    pub fn upload_type(&self) -> &'static str {
        match self {
            Self::Android => "ANDROID_APP",
            Self::Ios => "IOS_APP",
        }
    }
}

impl fmt::Display for AppType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "android" | "android_app" => Ok(Self::Android),
            "ios" | "ios_app" => Ok(Self::Ios),
            _ => Err(ParseEnumError::new("app type", s, &["android", "ios"])),
        }
    }
}
