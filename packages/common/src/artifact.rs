use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ParseEnumError;

/// Artifact category accepted by the run artifacts listing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ArtifactCategory {
    Screenshot,
    #[default]
    File,
    Log,
}

impl ArtifactCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Screenshot => "SCREENSHOT",
            Self::File => "FILE",
            Self::Log => "LOG",
        }
    }
}

impl fmt::Display for ArtifactCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactCategory {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SCREENSHOT" => Ok(Self::Screenshot),
            "FILE" => Ok(Self::File),
            "LOG" => Ok(Self::Log),
            _ => Err(ParseEnumError::new(
                "artifact type",
                s,
                &["SCREENSHOT", "FILE", "LOG"],
            )),
        }
    }
}
