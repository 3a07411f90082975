pub mod app_type;
pub mod artifact;
pub mod device;
pub mod run_status;
pub mod session_phase;

pub use app_type::AppType;
pub use artifact::ArtifactCategory;
pub use device::DevicePlatform;
pub use run_status::RunStatus;
pub use session_phase::SessionPhase;

use std::fmt;

/// Error when parsing a string that is not one of an enum's known values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    kind: &'static str,
    invalid: String,
    valid: &'static [&'static str],
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, invalid: &str, valid: &'static [&'static str]) -> Self {
        Self {
            kind,
            invalid: invalid.to_string(),
            valid,
        }
    }
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid {} '{}'. Valid values: {}",
            self.kind,
            self.invalid,
            self.valid.join(", ")
        )
    }
}

impl std::error::Error for ParseEnumError {}
