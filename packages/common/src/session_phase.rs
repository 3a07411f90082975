use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of a remote-access session as reported by the device farm.
///
/// The vendor's status string is carried through untouched. The only local
/// interpretation is whether a phase is terminal, which decides when clients
/// stop polling.
///
/// Lifecycle: `REQUESTED -> PENDING -> {RUNNING, FAILED, ERRORED, COMPLETED}`,
/// and `RUNNING -> COMPLETED` once the session is stopped or times out.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(transparent)]
#[schema(example = "PENDING")]
pub struct SessionPhase(String);

impl SessionPhase {
    /// Local phase used before the vendor has reported anything.
    pub const REQUESTED: &'static str = "REQUESTED";
    pub const PENDING: &'static str = "PENDING";
    pub const RUNNING: &'static str = "RUNNING";
    pub const COMPLETED: &'static str = "COMPLETED";
    pub const FAILED: &'static str = "FAILED";
    pub const ERRORED: &'static str = "ERRORED";

    /// Phases after which the session will never become reachable again.
    pub const TERMINAL: &'static [&'static str] = &[Self::FAILED, Self::ERRORED, Self::COMPLETED];

    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    pub fn requested() -> Self {
        Self::new(Self::REQUESTED)
    }

    /// Build from an optional vendor status; a missing status means the
    /// vendor has not picked the request up yet.
    pub fn from_vendor(status: Option<&str>) -> Self {
        status.map_or_else(Self::requested, Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_terminal(&self) -> bool {
        Self::TERMINAL.contains(&self.0.as_str())
    }

    pub fn is_running(&self) -> bool {
        self.0 == Self::RUNNING
    }

    /// Any phase other than `COMPLETED` still holds the device and blocks
    /// project deletion on the vendor side.
    pub fn is_active(&self) -> bool {
        self.0 != Self::COMPLETED
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionPhase {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
