//! Parsing of Device Farm ARNs.
//!
//! Project-scoped resources embed the project id as the first path segment of
//! their resource part:
//!
//! ```text
//! arn:aws:devicefarm:us-west-2:123456789012:project:5e01a8c7
//! arn:aws:devicefarm:us-west-2:123456789012:session:5e01a8c7/9a4f.../00000
//! arn:aws:devicefarm:us-west-2:123456789012:upload:5e01a8c7/1b2c...
//! arn:aws:devicefarm:us-west-2:123456789012:devicepool:5e01a8c7/77aa...
//! arn:aws:devicefarm:us-west-2:123456789012:run:5e01a8c7/0c3d...
//! ```
//!
//! That is what lets the server check that a session or upload reference
//! handed in by a client really belongs to one of the caller's projects.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arn<'a> {
    pub partition: &'a str,
    pub region: &'a str,
    pub account: &'a str,
    /// Resource kind: `project`, `session`, `upload`, `devicepool`, `run`, `device`, ...
    pub kind: &'a str,
    /// Everything after the kind, e.g. `5e01a8c7/9a4f/00000`.
    pub resource: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a device farm ARN")]
pub struct InvalidArn(pub String);

impl<'a> Arn<'a> {
    pub fn parse(input: &'a str) -> Result<Self, InvalidArn> {
        let invalid = || InvalidArn(input.to_string());

        let mut parts = input.splitn(7, ':');
        let (Some("arn"), Some(partition), Some("devicefarm"), Some(region), Some(account)) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return Err(invalid());
        };
        let kind = parts.next().filter(|k| !k.is_empty()).ok_or_else(invalid)?;
        let resource = parts.next().filter(|r| !r.is_empty()).ok_or_else(invalid)?;

        Ok(Self {
            partition,
            region,
            account,
            kind,
            resource,
        })
    }

    /// Id of the project this resource lives under. For a project ARN this is
    /// the project's own id; devices are global and have none.
    pub fn project_id(&self) -> Option<&'a str> {
        if self.kind == "device" {
            return None;
        }
        self.resource.split('/').next().filter(|id| !id.is_empty())
    }

    /// ARN of the owning project.
    pub fn project_arn(&self) -> Option<String> {
        self.project_id().map(|id| {
            format!(
                "arn:{}:devicefarm:{}:{}:project:{}",
                self.partition, self.region, self.account, id
            )
        })
    }
}

/// Owning project ARN of any project-scoped ARN, or `None` if it does not parse.
pub fn owning_project_arn(arn: &str) -> Option<String> {
    Arn::parse(arn).ok().and_then(|parsed| parsed.project_arn())
}

/// Whether `arn` is of the given kind and lives under `project_arn`.
pub fn belongs_to_project(arn: &str, kind: &str, project_arn: &str) -> bool {
    match Arn::parse(arn) {
        Ok(parsed) => parsed.kind == kind && parsed.project_arn().as_deref() == Some(project_arn),
        Err(_) => false,
    }
}
