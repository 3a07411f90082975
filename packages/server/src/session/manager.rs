use chrono::Utc;
use common::SessionPhase;
use devicefarm::{DeviceFarm, RemoteSession};
use sea_orm::ConnectionTrait;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::SessionConfig;
use crate::error::AppError;
use crate::models::session::StopSessionResponse;
use crate::models::shared::require_arn;
use crate::utils::project::{find_linked_project, find_project_for_vendor_arn};

/// What a client sees of a remote session on every poll.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct SessionStatus {
    pub arn: String,
    pub name: Option<String>,
    /// Vendor phase, passed through as reported.
    pub status: SessionPhase,
    /// Remote-control URL. Only reported while the session is `RUNNING`.
    pub endpoint: Option<String>,
    pub result: Option<String>,
    pub message: Option<String>,
    pub device_arn: Option<String>,
    /// Whether the client can stop polling.
    pub done: bool,
    /// Suggested delay before the next poll; absent once `done`.
    pub poll_after_secs: Option<u64>,
}

impl SessionStatus {
    /// Polling ends on a terminal phase, or once a `RUNNING` session exposes
    /// its endpoint. An endpoint reported in any other phase does not count.
    pub fn polling_done(phase: &SessionPhase, endpoint: Option<&str>) -> bool {
        phase.is_terminal() || (phase.is_running() && endpoint.is_some())
    }

    fn from_vendor(session: RemoteSession, poll_interval_secs: u64) -> Self {
        let endpoint = session.endpoint.filter(|_| session.status.is_running());
        let done = Self::polling_done(&session.status, endpoint.as_deref());
        Self {
            arn: session.arn,
            name: session.name,
            status: session.status,
            endpoint,
            result: session.result,
            message: session.message,
            device_arn: session.device_arn,
            done,
            poll_after_secs: (!done).then_some(poll_interval_secs),
        }
    }
}

pub struct SessionManager<'a, C: ConnectionTrait> {
    conn: &'a C,
    vendor: &'a dyn DeviceFarm,
    poll_interval_secs: u64,
}

impl<'a, C: ConnectionTrait> SessionManager<'a, C> {
    pub fn new(conn: &'a C, vendor: &'a dyn DeviceFarm, config: &SessionConfig) -> Self {
        Self {
            conn,
            vendor,
            poll_interval_secs: config.poll_interval_secs,
        }
    }

    /// Ask the device farm for a session on `device_arn`. Nothing is stored.
    #[instrument(skip(self))]
    pub async fn start(
        &self,
        user_id: i32,
        project_id: i32,
        device_arn: Option<&str>,
        name: Option<&str>,
    ) -> Result<SessionStatus, AppError> {
        let device_arn = require_arn(device_arn, "device_arn")?;
        let (_, project_arn) = find_linked_project(self.conn, user_id, project_id).await?;

        let name = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => format!("Session-{}", Utc::now().timestamp_millis()),
        };

        let session = self
            .vendor
            .create_remote_session(&project_arn, device_arn, &name)
            .await
            .map_err(AppError::detailed)?;

        info!(arn = %session.arn, status = %session.status, "Remote session requested");
        Ok(SessionStatus::from_vendor(session, self.poll_interval_secs))
    }

    /// One fresh vendor read; safe to call repeatedly and concurrently.
    #[instrument(skip(self))]
    pub async fn poll(&self, user_id: i32, arn: &str) -> Result<SessionStatus, AppError> {
        let arn = require_arn(Some(arn), "arn")?;
        find_project_for_vendor_arn(self.conn, user_id, arn, "session", "Session").await?;

        let session = self
            .vendor
            .get_remote_session(arn)
            .await
            .map_err(AppError::detailed)?;
        Ok(SessionStatus::from_vendor(session, self.poll_interval_secs))
    }

    /// Best-effort stop. Once ownership is verified this never fails: the
    /// vendor rejecting the stop (usually because the session already ended)
    /// is only logged.
    #[instrument(skip(self))]
    pub async fn stop(&self, user_id: i32, arn: &str) -> Result<StopSessionResponse, AppError> {
        let arn = require_arn(Some(arn), "arn")?;
        find_project_for_vendor_arn(self.conn, user_id, arn, "session", "Session").await?;

        let stop_accepted = match self.vendor.stop_remote_session(arn).await {
            Ok(session) => {
                info!(status = %session.status, "Remote session stop requested");
                true
            }
            Err(e) => {
                warn!(error = %e, "Stopping remote session failed, ignoring");
                false
            }
        };

        Ok(StopSessionResponse {
            arn: arn.to_string(),
            stop_accepted,
        })
    }

    /// Every vendor session under a linked project, as currently reported.
    #[instrument(skip(self))]
    pub async fn list(&self, user_id: i32, project_id: i32) -> Result<Vec<SessionStatus>, AppError> {
        let (_, project_arn) = find_linked_project(self.conn, user_id, project_id).await?;
        let sessions = self.vendor.list_remote_sessions(&project_arn).await?;
        Ok(sessions
            .into_iter()
            .map(|s| SessionStatus::from_vendor(s, self.poll_interval_secs))
            .collect())
    }
}
