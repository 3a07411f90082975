//! Project teardown.
//!
//! The device farm refuses to delete a project while any of its remote
//! sessions is still live, so a teardown stops those sessions first, waits
//! for them to wind down, deletes the vendor project and only then removes
//! the local rows.

use std::time::Duration;

use devicefarm::{DeviceFarm, DeviceFarmError};
use futures::future::join_all;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use tracing::{error, info, instrument, warn};

use crate::config::TeardownConfig;
use crate::entity::{app, project, run};
use crate::error::AppError;
use crate::models::admin::{FailedProject, ResetReport};
use crate::session::poll_until;

pub struct TeardownService<'a> {
    db: &'a DatabaseConnection,
    vendor: &'a dyn DeviceFarm,
    settle_timeout: Duration,
    settle_interval: Duration,
}

impl<'a> TeardownService<'a> {
    pub fn new(db: &'a DatabaseConnection, vendor: &'a dyn DeviceFarm, config: &TeardownConfig) -> Self {
        Self {
            db,
            vendor,
            settle_timeout: Duration::from_millis(config.settle_timeout_ms),
            settle_interval: Duration::from_millis(config.settle_poll_interval_ms),
        }
    }

    /// Delete one project on both sides.
    ///
    /// A vendor refusal leaves the local rows untouched. A local failure after
    /// the vendor project is gone is reported as a persistence error.
    #[instrument(skip(self, project), fields(project_id = project.id))]
    pub async fn delete_project(&self, user_id: i32, project: &project::Model) -> Result<(), AppError> {
        if let Some(arn) = &project.vendor_project_arn {
            self.teardown_vendor_project(arn).await?;
        }

        let txn = self.db.begin().await?;
        delete_local_projects(&txn, user_id, &[project.id]).await?;
        txn.commit().await?;

        info!("Project deleted");
        Ok(())
    }

    /// Tear down every project of the user.
    ///
    /// Vendor teardowns run concurrently and fail independently. Projects
    /// whose teardown failed stay in local storage; the rest, unlinked ones
    /// included, are removed in one transaction.
    #[instrument(skip(self))]
    pub async fn reset_account(&self, user_id: i32) -> Result<ResetReport, AppError> {
        let projects = project::Entity::find()
            .filter(project::Column::UserId.eq(user_id))
            .order_by_asc(project::Column::Id)
            .all(self.db)
            .await?;

        let outcomes = join_all(projects.iter().map(|p| async move {
            let outcome = match &p.vendor_project_arn {
                Some(arn) => self.teardown_vendor_project(arn).await,
                None => Ok(()),
            };
            (p, outcome)
        }))
        .await;

        let mut report = ResetReport::default();
        for (p, outcome) in outcomes {
            match outcome {
                Ok(()) => report.projects_deleted.push(p.id),
                Err(e) => {
                    error!(project_id = p.id, error = %e, "Project teardown failed, keeping it");
                    report.projects_failed.push(FailedProject {
                        id: p.id,
                        name: p.name.clone(),
                        error: e.vendor_message(),
                    });
                }
            }
        }

        if !report.projects_deleted.is_empty() {
            let txn = self.db.begin().await?;
            delete_local_projects(&txn, user_id, &report.projects_deleted).await?;
            txn.commit().await?;
        }

        info!(
            deleted = report.projects_deleted.len(),
            failed = report.projects_failed.len(),
            "Account reset finished"
        );
        Ok(report)
    }

    /// Stop live sessions, let them settle, then delete the vendor project.
    /// Only the final deletion can fail the teardown. A project the vendor no
    /// longer knows counts as deleted.
    async fn teardown_vendor_project(&self, project_arn: &str) -> Result<(), DeviceFarmError> {
        let stopping = self.stop_live_sessions(project_arn).await;
        if !stopping.is_empty() {
            self.settle(project_arn, &stopping).await;
        }
        match self.vendor.delete_project(project_arn).await {
            Err(e) if e.is_not_found() => {
                warn!(project_arn, error = %e, "Device farm project already gone");
                Ok(())
            }
            result => result,
        }
    }

    /// Request a stop for every session not yet `COMPLETED`, all at once.
    /// Returns the ARNs a stop was requested for.
    async fn stop_live_sessions(&self, project_arn: &str) -> Vec<String> {
        let sessions = match self.vendor.list_remote_sessions(project_arn).await {
            Ok(sessions) => sessions,
            Err(e) => {
                warn!(project_arn, error = %e, "Listing sessions failed, deleting anyway");
                return Vec::new();
            }
        };

        let live: Vec<String> = sessions
            .into_iter()
            .filter(|s| s.status.is_active())
            .map(|s| s.arn)
            .collect();

        let results = join_all(live.iter().map(|arn| self.vendor.stop_remote_session(arn))).await;
        for (arn, result) in live.iter().zip(results) {
            if let Err(e) = result {
                warn!(session_arn = %arn, error = %e, "Stopping session failed, ignoring");
            }
        }
        live
    }

    /// Wait until none of `stopping` is reported active any more, or give up
    /// at the settle timeout.
    async fn settle(&self, project_arn: &str, stopping: &[String]) {
        let vendor = self.vendor;
        let outcome = poll_until(self.settle_interval, self.settle_timeout, move || async move {
            match vendor.list_remote_sessions(project_arn).await {
                Ok(sessions) => !sessions
                    .iter()
                    .any(|s| s.status.is_active() && stopping.contains(&s.arn)),
                Err(e) => {
                    warn!(project_arn, error = %e, "Listing sessions failed while settling");
                    true
                }
            }
        })
        .await;

        if !outcome.finished {
            warn!(
                project_arn,
                probes = outcome.probes,
                "Sessions still active after settle timeout, deleting anyway"
            );
        }
    }
}

/// Delete projects with their runs and apps. Every statement is scoped to
/// `user_id`.
async fn delete_local_projects<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    project_ids: &[i32],
) -> Result<(), DbErr> {
    run::Entity::delete_many()
        .filter(run::Column::UserId.eq(user_id))
        .filter(run::Column::ProjectId.is_in(project_ids.to_vec()))
        .exec(conn)
        .await?;
    app::Entity::delete_many()
        .filter(app::Column::UserId.eq(user_id))
        .filter(app::Column::ProjectId.is_in(project_ids.to_vec()))
        .exec(conn)
        .await?;
    project::Entity::delete_many()
        .filter(project::Column::UserId.eq(user_id))
        .filter(project::Column::Id.is_in(project_ids.to_vec()))
        .exec(conn)
        .await?;
    Ok(())
}
