pub mod arn;
pub mod aws;
pub mod config;
pub mod error;
pub mod memory;
pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use common::{ArtifactCategory, DevicePlatform};
use tracing::info;

pub use aws::AwsDeviceFarm;
pub use config::{DeviceFarmConfig, VendorMode};
pub use error::{DeviceFarmError, Result};
pub use memory::InMemoryDeviceFarm;
pub use models::*;

/// Every device farm operation the console issues.
///
/// Reads are idempotent; writes are best-effort. Implementations never retry:
/// a failure is logged once and handed back to the caller.
#[async_trait]
pub trait DeviceFarm: Send + Sync + 'static {
    async fn list_projects(&self) -> Result<Vec<Project>>;
    async fn create_project(&self, name: &str) -> Result<Project>;
    async fn delete_project(&self, arn: &str) -> Result<()>;

    async fn list_device_pools(&self, project_arn: &str) -> Result<Vec<DevicePool>>;
    async fn create_device_pool(
        &self,
        project_arn: &str,
        name: &str,
        description: Option<&str>,
        rules: &[PoolRule],
    ) -> Result<DevicePool>;
    async fn update_device_pool(
        &self,
        arn: &str,
        name: Option<&str>,
        rules: Option<&[PoolRule]>,
    ) -> Result<DevicePool>;
    async fn delete_device_pool(&self, arn: &str) -> Result<()>;

    async fn list_devices(&self, platform: Option<DevicePlatform>) -> Result<Vec<Device>>;

    async fn create_upload(&self, project_arn: &str, name: &str, upload_type: &str)
    -> Result<Upload>;
    async fn get_upload(&self, arn: &str) -> Result<Upload>;

    async fn schedule_run(&self, run: &ScheduleRun) -> Result<Run>;
    async fn get_run(&self, arn: &str) -> Result<Run>;
    async fn stop_run(&self, arn: &str) -> Result<Run>;
    async fn list_artifacts(&self, run_arn: &str, category: ArtifactCategory)
    -> Result<Vec<Artifact>>;

    async fn create_remote_session(
        &self,
        project_arn: &str,
        device_arn: &str,
        name: &str,
    ) -> Result<RemoteSession>;
    async fn get_remote_session(&self, arn: &str) -> Result<RemoteSession>;
    async fn list_remote_sessions(&self, project_arn: &str) -> Result<Vec<RemoteSession>>;
    async fn stop_remote_session(&self, arn: &str) -> Result<RemoteSession>;
}

/// Build the process-wide vendor client selected by `config.mode`.
pub async fn connect(config: &DeviceFarmConfig) -> Arc<dyn DeviceFarm> {
    match config.mode {
        VendorMode::Aws => {
            info!(region = %config.region, endpoint = %config.endpoint(), "Using AWS Device Farm");
            Arc::new(AwsDeviceFarm::from_config(config).await)
        }
        VendorMode::Memory => {
            info!("Using in-memory device farm");
            Arc::new(InMemoryDeviceFarm::new())
        }
    }
}
