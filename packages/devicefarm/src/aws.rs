use std::future::Future;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_devicefarm::Client;
use aws_sdk_devicefarm::config::{Credentials, Region};
use aws_sdk_devicefarm::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_devicefarm::primitives::DateTime as AwsDateTime;
use aws_sdk_devicefarm::types as aws;
use chrono::{DateTime, Utc};
use common::{ArtifactCategory, DevicePlatform, SessionPhase};
use tracing::{debug, error};

use crate::config::DeviceFarmConfig;
use crate::error::{DeviceFarmError, Result};
use crate::models::*;
use crate::DeviceFarm;

/// Device Farm client backed by the AWS SDK.
#[derive(Clone, Debug)]
pub struct AwsDeviceFarm {
    client: Client,
}

impl AwsDeviceFarm {
    pub async fn from_config(config: &DeviceFarmConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(config.endpoint());

        if let (Some(key_id), Some(secret)) = (&config.access_key_id, &config.secret_access_key) {
            loader = loader.credentials_provider(Credentials::new(
                key_id.clone(),
                secret.clone(),
                None,
                None,
                "farmdeck-config",
            ));
        }

        let shared = loader.load().await;
        Self {
            client: Client::new(&shared),
        }
    }
}

fn request_failed<E>(operation: &'static str, err: E) -> DeviceFarmError
where
    E: std::error::Error + ProvideErrorMetadata,
{
    let message = DisplayErrorContext(&err).to_string();
    error!(operation, error = %message, "Device farm request failed");
    if err.code() == Some("NotFoundException") {
        DeviceFarmError::NotFound { operation, message }
    } else {
        DeviceFarmError::request(operation, message)
    }
}

/// Follow `nextToken` until the vendor stops handing one out.
async fn collect_pages<T, F, Fut>(mut fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<(Vec<T>, Option<String>)>>,
{
    let mut items = Vec::new();
    let mut next_token = None;
    loop {
        let (page, token) = fetch_page(next_token).await?;
        items.extend(page);
        match token.filter(|t| !t.is_empty()) {
            Some(token) => next_token = Some(token),
            None => return Ok(items),
        }
    }
}

fn missing(operation: &'static str, field: &'static str) -> DeviceFarmError {
    error!(operation, field, "Device farm response is missing a field");
    DeviceFarmError::MissingField { operation, field }
}

fn text(value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}

fn timestamp(value: Option<&AwsDateTime>) -> Option<DateTime<Utc>> {
    value.and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos()))
}

fn required_arn(operation: &'static str, arn: Option<&str>) -> Result<String> {
    arn.map(str::to_string).ok_or_else(|| missing(operation, "arn"))
}

fn convert_project(operation: &'static str, p: &aws::Project) -> Result<Project> {
    Ok(Project {
        arn: required_arn(operation, p.arn())?,
        name: text(p.name()),
        created: timestamp(p.created()),
    })
}

fn convert_rule(rule: &aws::Rule) -> PoolRule {
    PoolRule {
        attribute: rule.attribute().map(|a| a.as_str().to_string()).unwrap_or_default(),
        operator: rule.operator().map(|o| o.as_str().to_string()).unwrap_or_default(),
        value: rule.value().unwrap_or_default().to_string(),
    }
}

fn to_aws_rule(rule: &PoolRule) -> aws::Rule {
    aws::Rule::builder()
        .attribute(aws::DeviceAttribute::from(rule.attribute.as_str()))
        .operator(aws::RuleOperator::from(rule.operator.as_str()))
        .value(rule.value.clone())
        .build()
}

fn convert_pool(operation: &'static str, pool: &aws::DevicePool) -> Result<DevicePool> {
    Ok(DevicePool {
        arn: required_arn(operation, pool.arn())?,
        name: text(pool.name()),
        description: text(pool.description()),
        pool_type: pool.r#type().map(|t| t.as_str().to_string()),
        rules: pool.rules().iter().map(convert_rule).collect(),
    })
}

fn convert_device(operation: &'static str, device: &aws::Device) -> Result<Device> {
    Ok(Device {
        arn: required_arn(operation, device.arn())?,
        name: text(device.name()),
        manufacturer: text(device.manufacturer()),
        model: text(device.model()),
        os: text(device.os()),
        platform: device.platform().map(|p| p.as_str().to_string()),
        form_factor: device.form_factor().map(|f| f.as_str().to_string()),
        remote_access_enabled: device.remote_access_enabled(),
        availability: device.availability().map(|a| a.as_str().to_string()),
    })
}

fn convert_upload(operation: &'static str, upload: &aws::Upload) -> Result<Upload> {
    Ok(Upload {
        arn: required_arn(operation, upload.arn())?,
        name: text(upload.name()),
        upload_type: upload.r#type().map(|t| t.as_str().to_string()),
        status: upload.status().map(|s| s.as_str().to_string()),
        url: text(upload.url()),
        message: text(upload.message()),
    })
}

fn convert_run(operation: &'static str, run: &aws::Run) -> Result<Run> {
    Ok(Run {
        arn: required_arn(operation, run.arn())?,
        name: text(run.name()),
        status: run.status().map(|s| s.as_str().to_string()),
        result: run.result().map(|r| r.as_str().to_string()),
        counters: run.counters().map(|c| RunCounters {
            total: c.total(),
            passed: c.passed(),
            failed: c.failed(),
            errored: c.errored(),
            stopped: c.stopped(),
            skipped: c.skipped(),
        }),
        created: timestamp(run.created()),
        started: timestamp(run.started()),
        stopped: timestamp(run.stopped()),
    })
}

fn convert_artifact(operation: &'static str, artifact: &aws::Artifact) -> Result<Artifact> {
    Ok(Artifact {
        arn: required_arn(operation, artifact.arn())?,
        name: text(artifact.name()),
        artifact_type: artifact.r#type().map(|t| t.as_str().to_string()),
        extension: text(artifact.extension()),
        url: text(artifact.url()),
    })
}

fn convert_session(
    operation: &'static str,
    session: &aws::RemoteAccessSession,
) -> Result<RemoteSession> {
    Ok(RemoteSession {
        arn: required_arn(operation, session.arn())?,
        name: text(session.name()),
        status: SessionPhase::from_vendor(session.status().map(|s| s.as_str())),
        result: session.result().map(|r| r.as_str().to_string()),
        message: text(session.message()),
        endpoint: text(session.endpoint()),
        device_arn: session.device().and_then(|d| text(d.arn())),
        created: timestamp(session.created()),
    })
}

fn artifact_category(category: ArtifactCategory) -> aws::ArtifactCategory {
    match category {
        ArtifactCategory::Screenshot => aws::ArtifactCategory::Screenshot,
        ArtifactCategory::File => aws::ArtifactCategory::File,
        ArtifactCategory::Log => aws::ArtifactCategory::Log,
    }
}

#[async_trait]
impl DeviceFarm for AwsDeviceFarm {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        const OP: &str = "ListProjects";
        collect_pages(|next_token| async move {
            let output = self
                .client
                .list_projects()
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|e| request_failed(OP, e))?;
            let page = output
                .projects()
                .iter()
                .map(|p| convert_project(OP, p))
                .collect::<Result<Vec<_>>>()?;
            Ok((page, text(output.next_token())))
        })
        .await
    }

    async fn create_project(&self, name: &str) -> Result<Project> {
        const OP: &str = "CreateProject";
        let output = self
            .client
            .create_project()
            .name(name)
            .send()
            .await
            .map_err(|e| request_failed(OP, e))?;
        let project = output.project().ok_or_else(|| missing(OP, "project"))?;
        convert_project(OP, project)
    }

    async fn delete_project(&self, arn: &str) -> Result<()> {
        self.client
            .delete_project()
            .arn(arn)
            .send()
            .await
            .map_err(|e| request_failed("DeleteProject", e))?;
        debug!(arn, "Deleted device farm project");
        Ok(())
    }

    async fn list_device_pools(&self, project_arn: &str) -> Result<Vec<DevicePool>> {
        const OP: &str = "ListDevicePools";
        collect_pages(|next_token| async move {
            let output = self
                .client
                .list_device_pools()
                .arn(project_arn)
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|e| request_failed(OP, e))?;
            let page = output
                .device_pools()
                .iter()
                .map(|p| convert_pool(OP, p))
                .collect::<Result<Vec<_>>>()?;
            Ok((page, text(output.next_token())))
        })
        .await
    }

    async fn create_device_pool(
        &self,
        project_arn: &str,
        name: &str,
        description: Option<&str>,
        rules: &[PoolRule],
    ) -> Result<DevicePool> {
        const OP: &str = "CreateDevicePool";
        let output = self
            .client
            .create_device_pool()
            .project_arn(project_arn)
            .name(name)
            .set_description(text(description))
            .set_rules(Some(rules.iter().map(to_aws_rule).collect()))
            .send()
            .await
            .map_err(|e| request_failed(OP, e))?;
        let pool = output.device_pool().ok_or_else(|| missing(OP, "devicePool"))?;
        convert_pool(OP, pool)
    }

    async fn update_device_pool(
        &self,
        arn: &str,
        name: Option<&str>,
        rules: Option<&[PoolRule]>,
    ) -> Result<DevicePool> {
        const OP: &str = "UpdateDevicePool";
        let output = self
            .client
            .update_device_pool()
            .arn(arn)
            .set_name(text(name))
            .set_rules(rules.map(|r| r.iter().map(to_aws_rule).collect()))
            .send()
            .await
            .map_err(|e| request_failed(OP, e))?;
        let pool = output.device_pool().ok_or_else(|| missing(OP, "devicePool"))?;
        convert_pool(OP, pool)
    }

    async fn delete_device_pool(&self, arn: &str) -> Result<()> {
        self.client
            .delete_device_pool()
            .arn(arn)
            .send()
            .await
            .map_err(|e| request_failed("DeleteDevicePool", e))?;
        Ok(())
    }

    async fn list_devices(&self, platform: Option<DevicePlatform>) -> Result<Vec<Device>> {
        const OP: &str = "ListDevices";
        let filters = match platform {
            Some(platform) => Some(vec![
                aws::DeviceFilter::builder()
                    .attribute(aws::DeviceFilterAttribute::Platform)
                    .operator(aws::RuleOperator::Equals)
                    .values(platform.as_str())
                    .build()
                    .map_err(|e| DeviceFarmError::InvalidRequest(e.to_string()))?,
            ]),
            None => None,
        };
        let filters = &filters;
        collect_pages(|next_token| async move {
            let output = self
                .client
                .list_devices()
                .set_filters(filters.clone())
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|e| request_failed(OP, e))?;
            let page = output
                .devices()
                .iter()
                .map(|d| convert_device(OP, d))
                .collect::<Result<Vec<_>>>()?;
            Ok((page, text(output.next_token())))
        })
        .await
    }

    async fn create_upload(
        &self,
        project_arn: &str,
        name: &str,
        upload_type: &str,
    ) -> Result<Upload> {
        const OP: &str = "CreateUpload";
        let output = self
            .client
            .create_upload()
            .project_arn(project_arn)
            .name(name)
            .r#type(aws::UploadType::from(upload_type))
            .send()
            .await
            .map_err(|e| request_failed(OP, e))?;
        let upload = output.upload().ok_or_else(|| missing(OP, "upload"))?;
        convert_upload(OP, upload)
    }

    async fn get_upload(&self, arn: &str) -> Result<Upload> {
        const OP: &str = "GetUpload";
        let output = self
            .client
            .get_upload()
            .arn(arn)
            .send()
            .await
            .map_err(|e| request_failed(OP, e))?;
        let upload = output.upload().ok_or_else(|| missing(OP, "upload"))?;
        convert_upload(OP, upload)
    }

    async fn schedule_run(&self, run: &ScheduleRun) -> Result<Run> {
        const OP: &str = "ScheduleRun";
        let test = aws::ScheduleRunTest::builder()
            .r#type(aws::TestType::BuiltinFuzz)
            .build()
            .map_err(|e| DeviceFarmError::InvalidRequest(e.to_string()))?;
        let output = self
            .client
            .schedule_run()
            .project_arn(&run.project_arn)
            .app_arn(&run.app_arn)
            .device_pool_arn(&run.device_pool_arn)
            .name(&run.name)
            .test(test)
            .send()
            .await
            .map_err(|e| request_failed(OP, e))?;
        let scheduled = output.run().ok_or_else(|| missing(OP, "run"))?;
        convert_run(OP, scheduled)
    }

    async fn get_run(&self, arn: &str) -> Result<Run> {
        const OP: &str = "GetRun";
        let output = self
            .client
            .get_run()
            .arn(arn)
            .send()
            .await
            .map_err(|e| request_failed(OP, e))?;
        let run = output.run().ok_or_else(|| missing(OP, "run"))?;
        convert_run(OP, run)
    }

    async fn stop_run(&self, arn: &str) -> Result<Run> {
        const OP: &str = "StopRun";
        let output = self
            .client
            .stop_run()
            .arn(arn)
            .send()
            .await
            .map_err(|e| request_failed(OP, e))?;
        let run = output.run().ok_or_else(|| missing(OP, "run"))?;
        convert_run(OP, run)
    }

    async fn list_artifacts(
        &self,
        run_arn: &str,
        category: ArtifactCategory,
    ) -> Result<Vec<Artifact>> {
        const OP: &str = "ListArtifacts";
        collect_pages(|next_token| async move {
            let output = self
                .client
                .list_artifacts()
                .arn(run_arn)
                .r#type(artifact_category(category))
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|e| request_failed(OP, e))?;
            let page = output
                .artifacts()
                .iter()
                .map(|a| convert_artifact(OP, a))
                .collect::<Result<Vec<_>>>()?;
            Ok((page, text(output.next_token())))
        })
        .await
    }

    async fn create_remote_session(
        &self,
        project_arn: &str,
        device_arn: &str,
        name: &str,
    ) -> Result<RemoteSession> {
        const OP: &str = "CreateRemoteAccessSession";
        let configuration = aws::CreateRemoteAccessSessionConfiguration::builder()
            .billing_method(aws::BillingMethod::Metered)
            .build();
        let output = self
            .client
            .create_remote_access_session()
            .project_arn(project_arn)
            .device_arn(device_arn)
            .name(name)
            .configuration(configuration)
            .send()
            .await
            .map_err(|e| request_failed(OP, e))?;
        let session = output
            .remote_access_session()
            .ok_or_else(|| missing(OP, "remoteAccessSession"))?;
        convert_session(OP, session)
    }

    async fn get_remote_session(&self, arn: &str) -> Result<RemoteSession> {
        const OP: &str = "GetRemoteAccessSession";
        let output = self
            .client
            .get_remote_access_session()
            .arn(arn)
            .send()
            .await
            .map_err(|e| request_failed(OP, e))?;
        let session = output
            .remote_access_session()
            .ok_or_else(|| missing(OP, "remoteAccessSession"))?;
        convert_session(OP, session)
    }

    async fn list_remote_sessions(&self, project_arn: &str) -> Result<Vec<RemoteSession>> {
        const OP: &str = "ListRemoteAccessSessions";
        collect_pages(|next_token| async move {
            let output = self
                .client
                .list_remote_access_sessions()
                .arn(project_arn)
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|e| request_failed(OP, e))?;
            let page = output
                .remote_access_sessions()
                .iter()
                .map(|s| convert_session(OP, s))
                .collect::<Result<Vec<_>>>()?;
            Ok((page, text(output.next_token())))
        })
        .await
    }

    async fn stop_remote_session(&self, arn: &str) -> Result<RemoteSession> {
        const OP: &str = "StopRemoteAccessSession";
        let output = self
            .client
            .stop_remote_access_session()
            .arn(arn)
            .send()
            .await
            .map_err(|e| request_failed(OP, e))?;
        let session = output
            .remote_access_session()
            .ok_or_else(|| missing(OP, "remoteAccessSession"))?;
        convert_session(OP, session)
    }
}
