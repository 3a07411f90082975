//! In-process device farm.
//!
//! Keeps projects, pools, uploads, runs and remote sessions in memory and
//! applies the vendor rules the console depends on: a project with sessions
//! that are not `COMPLETED` cannot be deleted, and a completed session cannot
//! be stopped again. Session status sequences, failures and call counts can
//! be scripted and inspected, which is what the server tests build on.

use std::collections::{BTreeMap, HashMap, VecDeque};

use async_trait::async_trait;
use chrono::Utc;
use common::{ArtifactCategory, DevicePlatform, SessionPhase};
use tokio::sync::Mutex;
use tracing::{debug, error};
use uuid::Uuid;

use crate::arn::{belongs_to_project, owning_project_arn, Arn};
use crate::error::{DeviceFarmError, Result};
use crate::models::*;
use crate::DeviceFarm;

const PARTITION: &str = "aws";
const REGION: &str = "us-west-2";
const ACCOUNT: &str = "000000000000";

pub const ANDROID_DEVICE_ARN: &str =
    "arn:aws:devicefarm:us-west-2::device:5F20BBED05F74D6288D51236B0FB9895";
pub const ANDROID_TABLET_ARN: &str =
    "arn:aws:devicefarm:us-west-2::device:A7B8C2D4E6F8401A9C3D5E7F9A1B3C5D";
pub const IOS_DEVICE_ARN: &str =
    "arn:aws:devicefarm:us-west-2::device:D125AEEE8614463BAE106865CAF4470E";

/// One status observation handed out by `get_remote_session`.
#[derive(Clone, Debug)]
pub struct SessionStep {
    pub status: SessionPhase,
    pub endpoint: Option<String>,
}

impl SessionStep {
    pub fn new(status: &str) -> Self {
        Self {
            status: SessionPhase::new(status),
            endpoint: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}

struct StoredSession {
    session: RemoteSession,
    /// Remaining observations. The last one sticks.
    steps: VecDeque<SessionStep>,
}

struct Failure {
    operation: &'static str,
    project_arn: Option<String>,
    message: String,
    /// The call still takes effect; only the answer is an error.
    after_effect: bool,
}

#[derive(Default)]
struct State {
    projects: BTreeMap<String, Project>,
    pools: BTreeMap<String, DevicePool>,
    uploads: BTreeMap<String, Upload>,
    runs: BTreeMap<String, Run>,
    sessions: BTreeMap<String, StoredSession>,
    scripts: HashMap<String, Vec<SessionStep>>,
    failures: Vec<Failure>,
    calls: HashMap<&'static str, usize>,
}

impl State {
    /// Count the call and fail it if a matching failure was injected.
    fn enter(&mut self, operation: &'static str, scope: Option<&str>) -> Result<()> {
        *self.calls.entry(operation).or_default() += 1;
        self.injected(operation, scope, false)
    }

    /// Fail a call that already took effect if a matching failure was injected.
    fn answer(&self, operation: &'static str, scope: Option<&str>) -> Result<()> {
        self.injected(operation, scope, true)
    }

    fn injected(&self, operation: &'static str, scope: Option<&str>, after_effect: bool) -> Result<()> {
        let injected = self.failures.iter().find(|f| {
            f.operation == operation
                && f.after_effect == after_effect
                && f.project_arn
                    .as_deref()
                    .is_none_or(|arn| scope == Some(arn))
        });
        match injected {
            Some(failure) => Err(rejected(operation, failure.message.clone())),
            None => Ok(()),
        }
    }

    fn require_project(&self, operation: &'static str, project_arn: &str) -> Result<()> {
        if self.projects.contains_key(project_arn) {
            Ok(())
        } else {
            Err(not_found(operation, "project", project_arn))
        }
    }
}

fn rejected(operation: &'static str, message: String) -> DeviceFarmError {
    error!(operation, error = %message, "Device farm request failed");
    DeviceFarmError::request(operation, message)
}

fn not_found(operation: &'static str, kind: &str, arn: &str) -> DeviceFarmError {
    let message = format!("NotFoundException: {kind} {arn} does not exist");
    error!(operation, error = %message, "Device farm request failed");
    DeviceFarmError::NotFound { operation, message }
}

fn project_id(project_arn: &str) -> Option<String> {
    Arn::parse(project_arn)
        .ok()
        .and_then(|arn| arn.project_id().map(str::to_string))
}

fn child_arn(kind: &str, project_arn: &str, suffix: &str) -> Option<String> {
    project_id(project_arn)
        .map(|id| format!("arn:{PARTITION}:devicefarm:{REGION}:{ACCOUNT}:{kind}:{id}/{suffix}"))
}

fn default_endpoint(session_arn: &str) -> String {
    let id = session_arn.rsplit(':').next().unwrap_or_default();
    format!("wss://sessions.devicefarm.invalid/{id}")
}

fn default_script() -> Vec<SessionStep> {
    vec![
        SessionStep::new(SessionPhase::PENDING),
        SessionStep::new(SessionPhase::RUNNING),
    ]
}

fn sample_devices() -> Vec<Device> {
    let device = |arn: &str, name: &str, manufacturer: &str, os: &str, platform: &str, form: &str| {
        Device {
            arn: arn.to_string(),
            name: Some(name.to_string()),
            manufacturer: Some(manufacturer.to_string()),
            model: Some(name.to_string()),
            os: Some(os.to_string()),
            platform: Some(platform.to_string()),
            form_factor: Some(form.to_string()),
            remote_access_enabled: Some(true),
            availability: Some("HIGHLY_AVAILABLE".to_string()),
        }
    };
    vec![
        device(ANDROID_DEVICE_ARN, "Google Pixel 7", "Google", "13", "ANDROID", "PHONE"),
        device(ANDROID_TABLET_ARN, "Samsung Galaxy Tab S8", "Samsung", "12", "ANDROID", "TABLET"),
        device(IOS_DEVICE_ARN, "Apple iPhone 14", "Apple", "16.4", "IOS", "PHONE"),
    ]
}

/// Device farm that lives entirely in process memory.
pub struct InMemoryDeviceFarm {
    devices: Vec<Device>,
    state: Mutex<State>,
}

impl Default for InMemoryDeviceFarm {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDeviceFarm {
    pub fn new() -> Self {
        Self {
            devices: sample_devices(),
            state: Mutex::new(State::default()),
        }
    }

    /// Observations handed out, in order, by `get_remote_session` for sessions
    /// later opened on `device_arn`. Without a script a session goes
    /// `PENDING` then `RUNNING`.
    pub async fn script_session(&self, device_arn: &str, steps: Vec<SessionStep>) {
        self.state
            .lock()
            .await
            .scripts
            .insert(device_arn.to_string(), steps);
    }

    /// Make every call of `operation` fail.
    pub async fn fail(&self, operation: &'static str, message: &str) {
        self.state.lock().await.failures.push(Failure {
            operation,
            project_arn: None,
            message: message.to_string(),
            after_effect: false,
        });
    }

    /// Make calls of `operation` that touch `project_arn` fail.
    pub async fn fail_for_project(&self, operation: &'static str, project_arn: &str, message: &str) {
        self.state.lock().await.failures.push(Failure {
            operation,
            project_arn: Some(project_arn.to_string()),
            message: message.to_string(),
            after_effect: false,
        });
    }

    /// Let calls of `operation` take effect but answer with an error, as when
    /// the vendor acts on a request and the response is lost. Honoured by
    /// `stop_remote_session`.
    pub async fn fail_after_effect(&self, operation: &'static str, message: &str) {
        self.state.lock().await.failures.push(Failure {
            operation,
            project_arn: None,
            message: message.to_string(),
            after_effect: true,
        });
    }

    pub async fn clear_failures(&self) {
        self.state.lock().await.failures.clear();
    }

    /// Number of times `operation` was invoked, failed calls included.
    pub async fn calls(&self, operation: &str) -> usize {
        self.state
            .lock()
            .await
            .calls
            .get(operation)
            .copied()
            .unwrap_or_default()
    }

    /// Overwrite the vendor-side state of a run, as the farm would while executing it.
    pub async fn set_run_state(&self, arn: &str, status: &str, result: Option<&str>) -> bool {
        let mut state = self.state.lock().await;
        let Some(run) = state.runs.get_mut(arn) else {
            return false;
        };
        run.status = Some(status.to_string());
        run.result = result.map(str::to_string);
        if status == "COMPLETED" {
            run.stopped = Some(Utc::now());
        }
        true
    }

    pub async fn set_upload_status(&self, arn: &str, status: &str) -> bool {
        let mut state = self.state.lock().await;
        match state.uploads.get_mut(arn) {
            Some(upload) => {
                upload.status = Some(status.to_string());
                true
            }
            None => false,
        }
    }

    /// Current vendor-side view of a session, without consuming a scripted step.
    pub async fn session(&self, arn: &str) -> Option<RemoteSession> {
        self.state
            .lock()
            .await
            .sessions
            .get(arn)
            .map(|stored| stored.session.clone())
    }

    pub async fn project_arns(&self) -> Vec<String> {
        self.state.lock().await.projects.keys().cloned().collect()
    }
}

#[async_trait]
impl DeviceFarm for InMemoryDeviceFarm {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        let mut state = self.state.lock().await;
        state.enter("ListProjects", None)?;
        Ok(state.projects.values().cloned().collect())
    }

    async fn create_project(&self, name: &str) -> Result<Project> {
        const OP: &str = "CreateProject";
        let mut state = self.state.lock().await;
        state.enter(OP, None)?;
        if name.trim().is_empty() {
            return Err(rejected(OP, "ArgumentException: name must not be empty".into()));
        }

        let arn = format!(
            "arn:{PARTITION}:devicefarm:{REGION}:{ACCOUNT}:project:{}",
            Uuid::new_v4()
        );
        let project = Project {
            arn: arn.clone(),
            name: Some(name.to_string()),
            created: Some(Utc::now()),
        };
        state.projects.insert(arn.clone(), project.clone());

        if let Some(pool_arn) = child_arn("devicepool", &arn, &Uuid::new_v4().to_string()) {
            state.pools.insert(
                pool_arn.clone(),
                DevicePool {
                    arn: pool_arn,
                    name: Some("Top Devices".to_string()),
                    description: Some("Top devices".to_string()),
                    pool_type: Some("CURATED".to_string()),
                    rules: vec![PoolRule {
                        attribute: "ARN".to_string(),
                        operator: "IN".to_string(),
                        value: format!("[\"{ANDROID_DEVICE_ARN}\",\"{IOS_DEVICE_ARN}\"]"),
                    }],
                },
            );
        }

        debug!(arn = %project.arn, name, "Created project");
        Ok(project)
    }

    async fn delete_project(&self, arn: &str) -> Result<()> {
        const OP: &str = "DeleteProject";
        let mut state = self.state.lock().await;
        state.enter(OP, Some(arn))?;
        state.require_project(OP, arn)?;

        let active = state.sessions.values().any(|stored| {
            belongs_to_project(&stored.session.arn, "session", arn)
                && stored.session.status.is_active()
        });
        if active {
            return Err(rejected(
                OP,
                "ArgumentException: project has remote access sessions that are not completed"
                    .into(),
            ));
        }

        state.projects.remove(arn);
        let owned = |child: &String| owning_project_arn(child).as_deref() != Some(arn);
        state.pools.retain(|k, _| owned(k));
        state.uploads.retain(|k, _| owned(k));
        state.runs.retain(|k, _| owned(k));
        state.sessions.retain(|k, _| owned(k));
        debug!(arn, "Deleted project");
        Ok(())
    }

    async fn list_device_pools(&self, project_arn: &str) -> Result<Vec<DevicePool>> {
        const OP: &str = "ListDevicePools";
        let mut state = self.state.lock().await;
        state.enter(OP, Some(project_arn))?;
        state.require_project(OP, project_arn)?;
        Ok(state
            .pools
            .values()
            .filter(|pool| belongs_to_project(&pool.arn, "devicepool", project_arn))
            .cloned()
            .collect())
    }

    async fn create_device_pool(
        &self,
        project_arn: &str,
        name: &str,
        description: Option<&str>,
        rules: &[PoolRule],
    ) -> Result<DevicePool> {
        const OP: &str = "CreateDevicePool";
        let mut state = self.state.lock().await;
        state.enter(OP, Some(project_arn))?;
        state.require_project(OP, project_arn)?;

        let arn = child_arn("devicepool", project_arn, &Uuid::new_v4().to_string())
            .ok_or_else(|| not_found(OP, "project", project_arn))?;
        let pool = DevicePool {
            arn: arn.clone(),
            name: Some(name.to_string()),
            description: description.map(str::to_string),
            pool_type: Some("PRIVATE".to_string()),
            rules: rules.to_vec(),
        };
        state.pools.insert(arn, pool.clone());
        Ok(pool)
    }

    async fn update_device_pool(
        &self,
        arn: &str,
        name: Option<&str>,
        rules: Option<&[PoolRule]>,
    ) -> Result<DevicePool> {
        const OP: &str = "UpdateDevicePool";
        let mut state = self.state.lock().await;
        state.enter(OP, owning_project_arn(arn).as_deref())?;

        let pool = state
            .pools
            .get_mut(arn)
            .ok_or_else(|| not_found(OP, "device pool", arn))?;
        if let Some(name) = name {
            pool.name = Some(name.to_string());
        }
        if let Some(rules) = rules {
            pool.rules = rules.to_vec();
        }
        Ok(pool.clone())
    }

    async fn delete_device_pool(&self, arn: &str) -> Result<()> {
        const OP: &str = "DeleteDevicePool";
        let mut state = self.state.lock().await;
        state.enter(OP, owning_project_arn(arn).as_deref())?;
        state
            .pools
            .remove(arn)
            .map(|_| ())
            .ok_or_else(|| not_found(OP, "device pool", arn))
    }

    async fn list_devices(&self, platform: Option<DevicePlatform>) -> Result<Vec<Device>> {
        self.state.lock().await.enter("ListDevices", None)?;
        Ok(self
            .devices
            .iter()
            .filter(|device| {
                platform.is_none_or(|p| device.platform.as_deref() == Some(p.as_str()))
            })
            .cloned()
            .collect())
    }

    async fn create_upload(
        &self,
        project_arn: &str,
        name: &str,
        upload_type: &str,
    ) -> Result<Upload> {
        const OP: &str = "CreateUpload";
        let mut state = self.state.lock().await;
        state.enter(OP, Some(project_arn))?;
        state.require_project(OP, project_arn)?;

        let id = Uuid::new_v4();
        let arn = child_arn("upload", project_arn, &id.to_string())
            .ok_or_else(|| not_found(OP, "project", project_arn))?;
        let upload = Upload {
            arn: arn.clone(),
            name: Some(name.to_string()),
            upload_type: Some(upload_type.to_string()),
            status: Some("INITIALIZED".to_string()),
            url: Some(format!("https://uploads.devicefarm.invalid/{id}")),
            message: None,
        };
        state.uploads.insert(arn, upload.clone());
        Ok(upload)
    }

    async fn get_upload(&self, arn: &str) -> Result<Upload> {
        const OP: &str = "GetUpload";
        let mut state = self.state.lock().await;
        state.enter(OP, owning_project_arn(arn).as_deref())?;
        state
            .uploads
            .get(arn)
            .cloned()
            .ok_or_else(|| not_found(OP, "upload", arn))
    }

    async fn schedule_run(&self, request: &ScheduleRun) -> Result<Run> {
        const OP: &str = "ScheduleRun";
        let mut state = self.state.lock().await;
        state.enter(OP, Some(&request.project_arn))?;
        state.require_project(OP, &request.project_arn)?;
        if !state.uploads.contains_key(&request.app_arn) {
            return Err(not_found(OP, "upload", &request.app_arn));
        }
        if !state.pools.contains_key(&request.device_pool_arn) {
            return Err(not_found(OP, "device pool", &request.device_pool_arn));
        }

        let arn = child_arn("run", &request.project_arn, &Uuid::new_v4().to_string())
            .ok_or_else(|| not_found(OP, "project", &request.project_arn))?;
        let run = Run {
            arn: arn.clone(),
            name: Some(request.name.clone()),
            status: Some("SCHEDULING".to_string()),
            result: Some("PENDING".to_string()),
            counters: Some(RunCounters::default()),
            created: Some(Utc::now()),
            started: None,
            stopped: None,
        };
        state.runs.insert(arn, run.clone());
        Ok(run)
    }

    async fn get_run(&self, arn: &str) -> Result<Run> {
        const OP: &str = "GetRun";
        let mut state = self.state.lock().await;
        state.enter(OP, owning_project_arn(arn).as_deref())?;
        state
            .runs
            .get(arn)
            .cloned()
            .ok_or_else(|| not_found(OP, "run", arn))
    }

    async fn stop_run(&self, arn: &str) -> Result<Run> {
        const OP: &str = "StopRun";
        let mut state = self.state.lock().await;
        state.enter(OP, owning_project_arn(arn).as_deref())?;
        let run = state
            .runs
            .get_mut(arn)
            .ok_or_else(|| not_found(OP, "run", arn))?;
        if run.status.as_deref() != Some("COMPLETED") {
            run.status = Some("STOPPING".to_string());
        }
        Ok(run.clone())
    }

    async fn list_artifacts(
        &self,
        run_arn: &str,
        category: ArtifactCategory,
    ) -> Result<Vec<Artifact>> {
        const OP: &str = "ListArtifacts";
        let mut state = self.state.lock().await;
        state.enter(OP, owning_project_arn(run_arn).as_deref())?;
        let run = state
            .runs
            .get(run_arn)
            .ok_or_else(|| not_found(OP, "run", run_arn))?;
        if run.status.as_deref() != Some("COMPLETED") {
            return Ok(Vec::new());
        }

        let (name, artifact_type, extension) = match category {
            ArtifactCategory::Screenshot => ("launch", "SCREENSHOT", "png"),
            ArtifactCategory::File => ("Customer Artifacts", "CUSTOMER_ARTIFACT", "zip"),
            ArtifactCategory::Log => ("Logcat", "DEVICE_LOG", "txt"),
        };
        let id = Uuid::new_v4();
        Ok(vec![Artifact {
            arn: child_arn("artifact", run_arn, &id.to_string()).unwrap_or_default(),
            name: Some(name.to_string()),
            artifact_type: Some(artifact_type.to_string()),
            extension: Some(extension.to_string()),
            url: Some(format!("https://artifacts.devicefarm.invalid/{id}.{extension}")),
        }])
    }

    async fn create_remote_session(
        &self,
        project_arn: &str,
        device_arn: &str,
        name: &str,
    ) -> Result<RemoteSession> {
        const OP: &str = "CreateRemoteAccessSession";
        let mut state = self.state.lock().await;
        state.enter(OP, Some(project_arn))?;
        state.require_project(OP, project_arn)?;
        if !self.devices.iter().any(|d| d.arn == device_arn) {
            return Err(not_found(OP, "device", device_arn));
        }

        let arn = child_arn("session", project_arn, &format!("{}/00000", Uuid::new_v4()))
            .ok_or_else(|| not_found(OP, "project", project_arn))?;
        let steps = state
            .scripts
            .get(device_arn)
            .cloned()
            .unwrap_or_else(default_script);
        let session = RemoteSession {
            arn: arn.clone(),
            name: Some(name.to_string()),
            status: SessionPhase::new(SessionPhase::PENDING),
            result: None,
            message: None,
            endpoint: None,
            device_arn: Some(device_arn.to_string()),
            created: Some(Utc::now()),
        };
        state.sessions.insert(
            arn.clone(),
            StoredSession {
                session: session.clone(),
                steps: steps.into(),
            },
        );
        debug!(arn, device_arn, "Created remote access session");
        Ok(session)
    }

    async fn get_remote_session(&self, arn: &str) -> Result<RemoteSession> {
        const OP: &str = "GetRemoteAccessSession";
        let mut state = self.state.lock().await;
        state.enter(OP, owning_project_arn(arn).as_deref())?;
        let stored = state
            .sessions
            .get_mut(arn)
            .ok_or_else(|| not_found(OP, "session", arn))?;

        let step = if stored.steps.len() > 1 {
            stored.steps.pop_front()
        } else {
            stored.steps.front().cloned()
        };
        if let Some(step) = step {
            let endpoint = match (step.endpoint, step.status.is_running()) {
                (Some(endpoint), _) => Some(endpoint),
                (None, true) => Some(default_endpoint(arn)),
                (None, false) => None,
            };
            stored.session.status = step.status;
            stored.session.endpoint = endpoint;
        }
        Ok(stored.session.clone())
    }

    async fn list_remote_sessions(&self, project_arn: &str) -> Result<Vec<RemoteSession>> {
        const OP: &str = "ListRemoteAccessSessions";
        let mut state = self.state.lock().await;
        state.enter(OP, Some(project_arn))?;
        state.require_project(OP, project_arn)?;
        Ok(state
            .sessions
            .values()
            .filter(|stored| belongs_to_project(&stored.session.arn, "session", project_arn))
            .map(|stored| stored.session.clone())
            .collect())
    }

    async fn stop_remote_session(&self, arn: &str) -> Result<RemoteSession> {
        const OP: &str = "StopRemoteAccessSession";
        let mut state = self.state.lock().await;
        state.enter(OP, owning_project_arn(arn).as_deref())?;
        let stored = state
            .sessions
            .get_mut(arn)
            .ok_or_else(|| not_found(OP, "session", arn))?;
        if !stored.session.status.is_active() {
            return Err(rejected(
                OP,
                format!("ArgumentException: session {arn} is already completed"),
            ));
        }

        stored.session.status = SessionPhase::new(SessionPhase::COMPLETED);
        stored.session.result = Some("STOPPED".to_string());
        stored.session.endpoint = None;
        stored.steps = VecDeque::from([SessionStep::new(SessionPhase::COMPLETED)]);
        let session = stored.session.clone();
        debug!(arn, "Stopped remote access session");
        state.answer(OP, owning_project_arn(arn).as_deref())?;
        Ok(session)
    }
}
