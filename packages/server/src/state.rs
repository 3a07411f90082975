use std::sync::Arc;

use axum::extract::FromRef;
use devicefarm::DeviceFarm;
use sea_orm::DatabaseConnection;

use crate::config::{AppConfig, AuthConfig};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    /// Built once at startup and only read afterwards.
    pub vendor: Arc<dyn DeviceFarm>,
}

impl FromRef<AppState> for AuthConfig {
    fn from_ref(state: &AppState) -> Self {
        state.config.auth.clone()
    }
}
