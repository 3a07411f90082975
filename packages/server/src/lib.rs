pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod session;
pub mod state;
pub mod teardown;
pub mod utils;

use std::time::Duration;

use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_scalar::{Scalar, Servable as ScalarServable};

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Farmdeck API",
        version = "1.0.0",
        description = "Console backend for running fuzz tests and remote sessions on a cloud device farm"
    ),
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::me,
        handlers::project::list_projects,
        handlers::project::create_project,
        handlers::project::get_project,
        handlers::project::delete_project,
        handlers::project::link_project,
        handlers::app::list_apps,
        handlers::app::create_app,
        handlers::app::get_app,
        handlers::app::delete_app,
        handlers::device_pool::list_device_pools,
        handlers::device_pool::create_device_pool,
        handlers::device_pool::update_device_pool,
        handlers::device_pool::delete_device_pool,
        handlers::device::list_devices,
        handlers::run::list_runs,
        handlers::run::create_run,
        handlers::run::get_run,
        handlers::run::stop_run,
        handlers::run::sync_run,
        handlers::run::list_run_artifacts,
        handlers::session::start_session,
        handlers::session::poll_session,
        handlers::session::stop_session,
        handlers::session::list_sessions,
        handlers::admin::reset_account,
        handlers::status::vendor_status,
    ),
    tags(
        (name = "Auth", description = "Authentication and user management"),
        (name = "Projects", description = "Projects and their device farm counterparts"),
        (name = "Apps", description = "Two-phase app uploads"),
        (name = "Device Pools", description = "Device pools of a project"),
        (name = "Devices", description = "Device farm device catalogue"),
        (name = "Runs", description = "Scheduled fuzz runs"),
        (name = "Sessions", description = "Interactive remote-access sessions"),
        (name = "Admin", description = "Account-wide teardown"),
        (name = "Status", description = "Device farm connectivity"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// CORS for the configured origins. No origins means any origin.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(config.max_age));

    if config.allow_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = cors_layer(&state.config.server.cors);

    axum::Router::new()
        .nest("/api", routes::api_routes())
        .with_state(state)
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .layer(cors)
}
