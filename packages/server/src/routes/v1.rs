use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/projects", project_routes())
        .nest("/apps", app_routes())
        .nest("/device-pools", device_pool_routes())
        .route("/devices", get(handlers::device::list_devices))
        .nest("/runs", run_routes())
        .nest("/sessions", session_routes())
        .route("/admin/reset", delete(handlers::admin::reset_account))
        .route("/status/vendor", get(handlers::status::vendor_status))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/me", get(handlers::auth::me))
}

fn project_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::project::list_projects).post(handlers::project::create_project),
        )
        .route(
            "/{id}",
            get(handlers::project::get_project).delete(handlers::project::delete_project),
        )
        .route("/{id}/link", post(handlers::project::link_project))
}

fn app_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::app::list_apps).post(handlers::app::create_app),
        )
        .route(
            "/{id}",
            get(handlers::app::get_app).delete(handlers::app::delete_app),
        )
}

fn device_pool_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(handlers::device_pool::list_device_pools)
            .post(handlers::device_pool::create_device_pool)
            .patch(handlers::device_pool::update_device_pool)
            .delete(handlers::device_pool::delete_device_pool),
    )
}

fn run_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::run::list_runs).post(handlers::run::create_run),
        )
        .route("/{id}", get(handlers::run::get_run))
        .route("/{id}/stop", post(handlers::run::stop_run))
        .route("/{id}/sync", post(handlers::run::sync_run))
        .route("/{id}/artifacts", get(handlers::run::list_run_artifacts))
}

fn session_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::session::poll_session)
                .post(handlers::session::start_session)
                .delete(handlers::session::stop_session),
        )
        .route("/list", get(handlers::session::list_sessions))
}
