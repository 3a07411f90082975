pub mod admin;
pub mod app;
pub mod auth;
pub mod device;
pub mod device_pool;
pub mod project;
pub mod run;
pub mod session;
pub mod shared;
pub mod status;
