pub mod app;
pub mod project;
pub mod run;
pub mod user;
