
mod device_pool;
mod project;
mod run;
mod session;
mod status;
mod teardown;
