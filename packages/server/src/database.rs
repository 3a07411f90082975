use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use tracing::info;

use crate::config::DatabaseConfig;

pub async fn init_db(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.url.to_owned());

    // Set connection pool options
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(config.sqlx_logging);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("server::entity::*")
        .sync(&db)
        .await?;
    ensure_indexes(&db).await?;

    info!(backend = ?db.get_database_backend(), "Database ready");
    Ok(db)
}

/// Secondary indexes for the per-user and per-project lookups every listing does.
pub async fn ensure_indexes<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let statements = [
        "CREATE INDEX IF NOT EXISTS idx_project_user_id ON project (user_id)",
        "CREATE INDEX IF NOT EXISTS idx_app_project_id ON app (project_id)",
        "CREATE INDEX IF NOT EXISTS idx_run_project_id ON run (project_id)",
        "CREATE INDEX IF NOT EXISTS idx_run_app_id ON run (app_id)",
    ];
    for sql in statements {
        db.execute_raw(Statement::from_string(backend, sql)).await?;
    }
    Ok(())
}
