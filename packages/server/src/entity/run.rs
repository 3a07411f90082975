use common::RunStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "run")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    pub status: RunStatus,
    pub run_arn: Option<String>,
    pub device_pool_arn: Option<String>,
    /// Last vendor snapshot of the run (status, result, counters), as returned by sync.
    #[sea_orm(column_type = "Json", nullable)]
    pub result: Option<Json>,

    pub user_id: i32,

    pub project_id: i32,
    #[sea_orm(belongs_to, from = "project_id", to = "id")]
    pub project: HasOne<super::project::Entity>,

    /// Cleared when the app is deleted.
    pub app_id: Option<i32>,
    #[sea_orm(belongs_to, from = "app_id", to = "id")]
    pub app: Option<super::app::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
