use common::AppType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "app")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    pub app_type: AppType,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    /// Vendor upload reference. Only ever set from a client-confirmed upload.
    pub upload_arn: Option<String>,
    /// Vendor-reported upload state at confirmation time.
    pub upload_status: Option<String>,

    pub user_id: i32,

    pub project_id: i32,
    #[sea_orm(belongs_to, from = "project_id", to = "id")]
    pub project: HasOne<super::project::Entity>,

    #[sea_orm(has_many)]
    pub runs: HasMany<super::run::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
