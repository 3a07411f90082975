use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    pub description: Option<String>,
    /// NULL while the project has no device farm counterpart.
    pub vendor_project_arn: Option<String>,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    #[sea_orm(has_many)]
    pub apps: HasMany<super::app::Entity>,

    #[sea_orm(has_many)]
    pub runs: HasMany<super::run::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    pub fn is_linked(&self) -> bool {
        self.vendor_project_arn.is_some()
    }
}

impl ActiveModelBehavior for ActiveModel {}
