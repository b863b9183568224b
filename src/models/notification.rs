use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Rows polled by the admin dashboard. There is no push channel.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub kind: String, // 'order', 'fine', 'ticket'
    pub message: String,
    pub read: bool,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
