use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Public sequential id ("PAY-1001"), allocated from the counter table.
    pub payment_id: String,
    pub user_id: i32,
    pub giver_id: i32,
    pub book_id: String,
    pub amount: f64,
    pub payment_date: String,
    pub status: String, // 'PENDING', 'APPROVED', 'REJECTED'
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::refund::Entity")]
    Refund,
}

impl Related<super::refund::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Refund.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
