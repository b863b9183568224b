use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "refunds")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Public sequential id ("REF-1001"), allocated from the counter table.
    pub refund_id: String,
    /// Row id of the payment being refunded.
    pub payment_ref: i32,
    pub requester_id: i32,
    pub giver_id: i32,
    pub amount: f64,
    pub reason: Option<String>,
    pub status: String, // 'PENDING', 'APPROVED', 'REJECTED'
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::payment::Entity",
        from = "Column::PaymentRef",
        to = "super::payment::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Payment,
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
