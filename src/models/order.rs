use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Public sequential id ("ORD-1001"), allocated from the counter table.
    pub order_id: String,
    pub user_id: Option<i32>,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub total_items: i32,
    pub total_price: f64,
    pub status: String, // 'Pending', 'Approved', 'Rejected', 'Cancelled', 'Completed'
    pub payment_status: String, // 'Unpaid', 'Paid'
    pub dispute_status: Option<String>, // 'Open', 'Resolved'
    pub dispute_message: Option<String>,
    pub dispute_resolution: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItem,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
