use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tickets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub student_id: i32,
    pub subject: String,
    pub description: String,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub status: String, // 'Open', 'In Progress', 'Resolved', 'Closed'
    pub assigned_to: Option<String>,
    pub archived: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ticket_response::Entity")]
    TicketResponse,
}

impl Related<super::ticket_response::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TicketResponse.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Serialize, Deserialize)]
pub struct TicketDto {
    pub id: Option<i32>,
    pub student_id: i32,
    pub subject: String,
    pub description: String,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
}
