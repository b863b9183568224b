use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub code: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub stock_current: i32,
    pub stock_total: i32,
    pub supplier: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::loan::Entity")]
    Loan,
}

impl Related<super::loan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Loan.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Availability label shown by the storefront. Derived, never stored.
pub fn stock_status(stock_current: i32) -> &'static str {
    match stock_current {
        0 => "Out of Stock",
        1..=9 => "Low Stock",
        _ => "In Stock",
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductDto {
    pub id: Option<i32>,
    pub code: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub stock_current: i32,
    pub stock_total: i32,
    pub status: Option<String>,
    pub supplier: Option<String>,
}

impl From<Model> for ProductDto {
    fn from(model: Model) -> Self {
        Self {
            id: Some(model.id),
            status: Some(stock_status(model.stock_current).to_string()),
            code: model.code,
            name: model.name,
            category: model.category,
            price: model.price,
            stock_current: model.stock_current,
            stock_total: model.stock_total,
            supplier: model.supplier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::stock_status;

    #[test]
    fn stock_status_thresholds() {
        assert_eq!(stock_status(0), "Out of Stock");
        assert_eq!(stock_status(1), "Low Stock");
        assert_eq!(stock_status(9), "Low Stock");
        assert_eq!(stock_status(10), "In Stock");
    }
}
