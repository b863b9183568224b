//! Loan Service - borrow/return bookkeeping.
//!
//! A loan holds exactly one unit of a product's stock from borrow until
//! return; both sides of the swap share a transaction with the stock write.

use chrono::{Duration, Utc};
use sea_orm::*;
use std::collections::HashMap;

use super::ServiceError;
use crate::models::loan::{self, Entity as Loan};
use crate::models::product::{self, Entity as Product};
use crate::models::user::{self, Entity as User};

const LOAN_PERIOD_DAYS: i64 = 14;

/// Enriched loan with related data
#[derive(Debug, Clone, serde::Serialize)]
pub struct LoanWithDetails {
    pub id: i32,
    pub user_id: i32,
    pub product_id: i32,
    pub loan_date: String,
    pub due_date: String,
    pub return_date: Option<String>,
    pub status: String,
    pub borrower_name: String,
    pub book_title: String,
}

/// Filter parameters for listing loans
#[derive(Debug, Default, Clone)]
pub struct LoanFilter {
    pub user_id: Option<i32>,
    pub status: Option<String>,
}

/// List loans with borrower and book info
pub async fn list_loans(
    db: &DatabaseConnection,
    filter: LoanFilter,
) -> Result<Vec<LoanWithDetails>, ServiceError> {
    let mut condition = Condition::all();

    if let Some(user_id) = filter.user_id {
        condition = condition.add(loan::Column::UserId.eq(user_id));
    }

    if let Some(status) = filter.status {
        condition = condition.add(loan::Column::Status.eq(status));
    }

    let loans_with_products = Loan::find()
        .filter(condition)
        .order_by_desc(loan::Column::LoanDate)
        .find_also_related(Product)
        .all(db)
        .await?;

    // Collect user ids to fetch borrower names
    let user_ids: Vec<i32> = loans_with_products.iter().map(|(l, _)| l.user_id).collect();

    let mut user_name_map: HashMap<i32, String> = HashMap::new();

    if !user_ids.is_empty() {
        let users = User::find()
            .filter(user::Column::Id.is_in(user_ids))
            .all(db)
            .await?;

        for u in users {
            user_name_map.insert(u.id, u.name);
        }
    }

    let result: Vec<LoanWithDetails> = loans_with_products
        .into_iter()
        .map(|(loan, product)| {
            let borrower_name = user_name_map
                .get(&loan.user_id)
                .cloned()
                .unwrap_or_else(|| "Unknown".to_string());
            let book_title = product
                .map(|p| p.name)
                .unwrap_or_else(|| "Unknown".to_string());

            LoanWithDetails {
                id: loan.id,
                user_id: loan.user_id,
                product_id: loan.product_id,
                loan_date: loan.loan_date,
                due_date: loan.due_date,
                return_date: loan.return_date,
                status: loan.status,
                borrower_name,
                book_title,
            }
        })
        .collect();

    Ok(result)
}

/// Borrow one unit of a book, identified by its product code.
pub async fn create_loan(
    db: &DatabaseConnection,
    user_id: i32,
    book_id: &str,
) -> Result<loan::Model, ServiceError> {
    let now = Utc::now();
    let now_str = now.to_rfc3339();

    let txn = db.begin().await?;

    let product = Product::find()
        .filter(product::Column::Code.eq(book_id))
        .one(&txn)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if product.stock_current < 1 {
        return Err(ServiceError::InvalidState(format!(
            "{} is out of stock",
            product.code
        )));
    }

    let product_id = product.id;
    let new_stock = product.stock_current - 1;
    let mut product_active: product::ActiveModel = product.into();
    product_active.stock_current = Set(new_stock);
    product_active.updated_at = Set(now_str.clone());
    product_active.update(&txn).await?;

    let due = now + Duration::days(LOAN_PERIOD_DAYS);
    let saved_loan = loan::ActiveModel {
        user_id: Set(user_id),
        product_id: Set(product_id),
        loan_date: Set(now_str.clone()),
        due_date: Set(due.to_rfc3339()),
        return_date: Set(None),
        status: Set("active".to_owned()),
        created_at: Set(now_str.clone()),
        updated_at: Set(now_str),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    Ok(saved_loan)
}

/// Return a loan and put its unit of stock back.
pub async fn return_loan(db: &DatabaseConnection, id: i32) -> Result<loan::Model, ServiceError> {
    let now = Utc::now().to_rfc3339();

    let txn = db.begin().await?;

    let loan = Loan::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if loan.status == "returned" {
        return Err(ServiceError::InvalidState(
            "Loan is already returned".to_string(),
        ));
    }

    let product_id = loan.product_id;
    let mut loan_active: loan::ActiveModel = loan.into();
    loan_active.return_date = Set(Some(now.clone()));
    loan_active.status = Set("returned".to_owned());
    loan_active.updated_at = Set(now.clone());
    let updated_loan = loan_active.update(&txn).await?;

    if let Some(product) = Product::find_by_id(product_id).one(&txn).await? {
        let new_stock = product.stock_current + 1;
        let mut product_active: product::ActiveModel = product.into();
        product_active.stock_current = Set(new_stock);
        product_active.updated_at = Set(now);
        product_active.update(&txn).await?;
    }

    txn.commit().await?;
    Ok(updated_loan)
}

/// Count active loans
pub async fn count_active_loans(db: &DatabaseConnection) -> Result<i64, ServiceError> {
    let count = Loan::find()
        .filter(loan::Column::Status.eq("active"))
        .count(db)
        .await?;
    Ok(count as i64)
}
