//! Fine Service - overdue accrual from payment records and fine settlement.

use chrono::{DateTime, Duration, Utc};
use sea_orm::*;

use super::{wallet_service, ServiceError};
use crate::models::fine::{self, Entity as Fine};
use crate::models::payment::{self, Entity as Payment};

const FINE_PER_DAY: f64 = 100.0;
const GRACE_DAYS: i64 = 14;

/// Sweep all payments and create fines for overdue books. Runs synchronously
/// before every fines listing rather than on a schedule.
///
/// A fine is created for a (user, book) pair only when no fine for that pair
/// exists with a status other than PAID. A PAID fine stops blocking, so a
/// fresh fine can accrue after settlement; a REJECTED one blocks recreation.
pub async fn calculate_fines(db: &DatabaseConnection) -> Result<u32, ServiceError> {
    let now = Utc::now();
    let payments = Payment::find().all(db).await?;

    let mut created = 0;
    for p in payments {
        let paid_at = match DateTime::parse_from_rfc3339(&p.payment_date) {
            Ok(t) => t.with_timezone(&Utc),
            Err(e) => {
                tracing::warn!("skipping payment {}: bad payment_date: {}", p.payment_id, e);
                continue;
            }
        };

        let due = paid_at + Duration::days(GRACE_DAYS);
        if now <= due {
            continue;
        }

        // Ceil to whole days: one second late is one day overdue.
        let overdue_secs = (now - due).num_seconds();
        let overdue_days = (overdue_secs + 86_399) / 86_400;

        let blocking = Fine::find()
            .filter(fine::Column::UserId.eq(p.user_id))
            .filter(fine::Column::BookId.eq(&p.book_id))
            .filter(fine::Column::Status.ne("PAID"))
            .one(db)
            .await?;

        if blocking.is_some() {
            continue;
        }

        let now_str = now.to_rfc3339();
        fine::ActiveModel {
            user_id: Set(p.user_id),
            book_id: Set(p.book_id.clone()),
            amount: Set(overdue_days as f64 * FINE_PER_DAY),
            overdue_days: Set(overdue_days as i32),
            status: Set("PENDING".to_owned()),
            created_at: Set(now_str.clone()),
            updated_at: Set(now_str),
            ..Default::default()
        }
        .insert(db)
        .await?;

        super::notify(
            db,
            "fine",
            format!(
                "Fine created for user {} on book {}: {} days overdue",
                p.user_id, p.book_id, overdue_days
            ),
        )
        .await;

        created += 1;
    }

    Ok(created)
}

pub async fn list_fines(db: &DatabaseConnection) -> Result<Vec<fine::Model>, ServiceError> {
    Ok(Fine::find()
        .order_by_desc(fine::Column::CreatedAt)
        .all(db)
        .await?)
}

/// Approve a pending fine: the amount is credited to the system wallet and
/// the status flips, in one transaction.
pub async fn approve_fine(db: &DatabaseConnection, id: i32) -> Result<fine::Model, ServiceError> {
    let txn = db.begin().await?;

    let fine = Fine::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if fine.status != "PENDING" {
        return Err(ServiceError::InvalidState(format!(
            "Cannot approve a fine in status {}",
            fine.status
        )));
    }

    let system_wallet = wallet_service::get_or_create_system_wallet(&txn).await?;
    wallet_service::credit(&txn, system_wallet, fine.amount).await?;

    let mut active: fine::ActiveModel = fine.into();
    active.status = Set("APPROVED".to_owned());
    active.updated_at = Set(Utc::now().to_rfc3339());
    let updated = active.update(&txn).await?;

    txn.commit().await?;
    Ok(updated)
}

pub async fn reject_fine(db: &DatabaseConnection, id: i32) -> Result<fine::Model, ServiceError> {
    let fine = Fine::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if fine.status != "PENDING" {
        return Err(ServiceError::InvalidState(format!(
            "Cannot reject a fine in status {}",
            fine.status
        )));
    }

    let mut active: fine::ActiveModel = fine.into();
    active.status = Set("REJECTED".to_owned());
    active.updated_at = Set(Utc::now().to_rfc3339());
    Ok(active.update(db).await?)
}

/// Settle an approved fine. PAID unblocks future accrual for the pair.
pub async fn mark_fine_paid(db: &DatabaseConnection, id: i32) -> Result<fine::Model, ServiceError> {
    let fine = Fine::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if fine.status != "APPROVED" {
        return Err(ServiceError::InvalidState(format!(
            "Cannot mark a fine paid in status {}",
            fine.status
        )));
    }

    let mut active: fine::ActiveModel = fine.into();
    active.status = Set("PAID".to_owned());
    active.updated_at = Set(Utc::now().to_rfc3339());
    Ok(active.update(db).await?)
}
