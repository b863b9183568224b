//! Refund Service - refund requests and the approval settlement split.

use chrono::Utc;
use sea_orm::*;

use super::{next_id, wallet_service, ServiceError};
use crate::models::payment::Entity as Payment;
use crate::models::refund::{self, Entity as Refund};

/// Share of the refunded amount clawed back from the giver; the system
/// wallet covers the remainder.
const GIVER_SHARE: f64 = 0.9;

/// Open a refund request against an existing payment. Requester, giver and
/// amount are taken from the payment, never from the caller.
pub async fn create_refund(
    db: &DatabaseConnection,
    payment_ref: i32,
    reason: Option<String>,
) -> Result<refund::Model, ServiceError> {
    let now = Utc::now().to_rfc3339();
    let txn = db.begin().await?;

    let payment = Payment::find_by_id(payment_ref)
        .one(&txn)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let refund_id = next_id(&txn, "refund", "REF").await?;

    let saved = refund::ActiveModel {
        refund_id: Set(refund_id),
        payment_ref: Set(payment.id),
        requester_id: Set(payment.user_id),
        giver_id: Set(payment.giver_id),
        amount: Set(payment.amount),
        reason: Set(reason),
        status: Set("PENDING".to_owned()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    Ok(saved)
}

pub async fn list_refunds(db: &DatabaseConnection) -> Result<Vec<refund::Model>, ServiceError> {
    Ok(Refund::find()
        .order_by_desc(refund::Column::CreatedAt)
        .all(db)
        .await?)
}

/// Approve a pending refund: the requester receives the full payment amount,
/// the giver is debited 90% of it and the system wallet 10%, both floored at
/// zero. The three wallet writes and the status flip share one transaction.
pub async fn approve_refund(
    db: &DatabaseConnection,
    id: i32,
) -> Result<refund::Model, ServiceError> {
    let txn = db.begin().await?;

    let refund = Refund::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if refund.status != "PENDING" {
        return Err(ServiceError::InvalidState(format!(
            "Cannot approve a refund in status {}",
            refund.status
        )));
    }

    let payment = Payment::find_by_id(refund.payment_ref)
        .one(&txn)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let buyer_wallet = wallet_service::get_or_create_user_wallet(&txn, refund.requester_id).await?;
    wallet_service::credit(&txn, buyer_wallet, payment.amount).await?;

    let giver_wallet = wallet_service::get_or_create_user_wallet(&txn, refund.giver_id).await?;
    wallet_service::debit(&txn, giver_wallet, payment.amount * GIVER_SHARE).await?;

    let system_wallet = wallet_service::get_or_create_system_wallet(&txn).await?;
    wallet_service::debit(&txn, system_wallet, payment.amount * (1.0 - GIVER_SHARE)).await?;

    let mut active: refund::ActiveModel = refund.into();
    active.status = Set("APPROVED".to_owned());
    active.updated_at = Set(Utc::now().to_rfc3339());
    let updated = active.update(&txn).await?;

    txn.commit().await?;
    Ok(updated)
}

pub async fn reject_refund(db: &DatabaseConnection, id: i32) -> Result<refund::Model, ServiceError> {
    let refund = Refund::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if refund.status != "PENDING" {
        return Err(ServiceError::InvalidState(format!(
            "Cannot reject a refund in status {}",
            refund.status
        )));
    }

    let mut active: refund::ActiveModel = refund.into();
    active.status = Set("REJECTED".to_owned());
    active.updated_at = Set(Utc::now().to_rfc3339());
    Ok(active.update(db).await?)
}
