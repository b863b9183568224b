//! Wallet Service - lazy wallet rows and balance arithmetic.

use chrono::Utc;
use sea_orm::*;

use super::ServiceError;
use crate::models::wallet::{self, Entity as Wallet};

/// Fetch the singleton system wallet, creating it on first use.
pub async fn get_or_create_system_wallet<C: ConnectionTrait>(
    conn: &C,
) -> Result<wallet::Model, ServiceError> {
    if let Some(existing) = Wallet::find()
        .filter(wallet::Column::WalletType.eq("system"))
        .one(conn)
        .await?
    {
        return Ok(existing);
    }

    let now = Utc::now().to_rfc3339();
    Ok(wallet::ActiveModel {
        user_id: Set(None),
        wallet_type: Set("system".to_owned()),
        balance: Set(0.0),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await?)
}

/// Fetch a user's wallet, creating it on first use.
pub async fn get_or_create_user_wallet<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<wallet::Model, ServiceError> {
    if let Some(existing) = Wallet::find()
        .filter(wallet::Column::WalletType.eq("user"))
        .filter(wallet::Column::UserId.eq(user_id))
        .one(conn)
        .await?
    {
        return Ok(existing);
    }

    let now = Utc::now().to_rfc3339();
    Ok(wallet::ActiveModel {
        user_id: Set(Some(user_id)),
        wallet_type: Set("user".to_owned()),
        balance: Set(0.0),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await?)
}

pub async fn credit<C: ConnectionTrait>(
    conn: &C,
    wallet: wallet::Model,
    amount: f64,
) -> Result<wallet::Model, ServiceError> {
    let new_balance = wallet.balance + amount;
    let mut active: wallet::ActiveModel = wallet.into();
    active.balance = Set(new_balance);
    active.updated_at = Set(Utc::now().to_rfc3339());
    Ok(active.update(conn).await?)
}

/// Debit clamps at zero instead of failing; a shortfall is absorbed.
pub async fn debit<C: ConnectionTrait>(
    conn: &C,
    wallet: wallet::Model,
    amount: f64,
) -> Result<wallet::Model, ServiceError> {
    let new_balance = (wallet.balance - amount).max(0.0);
    let mut active: wallet::ActiveModel = wallet.into();
    active.balance = Set(new_balance);
    active.updated_at = Set(Utc::now().to_rfc3339());
    Ok(active.update(conn).await?)
}
