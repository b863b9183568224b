//! Services Layer
//!
//! Business logic extracted from HTTP handlers. Anything touching more than
//! one row lives here so the whole step sequence can share one transaction.

pub mod fine_service;
pub mod loan_service;
pub mod order_service;
pub mod refund_service;
pub mod ticket_service;
pub mod wallet_service;

use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Set};

use crate::models::{counter, notification};

/// Error type for service operations
#[derive(Debug)]
pub enum ServiceError {
    Database(String),
    NotFound,
    InvalidState(String),
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self {
        ServiceError::Database(e.to_string())
    }
}

/// Allocate the next value of a named sequence and format the public id.
/// Call this on the enclosing transaction so two concurrent allocations
/// cannot observe the same value.
pub async fn next_id<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    prefix: &str,
) -> Result<String, ServiceError> {
    let value = match counter::Entity::find_by_id(name.to_owned()).one(conn).await? {
        Some(row) => {
            let next = row.value + 1;
            let mut active: counter::ActiveModel = row.into();
            active.value = Set(next);
            active.update(conn).await?;
            next
        }
        None => {
            let next = 1001;
            counter::ActiveModel {
                name: Set(name.to_owned()),
                value: Set(next),
            }
            .insert(conn)
            .await?;
            next
        }
    };

    Ok(format!("{}-{}", prefix, value))
}

/// Record a notification row for the admin dashboard. Best-effort: a failed
/// write is logged and swallowed so it can never fail the request that
/// triggered it.
pub async fn notify(db: &DatabaseConnection, kind: &str, message: String) {
    let row = notification::ActiveModel {
        kind: Set(kind.to_owned()),
        message: Set(message),
        read: Set(false),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    };

    if let Err(e) = row.insert(db).await {
        tracing::warn!("failed to record notification: {}", e);
    }
}
