//! Order Service - stock reconciliation and the order status lifecycle.
//!
//! Every operation that moves stock runs inside a single transaction, so a
//! failed line item rolls back the decrements made for earlier items and the
//! decrement/restore pair stays exactly-once across the whole lifecycle.

use chrono::Utc;
use sea_orm::*;
use serde::{Deserialize, Serialize};

use super::{next_id, ServiceError};
use crate::models::order::{self, Entity as Order};
use crate::models::order_item::{self, Entity as OrderItem};
use crate::models::product::{self, Entity as Product};

#[derive(Debug, Deserialize)]
pub struct OrderItemInput {
    pub book_id: String,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderInput {
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub user_id: Option<i32>,
    pub items: Vec<OrderItemInput>,
}

#[derive(Debug, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: order::Model,
    pub items: Vec<order_item::Model>,
}

/// Create an order: allocate the public id, check and decrement stock for
/// every line item, persist the order. All-or-nothing.
pub async fn create_order(
    db: &DatabaseConnection,
    input: CreateOrderInput,
) -> Result<OrderWithItems, ServiceError> {
    if input.items.is_empty() {
        return Err(ServiceError::InvalidState(
            "Order must contain at least one item".to_string(),
        ));
    }

    let now = Utc::now().to_rfc3339();
    let txn = db.begin().await?;

    let order_id = next_id(&txn, "order", "ORD").await?;

    let mut total_items = 0;
    let mut total_price = 0.0;
    let mut lines: Vec<(String, String, f64, i32)> = Vec::new();

    for item in &input.items {
        if item.quantity <= 0 {
            return Err(ServiceError::InvalidState(format!(
                "Invalid quantity {} for {}",
                item.quantity, item.book_id
            )));
        }

        let product = Product::find()
            .filter(product::Column::Code.eq(&item.book_id))
            .one(&txn)
            .await?
            .ok_or(ServiceError::NotFound)?;

        if product.stock_current < item.quantity {
            return Err(ServiceError::InvalidState(format!(
                "Insufficient stock for {}: requested {}, available {}",
                product.code, item.quantity, product.stock_current
            )));
        }

        total_items += item.quantity;
        total_price += product.price * item.quantity as f64;
        lines.push((
            product.code.clone(),
            product.name.clone(),
            product.price,
            item.quantity,
        ));

        let new_stock = product.stock_current - item.quantity;
        let mut active: product::ActiveModel = product.into();
        active.stock_current = Set(new_stock);
        active.updated_at = Set(now.clone());
        active.update(&txn).await?;
    }

    let saved_order = order::ActiveModel {
        order_id: Set(order_id),
        user_id: Set(input.user_id),
        customer_name: Set(input.customer_name),
        customer_email: Set(input.customer_email),
        total_items: Set(total_items),
        total_price: Set(total_price),
        status: Set("Pending".to_owned()),
        payment_status: Set("Unpaid".to_owned()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(lines.len());
    for (book_id, item_name, price, quantity) in lines {
        let saved = order_item::ActiveModel {
            order_ref: Set(saved_order.id),
            book_id: Set(book_id),
            item_name: Set(item_name),
            price: Set(price),
            quantity: Set(quantity),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        items.push(saved);
    }

    txn.commit().await?;

    Ok(OrderWithItems {
        order: saved_order,
        items,
    })
}

/// List all orders with their items, newest first.
pub async fn list_orders(db: &DatabaseConnection) -> Result<Vec<OrderWithItems>, ServiceError> {
    let orders = Order::find()
        .order_by_desc(order::Column::CreatedAt)
        .find_with_related(OrderItem)
        .all(db)
        .await?;

    Ok(orders
        .into_iter()
        .map(|(order, items)| OrderWithItems { order, items })
        .collect())
}

/// List a single user's orders, newest first.
pub async fn list_user_orders(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<OrderWithItems>, ServiceError> {
    let orders = Order::find()
        .filter(order::Column::UserId.eq(user_id))
        .order_by_desc(order::Column::CreatedAt)
        .find_with_related(OrderItem)
        .all(db)
        .await?;

    Ok(orders
        .into_iter()
        .map(|(order, items)| OrderWithItems { order, items })
        .collect())
}

pub async fn get_order(db: &DatabaseConnection, id: i32) -> Result<OrderWithItems, ServiceError> {
    let order = Order::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let items = OrderItem::find()
        .filter(order_item::Column::OrderRef.eq(order.id))
        .all(db)
        .await?;

    Ok(OrderWithItems { order, items })
}

/// Put every item's quantity back on the shelf. Inverse of the creation
/// decrement; a product deleted since the order was placed is skipped.
async fn restore_stock<C: ConnectionTrait>(
    conn: &C,
    items: &[order_item::Model],
    now: &str,
) -> Result<(), ServiceError> {
    for item in items {
        if let Some(product) = Product::find()
            .filter(product::Column::Code.eq(&item.book_id))
            .one(conn)
            .await?
        {
            let new_stock = product.stock_current + item.quantity;
            let mut active: product::ActiveModel = product.into();
            active.stock_current = Set(new_stock);
            active.updated_at = Set(now.to_owned());
            active.update(conn).await?;
        }
    }
    Ok(())
}

pub async fn approve_order(db: &DatabaseConnection, id: i32) -> Result<order::Model, ServiceError> {
    let order = Order::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if order.status != "Pending" {
        return Err(ServiceError::InvalidState(format!(
            "Cannot approve an order in status {}",
            order.status
        )));
    }

    let mut active: order::ActiveModel = order.into();
    active.status = Set("Approved".to_owned());
    active.updated_at = Set(Utc::now().to_rfc3339());
    Ok(active.update(db).await?)
}

/// Reject a pending order and restore its stock in the same transaction.
pub async fn reject_order(db: &DatabaseConnection, id: i32) -> Result<order::Model, ServiceError> {
    close_with_restock(db, id, "Rejected").await
}

/// Cancel a pending order and restore its stock in the same transaction.
pub async fn cancel_order(db: &DatabaseConnection, id: i32) -> Result<order::Model, ServiceError> {
    close_with_restock(db, id, "Cancelled").await
}

async fn close_with_restock(
    db: &DatabaseConnection,
    id: i32,
    new_status: &str,
) -> Result<order::Model, ServiceError> {
    let now = Utc::now().to_rfc3339();
    let txn = db.begin().await?;

    let order = Order::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if order.status != "Pending" {
        return Err(ServiceError::InvalidState(format!(
            "Cannot move an order from {} to {}",
            order.status, new_status
        )));
    }

    let items = OrderItem::find()
        .filter(order_item::Column::OrderRef.eq(order.id))
        .all(&txn)
        .await?;

    restore_stock(&txn, &items, &now).await?;

    let mut active: order::ActiveModel = order.into();
    active.status = Set(new_status.to_owned());
    active.updated_at = Set(now);
    let updated = active.update(&txn).await?;

    txn.commit().await?;
    Ok(updated)
}

/// Record payment receipt. Valid while the order is still in flight.
pub async fn mark_paid(db: &DatabaseConnection, id: i32) -> Result<order::Model, ServiceError> {
    let order = Order::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if order.payment_status == "Paid" {
        return Err(ServiceError::InvalidState(
            "Order is already paid".to_string(),
        ));
    }
    if order.status != "Pending" && order.status != "Approved" {
        return Err(ServiceError::InvalidState(format!(
            "Cannot record payment for an order in status {}",
            order.status
        )));
    }

    let mut active: order::ActiveModel = order.into();
    active.payment_status = Set("Paid".to_owned());
    active.updated_at = Set(Utc::now().to_rfc3339());
    Ok(active.update(db).await?)
}

/// Complete an approved, paid order.
pub async fn complete_order(
    db: &DatabaseConnection,
    id: i32,
) -> Result<order::Model, ServiceError> {
    let order = Order::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if order.status != "Approved" {
        return Err(ServiceError::InvalidState(format!(
            "Cannot complete an order in status {}",
            order.status
        )));
    }
    if order.payment_status != "Paid" {
        return Err(ServiceError::InvalidState(
            "Order must be paid before completion".to_string(),
        ));
    }

    let mut active: order::ActiveModel = order.into();
    active.status = Set("Completed".to_owned());
    active.updated_at = Set(Utc::now().to_rfc3339());
    Ok(active.update(db).await?)
}

/// Delete an order. Stock is restored only while the order still holds it
/// (Pending or Approved); deleting a cancelled or rejected order must not
/// restore a second time.
pub async fn delete_order(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let now = Utc::now().to_rfc3339();
    let txn = db.begin().await?;

    let order = Order::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(ServiceError::NotFound)?;

    let items = OrderItem::find()
        .filter(order_item::Column::OrderRef.eq(order.id))
        .all(&txn)
        .await?;

    if order.status == "Pending" || order.status == "Approved" {
        restore_stock(&txn, &items, &now).await?;
    }

    OrderItem::delete_many()
        .filter(order_item::Column::OrderRef.eq(order.id))
        .exec(&txn)
        .await?;
    Order::delete_by_id(order.id).exec(&txn).await?;

    txn.commit().await?;
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderInput {
    pub book_id: String,
    pub quantity: i32,
}

/// Edit the line of a pending single-item order. Same book: adjust stock by
/// the quantity delta. Different book: restore the old book, take from the
/// new one. One transaction either way.
pub async fn update_order(
    db: &DatabaseConnection,
    id: i32,
    input: UpdateOrderInput,
) -> Result<OrderWithItems, ServiceError> {
    if input.quantity <= 0 {
        return Err(ServiceError::InvalidState(format!(
            "Invalid quantity {}",
            input.quantity
        )));
    }

    let now = Utc::now().to_rfc3339();
    let txn = db.begin().await?;

    let order = Order::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if order.status != "Pending" {
        return Err(ServiceError::InvalidState(
            "Only pending orders can be edited".to_string(),
        ));
    }

    let items = OrderItem::find()
        .filter(order_item::Column::OrderRef.eq(order.id))
        .all(&txn)
        .await?;

    if items.len() != 1 {
        return Err(ServiceError::InvalidState(
            "Only single-item orders can be edited".to_string(),
        ));
    }
    let item = items.into_iter().next().unwrap();

    let updated_item = if item.book_id == input.book_id {
        let product = Product::find()
            .filter(product::Column::Code.eq(&item.book_id))
            .one(&txn)
            .await?
            .ok_or(ServiceError::NotFound)?;

        let delta = input.quantity - item.quantity;
        if delta > 0 && product.stock_current < delta {
            return Err(ServiceError::InvalidState(format!(
                "Insufficient stock for {}: requested {} more, available {}",
                product.code, delta, product.stock_current
            )));
        }

        let new_stock = product.stock_current - delta;
        let price = product.price;
        let mut active: product::ActiveModel = product.into();
        active.stock_current = Set(new_stock);
        active.updated_at = Set(now.clone());
        active.update(&txn).await?;

        let mut item_active: order_item::ActiveModel = item.into();
        item_active.quantity = Set(input.quantity);
        item_active.price = Set(price);
        item_active.update(&txn).await?
    } else {
        restore_stock(&txn, std::slice::from_ref(&item), &now).await?;

        let product = Product::find()
            .filter(product::Column::Code.eq(&input.book_id))
            .one(&txn)
            .await?
            .ok_or(ServiceError::NotFound)?;

        if product.stock_current < input.quantity {
            return Err(ServiceError::InvalidState(format!(
                "Insufficient stock for {}: requested {}, available {}",
                product.code, input.quantity, product.stock_current
            )));
        }

        let new_stock = product.stock_current - input.quantity;
        let code = product.code.clone();
        let name = product.name.clone();
        let price = product.price;
        let mut active: product::ActiveModel = product.into();
        active.stock_current = Set(new_stock);
        active.updated_at = Set(now.clone());
        active.update(&txn).await?;

        let mut item_active: order_item::ActiveModel = item.into();
        item_active.book_id = Set(code);
        item_active.item_name = Set(name);
        item_active.price = Set(price);
        item_active.quantity = Set(input.quantity);
        item_active.update(&txn).await?
    };

    let mut order_active: order::ActiveModel = order.into();
    order_active.total_items = Set(updated_item.quantity);
    order_active.total_price = Set(updated_item.price * updated_item.quantity as f64);
    order_active.updated_at = Set(now);
    let updated_order = order_active.update(&txn).await?;

    txn.commit().await?;

    Ok(OrderWithItems {
        order: updated_order,
        items: vec![updated_item],
    })
}

/// Attach a dispute to an order. At most one open dispute at a time.
pub async fn open_dispute(
    db: &DatabaseConnection,
    id: i32,
    message: String,
) -> Result<order::Model, ServiceError> {
    let order = Order::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if order.dispute_status.as_deref() == Some("Open") {
        return Err(ServiceError::InvalidState(
            "Order already has an open dispute".to_string(),
        ));
    }

    let mut active: order::ActiveModel = order.into();
    active.dispute_status = Set(Some("Open".to_owned()));
    active.dispute_message = Set(Some(message));
    active.dispute_resolution = Set(None);
    active.updated_at = Set(Utc::now().to_rfc3339());
    Ok(active.update(db).await?)
}

pub async fn resolve_dispute(
    db: &DatabaseConnection,
    id: i32,
    resolution: String,
) -> Result<order::Model, ServiceError> {
    let order = Order::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound)?;

    if order.dispute_status.as_deref() != Some("Open") {
        return Err(ServiceError::InvalidState(
            "Order has no open dispute".to_string(),
        ));
    }

    let mut active: order::ActiveModel = order.into();
    active.dispute_status = Set(Some("Resolved".to_owned()));
    active.dispute_resolution = Set(Some(resolution));
    active.updated_at = Set(Utc::now().to_rfc3339());
    Ok(active.update(db).await?)
}
