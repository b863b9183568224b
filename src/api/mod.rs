pub mod fines;
pub mod health;
pub mod inventory;
pub mod loans;
pub mod notifications;
pub mod orders;
pub mod payments;
pub mod products;
pub mod refunds;
pub mod suppliers;
pub mod tickets;
pub mod users;
pub mod wallets;

use axum::{
    http::StatusCode,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};

use crate::services::ServiceError;

/// Map a service error to the wire shape. Every controller speaks
/// `{"error": ...}` with the matching status code.
pub(crate) fn service_error(err: ServiceError) -> (StatusCode, Json<Value>) {
    match err {
        ServiceError::NotFound => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Not found" })),
        ),
        ServiceError::InvalidState(msg) => (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))),
        ServiceError::Database(msg) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": msg })),
        ),
    }
}

pub fn api_router(db: DatabaseConnection) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Users & auth
        .route("/users", get(users::list_users).post(users::register))
        .route("/users/login", post(users::login))
        .route(
            "/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/:id/change-password", put(users::change_password))
        .route("/users/:id/reset-password", put(users::reset_password))
        // Products
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/products/sync-to-inventory",
            post(inventory::sync_to_inventory),
        )
        .route(
            "/products/:id",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        // Legacy inventory view (read adapter over products)
        .route("/inventory", get(inventory::list_inventory))
        .route("/inventory/:book_id", get(inventory::get_inventory_item))
        // Orders
        .route(
            "/orders",
            get(orders::list_orders).post(orders::create_order),
        )
        .route("/orders/user/:userid", get(orders::list_user_orders))
        .route(
            "/orders/:id",
            get(orders::get_order)
                .put(orders::update_order)
                .delete(orders::delete_order),
        )
        .route("/orders/:id/approve", patch(orders::approve_order))
        .route("/orders/:id/reject", patch(orders::reject_order))
        .route("/orders/:id/cancel", patch(orders::cancel_order))
        .route("/orders/:id/complete", patch(orders::complete_order))
        .route("/orders/:id/paid", patch(orders::mark_paid))
        .route("/orders/:id/dispute", post(orders::open_dispute))
        .route(
            "/orders/:id/resolve-dispute",
            patch(orders::resolve_dispute),
        )
        // Loans
        .route("/loans", get(loans::list_loans).post(loans::create_loan))
        .route("/loans/:id/return", put(loans::return_loan))
        // Tickets
        .route(
            "/tickets",
            get(tickets::list_tickets).post(tickets::create_ticket),
        )
        .route("/tickets/stats/dashboard", get(tickets::dashboard_stats))
        .route(
            "/tickets/:id",
            get(tickets::get_ticket)
                .patch(tickets::update_ticket)
                .delete(tickets::delete_ticket),
        )
        .route("/tickets/:id/status", patch(tickets::update_status))
        .route("/tickets/:id/assign", patch(tickets::assign_ticket))
        .route("/tickets/:id/archive", patch(tickets::archive_ticket))
        .route("/tickets/:id/responses", post(tickets::add_response))
        // Payments
        .route(
            "/payments",
            get(payments::list_payments).post(payments::create_payment),
        )
        .route("/payments/:id", get(payments::get_payment))
        .route("/payments/:id/status", patch(payments::update_status))
        // Refunds
        .route(
            "/refunds",
            get(refunds::list_refunds).post(refunds::create_refund),
        )
        .route("/refunds/:id/approve", patch(refunds::approve_refund))
        .route("/refunds/:id/reject", patch(refunds::reject_refund))
        // Fines
        .route("/fines", get(fines::list_fines))
        .route("/fines/:id/approve", patch(fines::approve_fine))
        .route("/fines/:id/reject", patch(fines::reject_fine))
        .route("/fines/:id/pay", patch(fines::mark_paid))
        // Wallets
        .route("/wallets", get(wallets::list_wallets))
        .route("/wallets/system", get(wallets::get_system_wallet))
        .route("/wallets/user/:id", get(wallets::get_user_wallet))
        // Notifications
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/:id/read", patch(notifications::mark_read))
        .route(
            "/notifications/:id",
            delete(notifications::delete_notification),
        )
        // Suppliers
        .route(
            "/suppliers",
            get(suppliers::list_suppliers).post(suppliers::create_supplier),
        )
        .route(
            "/suppliers/:id",
            put(suppliers::update_supplier).delete(suppliers::delete_supplier),
        )
        .with_state(db)
}
