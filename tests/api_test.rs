use axum::body::Body;
use axum::http::{Request, StatusCode};
use bookswap::{api, db};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use serial_test::serial;
use tower::ServiceExt; // for oneshot

async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn authed_json_request(method: &str, uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// Register a user through the API and return a login token
async fn register_and_login(app: &axum::Router, email: &str, uni_id: &str, role: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/users",
            json!({
                "name": "Test User",
                "email": email,
                "uni_id": uni_id,
                "password": "hunter2",
                "role": role
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/users/login",
            json!({ "email": email, "password": "hunter2" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    body["token"].as_str().expect("token missing").to_string()
}

#[tokio::test]
#[serial]
async fn test_health_endpoint() {
    let db = setup_test_db().await;
    let app = api::api_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "bookswap");
}

#[tokio::test]
#[serial]
async fn test_login_rejects_bad_credentials() {
    let db = setup_test_db().await;
    let app = api::api_router(db);

    register_and_login(&app, "student@test.local", "STU-1", "user").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/users/login",
            json!({ "email": "student@test.local", "password": "wrong" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[serial]
async fn test_role_gates_on_user_listing() {
    let db = setup_test_db().await;
    let app = api::api_router(db);

    // No token at all
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/users")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Plain user token is forbidden
    let user_token = register_and_login(&app, "plain@test.local", "STU-2", "user").await;
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/users")
                .header("Authorization", format!("Bearer {}", user_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Admin token works
    let admin_token = register_and_login(&app, "admin@test.local", "ADM-2", "admin").await;
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/users")
                .header("Authorization", format!("Bearer {}", admin_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["total"], 2);
}

#[tokio::test]
#[serial]
async fn test_product_crud_and_inventory_view() {
    let db = setup_test_db().await;
    let app = api::api_router(db);

    // Creating without a token is unauthorized
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/products",
            json!({
                "code": "BK-500", "name": "Calculus", "category": "Math",
                "price": 450.0, "stock_current": 7, "stock_total": 7
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let token = register_and_login(&app, "manager@test.local", "MGR-1", "inventory_manager").await;

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/products",
            &token,
            json!({
                "code": "BK-500", "name": "Calculus", "category": "Math",
                "price": 450.0, "stock_current": 7, "stock_total": 7
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["product"]["status"], "Low Stock");

    // Duplicate code is a client error
    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/products",
            &token,
            json!({
                "code": "BK-500", "name": "Calculus again", "category": "Math",
                "price": 450.0, "stock_current": 1, "stock_total": 1
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The legacy inventory view mirrors the product exactly
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/inventory/BK-500")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["item"]["bookId"], "BK-500");
    assert_eq!(body["item"]["itemName"], "Calculus");
    assert_eq!(body["item"]["quantity"], 7);

    // The sync shim reports the derived view
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/products/sync-to-inventory",
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["synced"], 1);
}

#[tokio::test]
#[serial]
async fn test_order_flow_through_router() {
    let db = setup_test_db().await;
    let app = api::api_router(db);

    let manager = register_and_login(&app, "mgr@test.local", "MGR-9", "inventory_manager").await;
    let admin = register_and_login(&app, "boss@test.local", "ADM-9", "admin").await;

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/products",
            &manager,
            json!({
                "code": "BK-600", "name": "Networks", "category": "CS",
                "price": 300.0, "stock_current": 10, "stock_total": 10
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Order more than available: 400, stock untouched
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/orders",
            json!({
                "customer_name": "Student A",
                "items": [{ "book_id": "BK-600", "quantity": 99 }]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Valid order
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/orders",
            json!({
                "customer_name": "Student A",
                "items": [{ "book_id": "BK-600", "quantity": 2 }]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let order_pk = body["order"]["id"].as_i64().unwrap();
    assert_eq!(body["order"]["status"], "Pending");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/inventory/BK-600")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["item"]["quantity"], 8);

    // Approving needs the admin role
    let response = app
        .clone()
        .oneshot(authed_json_request(
            "PATCH",
            &format!("/orders/{}/approve", order_pk),
            &manager,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "PATCH",
            &format!("/orders/{}/approve", order_pk),
            &admin,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Approval left a notification row behind
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/notifications")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert!(body["total"].as_u64().unwrap() >= 1);
}

#[tokio::test]
#[serial]
async fn test_jwt_secret_env_round_trip() {
    unsafe {
        std::env::set_var("JWT_SECRET", "api-test-secret");
    }

    let token = bookswap::auth::create_jwt("someone@test.local", "user").unwrap();
    let claims = bookswap::auth::decode_jwt(&token).unwrap();
    assert_eq!(claims.sub, "someone@test.local");
    assert_eq!(claims.role, "user");

    unsafe {
        std::env::remove_var("JWT_SECRET");
    }
}
