use bookswap::db;
use bookswap::models::{fine, payment, product, user, wallet};
use bookswap::services::{fine_service, loan_service, refund_service, wallet_service, ServiceError};
use chrono::{Duration, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

// Helper to create a payment whose payment_date lies `age` in the past
async fn create_test_payment(
    db: &DatabaseConnection,
    user_id: i32,
    giver_id: i32,
    book_id: &str,
    amount: f64,
    age: Duration,
) -> i32 {
    let now = Utc::now().to_rfc3339();
    let row = payment::ActiveModel {
        payment_id: Set(format!("PAY-T{}-{}", user_id, book_id)),
        user_id: Set(user_id),
        giver_id: Set(giver_id),
        book_id: Set(book_id.to_string()),
        amount: Set(amount),
        payment_date: Set((Utc::now() - age).to_rfc3339()),
        status: Set("APPROVED".to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    let res = payment::Entity::insert(row)
        .exec(db)
        .await
        .expect("Failed to create payment");
    res.last_insert_id
}

async fn fines_for(db: &DatabaseConnection, user_id: i32, book_id: &str) -> Vec<fine::Model> {
    fine::Entity::find()
        .filter(fine::Column::UserId.eq(user_id))
        .filter(fine::Column::BookId.eq(book_id))
        .all(db)
        .await
        .unwrap()
}

async fn system_balance(db: &DatabaseConnection) -> f64 {
    wallet::Entity::find()
        .filter(wallet::Column::WalletType.eq("system"))
        .one(db)
        .await
        .unwrap()
        .map(|w| w.balance)
        .unwrap_or(0.0)
}

#[tokio::test]
async fn test_calculate_fines_is_idempotent() {
    let db = setup_test_db().await;
    // 15.5 days old: 1.5 days past the 14-day grace, rounded up to 2
    create_test_payment(
        &db,
        1,
        2,
        "BK-200",
        500.0,
        Duration::days(15) + Duration::hours(12),
    )
    .await;

    let created = fine_service::calculate_fines(&db).await.unwrap();
    assert_eq!(created, 1);

    let created_again = fine_service::calculate_fines(&db).await.unwrap();
    assert_eq!(created_again, 0);

    let fines = fines_for(&db, 1, "BK-200").await;
    assert_eq!(fines.len(), 1);
    assert_eq!(fines[0].overdue_days, 2);
    assert_eq!(fines[0].amount, 200.0);
    assert_eq!(fines[0].status, "PENDING");
}

#[tokio::test]
async fn test_no_fine_inside_grace_period() {
    let db = setup_test_db().await;
    create_test_payment(&db, 1, 2, "BK-201", 500.0, Duration::days(10)).await;

    let created = fine_service::calculate_fines(&db).await.unwrap();
    assert_eq!(created, 0);
    assert!(fines_for(&db, 1, "BK-201").await.is_empty());
}

#[tokio::test]
async fn test_rejected_fine_blocks_recreation() {
    let db = setup_test_db().await;
    create_test_payment(&db, 1, 2, "BK-202", 500.0, Duration::days(20)).await;

    fine_service::calculate_fines(&db).await.unwrap();
    let fines = fines_for(&db, 1, "BK-202").await;
    assert_eq!(fines.len(), 1);

    fine_service::reject_fine(&db, fines[0].id).await.unwrap();

    // A rejected fine still blocks the pair
    let created = fine_service::calculate_fines(&db).await.unwrap();
    assert_eq!(created, 0);
    assert_eq!(fines_for(&db, 1, "BK-202").await.len(), 1);
}

#[tokio::test]
async fn test_paid_fine_unblocks_future_accrual() {
    let db = setup_test_db().await;
    create_test_payment(&db, 1, 2, "BK-203", 500.0, Duration::days(20)).await;

    fine_service::calculate_fines(&db).await.unwrap();
    let first = fines_for(&db, 1, "BK-203").await;
    assert_eq!(first.len(), 1);

    fine_service::approve_fine(&db, first[0].id).await.unwrap();
    fine_service::mark_fine_paid(&db, first[0].id).await.unwrap();

    // The payment is still overdue; a PAID fine no longer blocks
    let created = fine_service::calculate_fines(&db).await.unwrap();
    assert_eq!(created, 1);

    let all = fines_for(&db, 1, "BK-203").await;
    assert_eq!(all.len(), 2);
    assert!(all.iter().any(|f| f.status == "PAID"));
    assert!(all.iter().any(|f| f.status == "PENDING"));
}

#[tokio::test]
async fn test_approve_fine_credits_system_wallet_once() {
    let db = setup_test_db().await;
    create_test_payment(&db, 1, 2, "BK-204", 500.0, Duration::days(20)).await;

    fine_service::calculate_fines(&db).await.unwrap();
    let fines = fines_for(&db, 1, "BK-204").await;
    let amount = fines[0].amount;

    let approved = fine_service::approve_fine(&db, fines[0].id).await.unwrap();
    assert_eq!(approved.status, "APPROVED");
    assert_eq!(system_balance(&db).await, amount);

    // Second approval attempt must fail and must not credit again
    assert!(matches!(
        fine_service::approve_fine(&db, fines[0].id).await,
        Err(ServiceError::InvalidState(_))
    ));
    assert_eq!(system_balance(&db).await, amount);
}

#[tokio::test]
async fn test_refund_approval_settlement_split() {
    let db = setup_test_db().await;
    let payment_id = create_test_payment(&db, 10, 20, "BK-205", 100.0, Duration::days(1)).await;

    // Pre-fund giver and system wallets
    let giver = wallet_service::get_or_create_user_wallet(&db, 20)
        .await
        .unwrap();
    wallet_service::credit(&db, giver, 1000.0).await.unwrap();
    let system = wallet_service::get_or_create_system_wallet(&db).await.unwrap();
    wallet_service::credit(&db, system, 50.0).await.unwrap();

    let refund = refund_service::create_refund(&db, payment_id, Some("Damaged".to_string()))
        .await
        .unwrap();
    assert_eq!(refund.status, "PENDING");
    assert_eq!(refund.amount, 100.0);
    assert!(refund.refund_id.starts_with("REF-"));

    let approved = refund_service::approve_refund(&db, refund.id).await.unwrap();
    assert_eq!(approved.status, "APPROVED");

    let buyer = wallet_service::get_or_create_user_wallet(&db, 10)
        .await
        .unwrap();
    assert_eq!(buyer.balance, 100.0);

    let giver = wallet_service::get_or_create_user_wallet(&db, 20)
        .await
        .unwrap();
    assert_eq!(giver.balance, 910.0);

    assert_eq!(system_balance(&db).await, 40.0);

    // Double approval is rejected
    assert!(matches!(
        refund_service::approve_refund(&db, refund.id).await,
        Err(ServiceError::InvalidState(_))
    ));
}

#[tokio::test]
async fn test_refund_debits_floor_at_zero() {
    let db = setup_test_db().await;
    let payment_id = create_test_payment(&db, 11, 21, "BK-206", 100.0, Duration::days(1)).await;

    // Giver and system wallets start empty; debits clamp instead of failing
    let refund = refund_service::create_refund(&db, payment_id, None).await.unwrap();
    refund_service::approve_refund(&db, refund.id).await.unwrap();

    let buyer = wallet_service::get_or_create_user_wallet(&db, 11)
        .await
        .unwrap();
    assert_eq!(buyer.balance, 100.0);

    let giver = wallet_service::get_or_create_user_wallet(&db, 21)
        .await
        .unwrap();
    assert_eq!(giver.balance, 0.0);
    assert_eq!(system_balance(&db).await, 0.0);
}

#[tokio::test]
async fn test_refund_for_unknown_payment() {
    let db = setup_test_db().await;
    let result = refund_service::create_refund(&db, 9999, None).await;
    assert!(matches!(result, Err(ServiceError::NotFound)));
}

#[tokio::test]
async fn test_reject_refund_moves_no_money() {
    let db = setup_test_db().await;
    let payment_id = create_test_payment(&db, 12, 22, "BK-207", 80.0, Duration::days(1)).await;

    let refund = refund_service::create_refund(&db, payment_id, None).await.unwrap();
    let rejected = refund_service::reject_refund(&db, refund.id).await.unwrap();
    assert_eq!(rejected.status, "REJECTED");

    let buyer = wallet_service::get_or_create_user_wallet(&db, 12)
        .await
        .unwrap();
    assert_eq!(buyer.balance, 0.0);
    assert_eq!(system_balance(&db).await, 0.0);
}

// Helper to create a borrower; loans reference a real user row
async fn create_test_user(db: &DatabaseConnection, email: &str, uni_id: &str) -> i32 {
    let now = Utc::now().to_rfc3339();
    let row = user::ActiveModel {
        name: Set("Borrower".to_string()),
        email: Set(email.to_string()),
        uni_id: Set(uni_id.to_string()),
        password_hash: Set("unused".to_string()),
        role: Set("user".to_string()),
        phone: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    user::Entity::insert(row)
        .exec(db)
        .await
        .expect("Failed to create user")
        .last_insert_id
}

// Helper to create a product for loan tests
async fn create_test_product(db: &DatabaseConnection, code: &str, stock: i32) -> i32 {
    let now = Utc::now().to_rfc3339();
    let row = product::ActiveModel {
        code: Set(code.to_string()),
        name: Set("Loanable Book".to_string()),
        category: Set("Testing".to_string()),
        price: Set(100.0),
        stock_current: Set(stock),
        stock_total: Set(stock),
        supplier: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    product::Entity::insert(row)
        .exec(db)
        .await
        .expect("Failed to create product")
        .last_insert_id
}

async fn loan_stock(db: &DatabaseConnection, code: &str) -> i32 {
    product::Entity::find()
        .filter(product::Column::Code.eq(code))
        .one(db)
        .await
        .unwrap()
        .unwrap()
        .stock_current
}

#[tokio::test]
async fn test_loan_round_trip_restores_stock() {
    let db = setup_test_db().await;
    let borrower = create_test_user(&db, "borrower@test.local", "STU-208").await;
    create_test_product(&db, "BK-208", 5).await;

    let loan = loan_service::create_loan(&db, borrower, "BK-208").await.unwrap();
    assert_eq!(loan.status, "active");
    assert_eq!(loan_stock(&db, "BK-208").await, 4);

    // Loans run two weeks
    let loaned = chrono::DateTime::parse_from_rfc3339(&loan.loan_date).unwrap();
    let due = chrono::DateTime::parse_from_rfc3339(&loan.due_date).unwrap();
    assert_eq!((due - loaned).num_days(), 14);

    let returned = loan_service::return_loan(&db, loan.id).await.unwrap();
    assert_eq!(returned.status, "returned");
    assert!(returned.return_date.is_some());
    assert_eq!(loan_stock(&db, "BK-208").await, 5);

    // Returning twice is rejected
    assert!(matches!(
        loan_service::return_loan(&db, loan.id).await,
        Err(ServiceError::InvalidState(_))
    ));
    assert_eq!(loan_stock(&db, "BK-208").await, 5);
}

#[tokio::test]
async fn test_loan_requires_stock() {
    let db = setup_test_db().await;
    let borrower = create_test_user(&db, "borrower2@test.local", "STU-209").await;
    create_test_product(&db, "BK-209", 0).await;

    let result = loan_service::create_loan(&db, borrower, "BK-209").await;
    assert!(matches!(result, Err(ServiceError::InvalidState(_))));
    assert_eq!(loan_stock(&db, "BK-209").await, 0);
}
