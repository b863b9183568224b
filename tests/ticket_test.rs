use bookswap::db;
use bookswap::models::ticket::{self, TicketDto};
use bookswap::services::{ticket_service, ServiceError};
use chrono::{Duration, Utc};
use sea_orm::{DatabaseConnection, EntityTrait, Set};

async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

fn ticket_dto(student_id: i32, subject: &str, description: &str) -> TicketDto {
    TicketDto {
        id: None,
        student_id,
        subject: subject.to_string(),
        description: description.to_string(),
        category: Some("General".to_string()),
        priority: Some("Medium".to_string()),
        status: None,
    }
}

// Helper to insert a ticket with a chosen created_at, bypassing the service
async fn insert_ticket_at(
    db: &DatabaseConnection,
    student_id: i32,
    description: &str,
    status: &str,
    created_at: String,
) -> i32 {
    let row = ticket::ActiveModel {
        student_id: Set(student_id),
        subject: Set("Backdated".to_string()),
        description: Set(description.to_string()),
        category: Set(None),
        priority: Set(None),
        status: Set(status.to_string()),
        assigned_to: Set(None),
        archived: Set(false),
        created_at: Set(created_at.clone()),
        updated_at: Set(created_at),
        ..Default::default()
    };
    ticket::Entity::insert(row)
        .exec(db)
        .await
        .expect("Failed to insert ticket")
        .last_insert_id
}

const LONG_DESCRIPTION: &str =
    "My order arrived with several missing pages in chapter three and the cover is torn";

#[tokio::test]
async fn test_duplicate_same_prefix_within_window() {
    let db = setup_test_db().await;

    ticket_service::create_ticket(&db, ticket_dto(1, "Damaged book", LONG_DESCRIPTION))
        .await
        .expect("Create failed");

    // Same first 50 characters, different tail, different case
    let prefix: String = LONG_DESCRIPTION.chars().take(50).collect();
    let near_copy = format!("{} AND I WOULD LIKE A REPLACEMENT COPY", prefix.to_uppercase());

    let dup = ticket_service::check_duplicate(&db, 1, &near_copy)
        .await
        .unwrap();
    assert!(dup.is_some());

    let result = ticket_service::create_ticket(&db, ticket_dto(1, "Damaged again", &near_copy)).await;
    assert!(matches!(result, Err(ServiceError::InvalidState(_))));
}

#[tokio::test]
async fn test_duplicate_ignores_other_students() {
    let db = setup_test_db().await;

    ticket_service::create_ticket(&db, ticket_dto(1, "Damaged book", LONG_DESCRIPTION))
        .await
        .unwrap();

    let dup = ticket_service::check_duplicate(&db, 2, LONG_DESCRIPTION)
        .await
        .unwrap();
    assert!(dup.is_none());
}

#[tokio::test]
async fn test_duplicate_ignores_different_description() {
    let db = setup_test_db().await;

    ticket_service::create_ticket(&db, ticket_dto(1, "Login issue", "Cannot login to my account"))
        .await
        .unwrap();

    let dup = ticket_service::check_duplicate(&db, 1, "Order arrived damaged yesterday evening")
        .await
        .unwrap();
    assert!(dup.is_none());
}

#[tokio::test]
async fn test_duplicate_expires_after_window() {
    let db = setup_test_db().await;

    let two_hours_ago = (Utc::now() - Duration::hours(2)).to_rfc3339();
    insert_ticket_at(&db, 1, LONG_DESCRIPTION, "Open", two_hours_ago).await;

    let dup = ticket_service::check_duplicate(&db, 1, LONG_DESCRIPTION)
        .await
        .unwrap();
    assert!(dup.is_none());

    ticket_service::create_ticket(&db, ticket_dto(1, "Damaged book", LONG_DESCRIPTION))
        .await
        .expect("Create should succeed after the window");
}

#[tokio::test]
async fn test_duplicate_ignores_closed_tickets() {
    let db = setup_test_db().await;

    let ticket = ticket_service::create_ticket(&db, ticket_dto(1, "Damaged", LONG_DESCRIPTION))
        .await
        .unwrap();
    ticket_service::update_status(&db, ticket.id, "Closed")
        .await
        .unwrap();

    let dup = ticket_service::check_duplicate(&db, 1, LONG_DESCRIPTION)
        .await
        .unwrap();
    assert!(dup.is_none());
}

#[tokio::test]
async fn test_status_transitions() {
    let db = setup_test_db().await;
    let ticket = ticket_service::create_ticket(&db, ticket_dto(1, "Flow", "Status machine check"))
        .await
        .unwrap();
    assert_eq!(ticket.status, "Open");

    let ticket = ticket_service::update_status(&db, ticket.id, "In Progress")
        .await
        .unwrap();
    assert_eq!(ticket.status, "In Progress");

    // In Progress cannot jump straight to Closed
    assert!(matches!(
        ticket_service::update_status(&db, ticket.id, "Closed").await,
        Err(ServiceError::InvalidState(_))
    ));

    let ticket = ticket_service::update_status(&db, ticket.id, "Resolved")
        .await
        .unwrap();
    let ticket = ticket_service::update_status(&db, ticket.id, "Closed")
        .await
        .unwrap();
    assert_eq!(ticket.status, "Closed");
}

#[tokio::test]
async fn test_open_can_close_directly() {
    let db = setup_test_db().await;
    let ticket = ticket_service::create_ticket(&db, ticket_dto(1, "Quick", "Never mind, solved it"))
        .await
        .unwrap();

    let ticket = ticket_service::update_status(&db, ticket.id, "Closed")
        .await
        .unwrap();
    assert_eq!(ticket.status, "Closed");
}

#[tokio::test]
async fn test_edit_only_while_open() {
    let db = setup_test_db().await;
    let ticket = ticket_service::create_ticket(&db, ticket_dto(1, "Edit me", "Original text"))
        .await
        .unwrap();

    let edited = ticket_service::update_ticket(&db, ticket.id, ticket_dto(1, "Edited", "New text"))
        .await
        .expect("Edit failed");
    assert_eq!(edited.subject, "Edited");

    ticket_service::update_status(&db, ticket.id, "In Progress")
        .await
        .unwrap();

    let result =
        ticket_service::update_ticket(&db, ticket.id, ticket_dto(1, "Nope", "Too late")).await;
    assert!(matches!(result, Err(ServiceError::InvalidState(_))));
}

#[tokio::test]
async fn test_delete_gated_by_status() {
    let db = setup_test_db().await;
    let ticket = ticket_service::create_ticket(&db, ticket_dto(1, "Delete me", "Some problem"))
        .await
        .unwrap();

    ticket_service::assign_ticket(&db, ticket.id, "support@bookswap.local".to_string())
        .await
        .unwrap();

    // In Progress tickets cannot be deleted
    assert!(matches!(
        ticket_service::delete_ticket(&db, ticket.id).await,
        Err(ServiceError::InvalidState(_))
    ));

    ticket_service::update_status(&db, ticket.id, "Resolved")
        .await
        .unwrap();
    ticket_service::update_status(&db, ticket.id, "Closed")
        .await
        .unwrap();

    ticket_service::delete_ticket(&db, ticket.id)
        .await
        .expect("Delete failed");
    assert!(ticket::Entity::find_by_id(ticket.id)
        .one(&db)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_assignment_moves_open_to_in_progress() {
    let db = setup_test_db().await;
    let ticket = ticket_service::create_ticket(&db, ticket_dto(1, "Assign", "Needs an owner"))
        .await
        .unwrap();

    let assigned = ticket_service::assign_ticket(&db, ticket.id, "agent".to_string())
        .await
        .unwrap();
    assert_eq!(assigned.status, "In Progress");
    assert_eq!(assigned.assigned_to.as_deref(), Some("agent"));
}

#[tokio::test]
async fn test_responses_thread() {
    let db = setup_test_db().await;
    let ticket = ticket_service::create_ticket(&db, ticket_dto(1, "Thread", "Question about fees"))
        .await
        .unwrap();

    let response =
        ticket_service::add_response(&db, ticket.id, "agent".to_string(), "Looking into it".to_string())
            .await
            .expect("Response failed");
    assert_eq!(response.ticket_id, ticket.id);

    let missing =
        ticket_service::add_response(&db, 9999, "agent".to_string(), "Hello?".to_string()).await;
    assert!(matches!(missing, Err(ServiceError::NotFound)));
}

#[tokio::test]
async fn test_dashboard_stats_counts() {
    let db = setup_test_db().await;

    let a = ticket_service::create_ticket(&db, ticket_dto(1, "A", "First distinct problem"))
        .await
        .unwrap();
    let b = ticket_service::create_ticket(&db, ticket_dto(2, "B", "Second distinct problem"))
        .await
        .unwrap();
    ticket_service::create_ticket(&db, ticket_dto(3, "C", "Third distinct problem"))
        .await
        .unwrap();

    ticket_service::update_status(&db, a.id, "In Progress")
        .await
        .unwrap();
    ticket_service::update_status(&db, b.id, "Closed").await.unwrap();

    let stats = ticket_service::dashboard_stats(&db).await.unwrap();
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["open"], 1);
    assert_eq!(stats["in_progress"], 1);
    assert_eq!(stats["closed"], 1);
    assert_eq!(stats["resolved"], 0);
}

#[tokio::test]
async fn test_archive_sets_flag() {
    let db = setup_test_db().await;
    let ticket = ticket_service::create_ticket(&db, ticket_dto(1, "Archive", "Old issue"))
        .await
        .unwrap();
    assert!(!ticket.archived);

    let archived = ticket_service::archive_ticket(&db, ticket.id).await.unwrap();
    assert!(archived.archived);
}
