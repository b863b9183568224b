use crate::auth::hash_password;
use crate::models::{product, supplier, user};
use sea_orm::*;

pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    // 1. Create Users
    let admin_password = hash_password("admin").unwrap();
    let user_password = hash_password("user").unwrap();

    let admin = user::ActiveModel {
        name: Set("Admin".to_owned()),
        email: Set("admin@bookswap.local".to_owned()),
        uni_id: Set("ADM-0001".to_owned()),
        password_hash: Set(admin_password),
        role: Set("admin".to_owned()),
        phone: Set(None),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        updated_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    };

    let normal_user = user::ActiveModel {
        name: Set("Demo Student".to_owned()),
        email: Set("student@bookswap.local".to_owned()),
        uni_id: Set("STU-0001".to_owned()),
        password_hash: Set(user_password),
        role: Set("user".to_owned()),
        phone: Set(None),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        updated_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    };

    user::Entity::insert(admin)
        .on_conflict(
            sea_orm::sea_query::OnConflict::column(user::Column::Email)
                .do_nothing()
                .to_owned(),
        )
        .exec(db)
        .await?;

    user::Entity::insert(normal_user)
        .on_conflict(
            sea_orm::sea_query::OnConflict::column(user::Column::Email)
                .do_nothing()
                .to_owned(),
        )
        .exec(db)
        .await?;

    // 2. Create a supplier
    let campus_press = supplier::ActiveModel {
        name: Set("Campus Press".to_owned()),
        email: Set(Some("orders@campuspress.example".to_owned())),
        phone: Set(None),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        updated_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    };
    let _ = supplier::Entity::insert(campus_press).exec(db).await;

    // 3. Create a few products
    let catalog = vec![
        ("BK-1001", "Introduction to Algorithms", "Computer Science", 1250.0, 12),
        ("BK-1002", "Organic Chemistry", "Chemistry", 900.0, 6),
        ("BK-1003", "Microeconomics", "Economics", 650.0, 3),
    ];

    for (code, name, category, price, stock) in catalog {
        let row = product::ActiveModel {
            code: Set(code.to_owned()),
            name: Set(name.to_owned()),
            category: Set(category.to_owned()),
            price: Set(price),
            stock_current: Set(stock),
            stock_total: Set(stock),
            supplier: Set(Some("Campus Press".to_owned())),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            updated_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };
        let _ = product::Entity::insert(row)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(product::Column::Code)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(db)
            .await;
    }

    Ok(())
}
