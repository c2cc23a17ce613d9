//! Test helpers for unit tests.
//!
//! Every helper panics on failure; they are only meant for test setup.

use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, EntityTrait, Set};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use crate::migrations::Migrator;
use crate::models::prelude::*;
use crate::models::question::QuestionType;
use crate::models::{event, invite, profile, question};

/// Create an in-memory SQLite database with every migration applied
pub async fn create_test_db() -> DatabaseConnection {
    // Use simple in-memory SQLite - each connection gets its own database
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run test migrations");

    db
}

pub async fn create_test_profile(db: &DatabaseConnection, name: &str) -> profile::Model {
    let now = Utc::now();
    profile::ActiveModel {
        id: Set(Uuid::new_v4()),
        discord_username: Set(Some(name.to_string())),
        discord_id: Set(None),
        avatar_url: Set(None),
        email: Set(Some(format!("{}@example.com", name))),
        role: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap()
}

/// Active event a month out
pub async fn create_test_event(db: &DatabaseConnection, slug: &str) -> event::Model {
    let now = Utc::now();
    event::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(format!("Event {}", slug)),
        slug: Set(slug.to_string()),
        description: Set(Some("A test event".to_string())),
        long_description: Set(None),
        date: Set(Some(now + Duration::days(30))),
        end_date: Set(None),
        location: Set(Some("Los Angeles".to_string())),
        max_attendees: Set(Some(100)),
        is_active: Set(true),
        banner_image_url: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap()
}

/// Unconditional short-text question
pub async fn create_test_question(
    db: &DatabaseConnection,
    event_id: Uuid,
    order_index: i32,
    text: &str,
    is_required: bool,
) -> question::Model {
    question::ActiveModel {
        id: Set(Uuid::new_v4()),
        event_id: Set(event_id),
        question_text: Set(text.to_string()),
        question_type: Set(QuestionType::ShortText.as_str().to_string()),
        options: Set(None),
        is_required: Set(is_required),
        order_index: Set(order_index),
        placeholder: Set(None),
        helper_text: Set(None),
        depends_on_question_id: Set(None),
        visible_when: Set(None),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn create_test_invite(
    db: &DatabaseConnection,
    code: &str,
    name: &str,
    max_uses: i32,
) -> invite::Model {
    let now = Utc::now();
    invite::ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(code.to_string()),
        name: Set(name.to_string()),
        max_uses: Set(max_uses),
        used_count: Set(0),
        discord_id: Set(None),
        invite_sent_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn set_role(db: &DatabaseConnection, user_id: Uuid, role: &str) {
    let existing = Profile::find_by_id(user_id).one(db).await.unwrap().unwrap();
    let mut active: profile::ActiveModel = existing.into();
    active.role = Set(Some(role.to_string()));
    active.update(db).await.unwrap();
}
