//! Shared setup for integration tests.
//!
//! Builds an in-memory database, seeds events, questions and invites, mints
//! bearer tokens, and drives the full router with `oneshot`.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use parking_lot::Mutex;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, EntityTrait, Set};
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot`
use uuid::Uuid;

use ados::endpoints::create_app;
use ados::migrations::Migrator;
use ados::models::prelude::*;
use ados::models::question::{QuestionType, VisibilityRule};
use ados::models::{event, invite, profile, question};
use ados::services::notification::{
    ChannelType, NotificationMessage, NotificationProvider, NotificationService, SendResult,
};
use ados::services::questionnaire::{MemoryDraftStore, SharedDraftStore};
use ados::services::security::{create_access_token, UserMetadata};
use ados::state::AppState;

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

// ============================================================================
// Seed data
// ============================================================================

pub async fn create_test_profile(db: &DatabaseConnection, name: &str) -> profile::Model {
    let now = Utc::now();
    profile::ActiveModel {
        id: Set(Uuid::new_v4()),
        discord_username: Set(Some(name.to_string())),
        discord_id: Set(Some(format!("{}-discord", name))),
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

pub async fn create_test_admin(db: &DatabaseConnection, name: &str) -> profile::Model {
    let admin = create_test_profile(db, name).await;
    let mut active: profile::ActiveModel = admin.into();
    active.role = Set(Some("admin".to_string()));
    active.update(db).await.unwrap()
}

pub async fn create_test_event(db: &DatabaseConnection, slug: &str) -> event::Model {
    let now = Utc::now();
    event::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(format!("Event {}", slug)),
        slug: Set(slug.to_string()),
        description: Set(Some("A test event".to_string())),
        long_description: Set(Some("Panels, roundtables and a show".to_string())),
        date: Set(Some(now + Duration::days(30))),
        end_date: Set(None),
        location: Set(Some("Los Angeles".to_string())),
        max_attendees: Set(Some(200)),
        is_active: Set(true),
        banner_image_url: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn deactivate_event(db: &DatabaseConnection, event_id: Uuid) {
    let found = Event::find_by_id(event_id).one(db).await.unwrap().unwrap();
    let mut active: event::ActiveModel = found.into();
    active.is_active = Set(false);
    active.update(db).await.unwrap();
}

pub struct NewQuestion<'a> {
    pub order_index: i32,
    pub text: &'a str,
    pub kind: QuestionType,
    pub options: &'a [&'a str],
    pub is_required: bool,
    pub depends_on: Option<(Uuid, VisibilityRule)>,
}

impl<'a> NewQuestion<'a> {
    pub fn text(order_index: i32, text: &'a str, is_required: bool) -> Self {
        Self {
            order_index,
            text,
            kind: QuestionType::ShortText,
            options: &[],
            is_required,
            depends_on: None,
        }
    }

    pub fn choice(order_index: i32, text: &'a str, options: &'a [&'a str]) -> Self {
        Self {
            order_index,
            text,
            kind: QuestionType::SingleChoice,
            options,
            is_required: true,
            depends_on: None,
        }
    }

    pub fn shown_when(mut self, question_id: Uuid, rule: VisibilityRule) -> Self {
        self.depends_on = Some((question_id, rule));
        self
    }
}

pub async fn create_question(
    db: &DatabaseConnection,
    event_id: Uuid,
    new: NewQuestion<'_>,
) -> question::Model {
    let options = if new.options.is_empty() {
        None
    } else {
        Some(serde_json::to_string(new.options).unwrap())
    };
    let (depends_on, rule) = match new.depends_on {
        Some((id, rule)) => (Some(id), Some(rule.to_json())),
        None => (None, None),
    };

    question::ActiveModel {
        id: Set(Uuid::new_v4()),
        event_id: Set(event_id),
        question_text: Set(new.text.to_string()),
        question_type: Set(new.kind.as_str().to_string()),
        options: Set(options),
        is_required: Set(new.is_required),
        order_index: Set(new.order_index),
        placeholder: Set(None),
        helper_text: Set(None),
        depends_on_question_id: Set(depends_on),
        visible_when: Set(rule),
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

pub async fn reload_invite(db: &DatabaseConnection, invite_id: Uuid) -> invite::Model {
    Invite::find_by_id(invite_id).one(db).await.unwrap().unwrap()
}

/// The ADOS questionnaire shape: how-did-you-hear first, travel follow-up
/// shown only to respondents who need travel support.
pub struct SeededQuestionnaire {
    pub event: event::Model,
    pub referral: question::Model,
    pub role: question::Model,
    pub travel: question::Model,
    pub travel_details: question::Model,
}

pub async fn seed_questionnaire(db: &DatabaseConnection, slug: &str) -> SeededQuestionnaire {
    let event = create_test_event(db, slug).await;
    let referral = create_question(
        db,
        event.id,
        NewQuestion::text(0, "How did you hear about ADOS?", true),
    )
    .await;
    let role = create_question(db, event.id, NewQuestion::text(1, "What do you do?", true)).await;
    let travel = create_question(
        db,
        event.id,
        NewQuestion::choice(2, "Do you need travel support?", &["Yes", "No"]),
    )
    .await;
    let travel_details = create_question(
        db,
        event.id,
        NewQuestion::text(3, "Where are you travelling from?", true)
            .shown_when(travel.id, VisibilityRule::Equals("Yes".to_string())),
    )
    .await;

    SeededQuestionnaire {
        event,
        referral,
        role,
        travel,
        travel_details,
    }
}

// ============================================================================
// Notification doubles
// ============================================================================

/// Records every message; optionally reports failure for each send
pub struct RecordingProvider {
    channel: ChannelType,
    fail: bool,
    sent: Mutex<Vec<NotificationMessage>>,
}

impl RecordingProvider {
    pub fn new(channel: ChannelType) -> Arc<Self> {
        Arc::new(Self {
            channel,
            fail: false,
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(channel: ChannelType) -> Arc<Self> {
        Arc::new(Self {
            channel,
            fail: true,
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn sent(&self) -> Vec<NotificationMessage> {
        self.sent.lock().clone()
    }

    /// Wait for spawned deliveries to land
    pub async fn wait_for(&self, count: usize) -> Vec<NotificationMessage> {
        for _ in 0..100 {
            if self.sent.lock().len() >= count {
                break;
            }
            tokio::time::sleep(StdDuration::from_millis(10)).await;
        }
        self.sent()
    }
}

#[async_trait]
impl NotificationProvider for RecordingProvider {
    fn channel_type(&self) -> ChannelType {
        self.channel
    }

    async fn send(&self, message: &NotificationMessage) -> SendResult {
        self.sent.lock().push(message.clone());
        if self.fail {
            SendResult::failed("smtp relay refused the message")
        } else {
            SendResult::ok()
        }
    }
}

// ============================================================================
// App and requests
// ============================================================================

pub fn test_state(db: DatabaseConnection, providers: Vec<Arc<dyn NotificationProvider>>) -> AppState {
    let drafts: SharedDraftStore = Arc::new(MemoryDraftStore::new(Duration::hours(168)));
    AppState::with_parts(db, NotificationService::with_providers(providers), drafts)
}

pub fn test_app(state: AppState) -> Router {
    create_app(state)
}

/// Bearer token carrying the profile's identity, as the identity provider would mint it
pub fn token_for(profile: &profile::Model) -> String {
    let metadata = UserMetadata {
        full_name: profile.discord_username.clone(),
        provider_id: profile.discord_id.clone(),
        ..Default::default()
    };
    create_access_token(profile.id, profile.email.as_deref(), metadata, None).unwrap()
}

/// Send a request through the app and decode the JSON body (Null when empty)
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };

    (status, value)
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(app, Method::GET, uri, token, None).await
}

pub async fn post(app: &Router, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, token, Some(body)).await
}
