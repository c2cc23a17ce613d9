//! Admin review integration tests
//!
//! Tests cover:
//! - review queue filtering and applicant details
//! - allowed and refused status transitions
//! - approval notifications, including a failing channel

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::*;

use ados::models::prelude::*;
use ados::services::notification::ChannelType;
use sea_orm::EntityTrait;

/// Submit a plain application and return its attendance id
async fn apply_pending(app: &axum::Router, seeded: &SeededQuestionnaire, token: &str) -> String {
    let (status, body) = post(
        app,
        "/api/events/ados-2025/apply",
        Some(token),
        json!({
            "answers": {
                seeded.referral.id.to_string(): "A friend",
                seeded.role.id.to_string(): "Director",
                seeded.travel.id.to_string(): "No",
            },
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["attendance"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_review_queue_filters_by_status() {
    let db = create_test_db().await;
    let seeded = seed_questionnaire(&db, "ados-2025").await;
    create_test_invite(&db, "VIP", "Vip", 1).await;
    let admin = create_test_admin(&db, "admin").await;
    let ada = create_test_profile(&db, "ada").await;
    let bob = create_test_profile(&db, "bob").await;
    let app = test_app(test_state(db.clone(), vec![]));
    let admin_token = token_for(&admin);

    apply_pending(&app, &seeded, &token_for(&ada)).await;
    post(
        &app,
        "/api/events/ados-2025/redeem",
        Some(&token_for(&bob)),
        json!({ "invite_code": "VIP" }),
    )
    .await;

    let (status, body) = get(&app, "/api/admin/events/ados-2025/attendance", Some(&admin_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = get(
        &app,
        "/api/admin/events/ados-2025/attendance?status=pending",
        Some(&admin_token),
    )
    .await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["applicant"]["discord_username"], "ada");
    assert_eq!(rows[0]["applicant"]["email"], "ada@example.com");
}

#[tokio::test]
async fn test_attendance_detail_includes_question_text() {
    let db = create_test_db().await;
    let seeded = seed_questionnaire(&db, "ados-2025").await;
    let admin = create_test_admin(&db, "admin").await;
    let ada = create_test_profile(&db, "ada").await;
    let app = test_app(test_state(db.clone(), vec![]));

    let id = apply_pending(&app, &seeded, &token_for(&ada)).await;

    let (status, body) = get(
        &app,
        &format!("/api/admin/attendance/{}", id),
        Some(&token_for(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["event"]["slug"], "ados-2025");
    assert_eq!(body["applicant"]["id"], ada.id.to_string());

    let answers = body["answers"].as_array().unwrap();
    assert_eq!(answers.len(), 3);
    assert!(answers.iter().any(|a| {
        a["question_text"] == "What do you do?" && a["answer_text"] == "Director"
    }));
}

#[tokio::test]
async fn test_approval_notifies_and_records_reviewer() {
    let db = create_test_db().await;
    let seeded = seed_questionnaire(&db, "ados-2025").await;
    let admin = create_test_admin(&db, "admin").await;
    let ada = create_test_profile(&db, "ada").await;
    let email = RecordingProvider::new(ChannelType::Email);
    let discord = RecordingProvider::new(ChannelType::Discord);
    let app = test_app(test_state(db.clone(), vec![email.clone(), discord.clone()]));

    let id = apply_pending(&app, &seeded, &token_for(&ada)).await;

    let (status, body) = post(
        &app,
        &format!("/api/admin/attendance/{}/status", id),
        Some(&token_for(&admin)),
        json!({ "status": "approved", "notes": "Great portfolio" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["changed"], true);
    assert_eq!(body["previous_status"], "pending");
    assert_eq!(body["attendance"]["status"], "approved");
    assert_eq!(body["attendance"]["reviewed_by"], admin.id.to_string());
    assert_eq!(body["attendance"]["notes"], "Great portfolio");
    assert!(body["attendance"]["reviewed_at"].is_string());

    assert_eq!(email.wait_for(1).await[0].recipient, "ada@example.com");
    assert_eq!(discord.wait_for(1).await[0].recipient, "ada-discord");
}

#[tokio::test]
async fn test_failed_notification_keeps_approval() {
    let db = create_test_db().await;
    let seeded = seed_questionnaire(&db, "ados-2025").await;
    let admin = create_test_admin(&db, "admin").await;
    let ada = create_test_profile(&db, "ada").await;
    let broken = RecordingProvider::failing(ChannelType::Email);
    let app = test_app(test_state(db.clone(), vec![broken.clone()]));

    let id = apply_pending(&app, &seeded, &token_for(&ada)).await;

    let (status, body) = post(
        &app,
        &format!("/api/admin/attendance/{}/status", id),
        Some(&token_for(&admin)),
        json!({ "status": "approved" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["attendance"]["status"], "approved");

    assert_eq!(broken.wait_for(1).await.len(), 1);
    let stored = Attendance::find_by_id(id.parse::<uuid::Uuid>().unwrap())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, "approved");
}

#[tokio::test]
async fn test_transition_rules() {
    let db = create_test_db().await;
    let seeded = seed_questionnaire(&db, "ados-2025").await;
    let admin = create_test_admin(&db, "admin").await;
    let ada = create_test_profile(&db, "ada").await;
    let email = RecordingProvider::new(ChannelType::Email);
    let app = test_app(test_state(db.clone(), vec![email.clone()]));
    let token = token_for(&admin);

    let id = apply_pending(&app, &seeded, &token_for(&ada)).await;
    let uri = format!("/api/admin/attendance/{}/status", id);

    let (status, body) = post(&app, &uri, Some(&token), json!({ "status": "rejected" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["attendance"]["status"], "rejected");

    // A decision cannot flip straight to the other decision
    let (status, body) = post(&app, &uri, Some(&token), json!({ "status": "approved" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"], "Cannot move attendance from rejected to approved");

    // Same status is a no-op
    let (status, body) = post(&app, &uri, Some(&token), json!({ "status": "rejected" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["changed"], false);

    let (status, body) = post(&app, &uri, Some(&token), json!({ "status": "pending" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["attendance"]["status"], "pending");

    // Status changes never touch the submitted answers
    let (status, detail) = get(&app, &format!("/api/admin/attendance/{}", id), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let mut stored: Vec<(String, String)> = detail["answers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| {
            (
                a["question_id"].as_str().unwrap().to_string(),
                a["answer_text"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    stored.sort();
    let mut submitted = vec![
        (seeded.referral.id.to_string(), "A friend".to_string()),
        (seeded.role.id.to_string(), "Director".to_string()),
        (seeded.travel.id.to_string(), "No".to_string()),
    ];
    submitted.sort();
    assert_eq!(stored, submitted);

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(email.sent().is_empty());

    let (status, _) = post(&app, &uri, Some(&token), json!({ "status": "waitlisted" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_unknown_attendance_is_not_found() {
    let db = create_test_db().await;
    let admin = create_test_admin(&db, "admin").await;
    let app = test_app(test_state(db.clone(), vec![]));

    let (status, _) = post(
        &app,
        &format!("/api/admin/attendance/{}/status", uuid::Uuid::new_v4()),
        Some(&token_for(&admin)),
        json!({ "status": "approved" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_routes_require_admin_role() {
    let db = create_test_db().await;
    create_test_event(&db, "ados-2025").await;
    let ada = create_test_profile(&db, "ada").await;
    let app = test_app(test_state(db.clone(), vec![]));

    let uris = [
        "/api/admin/events/ados-2025/attendance",
        "/api/admin/invites",
    ];
    for uri in uris {
        let (status, body) = get(&app, uri, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert!(body["detail"].is_string());

        let (status, body) = get(&app, uri, Some(&token_for(&ada))).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", uri);
        assert_eq!(body["detail"], "Administrator access required");
    }

    let (status, _) = get(&app, "/api/admin/invites", Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
