//! Review queue and status changes for administrators

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::attendance::AttendanceStatus;
use crate::schemas::{
    AnswerResponse, ApplicantResponse, AttendanceDetailResponse, AttendanceFilter,
    AttendanceResponse, EventAttendanceResponse, EventSummary, StatusUpdateRequest,
    TransitionResponse,
};
use crate::services::{attendance, events, profiles};
use crate::state::AppState;

pub fn admin_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/admin/events/{slug}/attendance", get(list_event_attendance))
        .route("/api/admin/attendance/{id}", get(get_attendance))
        .route("/api/admin/attendance/{id}/status", post(update_status))
        .with_state(state)
}

async fn list_event_attendance(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(slug): Path<String>,
    Query(filter): Query<AttendanceFilter>,
) -> Result<Json<Vec<EventAttendanceResponse>>> {
    let event = events::get_by_slug(&state.db, &slug).await?;
    let rows = attendance::list_for_event(&state.db, event.id, filter.status).await?;

    let response = rows
        .iter()
        .map(|(attendance, profile)| EventAttendanceResponse {
            attendance: AttendanceResponse::from(attendance),
            applicant: profile.as_ref().map(ApplicantResponse::from),
        })
        .collect();
    Ok(Json(response))
}

async fn get_attendance(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<AttendanceDetailResponse>> {
    let attendance = attendance::get(&state.db, id).await?;

    let (answers, questions, event, applicant) = tokio::try_join!(
        attendance::answers_for(&state.db, attendance.id),
        events::questions_for(&state.db, attendance.event_id),
        events::find_by_id(&state.db, attendance.event_id),
        profiles::find(&state.db, attendance.user_id),
    )?;

    let texts: HashMap<Uuid, String> = questions
        .into_iter()
        .map(|q| (q.id, q.question_text))
        .collect();

    Ok(Json(AttendanceDetailResponse {
        attendance: AttendanceResponse::from(&attendance),
        event: event.as_ref().map(EventSummary::from),
        applicant: applicant.as_ref().map(ApplicantResponse::from),
        answers: answers
            .iter()
            .map(|a| AnswerResponse::new(a, texts.get(&a.question_id).cloned()))
            .collect(),
    }))
}

async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusUpdateRequest>,
) -> Result<Json<TransitionResponse>> {
    req.validate()?;
    let outcome = attendance::transition(&state.db, id, req.status, admin.id, req.notes).await?;

    if outcome.changed {
        tracing::info!(
            "Admin {} moved attendance {} from {} to {}",
            admin.id,
            id,
            outcome.previous,
            req.status
        );
        // The status change is committed; delivery runs on its own
        if req.status == AttendanceStatus::Approved {
            state.notification.dispatch_approval(state.db.clone(), id);
        }
    }

    Ok(Json(TransitionResponse {
        attendance: AttendanceResponse::from(&outcome.attendance),
        previous_status: outcome.previous,
        changed: outcome.changed,
    }))
}
