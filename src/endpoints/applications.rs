//! Applicant-facing questionnaire, drafts and submissions

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use sea_orm::ConnectionTrait;
use validator::Validate;

use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::models::attendance::AttendanceStatus;
use crate::models::{attendance as attendance_model, invite};
use crate::schemas::{
    AnswersRequest, AttendanceResponse, DraftRequest, DraftResponse, EventSummary,
    MyAttendanceResponse, QuestionnaireQuery, QuestionnaireView, RedeemRequest,
    SubmissionResponse,
};
use crate::services::attendance::{self, InviteUse, SubmissionOutcome};
use crate::services::invites::{self, InviteRejection, RememberedInvite};
use crate::services::questionnaire::DraftKey;
use crate::services::{events, Questionnaire};
use crate::state::AppState;

pub fn applications_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/events/{slug}/questionnaire", get(get_questionnaire))
        .route(
            "/api/events/{slug}/draft",
            get(get_draft).put(save_draft).delete(clear_draft),
        )
        .route("/api/events/{slug}/preview", post(preview))
        .route("/api/events/{slug}/apply", post(apply))
        .route("/api/events/{slug}/redeem", post(redeem))
        .route("/api/attendance/me", get(my_attendance))
        .with_state(state)
}

/// Check a presented code without failing the request
async fn check_invite<C: ConnectionTrait>(
    db: &C,
    code: Option<&str>,
) -> Result<(Option<invite::Model>, Option<InviteRejection>)> {
    let Some(code) = code.map(str::trim).filter(|c| !c.is_empty()) else {
        return Ok((None, None));
    };

    match invites::validate(db, code).await {
        Ok(invite) => Ok((Some(invite), None)),
        Err(e) => match InviteRejection::from_error(&e) {
            Some(rejection) => Ok((None, Some(rejection))),
            None => Err(e),
        },
    }
}

/// The first question is skipped for invitees. Once an attendance exists a
/// new code is never applied, so only its own invite counts.
fn invite_active(invite: Option<&invite::Model>, existing: Option<&attendance_model::Model>) -> bool {
    match existing {
        Some(attendance) => attendance.invite_code.is_some(),
        None => invite.is_some(),
    }
}

async fn get_questionnaire(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Query(query): Query<QuestionnaireQuery>,
) -> Result<Json<QuestionnaireView>> {
    let event = events::get_open_by_slug(&state.db, &slug).await?;
    let user_id = auth_user.id();

    let (questions, existing, (invite, rejection)) = tokio::try_join!(
        events::questions_for(&state.db, event.id),
        attendance::find_for_user(&state.db, user_id, event.id),
        check_invite(&state.db, query.invite.as_deref()),
    )?;

    let stored = match &existing {
        Some(a) => Some(attendance::answers_for(&state.db, a.id).await?),
        None => None,
    };

    let key = DraftKey::for_user(user_id, event.id);
    let engine = Questionnaire::resume(
        state.drafts.as_ref(),
        &key,
        questions,
        invite_active(invite.as_ref(), existing.as_ref()),
        stored.as_deref(),
    )
    .await?;

    Ok(Json(QuestionnaireView::new(
        event.id,
        &engine,
        existing.is_some(),
        invite.as_ref().map(RememberedInvite::from),
        rejection,
    )))
}

async fn get_draft(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<DraftResponse>> {
    let event = events::get_by_slug(&state.db, &slug).await?;
    let key = DraftKey::for_user(auth_user.id(), event.id);

    let response = match state.drafts.load(&key).await? {
        Some(draft) => DraftResponse {
            answers: draft.answers,
            updated_at: Some(draft.updated_at),
        },
        None => DraftResponse {
            answers: Default::default(),
            updated_at: None,
        },
    };
    Ok(Json(response))
}

async fn save_draft(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(req): Json<DraftRequest>,
) -> Result<Json<DraftResponse>> {
    let event = events::get_by_slug(&state.db, &slug).await?;
    let key = DraftKey::for_user(auth_user.id(), event.id);

    state.drafts.save(&key, &req.answers).await?;
    let saved = state.drafts.load(&key).await?;

    Ok(Json(DraftResponse {
        answers: req.answers,
        updated_at: saved.map(|d| d.updated_at),
    }))
}

async fn clear_draft(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<StatusCode> {
    let event = events::get_by_slug(&state.db, &slug).await?;
    state
        .drafts
        .clear(&DraftKey::for_user(auth_user.id(), event.id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Recompute visibility and step for the client's current answers.
///
/// The answers are mirrored to the draft store.
async fn preview(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(req): Json<AnswersRequest>,
) -> Result<Json<QuestionnaireView>> {
    req.validate()?;
    let event = events::get_open_by_slug(&state.db, &slug).await?;
    let user_id = auth_user.id();

    let (questions, existing, (invite, rejection)) = tokio::try_join!(
        events::questions_for(&state.db, event.id),
        attendance::find_for_user(&state.db, user_id, event.id),
        check_invite(&state.db, req.invite_code.as_deref()),
    )?;

    let engine = Questionnaire::new(questions, invite_active(invite.as_ref(), existing.as_ref()))
        .with_answers(req.answers);
    state
        .drafts
        .save(&DraftKey::for_user(user_id, event.id), engine.answers())
        .await?;

    Ok(Json(QuestionnaireView::new(
        event.id,
        &engine,
        existing.is_some(),
        invite.as_ref().map(RememberedInvite::from),
        rejection,
    )))
}

async fn apply(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(req): Json<AnswersRequest>,
) -> Result<(StatusCode, Json<SubmissionResponse>)> {
    req.validate()?;
    let event = events::get_open_by_slug(&state.db, &slug).await?;
    let user_id = auth_user.id();

    let (questions, existing, (invite, _)) = tokio::try_join!(
        events::questions_for(&state.db, event.id),
        attendance::find_for_user(&state.db, user_id, event.id),
        check_invite(&state.db, req.invite_code.as_deref()),
    )?;

    let skip_first = invite_active(invite.as_ref(), existing.as_ref());
    let mut engine = Questionnaire::new(questions, skip_first).with_answers(req.answers);
    engine.validate_all()?;
    let entries = engine.assemble_submission();

    // The skipped question must not go missing if the invite runs out meanwhile
    let invite_use = if skip_first && existing.is_none() {
        InviteUse::Required
    } else {
        InviteUse::Optional
    };
    let outcome = attendance::submit_with(
        &state.db,
        user_id,
        event.id,
        &entries,
        req.invite_code.as_deref(),
        invite_use,
    )
    .await?;

    Ok(finish_submission(&state, DraftKey::for_user(user_id, event.id), outcome).await)
}

async fn redeem(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(req): Json<RedeemRequest>,
) -> Result<(StatusCode, Json<SubmissionResponse>)> {
    req.validate()?;
    let event = events::get_open_by_slug(&state.db, &slug).await?;
    let user_id = auth_user.id();

    let outcome = attendance::redeem(&state.db, user_id, event.id, &req.invite_code).await?;

    Ok(finish_submission(&state, DraftKey::for_user(user_id, event.id), outcome).await)
}

/// Drop the draft and confirm a fresh approval. Neither step can fail the
/// request once the attendance is committed.
async fn finish_submission(
    state: &AppState,
    key: DraftKey,
    outcome: SubmissionOutcome,
) -> (StatusCode, Json<SubmissionResponse>) {
    if let Err(e) = state.drafts.clear(&key).await {
        tracing::warn!("Failed to clear draft for {}: {}", key.owner, e);
    }

    if outcome.created && outcome.attendance.status() == AttendanceStatus::Approved {
        state
            .notification
            .dispatch_approval(state.db.clone(), outcome.attendance.id);
    }

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    (status, Json(SubmissionResponse::from(&outcome)))
}

async fn my_attendance(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<MyAttendanceResponse>>> {
    let rows = attendance::list_for_user(&state.db, auth_user.id()).await?;

    let response = rows
        .iter()
        .map(|(attendance, event)| MyAttendanceResponse {
            attendance: AttendanceResponse::from(attendance),
            event: event.as_ref().map(EventSummary::from),
        })
        .collect();
    Ok(Json(response))
}

