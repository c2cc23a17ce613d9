use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::attendance::AttendanceStatus;
use crate::models::{answer, attendance, profile};
use crate::schemas::event::EventSummary;
use crate::services::attendance::{InviteOutcome, SubmissionOutcome};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RedeemRequest {
    #[validate(length(min = 1, max = 64, message = "Enter an invite code"))]
    pub invite_code: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StatusUpdateRequest {
    pub status: AttendanceStatus,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceFilter {
    pub status: Option<AttendanceStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub status: AttendanceStatus,
    pub applied_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<Uuid>,
    pub notes: Option<String>,
    pub invite_code: Option<String>,
}

impl From<&attendance::Model> for AttendanceResponse {
    fn from(a: &attendance::Model) -> Self {
        Self {
            id: a.id,
            user_id: a.user_id,
            event_id: a.event_id,
            status: a.status(),
            applied_at: a.applied_at,
            reviewed_at: a.reviewed_at,
            reviewed_by: a.reviewed_by,
            notes: a.notes.clone(),
            invite_code: a.invite_code.clone(),
        }
    }
}

/// Dashboard row
#[derive(Debug, Clone, Serialize)]
pub struct MyAttendanceResponse {
    #[serde(flatten)]
    pub attendance: AttendanceResponse,
    pub event: Option<EventSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicantResponse {
    pub id: Uuid,
    pub discord_username: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<&profile::Model> for ApplicantResponse {
    fn from(p: &profile::Model) -> Self {
        Self {
            id: p.id,
            discord_username: p.discord_username.clone(),
            email: p.email.clone(),
            avatar_url: p.avatar_url.clone(),
        }
    }
}

/// Review queue row
#[derive(Debug, Clone, Serialize)]
pub struct EventAttendanceResponse {
    #[serde(flatten)]
    pub attendance: AttendanceResponse,
    pub applicant: Option<ApplicantResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerResponse {
    pub question_id: Uuid,
    pub question_text: Option<String>,
    pub answer_text: String,
}

impl AnswerResponse {
    pub fn new(answer: &answer::Model, question_text: Option<String>) -> Self {
        Self {
            question_id: answer.question_id,
            question_text,
            answer_text: answer.answer_text.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceDetailResponse {
    #[serde(flatten)]
    pub attendance: AttendanceResponse,
    pub event: Option<EventSummary>,
    pub applicant: Option<ApplicantResponse>,
    pub answers: Vec<AnswerResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionResponse {
    pub attendance: AttendanceResponse,
    pub created: bool,
    pub invite: InviteOutcome,
    pub answers_written: usize,
}

impl From<&SubmissionOutcome> for SubmissionResponse {
    fn from(outcome: &SubmissionOutcome) -> Self {
        Self {
            attendance: AttendanceResponse::from(&outcome.attendance),
            created: outcome.created,
            invite: outcome.invite.clone(),
            answers_written: outcome.answers_written,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TransitionResponse {
    pub attendance: AttendanceResponse,
    pub previous_status: AttendanceStatus,
    pub changed: bool,
}
