use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::schemas::event::QuestionView;
use crate::services::invites::{InviteRejection, RememberedInvite};
use crate::services::questionnaire::{Questionnaire, Step};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionnaireQuery {
    pub invite: Option<String>,
}

/// Answer state sent by the client for preview and submission
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct AnswersRequest {
    #[serde(default)]
    pub answers: HashMap<Uuid, String>,
    #[validate(length(max = 64))]
    pub invite_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftRequest {
    #[serde(default)]
    pub answers: HashMap<Uuid, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DraftResponse {
    pub answers: HashMap<Uuid, String>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionnaireView {
    pub event_id: Uuid,
    pub questions: Vec<QuestionView>,
    pub answers: HashMap<Uuid, String>,
    pub step: Step,
    pub progress: (usize, usize),
    pub is_updating: bool,
    pub invite: Option<RememberedInvite>,
    pub invite_rejection: Option<InviteRejection>,
}

impl QuestionnaireView {
    pub fn new(
        event_id: Uuid,
        engine: &Questionnaire,
        is_updating: bool,
        invite: Option<RememberedInvite>,
        invite_rejection: Option<InviteRejection>,
    ) -> Self {
        Self {
            event_id,
            questions: engine
                .visible_questions()
                .into_iter()
                .map(QuestionView::from)
                .collect(),
            answers: engine.answers().clone(),
            step: engine.step(),
            progress: engine.progress(),
            is_updating,
            invite,
            invite_rejection,
        }
    }
}
