use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::attendance::AttendanceStatus;
use crate::models::question::{QuestionType, VisibilityRule};
use crate::models::{event, question};

#[derive(Debug, Clone, Serialize)]
pub struct EventSummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub banner_image_url: Option<String>,
}

impl From<&event::Model> for EventSummary {
    fn from(event: &event::Model) -> Self {
        Self {
            id: event.id,
            name: event.name.clone(),
            slug: event.slug.clone(),
            description: event.description.clone(),
            date: event.date,
            end_date: event.end_date,
            location: event.location.clone(),
            banner_image_url: event.banner_image_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: Uuid,
    pub question_text: String,
    pub question_type: QuestionType,
    pub options: Vec<String>,
    pub is_required: bool,
    pub order_index: i32,
    pub placeholder: Option<String>,
    pub helper_text: Option<String>,
    pub depends_on_question_id: Option<Uuid>,
    pub visible_when: Option<VisibilityRule>,
}

impl From<&question::Model> for QuestionView {
    fn from(q: &question::Model) -> Self {
        Self {
            id: q.id,
            question_text: q.question_text.clone(),
            question_type: q.kind(),
            options: q.option_list(),
            is_required: q.is_required,
            order_index: q.order_index,
            placeholder: q.placeholder.clone(),
            helper_text: q.helper_text.clone(),
            depends_on_question_id: q.depends_on_question_id,
            visible_when: q.visibility_rule(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: EventSummary,
    pub long_description: Option<String>,
    pub max_attendees: Option<i32>,
    pub is_active: bool,
    pub attendee_count: u64,
    pub questions: Vec<QuestionView>,
    /// Only filled in when the caller sent a valid token
    pub user_status: Option<AttendanceStatus>,
}
