use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::error::Result;
use crate::middleware::MaybeUser;
use crate::models::attendance::AttendanceStatus;
use crate::schemas::{EventDetail, EventSummary, QuestionView};
use crate::services::{attendance, events};
use crate::state::AppState;

pub fn events_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/events", get(list_events))
        .route("/api/events/{slug}", get(get_event))
        .with_state(state)
}

async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<EventSummary>>> {
    let events = events::list_active(&state.db).await?;
    Ok(Json(events.iter().map(EventSummary::from).collect()))
}

async fn get_event(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    MaybeUser(user_id): MaybeUser,
) -> Result<Json<EventDetail>> {
    let event = events::get_by_slug(&state.db, &slug).await?;

    let own_attendance = async {
        match user_id {
            Some(user_id) => attendance::find_for_user(&state.db, user_id, event.id).await,
            None => Ok(None),
        }
    };

    let (questions, attendee_count, mine) = tokio::try_join!(
        events::questions_for(&state.db, event.id),
        attendance::count_for_event(&state.db, event.id, Some(AttendanceStatus::Approved)),
        own_attendance,
    )?;

    Ok(Json(EventDetail {
        event: EventSummary::from(&event),
        long_description: event.long_description.clone(),
        max_attendees: event.max_attendees,
        is_active: event.is_active,
        attendee_count,
        questions: questions.iter().map(QuestionView::from).collect(),
        user_status: mine.map(|a| a.status()),
    }))
}
