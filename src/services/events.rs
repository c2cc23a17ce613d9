//! Event and question reads

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::prelude::*;
use crate::models::{event, question};

/// Active events, soonest first
pub async fn list_active<C: ConnectionTrait>(db: &C) -> Result<Vec<event::Model>> {
    let events = Event::find()
        .filter(event::Column::IsActive.eq(true))
        .order_by_asc(event::Column::Date)
        .all(db)
        .await?;
    Ok(events)
}

pub async fn find_by_id<C: ConnectionTrait>(db: &C, event_id: Uuid) -> Result<Option<event::Model>> {
    let found = Event::find_by_id(event_id).one(db).await?;
    Ok(found)
}

pub async fn find_by_slug<C: ConnectionTrait>(db: &C, slug: &str) -> Result<Option<event::Model>> {
    let found = Event::find()
        .filter(event::Column::Slug.eq(slug))
        .one(db)
        .await?;
    Ok(found)
}

pub async fn get_by_slug<C: ConnectionTrait>(db: &C, slug: &str) -> Result<event::Model> {
    find_by_slug(db, slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
}

/// Same as [`get_by_slug`] but refuses events that are closed for applications
pub async fn get_open_by_slug<C: ConnectionTrait>(db: &C, slug: &str) -> Result<event::Model> {
    let event = get_by_slug(db, slug).await?;
    if !event.is_active {
        return Err(AppError::BadRequest(
            "This event is not accepting applications".to_string(),
        ));
    }
    Ok(event)
}

/// All questions of an event in display order
pub async fn questions_for<C: ConnectionTrait>(
    db: &C,
    event_id: Uuid,
) -> Result<Vec<question::Model>> {
    let questions = Question::find()
        .filter(question::Column::EventId.eq(event_id))
        .order_by_asc(question::Column::OrderIndex)
        .all(db)
        .await?;
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{create_test_db, create_test_event, create_test_question};

    #[tokio::test]
    async fn test_questions_come_back_in_order() {
        let db = create_test_db().await;
        let event = create_test_event(&db, "ados-2025").await;
        create_test_question(&db, event.id, 2, "Third", false).await;
        create_test_question(&db, event.id, 0, "First", true).await;
        create_test_question(&db, event.id, 1, "Second", false).await;

        let texts: Vec<String> = questions_for(&db, event.id)
            .await
            .unwrap()
            .into_iter()
            .map(|q| q.question_text)
            .collect();
        assert_eq!(texts, vec!["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn test_unknown_slug_is_not_found() {
        let db = create_test_db().await;
        assert!(matches!(
            get_by_slug(&db, "missing").await,
            Err(AppError::NotFound(_))
        ));
    }
}
