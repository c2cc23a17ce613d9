//! Migration: Declare the travel-location question's dependency on travel support
//!
//! Questionnaires authored before conditional fields existed relied on the
//! wording of two questions. This links every "where will you travel from"
//! question to the "travel support" question of the same event, shown unless
//! the answer is exactly "No".

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

use crate::models::prelude::*;
use crate::models::question::{self, VisibilityRule};

const TRAVEL_LOCATION_PATTERN: &str = "where will you travel from";
const TRAVEL_SUPPORT_PATTERN: &str = "travel support";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        let unlinked = Question::find()
            .filter(question::Column::DependsOnQuestionId.is_null())
            .all(db)
            .await?;

        let rule = VisibilityRule::NotEquals("No".to_string()).to_json();

        for location in unlinked
            .iter()
            .filter(|q| q.question_text.to_lowercase().contains(TRAVEL_LOCATION_PATTERN))
        {
            let support = unlinked.iter().find(|q| {
                q.event_id == location.event_id
                    && q.id != location.id
                    && q.question_text.to_lowercase().contains(TRAVEL_SUPPORT_PATTERN)
            });

            if let Some(support) = support {
                let mut model: question::ActiveModel = location.clone().into();
                model.depends_on_question_id = Set(Some(support.id));
                model.visible_when = Set(Some(rule.clone()));
                model.update(db).await?;
            }
        }

        Ok(())
    }

    async fn down(&self, _manager: &SchemaManager) -> Result<(), DbErr> {
        // Links may have been edited since; leave them in place
        Ok(())
    }
}
