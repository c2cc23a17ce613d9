//! Drafts of in-progress questionnaires, so a respondent can leave and resume.
//!
//! A draft is keyed by owner and event, mirrored on every answer change and
//! cleared only after a confirmed submission. Stale drafts expire after a TTL.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AnswerMap, Questionnaire, Step};
use crate::error::Result;
use crate::models::prelude::*;
use crate::models::{answer, question, questionnaire_draft};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DraftKey {
    /// User id, or an anonymous session id
    pub owner: String,
    pub event_id: Uuid,
}

impl DraftKey {
    pub fn new(owner: impl Into<String>, event_id: Uuid) -> Self {
        Self {
            owner: owner.into(),
            event_id,
        }
    }

    pub fn for_user(user_id: Uuid, event_id: Uuid) -> Self {
        Self::new(user_id.to_string(), event_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub answers: AnswerMap,
    pub updated_at: DateTime<Utc>,
}

impl Draft {
    fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        self.updated_at + ttl < now
    }
}

#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Expired drafts are treated as absent.
    async fn load(&self, key: &DraftKey) -> Result<Option<Draft>>;
    async fn save(&self, key: &DraftKey, answers: &AnswerMap) -> Result<()>;
    async fn clear(&self, key: &DraftKey) -> Result<()>;
}

pub type SharedDraftStore = Arc<dyn DraftStore>;

/// Process-local store, used in tests and single-instance setups
pub struct MemoryDraftStore {
    ttl: Duration,
    drafts: Mutex<HashMap<DraftKey, Draft>>,
}

impl MemoryDraftStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            drafts: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.drafts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DraftStore for MemoryDraftStore {
    async fn load(&self, key: &DraftKey) -> Result<Option<Draft>> {
        let mut drafts = self.drafts.lock();
        let expired = drafts
            .get(key)
            .is_some_and(|d| d.is_expired(self.ttl, Utc::now()));
        if expired {
            drafts.remove(key);
            return Ok(None);
        }
        Ok(drafts.get(key).cloned())
    }

    async fn save(&self, key: &DraftKey, answers: &AnswerMap) -> Result<()> {
        self.drafts.lock().insert(
            key.clone(),
            Draft {
                answers: answers.clone(),
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn clear(&self, key: &DraftKey) -> Result<()> {
        self.drafts.lock().remove(key);
        Ok(())
    }
}

/// Drafts kept in the `questionnaire_drafts` table
#[derive(Clone)]
pub struct DbDraftStore {
    db: DatabaseConnection,
    ttl: Duration,
}

impl DbDraftStore {
    pub fn new(db: DatabaseConnection, ttl: Duration) -> Self {
        Self { db, ttl }
    }
}

#[async_trait]
impl DraftStore for DbDraftStore {
    async fn load(&self, key: &DraftKey) -> Result<Option<Draft>> {
        let Some(row) = QuestionnaireDraft::find_by_id((key.owner.clone(), key.event_id))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let draft = Draft {
            answers: serde_json::from_str(&row.answers)?,
            updated_at: row.updated_at,
        };

        if draft.is_expired(self.ttl, Utc::now()) {
            self.clear(key).await?;
            return Ok(None);
        }

        Ok(Some(draft))
    }

    async fn save(&self, key: &DraftKey, answers: &AnswerMap) -> Result<()> {
        let row = questionnaire_draft::ActiveModel {
            owner: Set(key.owner.clone()),
            event_id: Set(key.event_id),
            answers: Set(serde_json::to_string(answers)?),
            updated_at: Set(Utc::now()),
        };

        QuestionnaireDraft::insert(row)
            .on_conflict(
                OnConflict::columns([
                    questionnaire_draft::Column::Owner,
                    questionnaire_draft::Column::EventId,
                ])
                .update_columns([
                    questionnaire_draft::Column::Answers,
                    questionnaire_draft::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(())
    }

    async fn clear(&self, key: &DraftKey) -> Result<()> {
        QuestionnaireDraft::delete_by_id((key.owner.clone(), key.event_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}

/// Answer map from a stored submission, used to pre-fill an update
pub fn seed_from_answers(answers: &[answer::Model]) -> AnswerMap {
    answers
        .iter()
        .map(|a| (a.question_id, a.answer_text.clone()))
        .collect()
}

impl Questionnaire {
    /// Rebuild the engine for a respondent.
    ///
    /// When updating an existing submission the engine starts on review,
    /// either from the draft or from the stored answers, which then become
    /// the draft. An update with nothing stored starts at the first question.
    pub async fn resume(
        store: &dyn DraftStore,
        key: &DraftKey,
        questions: Vec<question::Model>,
        invite_active: bool,
        existing_answers: Option<&[answer::Model]>,
    ) -> Result<Self> {
        let updating = existing_answers.is_some();
        let draft = store.load(key).await?;

        let engine = Questionnaire::new(questions, invite_active);
        let engine = match (draft, existing_answers) {
            (Some(draft), _) => {
                let mut engine = engine.with_answers(draft.answers);
                if updating {
                    engine.step = Step::Review;
                }
                engine
            }
            (None, Some(stored)) if !stored.is_empty() => {
                let seeded = seed_from_answers(stored);
                store.save(key, &seeded).await?;
                let mut engine = engine.with_answers(seeded);
                engine.step = Step::Review;
                engine
            }
            (None, _) => engine,
        };

        Ok(engine)
    }

    /// Set an answer and mirror the whole answer map to the store.
    pub async fn record_answer(
        &mut self,
        store: &dyn DraftStore,
        key: &DraftKey,
        question_id: Uuid,
        value: impl Into<String>,
    ) -> Result<bool> {
        if !self.set_answer(question_id, value) {
            return Ok(false);
        }
        store.save(key, self.answers()).await?;
        Ok(true)
    }
}
