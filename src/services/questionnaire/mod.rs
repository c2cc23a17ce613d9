//! Questionnaire engine
//!
//! Step cursor over the visible questions of an event. Visibility is
//! recomputed on every answer change, so the cursor is re-clamped whenever the
//! visible set shrinks underneath it.

mod choices;
mod draft;
mod visibility;

pub use choices::{
    decode_choices, encode_choices, toggle_choice, unencodable_options, ChoiceError,
    CHOICE_DELIMITER,
};
pub use draft::{
    seed_from_answers, DbDraftStore, Draft, DraftKey, DraftStore, MemoryDraftStore,
    SharedDraftStore,
};
pub use visibility::{compute_visible_questions, AnswerMap};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::question;

/// Where the respondent currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum Step {
    /// Index into the visible questions
    Question(usize),
    Review,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// One line of the final submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionEntry {
    pub question_id: Uuid,
    pub answer_text: String,
}

/// A required question fails when its trimmed answer is empty.
pub fn validate_step(question: &question::Model, value: &str) -> Result<()> {
    if question.is_required && value.trim().is_empty() {
        return Err(AppError::RequiredFieldMissing {
            question_id: question.id,
        });
    }
    Ok(())
}

/// Every visible question in order, with `""` for anything unanswered.
/// Answers to hidden questions are dropped.
pub fn assemble_submission(
    visible: &[&question::Model],
    answers: &AnswerMap,
) -> Vec<SubmissionEntry> {
    visible
        .iter()
        .map(|q| SubmissionEntry {
            question_id: q.id,
            answer_text: answers.get(&q.id).cloned().unwrap_or_default(),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct Questionnaire {
    questions: Vec<question::Model>,
    answers: AnswerMap,
    invite_active: bool,
    step: Step,
    errors: HashMap<Uuid, String>,
}

impl Questionnaire {
    pub fn new(mut questions: Vec<question::Model>, invite_active: bool) -> Self {
        questions.sort_by_key(|q| q.order_index);

        for q in questions.iter().filter(|q| q.kind().has_options()) {
            let bad = unencodable_options(q);
            if !bad.is_empty() {
                tracing::warn!(
                    "Question {} has options containing '{}': {:?}",
                    q.id,
                    CHOICE_DELIMITER,
                    bad
                );
            }
        }

        let mut engine = Self {
            questions,
            answers: AnswerMap::new(),
            invite_active,
            step: Step::Question(0),
            errors: HashMap::new(),
        };
        engine.reconcile_step();
        engine
    }

    /// Seed answers, e.g. from a draft. Ids of unknown questions are dropped.
    pub fn with_answers(mut self, answers: AnswerMap) -> Self {
        self.answers = answers
            .into_iter()
            .filter(|(id, _)| self.questions.iter().any(|q| q.id == *id))
            .collect();
        self.reconcile_step();
        self
    }

    pub fn questions(&self) -> &[question::Model] {
        &self.questions
    }

    pub fn visible_questions(&self) -> Vec<&question::Model> {
        compute_visible_questions(&self.questions, &self.answers, self.invite_active)
    }

    pub fn invite_active(&self) -> bool {
        self.invite_active
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn current_question(&self) -> Option<&question::Model> {
        match self.step {
            Step::Question(index) => self.visible_questions().get(index).copied(),
            Step::Review => None,
        }
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn answer(&self, question_id: Uuid) -> &str {
        self.answers
            .get(&question_id)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn error_for(&self, question_id: Uuid) -> Option<&str> {
        self.errors.get(&question_id).map(String::as_str)
    }

    pub fn errors(&self) -> &HashMap<Uuid, String> {
        &self.errors
    }

    /// Record an answer. Returns false for an unknown question.
    pub fn set_answer(&mut self, question_id: Uuid, value: impl Into<String>) -> bool {
        if !self.questions.iter().any(|q| q.id == question_id) {
            return false;
        }
        self.answers.insert(question_id, value.into());
        self.errors.remove(&question_id);
        self.reconcile_step();
        true
    }

    pub fn toggle_choice(
        &mut self,
        question_id: Uuid,
        option: &str,
        checked: bool,
    ) -> std::result::Result<(), ChoiceError> {
        let updated = toggle_choice(self.answer(question_id), option, checked)?;
        self.set_answer(question_id, updated);
        Ok(())
    }

    /// Move the cursor.
    ///
    /// Forward validates the current question first; past the last visible
    /// question it lands on review. Backward never fails.
    pub fn advance(&mut self, direction: Direction) -> Result<Step> {
        let visible_len = self.visible_questions().len();

        self.step = match (direction, self.step) {
            (Direction::Forward, Step::Review) => Step::Review,
            (Direction::Forward, Step::Question(index)) => {
                if let Some(question) = self.current_question().cloned() {
                    if let Err(e) = validate_step(&question, self.answer(question.id)) {
                        self.errors
                            .insert(question.id, "This question is required".to_string());
                        return Err(e);
                    }
                }
                if index + 1 >= visible_len {
                    Step::Review
                } else {
                    Step::Question(index + 1)
                }
            }
            (Direction::Backward, Step::Question(index)) => Step::Question(index.saturating_sub(1)),
            (Direction::Backward, Step::Review) => match visible_len {
                0 => Step::Review,
                len => Step::Question(len - 1),
            },
        };

        Ok(self.step)
    }

    /// Jump to a visible question, typically from review.
    pub fn edit(&mut self, index: usize) -> Option<Step> {
        if index >= self.visible_questions().len() {
            return None;
        }
        self.step = Step::Question(index);
        Some(self.step)
    }

    pub fn enter_review(&mut self) {
        self.step = Step::Review;
    }

    /// Check every visible required question, stopping at the first failure.
    pub fn validate_all(&mut self) -> Result<()> {
        let failure = self
            .visible_questions()
            .into_iter()
            .find_map(|q| validate_step(q, self.answer(q.id)).err());

        if let Some(AppError::RequiredFieldMissing { question_id }) = &failure {
            self.errors
                .insert(*question_id, "This question is required".to_string());
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn assemble_submission(&self) -> Vec<SubmissionEntry> {
        assemble_submission(&self.visible_questions(), &self.answers)
    }

    /// 1-based position and visible total, for progress display
    pub fn progress(&self) -> (usize, usize) {
        let total = self.visible_questions().len();
        match self.step {
            Step::Question(index) => (index + 1, total),
            Step::Review => (total, total),
        }
    }

    fn reconcile_step(&mut self) {
        if let Step::Question(index) = self.step {
            let len = self.visible_questions().len();
            if len == 0 {
                self.step = Step::Review;
            } else if index >= len {
                self.step = Step::Question(len - 1);
            }
        }
    }
}
