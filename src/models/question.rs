use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "questions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub event_id: Uuid,
    pub question_text: String,
    pub question_type: String,
    /// JSON array of option labels, only set for choice questions
    pub options: Option<String>,
    pub is_required: bool,
    pub order_index: i32,
    pub placeholder: Option<String>,
    pub helper_text: Option<String>,
    /// Question whose answer controls whether this one is shown
    pub depends_on_question_id: Option<Uuid>,
    /// JSON-encoded [`VisibilityRule`] applied to the dependency's answer
    pub visible_when: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id"
    )]
    Event,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn kind(&self) -> QuestionType {
        QuestionType::parse(&self.question_type)
    }

    pub fn option_list(&self) -> Vec<String> {
        self.options
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }

    /// Parsed visibility rule; an unparseable rule is treated as absent.
    pub fn visibility_rule(&self) -> Option<VisibilityRule> {
        let raw = self.visible_when.as_deref()?;
        match serde_json::from_str(raw) {
            Ok(rule) => Some(rule),
            Err(e) => {
                tracing::warn!("Ignoring malformed visible_when on question {}: {}", self.id, e);
                None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionType {
    /// Single-line text
    #[serde(rename = "text")]
    ShortText,
    #[serde(rename = "textarea")]
    LongText,
    #[serde(rename = "multiple_choice")]
    SingleChoice,
    #[serde(rename = "multiple_select")]
    MultiChoice,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::ShortText => "text",
            QuestionType::LongText => "textarea",
            QuestionType::SingleChoice => "multiple_choice",
            QuestionType::MultiChoice => "multiple_select",
        }
    }

    /// Unknown types render as short text.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "textarea" => QuestionType::LongText,
            "multiple_choice" => QuestionType::SingleChoice,
            "multiple_select" => QuestionType::MultiChoice,
            _ => QuestionType::ShortText,
        }
    }

    pub fn has_options(&self) -> bool {
        matches!(self, QuestionType::SingleChoice | QuestionType::MultiChoice)
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Predicate over the answer of the question a conditional question depends on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityRule {
    Equals(String),
    NotEquals(String),
    Answered,
}

impl VisibilityRule {
    pub fn matches(&self, answer: &str) -> bool {
        match self {
            VisibilityRule::Equals(expected) => answer == expected,
            VisibilityRule::NotEquals(expected) => answer != expected,
            VisibilityRule::Answered => !answer.trim().is_empty(),
        }
    }

    pub fn to_json(&self) -> String {
        // Serializing a plain enum of strings cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }
}
