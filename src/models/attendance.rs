use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attendance")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub status: String,
    pub applied_at: DateTimeUtc,
    pub reviewed_at: Option<DateTimeUtc>,
    pub reviewed_by: Option<Uuid>,
    pub notes: Option<String>,
    pub invite_code: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id"
    )]
    Event,
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::UserId",
        to = "super::profile::Column::Id"
    )]
    Profile,
    #[sea_orm(has_many = "super::answer::Entity")]
    Answers,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl Related<super::answer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Answers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn status(&self) -> AttendanceStatus {
        AttendanceStatus::parse(&self.status).unwrap_or(AttendanceStatus::Pending)
    }
}

/// Review state of one user's application to one event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Pending,
    Approved,
    Rejected,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Pending => "pending",
            AttendanceStatus::Approved => "approved",
            AttendanceStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(AttendanceStatus::Pending),
            "approved" => Some(AttendanceStatus::Approved),
            "rejected" => Some(AttendanceStatus::Rejected),
            _ => None,
        }
    }

    /// Administrator transitions. Decisions are made from `pending`, and either
    /// decision can be reset back to `pending`.
    pub fn can_transition_to(&self, to: AttendanceStatus) -> bool {
        matches!(
            (self, to),
            (AttendanceStatus::Pending, AttendanceStatus::Approved)
                | (AttendanceStatus::Pending, AttendanceStatus::Rejected)
                | (AttendanceStatus::Approved, AttendanceStatus::Pending)
                | (AttendanceStatus::Rejected, AttendanceStatus::Pending)
        )
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decisions_only_from_pending() {
        use AttendanceStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Approved));
    }

    #[test]
    fn test_reset_to_pending_from_either_decision() {
        use AttendanceStatus::*;
        assert!(Approved.can_transition_to(Pending));
        assert!(Rejected.can_transition_to(Pending));
    }

    #[test]
    fn test_parse_round_trips_known_values() {
        for status in [
            AttendanceStatus::Pending,
            AttendanceStatus::Approved,
            AttendanceStatus::Rejected,
        ] {
            assert_eq!(AttendanceStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(AttendanceStatus::parse("APPROVED"), Some(AttendanceStatus::Approved));
        assert_eq!(AttendanceStatus::parse("waitlisted"), None);
    }
}
