pub mod answer;
pub mod attendance;
pub mod event;
pub mod invite;
pub mod profile;
pub mod question;
pub mod questionnaire_draft;

#[allow(unused_imports)]
pub mod prelude {
    pub use super::answer::{self, Entity as Answer};
    pub use super::attendance::{self, Entity as Attendance};
    pub use super::event::{self, Entity as Event};
    pub use super::invite::{self, Entity as Invite};
    pub use super::profile::{self, Entity as Profile};
    pub use super::question::{self, Entity as Question};
    pub use super::questionnaire_draft::{self, Entity as QuestionnaireDraft};
}
