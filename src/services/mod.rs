pub mod attendance;
pub mod calendar;
pub mod events;
pub mod invites;
pub mod notification;
pub mod profiles;
pub mod questionnaire;
pub mod security;

pub use notification::NotificationService;
pub use questionnaire::{Direction, Questionnaire, Step, SubmissionEntry};
