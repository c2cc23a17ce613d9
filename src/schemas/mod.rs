pub mod attendance;
pub mod event;
pub mod invite;
pub mod questionnaire;

pub use attendance::*;
pub use event::*;
pub use invite::*;
pub use questionnaire::*;
