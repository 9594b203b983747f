pub mod walker;
pub mod questionnaire;

pub use walker::TriageWalker;
pub use questionnaire::{Questionnaire, TriageService};
