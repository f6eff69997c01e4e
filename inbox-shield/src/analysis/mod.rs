//! Domain analysis: all five checks plus the overall score

pub mod checker;
pub mod score;

pub use checker::{CheckOptions, DomainCheckResult, DomainChecker};
pub use score::overall_score;
