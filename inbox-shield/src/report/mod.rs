//! Full report: DNS fixes, provider instructions and business impact

pub mod builder;
pub mod text;
pub mod types;

pub use builder::generate_report;
pub use text::render_text_report;
pub use types::{
    BusinessImpact, DnsFix, FullReport, Priority, Recommendation, VerificationStep,
};
