use crate::analysis::DomainCheckResult;
use crate::provider::{DnsProvider, ProviderInstructions};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "HIGH"),
            Priority::Medium => write!(f, "MEDIUM"),
            Priority::Low => write!(f, "LOW"),
        }
    }
}

/// A DNS record to add or replace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsFix {
    /// Protocol name (SPF, DMARC, ...)
    #[serde(rename = "type")]
    pub fix_type: String,
    /// Record value, or setup advice when the value comes from a mail provider
    pub record: String,
    pub record_type: String,
    /// Host name relative to the domain (`@`, `_dmarc`, ...)
    pub name: String,
    pub priority: Priority,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub impact: String,
    pub time_to_implement: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationStep {
    pub step: u32,
    pub title: String,
    pub description: String,
    pub time_frame: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessImpact {
    pub current_impact_level: Priority,
    pub estimated_deliverability_rate: String,
    pub potential_improvement_rate: String,
    /// Failing SPF, DMARC and DKIM checks
    pub critical_issues_found: usize,
    pub recommended_action_timeframe: String,
}

/// Paid report: the full analysis plus everything needed to fix it
///
/// Serializes as the analysis fields followed by the report fields, so a
/// report is also a valid [`DomainCheckResult`] document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullReport {
    #[serde(flatten)]
    pub analysis: DomainCheckResult,
    #[serde(default)]
    pub report_id: Option<String>,
    #[serde(default)]
    pub dns_fixes: Vec<DnsFix>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_provider: Option<DnsProvider>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_instructions: Option<ProviderInstructions>,
    #[serde(default)]
    pub verification_steps: Vec<VerificationStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_impact: Option<BusinessImpact>,
}
