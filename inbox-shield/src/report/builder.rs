//! Full report assembly

use super::types::{
    BusinessImpact, DnsFix, FullReport, Priority, Recommendation, VerificationStep,
};
use crate::analysis::{CheckOptions, DomainCheckResult, DomainChecker};
use crate::authentication::bimi::generate_bimi_fix;
use crate::authentication::dmarc::generate_dmarc_fix;
use crate::authentication::mta_sts::generate_sts_record;
use crate::authentication::spf::generate_spf_fix;
use crate::authentication::CheckStatus;
use crate::error::{CheckError, Result};
use crate::provider::{detect_dns_provider, provider_instructions, DnsProvider};
use crate::utils::{normalize_domain, validate_domain_format};
use chrono::Utc;
use tracing::info;

const DKIM_FIX_ADVICE: &str = "Setup required through your email provider";

/// `report_<domain>_<millis>` with every character outside `[a-z0-9]` replaced
pub fn report_id(domain: &str, unix_millis: i64) -> String {
    let sanitized: String = domain
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!("report_{}_{}", sanitized, unix_millis)
}

fn fix(
    fix_type: &str,
    record: String,
    name: &str,
    priority: Priority,
    description: &str,
) -> DnsFix {
    DnsFix {
        fix_type: fix_type.to_string(),
        record,
        record_type: "TXT".to_string(),
        name: name.to_string(),
        priority,
        description: description.to_string(),
    }
}

/// One fix per check that did not pass
///
/// The record suggested by the checker is used when there is one.
pub fn dns_fixes(result: &DomainCheckResult) -> Vec<DnsFix> {
    let domain = &result.domain;
    let mut fixes = Vec::new();

    if result.spf.status != CheckStatus::Pass {
        fixes.push(fix(
            "SPF",
            result
                .spf
                .suggested_record
                .clone()
                .unwrap_or_else(|| generate_spf_fix(result.spf.record.as_deref())),
            "@",
            Priority::High,
            "Authorizes mail servers to send emails on behalf of your domain",
        ));
    }

    if result.dmarc.status != CheckStatus::Pass {
        fixes.push(fix(
            "DMARC",
            result
                .dmarc
                .suggested_record
                .clone()
                .unwrap_or_else(|| generate_dmarc_fix(domain, result.dmarc.record.as_deref())),
            "_dmarc",
            Priority::High,
            "Protects against domain spoofing and provides email authentication policy",
        ));
    }

    if result.dkim.status != CheckStatus::Pass {
        fixes.push(fix(
            "DKIM",
            DKIM_FIX_ADVICE.to_string(),
            "default._domainkey",
            Priority::High,
            "Digital signature that proves email authenticity",
        ));
    }

    if result.bimi.status != CheckStatus::Pass {
        fixes.push(fix(
            "BIMI",
            result
                .bimi
                .suggested_record
                .clone()
                .unwrap_or_else(|| generate_bimi_fix(domain)),
            "default._bimi",
            Priority::Medium,
            "Displays your company logo in supported email clients",
        ));
    }

    if result.mta_sts.status != CheckStatus::Pass {
        fixes.push(fix(
            "MTA-STS",
            result
                .mta_sts
                .suggested_record
                .clone()
                .unwrap_or_else(generate_sts_record),
            "_mta-sts",
            Priority::Medium,
            "Enforces secure email transport and prevents downgrade attacks",
        ));
    }

    fixes
}

pub fn recommendations(result: &DomainCheckResult) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    let mut push = |title: &str, description: &str, impact: &str, time: &str| {
        recommendations.push(Recommendation {
            priority: Priority::High,
            title: title.to_string(),
            description: description.to_string(),
            impact: impact.to_string(),
            time_to_implement: time.to_string(),
        })
    };

    if result.spf.status != CheckStatus::Pass {
        push(
            "Implement SPF Record",
            "Add an SPF record to authorize which servers can send emails for your domain",
            "Prevents emails from being marked as spam",
            "5 minutes",
        );
    }

    if result.dmarc.status != CheckStatus::Pass {
        push(
            "Configure DMARC Policy",
            "Set up DMARC to protect against domain spoofing and get visibility into email usage",
            "Protects brand reputation and improves deliverability",
            "10 minutes",
        );
    }

    if result.dkim.status != CheckStatus::Pass {
        push(
            "Enable DKIM Signing",
            "Configure DKIM through your email provider to digitally sign outgoing emails",
            "Proves email authenticity and improves inbox placement",
            "15 minutes",
        );
    }

    recommendations
}

pub fn verification_steps() -> Vec<VerificationStep> {
    [
        (
            "Wait for DNS Propagation",
            "DNS changes can take 24-48 hours to fully propagate worldwide",
            "24-48 hours",
        ),
        (
            "Test Your Records",
            "Use online tools like MXToolbox or dig commands to verify your new DNS records",
            "5 minutes",
        ),
        (
            "Send Test Emails",
            "Send emails to Gmail, Outlook, and Yahoo to test deliverability improvements",
            "10 minutes",
        ),
        (
            "Monitor Results",
            "Check your email analytics for improved delivery rates over the next week",
            "1 week",
        ),
    ]
    .into_iter()
    .zip(1..)
    .map(|((title, description, time_frame), step)| VerificationStep {
        step,
        title: title.to_string(),
        description: description.to_string(),
        time_frame: time_frame.to_string(),
    })
    .collect()
}

/// Deliverability estimate from the number of failing SPF, DMARC and DKIM checks
pub fn business_impact(result: &DomainCheckResult) -> BusinessImpact {
    let critical = [result.spf.status, result.dmarc.status, result.dkim.status]
        .iter()
        .filter(|status| **status == CheckStatus::Fail)
        .count();

    let (level, rate) = match critical {
        0 => (Priority::Low, "85-95%"),
        1 => (Priority::Medium, "60-75%"),
        _ => (Priority::High, "30-50%"),
    };

    BusinessImpact {
        current_impact_level: level,
        estimated_deliverability_rate: rate.to_string(),
        potential_improvement_rate: "95%+".to_string(),
        critical_issues_found: critical,
        recommended_action_timeframe: if critical > 0 {
            "Within 24 hours".to_string()
        } else {
            "At your convenience".to_string()
        },
    }
}

impl FullReport {
    /// Build a report from a full analysis and the detected DNS provider
    pub fn build(analysis: DomainCheckResult, provider: DnsProvider) -> Self {
        let instructions = provider_instructions(&provider.code);

        Self {
            report_id: Some(report_id(&analysis.domain, Utc::now().timestamp_millis())),
            dns_fixes: dns_fixes(&analysis),
            recommendations: recommendations(&analysis),
            dns_provider: Some(provider),
            provider_instructions: Some(instructions),
            verification_steps: verification_steps(),
            business_impact: Some(business_impact(&analysis)),
            analysis,
        }
    }
}

/// Run a full analysis and provider detection for `domain` and build the report
pub async fn generate_report(
    checker: &DomainChecker,
    domain: &str,
    dkim_selector: Option<String>,
) -> Result<FullReport> {
    if !validate_domain_format(domain) {
        return Err(CheckError::InvalidDomain(domain.trim().to_string()));
    }

    let normalized = normalize_domain(domain);
    info!("Generating full report for {}", normalized);

    let options = CheckOptions::full(dkim_selector);
    let (analysis, provider) = tokio::join!(
        checker.check_domain(&normalized, &options),
        detect_dns_provider(checker.resolver(), &normalized),
    );

    Ok(FullReport::build(analysis?, provider))
}
