//! DMARC (Domain-based Message Authentication, Reporting & Conformance)
//!
//! Reads the policy a domain publishes at `_dmarc.<domain>` (RFC 7489) and
//! grades it: no record fails, a monitoring-only `p=none` policy or a partial
//! `pct=` warns, and an enforcing policy passes once reporting is configured.
//!
//! # Example
//! ```
//! use inbox_shield::authentication::dmarc::parse_dmarc_record;
//! use inbox_shield::authentication::DmarcPolicy;
//!
//! let parsed = parse_dmarc_record("v=DMARC1; p=reject; rua=mailto:dmarc@example.com");
//! assert_eq!(parsed.policy, Some(DmarcPolicy::Reject));
//! assert_eq!(parsed.reporting_addresses, vec!["mailto:dmarc@example.com"]);
//! ```

use super::find_records;
use super::types::{CheckMode, CheckStatus, DmarcPolicy, DmarcResult};
use crate::utils::DnsResolver;
use regex::Regex;
use once_cell::sync::Lazy;
use tracing::{debug, info, warn};

/// DMARC record from DNS
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DmarcRecord {
    /// Policy for domain emails (p= tag), `None` when missing or unknown
    pub policy: Option<DmarcPolicy>,
    /// Policy for subdomain emails (sp= tag)
    pub subdomain_policy: Option<DmarcPolicy>,
    /// Aggregate (rua=) and forensic (ruf=) report addresses
    pub reporting_addresses: Vec<String>,
    /// DKIM alignment mode (adkim= tag)
    pub dkim_alignment: Option<String>,
    /// SPF alignment mode (aspf= tag)
    pub spf_alignment: Option<String>,
    /// Percentage of emails the policy applies to (pct= tag)
    pub percentage: Option<u8>,
    /// Failure reporting options (fo= tag)
    pub failure_options: Option<String>,
}

/// Parse semicolon-separated DMARC tags
///
/// Unknown tags and malformed pairs are skipped.
pub fn parse_dmarc_record(record: &str) -> DmarcRecord {
    let mut dmarc = DmarcRecord::default();

    for pair in record.split(';') {
        let Some((key, value)) = pair.trim().split_once('=') else {
            continue;
        };

        let key = key.trim().to_lowercase();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }

        match key.as_str() {
            "p" => dmarc.policy = DmarcPolicy::parse(value),
            "sp" => dmarc.subdomain_policy = DmarcPolicy::parse(value),
            "rua" | "ruf" => dmarc.reporting_addresses.extend(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|address| !address.is_empty())
                    .map(str::to_string),
            ),
            "adkim" => dmarc.dkim_alignment = Some(value.to_string()),
            "aspf" => dmarc.spf_alignment = Some(value.to_string()),
            "pct" => {
                if let Ok(pct) = value.parse::<u8>() {
                    dmarc.percentage = Some(pct.min(100));
                }
            }
            "fo" => dmarc.failure_options = Some(value.to_string()),
            _ => {}
        }
    }

    dmarc
}

static MONITORING_POLICY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bp\s*=\s*none\b").expect("policy pattern is valid"));

/// Suggest a DMARC record for `domain`, upgrading `current` when present
///
/// A monitoring-only record is moved to `p=quarantine`; any other existing
/// record is returned as is.
pub fn generate_dmarc_fix(domain: &str, current: Option<&str>) -> String {
    let Some(current) = current else {
        return format!(
            "\"v=DMARC1; p=quarantine; rua=mailto:dmarc@{d}; ruf=mailto:dmarc@{d}; fo=1\"",
            d = domain
        );
    };

    let fixed = if parse_dmarc_record(current).policy == Some(DmarcPolicy::None) {
        MONITORING_POLICY
            .replace(current, "p=quarantine")
            .into_owned()
    } else {
        current.to_string()
    };

    format!("\"{}\"", fixed)
}

/// Check the DMARC policy of `domain`
pub async fn check_dmarc(resolver: &dyn DnsResolver, domain: &str, mode: CheckMode) -> DmarcResult {
    info!("Checking DMARC for {}", domain);

    let dmarc_domain = format!("_dmarc.{}", domain);
    let records = match find_records(resolver, &dmarc_domain, "v=dmarc1").await {
        Ok(records) => records,
        Err(e) => {
            warn!("DMARC lookup failed for {}: {}", domain, e);
            return DmarcResult {
                status: CheckStatus::Fail,
                record: None,
                policy: None,
                issues: vec![mode.text(
                    "DMARC lookup failed",
                    &format!("Could not look up DMARC record: {}", e),
                )],
                recommendations: mode
                    .detail(vec!["Verify that the domain's nameservers are reachable".to_string()])
                    .unwrap_or_default(),
                suggested_record: None,
            };
        }
    };

    let Some(record) = records.into_iter().next() else {
        debug!("No DMARC record found at {}", dmarc_domain);
        return DmarcResult {
            status: CheckStatus::Fail,
            record: None,
            policy: None,
            issues: vec![mode.text("DMARC record not found", "No DMARC record found for domain")],
            recommendations: mode
                .detail(vec![
                    "Add a DMARC record to protect against email spoofing".to_string(),
                    "Start with p=none for monitoring, then move to p=quarantine or p=reject"
                        .to_string(),
                ])
                .unwrap_or_default(),
            suggested_record: mode.detail(generate_dmarc_fix(domain, None)),
        };
    };

    let parsed = parse_dmarc_record(&record);
    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    match parsed.policy {
        None => {
            issues.push(mode.text(
                "No DMARC policy specified",
                "DMARC record is missing a valid policy (p=) tag",
            ));
            recommendations.push("Add p=quarantine or p=reject to your DMARC record".to_string());
        }
        Some(DmarcPolicy::None) => {
            issues.push(mode.text(
                "DMARC policy set to none",
                "DMARC policy is set to none (monitoring only)",
            ));
            recommendations
                .push("Upgrade to p=quarantine or p=reject for active protection".to_string());
        }
        Some(_) => {
            if let Some(pct) = parsed.percentage.filter(|pct| *pct < 100) {
                issues.push(mode.text(
                    "Partial DMARC enforcement",
                    &format!("DMARC policy only applies to {}% of messages", pct),
                ));
                recommendations.push("Raise pct to 100 once your reports look clean".to_string());
            }
        }
    }

    if parsed.reporting_addresses.is_empty() {
        issues.push(mode.text(
            "No reporting configured",
            "No DMARC reporting addresses configured",
        ));
        recommendations.push("Add rua and ruf tags for DMARC reports".to_string());
    }

    // Monitoring-only or partially enforced policies are weak, not broken
    let status = if issues.is_empty() {
        CheckStatus::Pass
    } else if parsed.policy == Some(DmarcPolicy::None)
        || (parsed.policy.is_some() && !parsed.reporting_addresses.is_empty())
    {
        CheckStatus::Warn
    } else {
        CheckStatus::Fail
    };

    debug!("DMARC for {}: {} ({} issue(s))", domain, status, issues.len());

    DmarcResult {
        status,
        policy: mode.detail(parsed.policy).flatten(),
        issues,
        recommendations: mode.detail(recommendations).unwrap_or_default(),
        suggested_record: mode.detail(generate_dmarc_fix(domain, Some(&record))),
        record: mode.detail(record),
    }
}
