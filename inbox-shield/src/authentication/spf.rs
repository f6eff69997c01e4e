//! SPF (Sender Policy Framework) record analysis
//!
//! Parses the `v=spf1` TXT record of a domain according to RFC 7208 and
//! reports on the three problems that matter for deliverability: a missing
//! record, more than ten DNS-querying terms, and a weak or missing `all`
//! policy.
//!
//! # Example
//! ```
//! use inbox_shield::authentication::spf::parse_spf_record;
//!
//! let parsed = parse_spf_record("v=spf1 include:_spf.google.com ~all");
//! assert_eq!(parsed.lookup_count, 1);
//! assert!(parsed.has_soft_fail);
//! ```

use super::find_records;
use super::types::{CheckMode, CheckStatus, SpfResult};
use crate::utils::DnsResolver;
use tracing::{debug, info, warn};

/// RFC 7208 limit on DNS-querying terms
pub const MAX_DNS_LOOKUPS: usize = 10;

/// Includes for the most common senders, in suggestion order
const COMMON_PROVIDER_INCLUDES: &[&str] = &[
    "include:_spf.google.com",
    "include:spf.protection.outlook.com",
    "include:sendgrid.net",
    "include:mailgun.org",
    "include:servers.mcsv.net",
    "include:spf.constantcontact.com",
    "include:_spf.hubspot.com",
    "include:spf.createsend.com",
    "include:spf.messagelabs.com",
    "include:amazonses.com",
];

/// Parsed SPF record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpfRecord {
    /// Every whitespace-separated term, version tag included
    pub mechanisms: Vec<String>,
    /// Terms that cost a DNS query when evaluated
    pub lookup_count: usize,
    /// Record ends in `-all`
    pub has_hard_fail: bool,
    /// Record ends in `~all`
    pub has_soft_fail: bool,
}

/// Strip a leading `+`, `-`, `~` or `?` qualifier
fn strip_qualifier(term: &str) -> &str {
    term.strip_prefix(['+', '-', '~', '?']).unwrap_or(term)
}

fn is_all_term(term: &str) -> bool {
    strip_qualifier(term).eq_ignore_ascii_case("all")
}

fn is_redirect(term: &str) -> bool {
    term.to_ascii_lowercase().starts_with("redirect=")
}

/// Whether evaluating `term` triggers a DNS query
fn counts_lookup(term: &str) -> bool {
    if is_redirect(term) {
        return true;
    }

    let mechanism = strip_qualifier(term).to_ascii_lowercase();
    let name = mechanism.split([':', '/']).next().unwrap_or_default();
    matches!(name, "include" | "a" | "mx" | "ptr" | "exists")
}

/// Parse an SPF record into its terms
pub fn parse_spf_record(record: &str) -> SpfRecord {
    let mechanisms: Vec<String> = record.split_whitespace().map(str::to_string).collect();

    let lookup_count = mechanisms.iter().filter(|m| counts_lookup(m)).count();
    let has_hard_fail = mechanisms.iter().any(|m| m.eq_ignore_ascii_case("-all"));
    let has_soft_fail = mechanisms.iter().any(|m| m.eq_ignore_ascii_case("~all"));

    SpfRecord {
        mechanisms,
        lookup_count,
        has_hard_fail,
        has_soft_fail,
    }
}

/// Suggest an SPF record, improving `current` when the domain has one
///
/// Without a record this proposes the three most common senders with `~all`.
/// An existing record gets `~all` hardened to `-all`, a missing policy added,
/// and includes for Google, Microsoft 365 and SendGrid inserted before the
/// policy term while the lookup budget allows. The result is quoted, ready to
/// paste into a DNS zone.
pub fn generate_spf_fix(current: Option<&str>) -> String {
    let Some(current) = current else {
        return format!("\"v=spf1 {} ~all\"", COMMON_PROVIDER_INCLUDES[..3].join(" "));
    };

    let parsed = parse_spf_record(current);
    let mut terms = parsed.mechanisms.clone();

    if parsed.has_soft_fail && !parsed.has_hard_fail {
        for term in terms.iter_mut().filter(|t| t.eq_ignore_ascii_case("~all")) {
            *term = "-all".to_string();
        }
    }

    if !parsed.has_hard_fail && !parsed.has_soft_fail {
        terms.push("-all".to_string());
    }

    let lowered = terms.join(" ").to_lowercase();
    let mut missing = Vec::new();
    if !lowered.contains("_spf.google.com") && !lowered.contains("gmail") {
        missing.push(COMMON_PROVIDER_INCLUDES[0]);
    }
    if !lowered.contains("spf.protection.outlook.com") && !lowered.contains("office365") {
        missing.push(COMMON_PROVIDER_INCLUDES[1]);
    }
    if !lowered.contains("sendgrid") && !lowered.contains("sg.") {
        missing.push(COMMON_PROVIDER_INCLUDES[2]);
    }

    if !missing.is_empty() && parsed.lookup_count < MAX_DNS_LOOKUPS - 2 {
        missing.truncate(MAX_DNS_LOOKUPS - parsed.lookup_count);

        let position = terms
            .iter()
            .position(|t| is_all_term(t))
            .or_else(|| terms.iter().position(|t| is_redirect(t)))
            .unwrap_or(terms.len());

        terms.splice(position..position, missing.into_iter().map(str::to_string));
    }

    format!("\"{}\"", terms.join(" "))
}

/// Check the SPF record of `domain`
pub async fn check_spf(resolver: &dyn DnsResolver, domain: &str, mode: CheckMode) -> SpfResult {
    info!("Checking SPF for {}", domain);

    let records = match find_records(resolver, domain, "v=spf1").await {
        Ok(records) => records,
        Err(e) => {
            warn!("SPF lookup failed for {}: {}", domain, e);
            return SpfResult {
                status: CheckStatus::Fail,
                record: None,
                issues: vec![mode.text(
                    "SPF lookup failed",
                    &format!("Could not look up SPF record: {}", e),
                )],
                recommendations: mode
                    .detail(vec!["Verify that the domain's nameservers are reachable".to_string()])
                    .unwrap_or_default(),
                dns_lookup_count: None,
                mechanisms: None,
                suggested_record: None,
            };
        }
    };

    let Some(record) = records.first().cloned() else {
        debug!("No SPF record found for {}", domain);
        return SpfResult {
            status: CheckStatus::Fail,
            record: None,
            issues: vec![mode.text("SPF record not found", "No SPF record found for domain")],
            recommendations: mode
                .detail(vec![
                    "Add an SPF record to authorize email senders".to_string(),
                    "Include your email service provider in the SPF record".to_string(),
                ])
                .unwrap_or_default(),
            dns_lookup_count: None,
            mechanisms: None,
            suggested_record: mode.detail(generate_spf_fix(None)),
        };
    };

    let parsed = parse_spf_record(&record);
    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    if records.len() > 1 {
        issues.push(mode.text(
            "Multiple SPF records found",
            "Multiple SPF records found (only one is allowed)",
        ));
        recommendations.push("Merge all SPF records into a single TXT record".to_string());
    }

    if parsed.lookup_count > MAX_DNS_LOOKUPS {
        issues.push(mode.text(
            "DNS lookup limit exceeded",
            "SPF record exceeds 10 DNS lookup limit",
        ));
        recommendations.push("Flatten SPF record by replacing includes with IP addresses".to_string());
    }

    if parsed.has_soft_fail && !parsed.has_hard_fail {
        issues.push(mode.text(
            "Weak SPF policy detected",
            "SPF uses soft fail (~all) instead of hard fail (-all)",
        ));
        recommendations.push("Change ~all to -all for stronger protection".to_string());
    }

    if !parsed.has_hard_fail && !parsed.has_soft_fail {
        issues.push(mode.text(
            "No fail policy specified",
            "SPF record missing fail policy (all mechanism)",
        ));
        recommendations.push("Add -all at the end of your SPF record".to_string());
    }

    let status = match issues.len() {
        0 => CheckStatus::Pass,
        1 | 2 => CheckStatus::Warn,
        _ => CheckStatus::Fail,
    };

    debug!("SPF for {}: {} ({} issue(s))", domain, status, issues.len());

    SpfResult {
        status,
        issues,
        recommendations: mode.detail(recommendations).unwrap_or_default(),
        dns_lookup_count: mode.detail(parsed.lookup_count),
        mechanisms: mode.detail(parsed.mechanisms),
        suggested_record: mode.detail(generate_spf_fix(Some(&record))),
        record: mode.detail(record),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticResolver;

    #[test]
    fn test_parse_counts_lookups() {
        let parsed = parse_spf_record(
            "v=spf1 a mx a:mail.example.com mx/24 include:_spf.google.com exists:%{i}.x.example ptr ip4:192.0.2.0/24 ~all",
        );
        assert_eq!(parsed.lookup_count, 7);
        assert!(parsed.has_soft_fail);
        assert!(!parsed.has_hard_fail);
        assert_eq!(parsed.mechanisms[0], "v=spf1");
        assert_eq!(parsed.mechanisms.len(), 10);
    }

    #[test]
    fn test_parse_qualified_and_redirect() {
        let parsed = parse_spf_record("v=spf1 +a ?include:example.net redirect=_spf.example.com");
        assert_eq!(parsed.lookup_count, 3);
        assert!(!parsed.has_hard_fail);
        assert!(!parsed.has_soft_fail);
    }

    #[test]
    fn test_parse_ignores_non_lookup_terms() {
        let parsed = parse_spf_record("v=spf1 ip4:192.0.2.1 ip6:2001:db8::/32 all -all");
        assert_eq!(parsed.lookup_count, 0);
        assert!(parsed.has_hard_fail);
    }

    #[test]
    fn test_generate_default_fix() {
        assert_eq!(
            generate_spf_fix(None),
            "\"v=spf1 include:_spf.google.com include:spf.protection.outlook.com include:sendgrid.net ~all\""
        );
    }

    #[test]
    fn test_generate_fix_hardens_soft_fail() {
        let fix = generate_spf_fix(Some(
            "v=spf1 include:_spf.google.com include:spf.protection.outlook.com include:sendgrid.net ~all",
        ));
        assert_eq!(
            fix,
            "\"v=spf1 include:_spf.google.com include:spf.protection.outlook.com include:sendgrid.net -all\""
        );
    }

    #[test]
    fn test_generate_fix_inserts_providers_before_policy() {
        let fix = generate_spf_fix(Some("v=spf1 ip4:192.0.2.1"));
        assert_eq!(
            fix,
            "\"v=spf1 ip4:192.0.2.1 include:_spf.google.com include:spf.protection.outlook.com include:sendgrid.net -all\""
        );
    }

    #[test]
    fn test_generate_fix_respects_lookup_budget() {
        let record = "v=spf1 a mx include:a.example include:b.example include:c.example include:d.example include:e.example include:f.example -all";
        assert_eq!(generate_spf_fix(Some(record)), format!("\"{}\"", record));
    }

    #[tokio::test]
    async fn test_check_hard_fail_record_passes() {
        let resolver = StaticResolver::new()
            .with_txt("example.com", &["google-site-verification=abc", "v=spf1 include:_spf.google.com -all"]);

        let result = check_spf(&resolver, "example.com", CheckMode::Full).await;
        assert_eq!(result.status, CheckStatus::Pass);
        assert!(result.issues.is_empty());
        assert_eq!(result.record.as_deref(), Some("v=spf1 include:_spf.google.com -all"));
        assert_eq!(result.dns_lookup_count, Some(1));
    }

    #[tokio::test]
    async fn test_check_missing_record_fails() {
        let resolver = StaticResolver::new();

        let result = check_spf(&resolver, "example.com", CheckMode::Full).await;
        assert_eq!(result.status, CheckStatus::Fail);
        assert_eq!(result.issues, vec!["No SPF record found for domain"]);
        assert_eq!(result.recommendations.len(), 2);
        assert_eq!(result.suggested_record, Some(generate_spf_fix(None)));
    }

    #[tokio::test]
    async fn test_check_soft_fail_warns() {
        let resolver = StaticResolver::new().with_txt("example.com", &["v=spf1 mx ~all"]);

        let result = check_spf(&resolver, "example.com", CheckMode::Full).await;
        assert_eq!(result.status, CheckStatus::Warn);
        assert_eq!(
            result.issues,
            vec!["SPF uses soft fail (~all) instead of hard fail (-all)"]
        );
        assert_eq!(result.recommendations, vec!["Change ~all to -all for stronger protection"]);
    }

    #[tokio::test]
    async fn test_check_three_issues_fails() {
        let resolver = StaticResolver::new().with_txt(
            "example.com",
            &[
                "v=spf1 a mx ptr include:a.example include:b.example include:c.example include:d.example include:e.example include:f.example include:g.example include:h.example",
                "v=spf1 -all",
            ],
        );

        let result = check_spf(&resolver, "example.com", CheckMode::Full).await;
        assert_eq!(result.status, CheckStatus::Fail);
        assert_eq!(result.issues.len(), 3);
        assert_eq!(result.dns_lookup_count, Some(11));
    }

    #[tokio::test]
    async fn test_check_preview_redacts() {
        let resolver = StaticResolver::new().with_txt("example.com", &["v=spf1 mx ~all"]);

        let result = check_spf(&resolver, "example.com", CheckMode::Preview).await;
        assert_eq!(result.status, CheckStatus::Warn);
        assert_eq!(result.issues, vec!["Weak SPF policy detected"]);
        assert!(result.recommendations.is_empty());
        assert!(result.record.is_none());
        assert!(result.mechanisms.is_none());
        assert!(result.suggested_record.is_none());
    }

    #[tokio::test]
    async fn test_check_lookup_failure_degrades() {
        let resolver = StaticResolver::new().with_failure("example.com");

        let result = check_spf(&resolver, "example.com", CheckMode::Full).await;
        assert_eq!(result.status, CheckStatus::Fail);
        assert!(result.issues[0].starts_with("Could not look up SPF record"));
    }
}
