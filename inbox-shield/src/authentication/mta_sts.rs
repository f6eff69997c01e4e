//! MTA-STS (SMTP MTA Strict Transport Security)
//!
//! A domain opts in with a `_mta-sts` TXT record and publishes the actual
//! policy over HTTPS at `mta-sts.<domain>/.well-known/mta-sts.txt`.

use super::find_records;
use super::types::{CheckMode, CheckStatus, MtaStsResult};
use crate::utils::{DnsResolver, HttpFetcher};
use chrono::Utc;
use tracing::{debug, info, warn};

/// Max age suggested for new policies (one week)
const SUGGESTED_MAX_AGE: u64 = 604_800;

/// MTA-STS policy mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StsMode {
    Enforce,
    Testing,
    None,
}

impl StsMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "enforce" => Some(StsMode::Enforce),
            "testing" => Some(StsMode::Testing),
            "none" => Some(StsMode::None),
            _ => None,
        }
    }
}

/// Parsed `mta-sts.txt` policy file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StsPolicy {
    pub version: Option<String>,
    pub mode: Option<StsMode>,
    pub mx: Vec<String>,
    pub max_age: Option<u64>,
}

/// Parse the `key: value` lines of a policy file
pub fn parse_sts_policy(content: &str) -> StsPolicy {
    let mut policy = StsPolicy::default();

    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        match key.trim().to_lowercase().as_str() {
            "version" => policy.version = Some(value.to_string()),
            "mode" => policy.mode = StsMode::parse(value),
            "mx" => policy.mx.push(value.to_string()),
            "max_age" => policy.max_age = value.parse().ok(),
            _ => {}
        }
    }

    policy
}

/// Suggested `_mta-sts` TXT record, id derived from today's date
pub fn generate_sts_record() -> String {
    format!("\"v=STSv1; id={}\"", Utc::now().format("%Y%m%d"))
}

/// Suggested enforcing policy file for `domain`
pub fn generate_sts_policy(domain: &str) -> String {
    format!(
        "version: STSv1\nmode: enforce\nmx: *.{}\nmax_age: {}\n",
        domain, SUGGESTED_MAX_AGE
    )
}

/// Check the MTA-STS record and, in full mode, the policy file of `domain`
pub async fn check_mta_sts(
    resolver: &dyn DnsResolver,
    fetcher: &dyn HttpFetcher,
    domain: &str,
    mode: CheckMode,
) -> MtaStsResult {
    info!("Checking MTA-STS for {}", domain);

    let sts_domain = format!("_mta-sts.{}", domain);
    let records = match find_records(resolver, &sts_domain, "v=sts1").await {
        Ok(records) => records,
        Err(e) => {
            warn!("MTA-STS lookup failed for {}: {}", domain, e);
            return MtaStsResult {
                status: CheckStatus::Warn,
                record: None,
                policy_content: None,
                issues: vec![mode.text(
                    "MTA-STS lookup failed",
                    &format!("Could not look up MTA-STS record: {}", e),
                )],
                recommendations: Vec::new(),
                suggested_record: None,
                suggested_policy: None,
            };
        }
    };

    let Some(record) = records.into_iter().next() else {
        debug!("No MTA-STS record found at {}", sts_domain);
        return MtaStsResult {
            status: CheckStatus::Warn,
            record: None,
            policy_content: None,
            issues: vec![mode.text(
                "MTA-STS record not found",
                "No MTA-STS record found (optional security enhancement)",
            )],
            recommendations: mode
                .detail(vec![
                    "MTA-STS is optional but provides additional email security".to_string(),
                    "Requires hosting a policy file at https://mta-sts.yourdomain.com/.well-known/mta-sts.txt".to_string(),
                ])
                .unwrap_or_default(),
            suggested_record: mode.detail(generate_sts_record()),
            suggested_policy: mode.detail(generate_sts_policy(domain)),
        };
    };

    let mut issues = Vec::new();
    let mut recommendations = Vec::new();
    let mut policy_content = None;

    if !mode.is_preview() {
        let policy_url = format!("https://mta-sts.{}/.well-known/mta-sts.txt", domain);

        match fetcher.fetch(&policy_url).await {
            Err(e) => {
                debug!("MTA-STS policy {} not accessible: {}", policy_url, e);
                issues.push("MTA-STS policy file is not accessible".to_string());
                recommendations
                    .push("Host your MTA-STS policy file at the required location".to_string());
            }
            Ok(content) => {
                let policy = parse_sts_policy(&content);

                if policy.version.as_deref() != Some("STSv1") {
                    issues.push("MTA-STS policy file format is invalid".to_string());
                    recommendations
                        .push("Ensure your policy file follows the correct format".to_string());
                }

                match policy.mode {
                    Some(StsMode::None) => {
                        issues.push("MTA-STS policy mode is none (policy disabled)".to_string());
                        recommendations.push("Set mode: enforce in your policy file".to_string());
                    }
                    Some(StsMode::Testing) => {
                        issues.push(
                            "MTA-STS policy is in testing mode (not enforced)".to_string(),
                        );
                        recommendations.push(
                            "Switch to mode: enforce once TLS reports look clean".to_string(),
                        );
                    }
                    _ => {}
                }

                debug!(
                    "MTA-STS policy for {}: mode={:?} mx={:?} max_age={:?}",
                    domain, policy.mode, policy.mx, policy.max_age
                );
                policy_content = Some(content);
            }
        }
    }

    let status = if issues.is_empty() {
        CheckStatus::Pass
    } else {
        CheckStatus::Warn
    };

    MtaStsResult {
        status,
        record: mode.detail(record),
        policy_content,
        issues,
        recommendations: mode.detail(recommendations).unwrap_or_default(),
        suggested_record: None,
        suggested_policy: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StaticFetcher, StaticResolver};

    const POLICY_URL: &str = "https://mta-sts.example.com/.well-known/mta-sts.txt";

    fn resolver_with_record() -> StaticResolver {
        StaticResolver::new().with_txt("_mta-sts.example.com", &["v=STSv1; id=20240101"])
    }

    #[test]
    fn test_parse_sts_policy() {
        let policy = parse_sts_policy(
            "version: STSv1\r\nmode: enforce\r\nmx: mx1.example.com\r\nmx: *.example.net\r\nmax_age: 86400\r\n",
        );
        assert_eq!(policy.version.as_deref(), Some("STSv1"));
        assert_eq!(policy.mode, Some(StsMode::Enforce));
        assert_eq!(policy.mx, vec!["mx1.example.com", "*.example.net"]);
        assert_eq!(policy.max_age, Some(86400));
    }

    #[test]
    fn test_generate_sts_policy() {
        let policy = parse_sts_policy(&generate_sts_policy("example.com"));
        assert_eq!(policy.mode, Some(StsMode::Enforce));
        assert_eq!(policy.mx, vec!["*.example.com"]);
        assert_eq!(policy.max_age, Some(SUGGESTED_MAX_AGE));

        let record = generate_sts_record();
        assert!(record.starts_with("\"v=STSv1; id="));
        assert_eq!(record.len(), "\"v=STSv1; id=\"".len() + 8);
    }

    #[tokio::test]
    async fn test_check_missing_record_warns() {
        let resolver = StaticResolver::new();
        let fetcher = StaticFetcher::new();

        let result = check_mta_sts(&resolver, &fetcher, "example.com", CheckMode::Full).await;
        assert_eq!(result.status, CheckStatus::Warn);
        assert_eq!(
            result.issues,
            vec!["No MTA-STS record found (optional security enhancement)"]
        );
        assert_eq!(result.recommendations.len(), 2);
        assert!(result.suggested_record.is_some());
        assert!(result.suggested_policy.is_some());

        let result = check_mta_sts(&resolver, &fetcher, "example.com", CheckMode::Preview).await;
        assert_eq!(result.issues, vec!["MTA-STS record not found"]);
        assert!(result.recommendations.is_empty());
        assert!(result.suggested_policy.is_none());
    }

    #[tokio::test]
    async fn test_check_enforced_policy_passes() {
        let content = "version: STSv1\nmode: enforce\nmx: mail.example.com\nmax_age: 604800\n";
        let fetcher = StaticFetcher::new().with_page(POLICY_URL, content);

        let result =
            check_mta_sts(&resolver_with_record(), &fetcher, "example.com", CheckMode::Full).await;
        assert_eq!(result.status, CheckStatus::Pass);
        assert_eq!(result.record.as_deref(), Some("v=STSv1; id=20240101"));
        assert_eq!(result.policy_content.as_deref(), Some(content));
    }

    #[tokio::test]
    async fn test_check_unreachable_policy_warns() {
        let fetcher = StaticFetcher::new();

        let result =
            check_mta_sts(&resolver_with_record(), &fetcher, "example.com", CheckMode::Full).await;
        assert_eq!(result.status, CheckStatus::Warn);
        assert_eq!(result.issues, vec!["MTA-STS policy file is not accessible"]);
        assert!(result.policy_content.is_none());
    }

    #[tokio::test]
    async fn test_check_invalid_and_testing_policy() {
        let fetcher = StaticFetcher::new().with_page(POLICY_URL, "mode: testing\nmx: mail.example.com\n");

        let result =
            check_mta_sts(&resolver_with_record(), &fetcher, "example.com", CheckMode::Full).await;
        assert_eq!(result.status, CheckStatus::Warn);
        assert_eq!(
            result.issues,
            vec![
                "MTA-STS policy file format is invalid",
                "MTA-STS policy is in testing mode (not enforced)"
            ]
        );
    }

    #[tokio::test]
    async fn test_check_preview_skips_fetch() {
        let fetcher = StaticFetcher::new();

        let result =
            check_mta_sts(&resolver_with_record(), &fetcher, "example.com", CheckMode::Preview).await;
        assert_eq!(result.status, CheckStatus::Pass);
        assert!(result.record.is_none());
        assert!(result.policy_content.is_none());
    }
}
