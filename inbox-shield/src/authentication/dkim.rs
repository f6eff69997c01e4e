//! DKIM key discovery
//!
//! DKIM keys live at `<selector>._domainkey.<domain>` and the selector is only
//! known to whoever signs the mail, so the checker probes a list of selectors
//! commonly used by mail providers (plus one the caller may supply) and reports
//! which of them publish a key.

use super::types::{CheckMode, CheckStatus, DkimResult, ProviderGuidance};
use crate::utils::DnsResolver;
use futures::future::join_all;
use tracing::{debug, info};

/// DKIM setup hints for the providers whose selectors are probed
pub fn provider_guidance() -> Vec<ProviderGuidance> {
    vec![
        ProviderGuidance {
            provider: "Google Workspace".to_string(),
            common_selectors: vec!["google".to_string(), "gmail".to_string()],
            setup_instructions: "Admin Console > Apps > Gmail > Authenticate Email".to_string(),
            documentation_url: Some("https://support.google.com/a/answer/174124".to_string()),
        },
        ProviderGuidance {
            provider: "Microsoft 365".to_string(),
            common_selectors: vec!["selector1".to_string(), "selector2".to_string()],
            setup_instructions: "Microsoft 365 Admin Center > Exchange > Mail Flow > Rules"
                .to_string(),
            documentation_url: None,
        },
        ProviderGuidance {
            provider: "SendGrid".to_string(),
            common_selectors: vec!["s1".to_string(), "s2".to_string()],
            setup_instructions: "SendGrid Dashboard > Settings > Sender Authentication".to_string(),
            documentation_url: None,
        },
    ]
}

/// Whether `selector` is usable as a DNS label prefix
pub fn is_valid_selector(selector: &str) -> bool {
    !selector.is_empty()
        && selector.len() <= 63
        && !selector.starts_with(['.', '-'])
        && !selector.ends_with(['.', '-'])
        && !selector.contains("..")
        && selector
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Whether a TXT record looks like a DKIM public key
fn is_key_record(record: &str) -> bool {
    record.contains("k=rsa") || record.contains("p=")
}

/// Probe one selector, treating lookup failures as "no key"
async fn probe_selector(resolver: &dyn DnsResolver, domain: &str, selector: &str) -> bool {
    let name = format!("{}._domainkey.{}", selector, domain);

    match resolver.txt_lookup(&name).await {
        Ok(records) => records.iter().any(|record| is_key_record(record)),
        Err(e) => {
            debug!("DKIM probe of {} failed: {}", name, e);
            false
        }
    }
}

/// Check which DKIM selectors of `domain` publish a key
///
/// `selectors` is the configured probe list; `extra_selector` is appended when
/// it is not already part of it.
pub async fn check_dkim(
    resolver: &dyn DnsResolver,
    domain: &str,
    selectors: &[String],
    extra_selector: Option<&str>,
    mode: CheckMode,
) -> DkimResult {
    info!("Checking DKIM for {}", domain);

    let mut common_selectors: Vec<String> = selectors.to_vec();
    if let Some(extra) = extra_selector.map(str::to_lowercase) {
        if !common_selectors.contains(&extra) {
            common_selectors.push(extra);
        }
    }

    let probes = join_all(
        common_selectors
            .iter()
            .map(|selector| probe_selector(resolver, domain, selector)),
    )
    .await;

    let validated_selectors: Vec<String> = common_selectors
        .iter()
        .zip(probes)
        .filter(|(_, found)| *found)
        .map(|(selector, _)| selector.clone())
        .collect();

    debug!("DKIM selectors with keys for {}: {:?}", domain, validated_selectors);

    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    if validated_selectors.is_empty() {
        issues.push(mode.text(
            "DKIM records not found for common selectors",
            "No DKIM records found for common selectors",
        ));
        recommendations.push("Set up DKIM signing with your email service provider".to_string());
        recommendations
            .push("Check your email provider's documentation for DKIM setup".to_string());
    }

    let status = if validated_selectors.is_empty() {
        CheckStatus::Fail
    } else {
        CheckStatus::Pass
    };

    DkimResult {
        status,
        common_selectors,
        validated_selectors,
        issues,
        recommendations: mode.detail(recommendations).unwrap_or_default(),
        provider_guidance: Some(provider_guidance()),
    }
}
