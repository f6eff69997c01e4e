//! BIMI (Brand Indicators for Message Identification)
//!
//! BIMI is optional, so a missing record only warns. When a record exists the
//! logo it points at must be served over HTTPS; full checks fetch it.

use super::find_records;
use super::types::{BimiResult, CheckMode, CheckStatus};
use crate::utils::{DnsResolver, HttpFetcher};
use tracing::{debug, info, warn};

/// Parsed BIMI assertion record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BimiRecord {
    /// SVG logo location (l= tag)
    pub logo_url: Option<String>,
    /// Verified Mark Certificate location (a= tag)
    pub authority_url: Option<String>,
    /// Empty `l=` tag: the domain opts out of BIMI
    pub declined: bool,
}

pub fn parse_bimi_record(record: &str) -> BimiRecord {
    let mut bimi = BimiRecord::default();

    for pair in record.split(';') {
        let Some((key, value)) = pair.trim().split_once('=') else {
            continue;
        };

        let value = value.trim();
        match key.trim().to_lowercase().as_str() {
            "l" if value.is_empty() => bimi.declined = true,
            "l" => bimi.logo_url = Some(value.to_string()),
            "a" if !value.is_empty() => bimi.authority_url = Some(value.to_string()),
            _ => {}
        }
    }

    bimi
}

/// Suggested BIMI record pointing at a logo on the domain's website
pub fn generate_bimi_fix(domain: &str) -> String {
    format!("\"v=BIMI1; l=https://{}/logo.svg; a=\"", domain)
}

/// Check the BIMI record of `domain`
pub async fn check_bimi(
    resolver: &dyn DnsResolver,
    fetcher: &dyn HttpFetcher,
    domain: &str,
    mode: CheckMode,
) -> BimiResult {
    info!("Checking BIMI for {}", domain);

    let bimi_domain = format!("default._bimi.{}", domain);
    let records = match find_records(resolver, &bimi_domain, "v=bimi1").await {
        Ok(records) => records,
        Err(e) => {
            warn!("BIMI lookup failed for {}: {}", domain, e);
            return BimiResult {
                status: CheckStatus::Warn,
                record: None,
                logo_url: None,
                issues: vec![mode.text(
                    "BIMI lookup failed",
                    &format!("Could not look up BIMI record: {}", e),
                )],
                recommendations: Vec::new(),
                suggested_record: None,
            };
        }
    };

    let Some(record) = records.into_iter().next() else {
        debug!("No BIMI record found at {}", bimi_domain);
        return BimiResult {
            status: CheckStatus::Warn,
            record: None,
            logo_url: None,
            issues: vec![mode.text(
                "BIMI record not found",
                "No BIMI record found (optional for brand logos)",
            )],
            recommendations: mode
                .detail(vec![
                    "BIMI is optional but helps display your logo in supported email clients"
                        .to_string(),
                    "Requires DMARC with p=quarantine or p=reject policy".to_string(),
                ])
                .unwrap_or_default(),
            suggested_record: mode.detail(generate_bimi_fix(domain)),
        };
    };

    let parsed = parse_bimi_record(&record);
    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    match parsed.logo_url.as_deref() {
        None if parsed.declined => {
            debug!("{} publishes a BIMI declination record", domain);
        }
        None => {
            issues.push(mode.text(
                "BIMI logo missing",
                "BIMI record does not specify a logo URL (l= tag)",
            ));
            recommendations.push("Add an l= tag pointing at your SVG logo".to_string());
        }
        Some(url) if !url.to_lowercase().starts_with("https://") => {
            issues.push(mode.text("BIMI logo must use HTTPS", "BIMI logo URL must use HTTPS"));
            recommendations.push("Serve your BIMI logo over HTTPS".to_string());
        }
        Some(url) if !mode.is_preview() => {
            if let Err(e) = fetcher.fetch(url).await {
                debug!("BIMI logo {} not accessible: {}", url, e);
                issues.push("BIMI logo URL is not accessible".to_string());
                recommendations
                    .push("Ensure your logo URL is publicly accessible via HTTPS".to_string());
            }
        }
        Some(_) => {}
    }

    let status = if issues.is_empty() {
        CheckStatus::Pass
    } else {
        CheckStatus::Warn
    };

    BimiResult {
        status,
        record: mode.detail(record),
        logo_url: mode.detail(parsed.logo_url).flatten(),
        issues,
        recommendations: mode.detail(recommendations).unwrap_or_default(),
        suggested_record: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StaticFetcher, StaticResolver};

    const LOGO: &str = "https://example.com/brand/logo.svg";
    const RECORD: &str = "v=BIMI1; l=https://example.com/brand/logo.svg";

    #[test]
    fn test_parse_bimi_record() {
        let parsed = parse_bimi_record(&format!("v=BIMI1; l={}; a=https://example.com/vmc.pem", LOGO));
        assert_eq!(parsed.logo_url.as_deref(), Some(LOGO));
        assert_eq!(parsed.authority_url.as_deref(), Some("https://example.com/vmc.pem"));

        let parsed = parse_bimi_record("v=BIMI1; l=; a=");
        assert!(parsed.declined);
        assert!(parsed.logo_url.is_none());
        assert!(parsed.authority_url.is_none());
    }

    #[tokio::test]
    async fn test_check_declination_record_passes() {
        let resolver = StaticResolver::new()
            .with_txt("default._bimi.example.com", &["v=BIMI1; l=; a="]);
        let fetcher = StaticFetcher::new();

        let result = check_bimi(&resolver, &fetcher, "example.com", CheckMode::Full).await;
        assert_eq!(result.status, CheckStatus::Pass);
        assert!(result.issues.is_empty());
        assert!(result.logo_url.is_none());
    }

    #[tokio::test]
    async fn test_check_record_without_logo_warns() {
        let resolver = StaticResolver::new()
            .with_txt("default._bimi.example.com", &["v=BIMI1; a=https://example.com/vmc.pem"]);
        let fetcher = StaticFetcher::new();

        let result = check_bimi(&resolver, &fetcher, "example.com", CheckMode::Full).await;
        assert_eq!(result.status, CheckStatus::Warn);
        assert_eq!(result.issues, vec!["BIMI record does not specify a logo URL (l= tag)"]);
    }

    #[tokio::test]
    async fn test_check_missing_record_warns() {
        let resolver = StaticResolver::new();
        let fetcher = StaticFetcher::new();

        let result = check_bimi(&resolver, &fetcher, "example.com", CheckMode::Full).await;
        assert_eq!(result.status, CheckStatus::Warn);
        assert_eq!(result.issues, vec!["No BIMI record found (optional for brand logos)"]);
        assert_eq!(
            result.suggested_record.as_deref(),
            Some("\"v=BIMI1; l=https://example.com/logo.svg; a=\"")
        );
    }

    #[tokio::test]
    async fn test_check_accessible_logo_passes() {
        let resolver = StaticResolver::new()
            .with_txt("default._bimi.example.com", &[RECORD]);
        let fetcher = StaticFetcher::new().with_page(LOGO, "<svg/>");

        let result = check_bimi(&resolver, &fetcher, "example.com", CheckMode::Full).await;
        assert_eq!(result.status, CheckStatus::Pass);
        assert_eq!(result.logo_url.as_deref(), Some(LOGO));
    }

    #[tokio::test]
    async fn test_check_unreachable_logo_warns() {
        let resolver = StaticResolver::new()
            .with_txt("default._bimi.example.com", &[RECORD]);
        let fetcher = StaticFetcher::new();

        let result = check_bimi(&resolver, &fetcher, "example.com", CheckMode::Full).await;
        assert_eq!(result.status, CheckStatus::Warn);
        assert_eq!(result.issues, vec!["BIMI logo URL is not accessible"]);
    }

    #[tokio::test]
    async fn test_check_preview_skips_fetch() {
        let resolver = StaticResolver::new()
            .with_txt("default._bimi.example.com", &[RECORD]);
        let fetcher = StaticFetcher::new();

        let result = check_bimi(&resolver, &fetcher, "example.com", CheckMode::Preview).await;
        assert_eq!(result.status, CheckStatus::Pass);
        assert!(result.record.is_none());
        assert!(result.logo_url.is_none());
    }

    #[tokio::test]
    async fn test_check_plain_http_logo_warns() {
        let resolver = StaticResolver::new()
            .with_txt("default._bimi.example.com", &["v=BIMI1; l=http://example.com/logo.svg"]);
        let fetcher = StaticFetcher::new();

        let result = check_bimi(&resolver, &fetcher, "example.com", CheckMode::Full).await;
        assert_eq!(result.status, CheckStatus::Warn);
        assert_eq!(result.issues, vec!["BIMI logo URL must use HTTPS"]);
    }
}
