//! Runs every authentication check for a domain

use crate::authentication::dkim::is_valid_selector;
use crate::authentication::{
    check_bimi, check_dkim, check_dmarc, check_mta_sts, check_spf, BimiResult, CheckMode,
    DkimResult, DmarcResult, MtaStsResult, SpfResult,
};
use crate::config::Config;
use crate::error::{CheckError, Result};
use crate::utils::{
    normalize_domain, validate_domain_format, DnsResolver, HttpFetcher, ReqwestFetcher,
    TrustDnsResolver,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::score::overall_score;

/// Outcome of a domain analysis
///
/// Missing fields deserialize to their defaults so partial documents, such as
/// a report posted back for rendering, are still accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DomainCheckResult {
    pub domain: String,
    /// RFC 3339 UTC time of the analysis
    pub timestamp: String,
    pub spf: SpfResult,
    pub dmarc: DmarcResult,
    pub dkim: DkimResult,
    pub bimi: BimiResult,
    pub mta_sts: MtaStsResult,
    pub overall_score: u8,
    pub is_preview: bool,
}

/// Per-request options
#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub mode: CheckMode,
    /// Extra DKIM selector to probe
    pub dkim_selector: Option<String>,
}

impl CheckOptions {
    pub fn preview() -> Self {
        Self {
            mode: CheckMode::Preview,
            dkim_selector: None,
        }
    }

    pub fn full(dkim_selector: Option<String>) -> Self {
        Self {
            mode: CheckMode::Full,
            dkim_selector,
        }
    }
}

/// Domain checker sharing one resolver and one HTTP client across requests
#[derive(Clone)]
pub struct DomainChecker {
    resolver: Arc<dyn DnsResolver>,
    fetcher: Arc<dyn HttpFetcher>,
    selectors: Vec<String>,
}

impl DomainChecker {
    pub fn new(
        resolver: Arc<dyn DnsResolver>,
        fetcher: Arc<dyn HttpFetcher>,
        selectors: Vec<String>,
    ) -> Self {
        Self {
            resolver,
            fetcher,
            selectors,
        }
    }

    /// Build a checker on trust-dns and reqwest from the configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let resolver = TrustDnsResolver::from_config(&config.dns)?;
        let fetcher = ReqwestFetcher::from_config(&config.http)?;

        Ok(Self::new(
            Arc::new(resolver),
            Arc::new(fetcher),
            config.dkim.selectors.clone(),
        ))
    }

    pub fn resolver(&self) -> &dyn DnsResolver {
        self.resolver.as_ref()
    }

    /// Validate `domain` and run the five checks concurrently
    ///
    /// A blank extra DKIM selector is ignored; a malformed one is rejected
    /// before any lookup.
    pub async fn check_domain(
        &self,
        domain: &str,
        options: &CheckOptions,
    ) -> Result<DomainCheckResult> {
        if !validate_domain_format(domain) {
            return Err(CheckError::InvalidDomain(domain.trim().to_string()));
        }

        let extra_selector = options
            .dkim_selector
            .as_deref()
            .map(str::trim)
            .filter(|selector| !selector.is_empty());
        if let Some(selector) = extra_selector {
            if !is_valid_selector(selector) {
                return Err(CheckError::InvalidSelector(selector.to_string()));
            }
        }

        let domain = normalize_domain(domain);
        let mode = options.mode;
        let resolver = self.resolver.as_ref();
        let fetcher = self.fetcher.as_ref();

        info!(
            "Analyzing {} ({})",
            domain,
            if mode.is_preview() { "preview" } else { "full" }
        );

        let (spf, dmarc, dkim, bimi, mta_sts) = tokio::join!(
            check_spf(resolver, &domain, mode),
            check_dmarc(resolver, &domain, mode),
            check_dkim(
                resolver,
                &domain,
                &self.selectors,
                extra_selector,
                mode
            ),
            check_bimi(resolver, fetcher, &domain, mode),
            check_mta_sts(resolver, fetcher, &domain, mode),
        );

        let overall_score = overall_score(
            spf.status,
            dmarc.status,
            dkim.status,
            bimi.status,
            mta_sts.status,
        );

        info!("Analysis of {} complete, score {}", domain, overall_score);

        Ok(DomainCheckResult {
            domain,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            spf,
            dmarc,
            dkim,
            bimi,
            mta_sts,
            overall_score,
            is_preview: mode.is_preview(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authentication::CheckStatus;
    use crate::config::DEFAULT_DKIM_SELECTORS;
    use crate::testing::{StaticFetcher, StaticResolver};

    fn checker(resolver: StaticResolver) -> DomainChecker {
        DomainChecker::new(
            Arc::new(resolver),
            Arc::new(StaticFetcher::new()),
            DEFAULT_DKIM_SELECTORS.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[tokio::test]
    async fn test_rejects_invalid_domain() {
        let checker = checker(StaticResolver::new());

        let err = checker
            .check_domain("localhost", &CheckOptions::preview())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckError::InvalidDomain(_)));
    }

    #[tokio::test]
    async fn test_rejects_invalid_selector() {
        let checker = checker(StaticResolver::new());

        let err = checker
            .check_domain("example.com", &CheckOptions::full(Some("bad selector..-".to_string())))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckError::InvalidSelector(_)));
    }

    #[tokio::test]
    async fn test_blank_selector_is_ignored() {
        let checker = checker(StaticResolver::new());

        let result = checker
            .check_domain("example.com", &CheckOptions::full(Some("  ".to_string())))
            .await
            .unwrap();
        assert_eq!(result.dkim.common_selectors.len(), DEFAULT_DKIM_SELECTORS.len());
    }

    #[tokio::test]
    async fn test_unconfigured_domain() {
        let checker = checker(StaticResolver::new());

        let result = checker
            .check_domain("  Example.COM ", &CheckOptions::full(None))
            .await
            .unwrap();
        assert_eq!(result.domain, "example.com");
        assert_eq!(result.spf.status, CheckStatus::Fail);
        assert_eq!(result.dmarc.status, CheckStatus::Fail);
        assert_eq!(result.dkim.status, CheckStatus::Fail);
        assert_eq!(result.bimi.status, CheckStatus::Warn);
        assert_eq!(result.mta_sts.status, CheckStatus::Warn);
        // 5 + 2.5
        assert_eq!(result.overall_score, 8);
        assert!(!result.is_preview);
    }

    #[tokio::test]
    async fn test_well_configured_domain() {
        let resolver = StaticResolver::new()
            .with_txt("example.com", &["v=spf1 include:_spf.google.com -all"])
            .with_txt(
                "_dmarc.example.com",
                &["v=DMARC1; p=reject; rua=mailto:dmarc@example.com"],
            )
            .with_txt("google._domainkey.example.com", &["v=DKIM1; k=rsa; p=MIIB"]);
        let checker = checker(resolver);

        let result = checker
            .check_domain("example.com", &CheckOptions::preview())
            .await
            .unwrap();
        assert_eq!(result.spf.status, CheckStatus::Pass);
        assert_eq!(result.dmarc.status, CheckStatus::Pass);
        assert_eq!(result.dkim.status, CheckStatus::Pass);
        // 85 + 5 + 2.5
        assert_eq!(result.overall_score, 93);
        assert!(result.is_preview);
        assert!(result.spf.record.is_none());
    }

    #[test]
    fn test_result_uses_camel_case() {
        let json = serde_json::json!({
            "domain": "example.com",
            "timestamp": "2024-01-01T00:00:00.000Z",
            "spf": { "status": "pass" },
            "dmarc": { "status": "fail" },
            "dkim": { "status": "fail" },
            "bimi": { "status": "warn" },
            "mtaSts": { "status": "warn" },
            "overallScore": 38,
            "isPreview": true
        });

        let result: DomainCheckResult = serde_json::from_value(json).unwrap();
        assert_eq!(result.mta_sts.status, CheckStatus::Warn);
        assert_eq!(result.overall_score, 38);

        let value = serde_json::to_value(&result).unwrap();
        assert!(value.get("mtaSts").is_some());
        assert!(value.get("overallScore").is_some());
    }

    #[test]
    fn test_partial_result_uses_defaults() {
        let result: DomainCheckResult =
            serde_json::from_value(serde_json::json!({ "domain": "example.com" })).unwrap();
        assert_eq!(result.domain, "example.com");
        assert!(result.timestamp.is_empty());
        assert_eq!(result.overall_score, 0);
        assert_eq!(result.spf.status, CheckStatus::Fail);
    }
}
