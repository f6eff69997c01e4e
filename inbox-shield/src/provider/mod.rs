//! DNS hosting provider detection
//!
//! The provider is guessed from the domain's NS host names so the full report
//! can show setup steps for the control panel the user actually has.

pub mod instructions;

pub use instructions::{provider_instructions, ProviderInstructions};

use crate::utils::DnsResolver;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Detected DNS hosting provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsProvider {
    pub name: String,
    /// Key into [`provider_instructions`]
    pub code: String,
    pub logo: String,
    /// Number of nameserver pattern matches
    pub confidence: u32,
}

impl DnsProvider {
    pub fn generic() -> Self {
        Self {
            name: "Generic DNS Provider".to_string(),
            code: "generic".to_string(),
            logo: "⚙️".to_string(),
            confidence: 0,
        }
    }
}

struct KnownProvider {
    name: &'static str,
    code: &'static str,
    logo: &'static str,
    patterns: &'static [&'static str],
}

const KNOWN_PROVIDERS: &[KnownProvider] = &[
    KnownProvider {
        name: "GoDaddy",
        code: "godaddy",
        logo: "🟢",
        patterns: &["godaddy.com", "domaincontrol.com", "secureserver.net"],
    },
    KnownProvider {
        name: "Cloudflare",
        code: "cloudflare",
        logo: "🟠",
        patterns: &["cloudflare.com", "ns.cloudflare.com"],
    },
    KnownProvider {
        name: "Namecheap",
        code: "namecheap",
        logo: "🔴",
        patterns: &["registrar-servers.com", "namecheaphosting.com", "namecheap.com"],
    },
    KnownProvider {
        name: "Route 53 (Amazon)",
        code: "route53",
        logo: "🟡",
        patterns: &["awsdns"],
    },
    KnownProvider {
        name: "Google Domains",
        code: "google",
        logo: "🔵",
        patterns: &["googledomains.com", "google.com"],
    },
];

/// Match nameserver host names against the known provider patterns
///
/// Every pattern contained in a nameserver counts once; the provider with the
/// most matches wins and ties go to the later entry.
pub fn match_nameservers(nameservers: &[String]) -> DnsProvider {
    let mut best: Option<(&KnownProvider, u32)> = None;

    for provider in KNOWN_PROVIDERS {
        let confidence = nameservers
            .iter()
            .map(|ns| ns.to_lowercase())
            .map(|ns| provider.patterns.iter().filter(|p| ns.contains(*p)).count() as u32)
            .sum::<u32>();

        if confidence > 0 && confidence >= best.map_or(0, |(_, c)| c) {
            best = Some((provider, confidence));
        }
    }

    match best {
        Some((provider, confidence)) => DnsProvider {
            name: provider.name.to_string(),
            code: provider.code.to_string(),
            logo: provider.logo.to_string(),
            confidence,
        },
        None => DnsProvider::generic(),
    }
}

/// Detect the DNS provider of `domain`, falling back to the generic provider
pub async fn detect_dns_provider(resolver: &dyn DnsResolver, domain: &str) -> DnsProvider {
    match resolver.ns_lookup(domain).await {
        Ok(nameservers) => {
            let provider = match_nameservers(&nameservers);
            debug!(
                "DNS provider for {}: {} (confidence {})",
                domain, provider.code, provider.confidence
            );
            provider
        }
        Err(e) => {
            warn!("Nameserver lookup failed for {}: {}", domain, e);
            DnsProvider::generic()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticResolver;

    fn hosts(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_match_cloudflare() {
        let provider = match_nameservers(&hosts(&["ada.ns.cloudflare.com", "bob.ns.cloudflare.com"]));
        assert_eq!(provider.code, "cloudflare");
        // both patterns match both hosts
        assert_eq!(provider.confidence, 4);
    }

    #[test]
    fn test_match_route53_case_insensitive() {
        let provider = match_nameservers(&hosts(&["NS-123.AWSDNS-45.COM", "ns-9.awsdns-01.net"]));
        assert_eq!(provider.code, "route53");
        assert_eq!(provider.confidence, 2);
    }

    #[test]
    fn test_tie_goes_to_later_provider() {
        let provider = match_nameservers(&hosts(&["ns1.google.com", "x.cloudflare.com"]));
        assert_eq!(provider.code, "google");
        assert_eq!(provider.confidence, 1);
    }

    #[test]
    fn test_unknown_nameservers_are_generic() {
        assert_eq!(match_nameservers(&hosts(&["ns1.example.net"])), DnsProvider::generic());
        assert_eq!(match_nameservers(&[]), DnsProvider::generic());
    }

    #[tokio::test]
    async fn test_detect_via_resolver() {
        let resolver = StaticResolver::new()
            .with_ns("example.com", &["ns51.domaincontrol.com", "ns52.domaincontrol.com"])
            .with_failure("broken.example");

        let provider = detect_dns_provider(&resolver, "example.com").await;
        assert_eq!(provider.code, "godaddy");
        assert_eq!(provider.name, "GoDaddy");

        let provider = detect_dns_provider(&resolver, "broken.example").await;
        assert_eq!(provider.code, "generic");
    }
}
