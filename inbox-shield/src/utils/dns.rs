//! DNS lookups for email authentication records
//!
//! Every checker resolves TXT records through the [`DnsResolver`] trait so the
//! analysis can run against a real resolver or an in-memory table.
//!
//! # Example
//! ```no_run
//! use inbox_shield::config::DnsConfig;
//! use inbox_shield::utils::{DnsResolver, TrustDnsResolver};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = TrustDnsResolver::from_config(&DnsConfig::default())?;
//! let records = resolver.txt_lookup("_dmarc.example.com").await?;
//! println!("DMARC records: {:?}", records);
//! # Ok(())
//! # }
//! ```

use crate::config::DnsConfig;
use crate::error::{CheckError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};
use trust_dns_resolver::system_conf::read_system_conf;
use trust_dns_resolver::TokioAsyncResolver;

/// Resolver abstraction used by the checkers
#[async_trait]
pub trait DnsResolver: Send + Sync {
    /// Return every TXT record published at `name`
    ///
    /// A missing name or an empty answer is `Ok(vec![])`, only resolver
    /// failures are errors.
    async fn txt_lookup(&self, name: &str) -> Result<Vec<String>>;

    /// Return the NS host names of `name` without the trailing dot
    async fn ns_lookup(&self, name: &str) -> Result<Vec<String>>;
}

/// Production resolver backed by trust-dns
pub struct TrustDnsResolver {
    resolver: TokioAsyncResolver,
}

/// Upstream servers and options for the configured resolver
///
/// The configured timeout and attempt count apply to every resolver,
/// including the one read from the system configuration.
fn resolver_settings(config: &DnsConfig) -> Result<(ResolverConfig, ResolverOpts)> {
    let (resolver_config, mut opts) = match config.resolver.as_str() {
        "system" => read_system_conf().map_err(|e| {
            CheckError::Config(format!("Failed to read system resolver: {}", e))
        })?,
        "google" => (ResolverConfig::google(), ResolverOpts::default()),
        "cloudflare" => (ResolverConfig::cloudflare(), ResolverOpts::default()),
        "quad9" => (ResolverConfig::quad9(), ResolverOpts::default()),
        other => {
            return Err(CheckError::Config(format!("Unknown DNS resolver: {}", other)));
        }
    };

    opts.timeout = Duration::from_secs(config.timeout_seconds);
    opts.attempts = config.attempts;

    Ok((resolver_config, opts))
}

impl TrustDnsResolver {
    /// Build a resolver from the `[dns]` configuration section
    pub fn from_config(config: &DnsConfig) -> Result<Self> {
        let (resolver_config, opts) = resolver_settings(config)?;

        Ok(Self {
            resolver: TokioAsyncResolver::tokio(resolver_config, opts),
        })
    }
}

fn is_empty_answer(error: &ResolveError) -> bool {
    matches!(error.kind(), ResolveErrorKind::NoRecordsFound { .. })
}

#[async_trait]
impl DnsResolver for TrustDnsResolver {
    async fn txt_lookup(&self, name: &str) -> Result<Vec<String>> {
        debug!("TXT lookup: {}", name);

        match self.resolver.txt_lookup(name).await {
            Ok(lookup) => {
                let records: Vec<String> = lookup
                    .iter()
                    .map(|txt| {
                        txt.txt_data()
                            .iter()
                            .map(|chunk| String::from_utf8_lossy(chunk))
                            .collect::<String>()
                    })
                    .collect();

                debug!("Found {} TXT record(s) at {}", records.len(), name);
                Ok(records)
            }
            Err(e) if is_empty_answer(&e) => {
                debug!("No TXT records at {}", name);
                Ok(Vec::new())
            }
            Err(e) => {
                warn!("TXT lookup failed for {}: {}", name, e);
                Err(CheckError::DnsLookup(format!("{}: {}", name, e)))
            }
        }
    }

    async fn ns_lookup(&self, name: &str) -> Result<Vec<String>> {
        debug!("NS lookup: {}", name);

        match self.resolver.ns_lookup(name).await {
            Ok(lookup) => Ok(lookup
                .iter()
                .map(|ns| ns.to_string().trim_end_matches('.').to_string())
                .collect()),
            Err(e) if is_empty_answer(&e) => Ok(Vec::new()),
            Err(e) => {
                warn!("NS lookup failed for {}: {}", name, e);
                Err(CheckError::DnsLookup(format!("{}: {}", name, e)))
            }
        }
    }
}
