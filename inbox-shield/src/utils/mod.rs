//! Utility modules
//!
//! Lookup plumbing shared by every checker:
//! - [`dns`]: TXT and NS lookups behind the [`DnsResolver`] trait
//! - [`domain`]: domain syntax validation and normalization
//! - [`http`]: HTTPS fetches behind the [`HttpFetcher`] trait

pub mod dns;
pub mod domain;
pub mod http;

pub use dns::{DnsResolver, TrustDnsResolver};
pub use domain::{normalize_domain, validate_domain_format};
pub use http::{HttpFetcher, ReqwestFetcher};
