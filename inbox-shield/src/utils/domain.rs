//! Domain name validation
//!
//! Syntax check applied to every domain before any lookup is issued. Besides
//! the hostname grammar it refuses loopback names and bare IPv4 literals so the
//! checker cannot be pointed at local infrastructure.

use regex::Regex;
use once_cell::sync::Lazy;

static LABEL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?(\.[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?)*$")
        .expect("domain pattern is valid")
});

static IPV4_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\d+\.\d+\.\d+$").expect("ipv4 pattern is valid"));

/// Trim and lowercase a user-supplied domain
pub fn normalize_domain(domain: &str) -> String {
    domain.trim().to_lowercase()
}

/// Check that a domain is safe and syntactically valid
///
/// # Examples
/// ```
/// use inbox_shield::utils::validate_domain_format;
///
/// assert!(validate_domain_format("example.com"));
/// assert!(!validate_domain_format("localhost"));
/// ```
pub fn validate_domain_format(domain: &str) -> bool {
    let domain = normalize_domain(domain);

    if domain.len() < 3 || domain.len() > 253 {
        return false;
    }

    if domain.contains("..")
        || domain.split('.').any(|label| label == "localhost")
        || domain.contains("127.0.0.1")
        || domain.contains("0.0.0.0")
        || IPV4_PATTERN.is_match(&domain)
    {
        return false;
    }

    LABEL_PATTERN.is_match(&domain)
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.starts_with('-')
        && !domain.ends_with('-')
}
