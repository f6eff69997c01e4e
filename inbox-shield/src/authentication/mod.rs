//! Email authentication checks (SPF, DMARC, DKIM, BIMI, MTA-STS)
//!
//! Each checker looks up the records a domain publishes for one protocol and
//! turns them into a pass/warn/fail verdict with issues, recommendations and,
//! where it makes sense, a suggested replacement record. Lookup failures never
//! escape a checker; they become issues on the verdict.

pub mod bimi;
pub mod dkim;
pub mod dmarc;
pub mod mta_sts;
pub mod spf;
pub mod types;

pub use bimi::check_bimi;
pub use dkim::check_dkim;
pub use dmarc::check_dmarc;
pub use mta_sts::check_mta_sts;
pub use spf::check_spf;
pub use types::{
    BimiResult, CheckMode, CheckStatus, DkimResult, DmarcPolicy, DmarcResult, MtaStsResult,
    ProviderGuidance, SpfResult,
};

use crate::error::Result;
use crate::utils::DnsResolver;

/// TXT records at `name` whose version tag matches `prefix` (case-insensitive)
pub(crate) async fn find_records(
    resolver: &dyn DnsResolver,
    name: &str,
    prefix: &str,
) -> Result<Vec<String>> {
    let records = resolver.txt_lookup(name).await?;
    Ok(records
        .into_iter()
        .map(|record| record.trim().to_string())
        .filter(|record| record.to_lowercase().starts_with(prefix))
        .collect())
}
