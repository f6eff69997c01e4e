//! inbox-shield: email authentication checker
//!
//! Looks up the SPF, DMARC, DKIM, BIMI and MTA-STS records of a domain,
//! grades each of them pass/warn/fail and combines the verdicts into a
//! weighted score. A full analysis also carries the raw records and suggested
//! fixes, and a full report adds DNS-provider setup instructions.
//!
//! # Example
//!
//! ```no_run
//! use inbox_shield::analysis::{CheckOptions, DomainChecker};
//! use inbox_shield::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let checker = DomainChecker::from_config(&Config::default())?;
//!     let result = checker
//!         .check_domain("example.com", &CheckOptions::full(None))
//!         .await?;
//!
//!     println!("{}: {}/100", result.domain, result.overall_score);
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`authentication`]: per-protocol record parsing and checks
//! - [`analysis`]: concurrent domain analysis and scoring
//! - [`report`]: full report assembly and text rendering
//! - [`provider`]: DNS hosting provider detection and setup instructions
//! - [`api`]: HTTP API
//! - [`utils`]: domain validation, DNS and HTTP access
//! - [`testing`]: in-memory resolver and fetcher

pub mod analysis;
pub mod api;
pub mod authentication;
pub mod config;
pub mod error;
pub mod provider;
pub mod report;
pub mod testing;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{CheckError, Result};
