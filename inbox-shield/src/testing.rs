//! In-memory resolver and fetcher
//!
//! Lets the checkers, the report builder and the API run without network
//! access. Names without an entry resolve to an empty answer, URLs without an
//! entry fail like an unreachable host.

use crate::error::{CheckError, Result};
use crate::utils::{DnsResolver, HttpFetcher};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

/// DNS resolver answering from fixed tables
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    txt: HashMap<String, Vec<String>>,
    ns: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish TXT records at `name`
    pub fn with_txt(mut self, name: &str, records: &[&str]) -> Self {
        self.txt
            .entry(name.to_lowercase())
            .or_default()
            .extend(records.iter().map(|r| r.to_string()));
        self
    }

    /// Publish NS records at `name`
    pub fn with_ns(mut self, name: &str, hosts: &[&str]) -> Self {
        self.ns
            .entry(name.to_lowercase())
            .or_default()
            .extend(hosts.iter().map(|h| h.to_string()));
        self
    }

    /// Make every lookup of `name` fail with a resolver error
    pub fn with_failure(mut self, name: &str) -> Self {
        self.failing.insert(name.to_lowercase());
        self
    }

    fn check_failure(&self, name: &str) -> Result<()> {
        if self.failing.contains(name) {
            return Err(CheckError::DnsLookup(format!("{}: server failure", name)));
        }
        Ok(())
    }
}

#[async_trait]
impl DnsResolver for StaticResolver {
    async fn txt_lookup(&self, name: &str) -> Result<Vec<String>> {
        let name = name.to_lowercase();
        self.check_failure(&name)?;
        Ok(self.txt.get(&name).cloned().unwrap_or_default())
    }

    async fn ns_lookup(&self, name: &str) -> Result<Vec<String>> {
        let name = name.to_lowercase();
        self.check_failure(&name)?;
        Ok(self.ns.get(&name).cloned().unwrap_or_default())
    }
}

/// HTTP fetcher answering from a fixed URL table
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }
}

#[async_trait]
impl HttpFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| CheckError::Http(format!("{}: connection refused", url)))
    }
}
