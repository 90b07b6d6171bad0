//! The closed set of named regions a dataset is broken down by.
//!
//! Built once at startup from configuration and passed to whatever needs it.

use crate::error::{CensusError, Result};

pub const REGION_COUNT: usize = 5;

pub const DEFAULT_REGIONS: [&str; REGION_COUNT] =
    ["Manhattan", "Bronx", "Brooklyn", "Queens", "Staten Island"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSet {
    names: Vec<String>,
}

impl Default for RegionSet {
    fn default() -> Self {
        Self {
            names: DEFAULT_REGIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RegionSet {
    /// Builds a region set from exactly five distinct, non-empty names.
    pub fn new<I, S>(names: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(|s| s.into().trim().to_string()).collect();
        if names.len() != REGION_COUNT {
            anyhow::bail!(
                "Exactly {REGION_COUNT} regions are required, got {}",
                names.len()
            );
        }
        if let Some(empty) = names.iter().position(|n| n.is_empty()) {
            anyhow::bail!("Region #{} has an empty name", empty + 1);
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].iter().any(|prev| prev.to_lowercase() == name.to_lowercase()) {
                anyhow::bail!("Region {name:?} is listed more than once");
            }
        }
        Ok(Self { names })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// The region a tree belongs to until one is assigned.
    pub fn default_region(&self) -> &str {
        &self.names[0]
    }

    /// Case-insensitive lookup returning the canonical spelling.
    pub fn resolve(&self, name: &str) -> Result<&str> {
        let name = name.trim();
        self.iter()
            .find(|candidate| candidate.to_lowercase() == name.to_lowercase())
            .ok_or_else(|| CensusError::InvalidRegion {
                value: name.to_string(),
                allowed: self.names.join(", "),
            })
    }
}
