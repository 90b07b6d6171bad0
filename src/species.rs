//! Species entities and the registry that deduplicates them.
//!
//! Two species are the same entity when both their common and latin names match
//! ignoring case. The registry keeps the first spelling it sees and hands out
//! shared references to it.
//!
//! [`SpeciesNames`] is the read side shared by species and individual trees.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Access to the common and scientific names of a species.
pub trait SpeciesNames {
    fn common_name(&self) -> &str;
    fn latin_name(&self) -> &str;
}

#[derive(Debug, Clone)]
pub struct Species {
    common_name: String,
    latin_name: String,
    common_folded: String,
    latin_folded: String,
}

impl Species {
    pub fn new(common_name: impl Into<String>, latin_name: impl Into<String>) -> Self {
        let common_name = common_name.into();
        let latin_name = latin_name.into();
        Self {
            common_folded: fold(&common_name),
            latin_folded: fold(&latin_name),
            common_name,
            latin_name,
        }
    }

    pub(crate) fn common_folded(&self) -> &str {
        &self.common_folded
    }

    pub(crate) fn latin_folded(&self) -> &str {
        &self.latin_folded
    }
}

impl SpeciesNames for Species {
    fn common_name(&self) -> &str {
        &self.common_name
    }

    fn latin_name(&self) -> &str {
        &self.latin_name
    }
}

impl PartialEq for Species {
    fn eq(&self, other: &Self) -> bool {
        self.common_folded == other.common_folded && self.latin_folded == other.latin_folded
    }
}

impl Eq for Species {}

impl Hash for Species {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.common_folded.hash(state);
        self.latin_folded.hash(state);
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.common_name, self.latin_name)
    }
}

/// Simple case folding used for every name comparison.
pub fn fold(text: &str) -> String {
    text.to_lowercase()
}

#[derive(Debug, Default)]
pub struct SpeciesRegistry {
    entries: Vec<Arc<Species>>,
    index: HashMap<Arc<Species>, usize>,
}

impl SpeciesRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `species` unless an equal entry exists; returns the canonical entry.
    pub fn add(&mut self, species: Species) -> Arc<Species> {
        if let Some(&idx) = self.index.get(&species) {
            return Arc::clone(&self.entries[idx]);
        }
        let species = Arc::new(species);
        self.index.insert(Arc::clone(&species), self.entries.len());
        self.entries.push(Arc::clone(&species));
        species
    }

    pub fn intern(&mut self, common_name: &str, latin_name: &str) -> Arc<Species> {
        self.add(Species::new(common_name, latin_name))
    }

    pub fn contains(&self, species: &Species) -> bool {
        self.index.contains_key(species)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Species>> {
        self.entries.iter()
    }

    pub fn find_by_common_name(&self, keyword: &str) -> Vec<Arc<Species>> {
        let keyword = fold(keyword);
        self.collect_matching(|s| s.common_folded().contains(&keyword))
    }

    pub fn find_by_latin_name(&self, keyword: &str) -> Vec<Arc<Species>> {
        let keyword = fold(keyword);
        self.collect_matching(|s| s.latin_folded().contains(&keyword))
    }

    fn collect_matching(&self, pred: impl Fn(&Species) -> bool) -> Vec<Arc<Species>> {
        self.entries
            .iter()
            .filter(|s| pred(s))
            .cloned()
            .collect()
    }
}
