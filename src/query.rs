//! Keyword queries over a loaded [`Census`].
//!
//! A keyword matches every species whose common or latin name contains it,
//! ignoring case. Matching species are counted once each, overall and in every
//! region, and reported together with the load-time region totals.

use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::census::Census;
use crate::species::{Species, SpeciesNames};
use crate::trees::NameField;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionCount {
    pub region: String,
    pub matched: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub keyword: String,
    /// Distinct matching names in ordinal order.
    pub names: Vec<String>,
    pub matched: usize,
    pub total: usize,
    pub regions: Vec<RegionCount>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    NoRecords,
    Found(Summary),
}

pub struct QueryEngine<'c> {
    census: &'c Census,
    last: Option<Summary>,
}

impl<'c> QueryEngine<'c> {
    pub fn new(census: &'c Census) -> Self {
        Self { census, last: None }
    }

    /// The result of the most recent successful query, cleared by a miss.
    pub fn last_summary(&self) -> Option<&Summary> {
        self.last.as_ref()
    }

    pub fn summarize(&mut self, keyword: &str) -> QueryOutcome {
        self.last = None;

        let registry = self.census.species();
        let by_common = registry.find_by_common_name(keyword);
        let by_latin = registry.find_by_latin_name(keyword);
        if by_common.is_empty() && by_latin.is_empty() {
            tracing::debug!(keyword, "no matching species");
            return QueryOutcome::NoRecords;
        }

        let mut names = BTreeSet::new();
        let mut matched_species: Vec<Arc<Species>> = Vec::new();
        let matches = by_common
            .iter()
            .map(|s| (s, s.common_name()))
            .chain(by_latin.iter().map(|s| (s, s.latin_name())));
        for (species, name) in matches {
            names.insert(name.to_string());
            if !matched_species.iter().any(|m| m == species) {
                matched_species.push(Arc::clone(species));
            }
        }

        let trees = self.census.trees();
        let regions = self.census.regions();
        let mut matched = 0;
        let mut per_region = vec![0usize; regions.names().len()];
        for species in &matched_species {
            let latin = species.latin_name();
            matched += trees.count_by_latin_name(latin);
            for (slot, region) in per_region.iter_mut().zip(regions.iter()) {
                *slot += trees.count_by_name_and_region(latin, region, NameField::Latin);
            }
        }

        let regions = regions
            .iter()
            .zip(per_region)
            .zip(self.census.region_totals())
            .map(|((region, matched), &total)| RegionCount {
                region: region.to_string(),
                matched,
                total,
            })
            .collect();

        let summary = Summary {
            keyword: keyword.to_string(),
            names: names.into_iter().collect(),
            matched,
            total: trees.total_count(),
            regions,
        };
        tracing::debug!(
            keyword,
            species = matched_species.len(),
            matched,
            "query answered"
        );
        self.last = Some(summary.clone());
        QueryOutcome::Found(summary)
    }
}
