//! Tree entities and the append-only collection that owns them.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{CensusError, Result};
use crate::region::RegionSet;
use crate::species::{Species, SpeciesNames, fold};

pub const MAX_ZIP_CODE: u32 = 99_999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Alive,
    Dead,
    Stump,
}

impl FromStr for Status {
    type Err = CensusError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "alive" => Ok(Self::Alive),
            "dead" => Ok(Self::Dead),
            "stump" => Ok(Self::Stump),
            _ => Err(CensusError::InvalidStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Good,
    Fair,
    Poor,
}

impl FromStr for Health {
    type Err = CensusError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "good" => Ok(Self::Good),
            "fair" => Ok(Self::Fair),
            "poor" => Ok(Self::Poor),
            _ => Err(CensusError::InvalidHealth(s.to_string())),
        }
    }
}

/// Parses an optional enumerated field; empty text means absent.
pub fn parse_optional<T: FromStr<Err = CensusError>>(value: &str) -> Result<Option<T>> {
    if value.trim().is_empty() {
        Ok(None)
    } else {
        value.parse().map(Some)
    }
}

pub fn check_zip_code(zip_code: u32) -> Result<u32> {
    if zip_code > MAX_ZIP_CODE {
        return Err(CensusError::ZipCodeOutOfRange(zip_code));
    }
    Ok(zip_code)
}

#[derive(Debug, Clone)]
pub struct Tree {
    id: u64,
    species: Arc<Species>,
    status: Option<Status>,
    health: Option<Health>,
    zip_code: u32,
    region: String,
    x: f64,
    y: f64,
}

impl Tree {
    /// Creates a tree in the default region of `regions` with every optional
    /// field unset.
    pub fn new(id: u64, species: Arc<Species>, regions: &RegionSet) -> Self {
        Self {
            id,
            species,
            status: None,
            health: None,
            zip_code: 0,
            region: regions.default_region().to_string(),
            x: 0.0,
            y: 0.0,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn species(&self) -> &Arc<Species> {
        &self.species
    }

    pub fn status(&self) -> Option<Status> {
        self.status
    }

    pub fn set_status(&mut self, status: Option<Status>) {
        self.status = status;
    }

    pub fn health(&self) -> Option<Health> {
        self.health
    }

    pub fn set_health(&mut self, health: Option<Health>) {
        self.health = health;
    }

    pub fn zip_code(&self) -> u32 {
        self.zip_code
    }

    pub fn set_zip_code(&mut self, zip_code: u32) -> Result<()> {
        self.zip_code = check_zip_code(zip_code)?;
        Ok(())
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Assigns the region, stored in the canonical spelling from `regions`.
    pub fn set_region(&mut self, value: &str, regions: &RegionSet) -> Result<()> {
        self.region = regions.resolve(value)?.to_string();
        Ok(())
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn set_x(&mut self, x: f64) {
        self.x = x;
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn set_y(&mut self, y: f64) {
        self.y = y;
    }
}

impl SpeciesNames for Tree {
    fn common_name(&self) -> &str {
        self.species.common_name()
    }

    fn latin_name(&self) -> &str {
        self.species.latin_name()
    }
}

/// Trees are the same when their ids match and both names match ignoring case.
impl PartialEq for Tree {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && *self.species == *other.species
    }
}

impl Eq for Tree {}

impl Hash for Tree {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.species.hash(state);
    }
}

impl PartialOrd for Tree {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Orders by common name ignoring case, then by id. The scientific name only
/// breaks the remaining ties so the order agrees with equality.
impl Ord for Tree {
    fn cmp(&self, other: &Self) -> Ordering {
        self.species
            .common_folded()
            .cmp(other.species.common_folded())
            .then_with(|| self.id.cmp(&other.id))
            .then_with(|| self.species.latin_folded().cmp(other.species.latin_folded()))
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.species, self.id)
    }
}

/// Which species name a count query compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameField {
    Common,
    Latin,
}

impl NameField {
    fn folded(self, species: &Species) -> &str {
        match self {
            Self::Common => species.common_folded(),
            Self::Latin => species.latin_folded(),
        }
    }
}

/// Append-only, insertion-ordered tree storage.
///
/// The collection is filled during a single load pass and read-only afterwards.
/// Sharing it across threads is fine once loading is done; appending after that
/// point is unsupported and invalidates every outstanding [`TreeCursor`].
#[derive(Debug, Default)]
pub struct TreeCollection {
    trees: Vec<Tree>,
    revision: u64,
}

impl TreeCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, tree: Tree) {
        self.trees.push(tree);
        self.revision += 1;
    }

    pub fn total_count(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Monotonic counter bumped on every append.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tree> {
        self.trees.iter()
    }

    pub fn cursor(&self) -> TreeCursor {
        TreeCursor {
            expected_revision: self.revision,
            position: 0,
        }
    }

    pub fn count_by_common_name(&self, name: &str) -> usize {
        self.count_by_name(name, NameField::Common)
    }

    pub fn count_by_latin_name(&self, name: &str) -> usize {
        self.count_by_name(name, NameField::Latin)
    }

    pub fn count_by_region(&self, region: &str) -> usize {
        let region = fold(region);
        self.count_where(|t| fold(&t.region) == region)
    }

    pub fn count_by_name_and_region(&self, name: &str, region: &str, field: NameField) -> usize {
        let name = fold(name);
        let region = fold(region);
        self.count_where(|t| field.folded(&t.species) == name && fold(&t.region) == region)
    }

    fn count_by_name(&self, name: &str, field: NameField) -> usize {
        let name = fold(name);
        self.count_where(|t| field.folded(&t.species) == name)
    }

    fn count_where(&self, pred: impl Fn(&Tree) -> bool) -> usize {
        self.trees.iter().filter(|t| pred(t)).count()
    }
}

impl<'a> IntoIterator for &'a TreeCollection {
    type Item = &'a Tree;
    type IntoIter = std::slice::Iter<'a, Tree>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Forward cursor over a [`TreeCollection`] that does not hold a borrow between
/// steps. Every step checks the collection's revision and fails with
/// [`CensusError::CollectionChanged`] once the collection was appended to.
#[derive(Debug, Clone)]
pub struct TreeCursor {
    expected_revision: u64,
    position: usize,
}

impl TreeCursor {
    pub fn advance<'a>(&mut self, trees: &'a TreeCollection) -> Result<Option<&'a Tree>> {
        if trees.revision != self.expected_revision {
            return Err(CensusError::CollectionChanged);
        }
        let tree = trees.trees.get(self.position);
        if tree.is_some() {
            self.position += 1;
        }
        Ok(tree)
    }

    /// Rewinds to the first tree and accepts the collection's current revision.
    pub fn restart(&mut self, trees: &TreeCollection) {
        self.expected_revision = trees.revision;
        self.position = 0;
    }
}
