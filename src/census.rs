//! Loads a census dataset into the species registry and tree collection.
//!
//! The first record is a header and is dropped. A row becomes a tree only when
//! both the id and the common name are non-empty; other rows are counted and
//! ignored. Rows whose optional fields fail validation are skipped or abort the
//! load depending on [`InvalidRowPolicy`].

use anyhow::{Context, Result};
use std::io::BufRead;
use std::path::Path;

use crate::config::{CensusConfig, ColumnLayout, InvalidRowPolicy};
use crate::error::CensusError;
use crate::reader::{Record, RecordReader};
use crate::region::RegionSet;
use crate::species::SpeciesRegistry;
use crate::trees::{Health, Status, Tree, TreeCollection, check_zip_code, parse_optional};

/// Rejected rows logged at `warn` before switching to `debug`.
const REJECTED_WARN_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub rows_read: usize,
    pub trees_loaded: usize,
    pub species: usize,
    pub rows_missing_required: usize,
    pub rows_rejected: usize,
}

#[derive(Debug)]
pub struct Census {
    regions: RegionSet,
    species: SpeciesRegistry,
    trees: TreeCollection,
    region_totals: Vec<usize>,
}

impl Census {
    pub fn load(path: &Path, config: &CensusConfig) -> Result<(Self, LoadReport)> {
        let reader = RecordReader::open(path)
            .with_context(|| format!("the file {} cannot be opened", path.display()))?;
        Self::from_records(reader, config)
            .with_context(|| format!("Failed to load dataset: {}", path.display()))
    }

    pub fn from_reader<R: BufRead>(source: R, config: &CensusConfig) -> Result<(Self, LoadReport)> {
        Self::from_records(RecordReader::new(source), config)
    }

    pub fn from_records<R: BufRead>(
        mut reader: RecordReader<R>,
        config: &CensusConfig,
    ) -> Result<(Self, LoadReport)> {
        let regions = config.region_set()?;
        let mut loader = Loader {
            regions: &regions,
            columns: &config.columns,
            species: SpeciesRegistry::new(),
            trees: TreeCollection::new(),
            report: LoadReport::default(),
        };

        if reader.has_next()? {
            reader.next_record()?;
        }

        while reader.has_next()? {
            let record = reader.next_record()?;
            loader.report.rows_read += 1;

            match loader.ingest(&record) {
                Ok(()) => {}
                Err(err) => {
                    let line = reader.line_number();
                    if config.invalid_rows == InvalidRowPolicy::Abort {
                        return Err(CensusError::InvalidRow {
                            line,
                            source: Box::new(err),
                        }
                        .into());
                    }
                    loader.report.rows_rejected += 1;
                    if loader.report.rows_rejected <= REJECTED_WARN_LIMIT {
                        tracing::warn!(line, error = %err, "skipping invalid row");
                    } else {
                        tracing::debug!(line, error = %err, "skipping invalid row");
                    }
                }
            }
        }

        let Loader {
            species,
            trees,
            mut report,
            ..
        } = loader;
        report.trees_loaded = trees.total_count();
        report.species = species.len();

        let region_totals = regions.iter().map(|r| trees.count_by_region(r)).collect();

        tracing::info!(
            rows = report.rows_read,
            trees = report.trees_loaded,
            species = report.species,
            missing_required = report.rows_missing_required,
            rejected = report.rows_rejected,
            "census loaded"
        );

        Ok((
            Self {
                regions,
                species,
                trees,
                region_totals,
            },
            report,
        ))
    }

    pub fn regions(&self) -> &RegionSet {
        &self.regions
    }

    pub fn species(&self) -> &SpeciesRegistry {
        &self.species
    }

    pub fn trees(&self) -> &TreeCollection {
        &self.trees
    }

    /// Trees per region, in region order, computed once after loading.
    pub fn region_totals(&self) -> &[usize] {
        &self.region_totals
    }
}

struct Loader<'a> {
    regions: &'a RegionSet,
    columns: &'a ColumnLayout,
    species: SpeciesRegistry,
    trees: TreeCollection,
    report: LoadReport,
}

impl Loader<'_> {
    fn ingest(&mut self, record: &Record) -> std::result::Result<(), CensusError> {
        let c = self.columns;
        let id_field = field(record, c.id);
        let common_name = field(record, c.common_name);
        if id_field.is_empty() || common_name.is_empty() {
            self.report.rows_missing_required += 1;
            return Ok(());
        }

        let id: u64 = parse_number("id", id_field)?;
        let status: Option<Status> = parse_optional(field(record, c.status))?;
        let health: Option<Health> = parse_optional(field(record, c.health))?;
        let zip_code = match field(record, c.zip_code) {
            "" => None,
            raw => Some(check_zip_code(parse_number("zip_code", raw)?)?),
        };
        let region = match field(record, c.region) {
            "" => None,
            raw => Some(self.regions.resolve(raw)?),
        };
        let x: Option<f64> = parse_optional_number("x", field(record, c.x))?;
        let y: Option<f64> = parse_optional_number("y", field(record, c.y))?;

        let species = self.species.intern(common_name, field(record, c.latin_name));
        let mut tree = Tree::new(id, species, self.regions);
        tree.set_status(status);
        tree.set_health(health);
        if let Some(zip_code) = zip_code {
            tree.set_zip_code(zip_code)?;
        }
        if let Some(region) = region {
            tree.set_region(region, self.regions)?;
        }
        if let Some(x) = x {
            tree.set_x(x);
        }
        if let Some(y) = y {
            tree.set_y(y);
        }

        self.trees.add(tree);
        Ok(())
    }
}

/// Missing trailing columns read as empty.
fn field(record: &Record, index: usize) -> &str {
    record.get(index).map(|s| s.trim()).unwrap_or("")
}

fn parse_number<T: std::str::FromStr>(
    name: &'static str,
    raw: &str,
) -> std::result::Result<T, CensusError> {
    raw.parse().map_err(|_| CensusError::InvalidNumber {
        field: name,
        value: raw.to_string(),
    })
}

fn parse_optional_number<T: std::str::FromStr>(
    name: &'static str,
    raw: &str,
) -> std::result::Result<Option<T>, CensusError> {
    if raw.is_empty() {
        return Ok(None);
    }
    parse_number(name, raw).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "tree_id,block_id,created_at,tree_dbh,stump_diam,curb_loc,status,health,spc_latin,spc_common";

    /// Builds a 41-column row with the fields the loader reads.
    fn row(id: &str, status: &str, health: &str, latin: &str, common: &str, zip: &str, region: &str) -> String {
        let mut cols = vec![String::new(); 41];
        cols[0] = id.to_string();
        cols[6] = status.to_string();
        cols[7] = health.to_string();
        cols[8] = latin.to_string();
        cols[9] = format!("\"{common}\"");
        cols[25] = zip.to_string();
        cols[29] = region.to_string();
        cols[39] = "1027431.148".to_string();
        cols[40] = "202756.7687".to_string();
        cols.join(",")
    }

    fn dataset(rows: &[String]) -> String {
        let mut text = String::from(HEADER);
        for r in rows {
            text.push('\n');
            text.push_str(r);
        }
        text.push('\n');
        text
    }

    #[test]
    fn loads_valid_rows_and_dedupes_species() -> Result<()> {
        let text = dataset(&[
            row("1", "Alive", "Good", "Platanus x acerifolia", "London planetree", "10023", "Manhattan"),
            row("2", "alive", "", "Platanus X Acerifolia", "london planetree", "10458", "Bronx"),
            row("3", "Stump", "", "Quercus", "Oak", "", "Manhattan"),
        ]);
        let (census, report) = Census::from_reader(Cursor::new(text), &CensusConfig::default())?;

        assert_eq!(report.rows_read, 3);
        assert_eq!(report.trees_loaded, 3);
        assert_eq!(report.species, 2);
        assert_eq!(census.species().len(), 2);
        assert_eq!(census.region_totals(), &[2, 1, 0, 0, 0]);

        let first = census.trees().iter().next().unwrap();
        assert_eq!(first.zip_code(), 10023);
        assert_eq!(first.status(), Some(Status::Alive));
        assert!((first.x() - 1027431.148).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn rows_missing_id_or_common_name_are_ignored() -> Result<()> {
        let text = dataset(&[
            row("", "Alive", "Good", "Quercus", "Oak", "", "Queens"),
            row("5", "Alive", "Good", "Quercus", "", "", "Queens"),
            "6,short row".to_string(),
            row("7", "Alive", "Good", "Quercus", "Oak", "", "Queens"),
        ]);
        let (census, report) = Census::from_reader(Cursor::new(text), &CensusConfig::default())?;

        assert_eq!(census.trees().total_count(), 1);
        assert_eq!(report.rows_missing_required, 3);
        assert_eq!(report.rows_rejected, 0);
        Ok(())
    }

    #[test]
    fn empty_region_keeps_the_default_region() -> Result<()> {
        let text = dataset(&[row("1", "", "", "Quercus", "Oak", "", "")]);
        let (census, _) = Census::from_reader(Cursor::new(text), &CensusConfig::default())?;
        assert_eq!(census.trees().iter().next().unwrap().region(), "Manhattan");
        Ok(())
    }

    #[test]
    fn invalid_rows_are_skipped_and_counted_by_default() -> Result<()> {
        let text = dataset(&[
            row("1", "Sleeping", "", "Quercus", "Oak", "", "Queens"),
            row("2", "", "Great", "Quercus", "Oak", "", "Queens"),
            row("3", "", "", "Quercus", "Oak", "123456", "Queens"),
            row("4", "", "", "Quercus", "Oak", "", "Hoboken"),
            row("-5", "", "", "Quercus", "Oak", "", "Queens"),
            row("6", "", "", "Ulmus", "Elm", "", "Queens"),
        ]);
        let (census, report) = Census::from_reader(Cursor::new(text), &CensusConfig::default())?;

        assert_eq!(report.rows_rejected, 5);
        assert_eq!(census.trees().total_count(), 1);
        // Rejected rows do not leave species behind.
        assert_eq!(census.species().len(), 1);
        Ok(())
    }

    #[test]
    fn abort_policy_stops_at_the_first_invalid_row() {
        let text = dataset(&[
            row("1", "", "", "Quercus", "Oak", "", "Queens"),
            row("2", "", "", "Quercus", "Oak", "", "Hoboken"),
        ]);
        let config = CensusConfig {
            invalid_rows: InvalidRowPolicy::Abort,
            ..CensusConfig::default()
        };

        let err = Census::from_reader(Cursor::new(text), &config).unwrap_err();
        let census_err = err.downcast_ref::<CensusError>().unwrap();
        assert!(matches!(census_err, CensusError::InvalidRow { line: 3, .. }));
    }

    #[test]
    fn badly_encoded_row_still_loads() -> Result<()> {
        let mut bytes = dataset(&[row("1", "", "", "Quercus", "Oak", "", "Queens")]).into_bytes();
        bytes.extend_from_slice(b"2,,,,,,,,Acer,\"Caf\xe9 maple\"\n");
        bytes.extend_from_slice(row("3", "", "", "Ulmus", "Elm", "", "Bronx").as_bytes());
        bytes.push(b'\n');

        let (census, report) = Census::from_reader(Cursor::new(bytes), &CensusConfig::default())?;

        assert_eq!(report.rows_read, 3);
        assert_eq!(report.rows_rejected, 0);
        assert_eq!(census.trees().total_count(), 3);
        assert_eq!(census.species().find_by_common_name("maple").len(), 1);
        Ok(())
    }

    #[test]
    fn header_only_dataset_loads_empty() -> Result<()> {
        let (census, report) =
            Census::from_reader(Cursor::new(format!("{HEADER}\n")), &CensusConfig::default())?;
        assert!(census.trees().is_empty());
        assert_eq!(report, LoadReport::default());
        Ok(())
    }

    #[test]
    fn load_names_the_path_when_the_file_is_missing() {
        let path = std::env::temp_dir().join("tree_census_no_such_dataset.csv");
        let err = Census::load(&path, &CensusConfig::default()).unwrap_err();
        assert!(err.to_string().contains("tree_census_no_such_dataset.csv"));
        assert!(err.to_string().contains("cannot be opened"));
    }
}
