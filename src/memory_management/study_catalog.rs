use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use log::{info, warn};

use crate::error::LoadError;
use crate::models::study::StudyRecord;

pub const ID_COLUMN: &str = "nctId";
pub const INCLUSION_COLUMN: &str = "Inclusion";
pub const EXCLUSION_COLUMN: &str = "Exclusion";

const CRITERIA_DELIMITER: char = '*';

/// Splits a criteria cell into trimmed criterion strings.
/// An empty cell yields a single empty criterion.
pub fn split_criteria(text: &str) -> Vec<String> {
    text.split(CRITERIA_DELIMITER)
        .map(|criterion| criterion.trim().to_string())
        .collect()
}

fn column_index(headers: &StringRecord, column: &'static str, path: &Path) -> Result<usize, LoadError> {
    headers
        .iter()
        .position(|header| header.trim() == column)
        .ok_or_else(|| LoadError::MissingColumn { path: path.to_path_buf(), column })
}

/// Studies in file order, plus whether exclusion criteria had their own column.
#[derive(Debug)]
pub struct Catalog {
    pub studies: Vec<StudyRecord>,
    pub exclusion_from_inclusion: bool,
}

/// Reads the trial catalog in file order.
pub fn load_catalog(path: &Path) -> Result<Vec<StudyRecord>, LoadError> {
    read_catalog(path).map(|catalog| catalog.studies)
}

/// Requires `nctId` and `Inclusion` columns. When there is no `Exclusion`
/// column the exclusion criteria are taken from `Inclusion` as well, which
/// leaves the matcher unable to tell studies apart.
pub fn read_catalog(path: &Path) -> Result<Catalog, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
    let csv_error = |source| LoadError::Csv { path: path.to_path_buf(), source };

    let mut reader = ReaderBuilder::new().flexible(true).from_reader(file);
    let headers = reader.headers().map_err(csv_error)?.clone();

    let id_idx = column_index(&headers, ID_COLUMN, path)?;
    let inclusion_idx = column_index(&headers, INCLUSION_COLUMN, path)?;
    let (exclusion_idx, exclusion_from_inclusion) = match column_index(&headers, EXCLUSION_COLUMN, path) {
        Ok(idx) => (idx, false),
        Err(_) => {
            warn!(
                "{} has no `{}` column, deriving exclusion criteria from `{}`; every adjusted score will be 0",
                path.display(),
                EXCLUSION_COLUMN,
                INCLUSION_COLUMN
            );
            (inclusion_idx, true)
        }
    };

    let mut studies = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        // Short rows and empty cells both read as ""
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        studies.push(StudyRecord {
            id: cell(id_idx).to_string(),
            inclusion_criteria: split_criteria(cell(inclusion_idx)),
            exclusion_criteria: split_criteria(cell(exclusion_idx)),
        });
    }

    info!("Loaded {} studies from {}", studies.len(), path.display());
    Ok(Catalog { studies, exclusion_from_inclusion })
}
