pub use self::{
    dataset::{Column, Dataset, DatasetError, DatasetRow, REQUIRED_COLUMNS},
    engine::{ComputationError, KpiEngine, Status, Validation, ValidationReport},
    kpi::{Formula, Kpi, KpiMapping, FORMULAS},
    report::{ErrorResponse, KpiResponse},
    threshold::{Threshold, ThresholdError, ThresholdTable},
    upload::{UploadError, DEFAULT_MAX_SIZE},
};

use std::io;
use std::path::Path;

mod dataset;
mod engine;
mod kpi;
mod report;
mod threshold;
mod upload;

#[cfg(test)]
mod fixtures;

/// Possible errors to occur while processing a dataset
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Computation(#[from] ComputationError),
}

impl Error {
    /// Whether the error was caused by the upload itself rather than by its content
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Upload(UploadError::MissingFile(_) | UploadError::EmptyFile(_) | UploadError::TooLarge { .. })
        )
    }
}

/// Loads a dataset, computes its KPIs and validates them against `thresholds`
///
/// Any failure aborts the whole pipeline, no partial results are returned.
pub fn process<R: io::Read>(source: R, thresholds: &ThresholdTable) -> Result<KpiResponse, Error> {
    let dataset = Dataset::load(source)?;
    let engine = KpiEngine::new(thresholds);
    let kpis = engine.calculate(&dataset)?;
    let validation = engine.validate(&kpis);

    Ok(KpiResponse::new(kpis, validation))
}

/// Like [`process`], but reads the dataset from an uploaded file
///
/// Only regular, non-empty files of at most `max_size` bytes are accepted.
pub fn process_file(path: &Path, max_size: u64, thresholds: &ThresholdTable) -> Result<KpiResponse, Error> {
    let file = upload::open(path, max_size)?;
    process(file, thresholds)
}
