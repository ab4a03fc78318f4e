use crate::{Error, KpiMapping, ValidationReport};

/// The message attached to every successful response
pub const SUCCESS_MESSAGE: &str = "Fichier téléchargé avec succès";

/// The response to a successfully processed dataset
#[derive(Debug, serde::Serialize)]
pub struct KpiResponse {
    pub message: &'static str,
    pub kpis: KpiMapping,
    pub validation: ValidationReport,
}

impl KpiResponse {
    pub fn new(kpis: KpiMapping, validation: ValidationReport) -> Self {
        Self {
            message: SUCCESS_MESSAGE,
            kpis,
            validation,
        }
    }
}

/// The response to a dataset that could not be processed
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&Error> for ErrorResponse {
    fn from(err: &Error) -> Self {
        Self { error: err.to_string() }
    }
}
