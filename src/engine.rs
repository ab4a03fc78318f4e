use std::collections::BTreeMap;

use log::{debug, warn};

use crate::{Column, Dataset, Kpi, KpiMapping, ThresholdTable, FORMULAS};

/// Possible errors to occur during the computation of the KPIs
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ComputationError {
    #[error("Cannot compute `{}`: the mean of `{}` is zero", .kpi.name(), .column.name())]
    DivisionByZero { kpi: Kpi, column: Column },
    #[error("Cannot compute `{}`: the column `{}` has no values", .kpi.name(), .column.name())]
    NoValues { kpi: Kpi, column: Column },
    #[error("Cannot compute `{}`: the result is not a finite number", .kpi.name())]
    NonFinite { kpi: Kpi },
}

/// The compliance status of a KPI
#[derive(Clone, Copy, Debug, serde::Serialize, PartialEq, Eq)]
pub enum Status {
    Conforme,
    NonConforme,
}

/// The outcome of checking one KPI against its compliance band
#[derive(Clone, Copy, Debug, serde::Serialize, PartialEq)]
pub struct Validation {
    pub value: f64,
    pub iso_compliant: bool,
    pub status: Status,
}

/// The validation of every computed KPI, keyed by KPI
#[derive(Clone, Debug, PartialEq)]
pub struct ValidationReport {
    entries: BTreeMap<Kpi, Validation>,
}

impl ValidationReport {
    /// The validation of a single KPI
    pub fn get(&self, kpi: Kpi) -> Option<&Validation> {
        self.entries.get(&kpi)
    }

    /// The number of validated KPIs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no KPI was validated
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All validations, in reporting order
    pub fn iter(&self) -> impl Iterator<Item = (Kpi, &Validation)> + '_ {
        self.entries.iter().map(|(&kpi, validation)| (kpi, validation))
    }
}

impl serde::Serialize for ValidationReport {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where S: serde::Serializer
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;

        for (kpi, validation) in &self.entries {
            map.serialize_entry(kpi.name(), validation)?;
        }

        map.end()
    }
}

/// The engine computing the KPIs of a dataset and checking their compliance
///
/// The engine only borrows its threshold table, so a single table can back
/// any number of engines, including engines on different threads.
#[derive(Clone, Copy, Debug)]
pub struct KpiEngine<'a> {
    thresholds: &'a ThresholdTable,
}

impl<'a> KpiEngine<'a> {
    /// Creates a new engine validating against `thresholds`
    pub fn new(thresholds: &'a ThresholdTable) -> Self {
        Self { thresholds }
    }

    /// Computes every KPI as the ratio of two column means
    ///
    /// Either all KPIs are computed or an error is returned.
    pub fn calculate(&self, dataset: &Dataset) -> Result<KpiMapping, ComputationError> {
        let mut values = BTreeMap::new();

        for formula in &FORMULAS {
            let kpi = formula.kpi;
            let mean = |column| {
                dataset
                    .mean(column)
                    .ok_or(ComputationError::NoValues { kpi, column })
            };

            let denominator = mean(formula.denominator)?;
            if denominator == 0.0 {
                return Err(ComputationError::DivisionByZero {
                    kpi,
                    column: formula.denominator,
                });
            }
            let numerator = mean(formula.numerator)?;

            let value = numerator / denominator;
            if !(numerator.is_finite() && denominator.is_finite() && value.is_finite()) {
                return Err(ComputationError::NonFinite { kpi });
            }

            debug!("{} = {}", formula.kpi.name(), value);
            values.insert(formula.kpi, value);
        }

        Ok(KpiMapping::new(dataset.first_date(), values))
    }

    /// Checks every computed KPI against its compliance band
    pub fn validate(&self, kpis: &KpiMapping) -> ValidationReport {
        let entries = kpis
            .values()
            .map(|(kpi, value)| {
                let threshold = self.thresholds.get(kpi);
                let iso_compliant = threshold.contains(value);
                if !iso_compliant {
                    warn!(
                        "{} = {} is outside of [{}, {}]",
                        kpi.name(),
                        value,
                        threshold.min(),
                        threshold.max(),
                    );
                }

                let status = match iso_compliant {
                    true => Status::Conforme,
                    false => Status::NonConforme,
                };
                (kpi, Validation { value, iso_compliant, status })
            })
            .collect();

        ValidationReport { entries }
    }
}
