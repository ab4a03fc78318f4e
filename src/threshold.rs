use crate::kpi::Kpi;

/// Possible errors to occur while building a threshold table
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ThresholdError {
    #[error("The lower bound {min} is greater than the upper bound {max}")]
    InvertedBounds { min: f64, max: f64 },
    #[error("The threshold bounds have to be finite")]
    NonFinite,
    #[error("There's no threshold for `{}`", .0.name())]
    Missing(Kpi),
}

const ISO_BANDS: [(Kpi, f64, f64); Kpi::COUNT] = [
    (Kpi::OnTimeDeliveryRate, 0.90, 1.00),
    (Kpi::TransportCostPerUnit, 0.00, 5.00),
    (Kpi::VehicleFillRate, 0.70, 1.00),
    // at most 20% of the distance is driven empty
    (Kpi::EmptyKilometres, 0.00, 0.20),
    (Kpi::StockTurnover, 2.0, 10.0),
    (Kpi::WarehouseOccupancy, 0.50, 0.90),
    // prepared lines per worked hour
    (Kpi::PickingProductivity, 20.0, 60.0),
    (Kpi::StockAccuracy, 0.95, 1.00),
    (Kpi::CustomerSatisfaction, 0.90, 1.00),
    (Kpi::ComplaintRate, 0.00, 0.05),
    (Kpi::PerfectOrderRate, 0.90, 1.00),
    (Kpi::BreakageRate, 0.00, 0.02),
    (Kpi::PickingErrorRate, 0.00, 0.03),
    (Kpi::OperatingMargin, 0.05, 0.30),
    (Kpi::CostPerOrder, 0.00, 50.00),
];

/// An inclusive compliance band
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Threshold {
    min: f64,
    max: f64,
}

impl Threshold {
    /// Creates a new band from `min` to `max`, both inclusive
    pub fn new(min: f64, max: f64) -> Result<Self, ThresholdError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(ThresholdError::NonFinite);
        }
        if min > max {
            return Err(ThresholdError::InvertedBounds { min, max });
        }

        Ok(Self { min, max })
    }

    /// The lowest compliant value
    pub fn min(&self) -> f64 {
        self.min
    }

    /// The highest compliant value
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Whether `value` lies within the band
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// The compliance band of every KPI
///
/// The table is immutable once built and can be shared freely between
/// threads.
#[derive(Clone, Debug, PartialEq)]
pub struct ThresholdTable {
    bands: [Threshold; Kpi::COUNT],
}

impl ThresholdTable {
    /// Builds a table from `(kpi, threshold)` pairs
    ///
    /// Every KPI needs an entry. If a KPI is listed more than once, the last
    /// entry wins.
    pub fn new<I>(entries: I) -> Result<Self, ThresholdError>
        where I: IntoIterator<Item = (Kpi, Threshold)>
    {
        let mut bands = [None; Kpi::COUNT];
        for (kpi, threshold) in entries {
            bands[kpi.index()] = Some(threshold);
        }

        let mut table = [Threshold { min: 0.0, max: 0.0 }; Kpi::COUNT];
        for kpi in Kpi::ALL {
            table[kpi.index()] = bands[kpi.index()].ok_or(ThresholdError::Missing(kpi))?;
        }

        Ok(Self { bands: table })
    }

    /// The ISO compliance bands for logistics operations
    pub fn iso() -> Self {
        let mut bands = [Threshold { min: 0.0, max: 0.0 }; Kpi::COUNT];
        for (kpi, min, max) in ISO_BANDS {
            bands[kpi.index()] = Threshold { min, max };
        }

        Self { bands }
    }

    /// The band of a single KPI
    pub fn get(&self, kpi: Kpi) -> Threshold {
        self.bands[kpi.index()]
    }
}
