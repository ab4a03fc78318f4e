use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::dataset::Column;

/// The logistics key performance indicators
///
/// The declaration order is the order KPIs are computed and reported in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kpi {
    OnTimeDeliveryRate,
    TransportCostPerUnit,
    VehicleFillRate,
    EmptyKilometres,
    StockTurnover,
    WarehouseOccupancy,
    PickingProductivity,
    StockAccuracy,
    CustomerSatisfaction,
    ComplaintRate,
    PerfectOrderRate,
    BreakageRate,
    PickingErrorRate,
    OperatingMargin,
    CostPerOrder,
}

impl Kpi {
    pub const COUNT: usize = 15;

    pub const ALL: [Kpi; Kpi::COUNT] = [
        Kpi::OnTimeDeliveryRate,
        Kpi::TransportCostPerUnit,
        Kpi::VehicleFillRate,
        Kpi::EmptyKilometres,
        Kpi::StockTurnover,
        Kpi::WarehouseOccupancy,
        Kpi::PickingProductivity,
        Kpi::StockAccuracy,
        Kpi::CustomerSatisfaction,
        Kpi::ComplaintRate,
        Kpi::PerfectOrderRate,
        Kpi::BreakageRate,
        Kpi::PickingErrorRate,
        Kpi::OperatingMargin,
        Kpi::CostPerOrder,
    ];

    /// The name the KPI is reported under
    pub fn name(self) -> &'static str {
        match self {
            Kpi::OnTimeDeliveryRate => "Taux_de_livraison_à_temps",
            Kpi::TransportCostPerUnit => "Coût_de_transport_par_unité",
            Kpi::VehicleFillRate => "Taux de remplissage des véhicules",
            Kpi::EmptyKilometres => "Kilomètres à vide",
            Kpi::StockTurnover => "Taux de rotation des stocks",
            Kpi::WarehouseOccupancy => "Taux_d_occupation_de_l_entrepôt",
            Kpi::PickingProductivity => "Productivité picking",
            Kpi::StockAccuracy => "Précision des stocks",
            Kpi::CustomerSatisfaction => "Taux de satisfaction client",
            Kpi::ComplaintRate => "Taux de réclamations",
            Kpi::PerfectOrderRate => "Perfect Order Rate",
            Kpi::BreakageRate => "Taux de casse",
            Kpi::PickingErrorRate => "Taux d erreurs de préparation",
            Kpi::OperatingMargin => "Marge opérationnelle",
            Kpi::CostPerOrder => "Coût par commande",
        }
    }

    /// The position of the KPI in [`Kpi::ALL`]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// A KPI and the columns whose means it is the ratio of
#[derive(Clone, Copy, Debug)]
pub struct Formula {
    pub kpi: Kpi,
    pub numerator: Column,
    pub denominator: Column,
}

/// The formula of every KPI, in reporting order
pub const FORMULAS: [Formula; Kpi::COUNT] = [
    Formula { kpi: Kpi::OnTimeDeliveryRate, numerator: Column::OnTimeDeliveries, denominator: Column::TotalDeliveries },
    Formula { kpi: Kpi::TransportCostPerUnit, numerator: Column::TransportCost, denominator: Column::TransportedUnits },
    Formula { kpi: Kpi::VehicleFillRate, numerator: Column::UsedVolume, denominator: Column::TotalCapacity },
    Formula { kpi: Kpi::EmptyKilometres, numerator: Column::EmptyKilometres, denominator: Column::TotalKilometres },
    Formula { kpi: Kpi::StockTurnover, numerator: Column::AnnualOutflows, denominator: Column::AverageStock },
    Formula { kpi: Kpi::WarehouseOccupancy, numerator: Column::OccupiedArea, denominator: Column::TotalArea },
    Formula { kpi: Kpi::PickingProductivity, numerator: Column::PreparedLines, denominator: Column::WorkedHours },
    Formula { kpi: Kpi::StockAccuracy, numerator: Column::PhysicalStock, denominator: Column::TheoreticalStock },
    Formula { kpi: Kpi::CustomerSatisfaction, numerator: Column::SatisfiedCustomers, denominator: Column::SurveyedCustomers },
    Formula { kpi: Kpi::ComplaintRate, numerator: Column::Complaints, denominator: Column::TotalOrders },
    Formula { kpi: Kpi::PerfectOrderRate, numerator: Column::PerfectOrders, denominator: Column::TotalOrders },
    Formula { kpi: Kpi::BreakageRate, numerator: Column::DamagedGoodsValue, denominator: Column::Revenue },
    Formula { kpi: Kpi::PickingErrorRate, numerator: Column::PickingErrors, denominator: Column::TotalPreparedLines },
    Formula { kpi: Kpi::OperatingMargin, numerator: Column::OperatingResult, denominator: Column::Revenue },
    Formula { kpi: Kpi::CostPerOrder, numerator: Column::TotalCosts, denominator: Column::TotalOrders },
];

/// The computed KPIs of a dataset
///
/// Serializes to a flat object: the `date` entry first, followed by every
/// KPI name and its value.
#[derive(Clone, Debug, PartialEq)]
pub struct KpiMapping {
    date: NaiveDate,
    values: BTreeMap<Kpi, f64>,
}

impl KpiMapping {
    pub(crate) fn new(date: NaiveDate, values: BTreeMap<Kpi, f64>) -> Self {
        Self { date, values }
    }

    /// The date of the first row of the dataset
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The value of a single KPI
    pub fn get(&self, kpi: Kpi) -> Option<f64> {
        self.values.get(&kpi).copied()
    }

    /// All KPI values, in reporting order
    pub fn values(&self) -> impl Iterator<Item = (Kpi, f64)> + '_ {
        self.values.iter().map(|(&kpi, &value)| (kpi, value))
    }
}

impl serde::Serialize for KpiMapping {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where S: serde::Serializer
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;

        map.serialize_entry("date", &self.date.format("%Y-%m-%d").to_string())?;
        for (kpi, value) in &self.values {
            map.serialize_entry(kpi.name(), value)?;
        }

        map.end()
    }
}
