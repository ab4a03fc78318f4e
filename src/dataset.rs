use std::io;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use log::{debug, info};

/// The name of the column holding the date of a record
pub const DATE_COLUMN: &str = "Date";
/// The name of the column holding the warehouse label of a record
pub const WAREHOUSE_COLUMN: &str = "Entrepôt";

/// Every column a dataset has to provide, in the order they are checked
pub const REQUIRED_COLUMNS: [&str; 29] = [
    DATE_COLUMN,
    WAREHOUSE_COLUMN,
    "Kilomètres_à_vide",
    "Capacité_total_km_parcourus",
    "Stock_moyen",
    "Sorties_annuelles",
    "Surface_occupée",
    "Surface_totale",
    "Lignes_préparées",
    "Heures_travaillées",
    "Stock_physique",
    "Stock_théorique",
    "Clients_satisfaits",
    "Total_clients_interrogés",
    "Nombre_de_réclamations",
    "Total_commandes",
    "Commandes_parfaites",
    "Valeur_marchandises_endommagées",
    "Nombre_de_livraisons_à_temps",
    "Nombre_total_de_livraisons",
    "Coût_total_transport",
    "Nombre_unités_transportées",
    "Volume_utilisé",
    "Capacité_totale",
    "Erreurs_de_picking",
    "Total_lignes_préparées",
    "Coûts_totaux",
    "Résultat_opérationnel",
    "Chiffre_d_affaires",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Possible errors to occur while loading a dataset
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("The required column `{0}` is missing")]
    MissingColumn(&'static str),
    #[error("Line {line}: `{value}` is not a valid date")]
    InvalidDate { line: u64, value: String },
    #[error("Line {line}: `{value}` in column `{column}` is not a finite number")]
    InvalidNumber { line: u64, column: String, value: String },
    #[error("The dataset does not contain any rows")]
    Empty,
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// The numeric columns of a dataset
///
/// Every KPI is the ratio of the means of two of these columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Column {
    EmptyKilometres,
    TotalKilometres,
    AverageStock,
    AnnualOutflows,
    OccupiedArea,
    TotalArea,
    PreparedLines,
    WorkedHours,
    PhysicalStock,
    TheoreticalStock,
    SatisfiedCustomers,
    SurveyedCustomers,
    Complaints,
    TotalOrders,
    PerfectOrders,
    DamagedGoodsValue,
    OnTimeDeliveries,
    TotalDeliveries,
    TransportCost,
    TransportedUnits,
    UsedVolume,
    TotalCapacity,
    PickingErrors,
    TotalPreparedLines,
    TotalCosts,
    OperatingResult,
    Revenue,
}

impl Column {
    pub const ALL: [Column; 27] = [
        Column::EmptyKilometres,
        Column::TotalKilometres,
        Column::AverageStock,
        Column::AnnualOutflows,
        Column::OccupiedArea,
        Column::TotalArea,
        Column::PreparedLines,
        Column::WorkedHours,
        Column::PhysicalStock,
        Column::TheoreticalStock,
        Column::SatisfiedCustomers,
        Column::SurveyedCustomers,
        Column::Complaints,
        Column::TotalOrders,
        Column::PerfectOrders,
        Column::DamagedGoodsValue,
        Column::OnTimeDeliveries,
        Column::TotalDeliveries,
        Column::TransportCost,
        Column::TransportedUnits,
        Column::UsedVolume,
        Column::TotalCapacity,
        Column::PickingErrors,
        Column::TotalPreparedLines,
        Column::TotalCosts,
        Column::OperatingResult,
        Column::Revenue,
    ];

    /// The header of the column in the source file
    pub fn name(self) -> &'static str {
        match self {
            Column::EmptyKilometres => "Kilomètres_à_vide",
            Column::TotalKilometres => "Capacité_total_km_parcourus",
            Column::AverageStock => "Stock_moyen",
            Column::AnnualOutflows => "Sorties_annuelles",
            Column::OccupiedArea => "Surface_occupée",
            Column::TotalArea => "Surface_totale",
            Column::PreparedLines => "Lignes_préparées",
            Column::WorkedHours => "Heures_travaillées",
            Column::PhysicalStock => "Stock_physique",
            Column::TheoreticalStock => "Stock_théorique",
            Column::SatisfiedCustomers => "Clients_satisfaits",
            Column::SurveyedCustomers => "Total_clients_interrogés",
            Column::Complaints => "Nombre_de_réclamations",
            Column::TotalOrders => "Total_commandes",
            Column::PerfectOrders => "Commandes_parfaites",
            Column::DamagedGoodsValue => "Valeur_marchandises_endommagées",
            Column::OnTimeDeliveries => "Nombre_de_livraisons_à_temps",
            Column::TotalDeliveries => "Nombre_total_de_livraisons",
            Column::TransportCost => "Coût_total_transport",
            Column::TransportedUnits => "Nombre_unités_transportées",
            Column::UsedVolume => "Volume_utilisé",
            Column::TotalCapacity => "Capacité_totale",
            Column::PickingErrors => "Erreurs_de_picking",
            Column::TotalPreparedLines => "Total_lignes_préparées",
            Column::TotalCosts => "Coûts_totaux",
            Column::OperatingResult => "Résultat_opérationnel",
            Column::Revenue => "Chiffre_d_affaires",
        }
    }
}

/// The numeric part of a record, deserialized by header name
///
/// Blank cells are kept as `None`.
#[derive(Debug, Clone, serde::Deserialize)]
struct Figures {
    #[serde(rename = "Kilomètres_à_vide")]
    empty_kilometres: Option<f64>,
    #[serde(rename = "Capacité_total_km_parcourus")]
    total_kilometres: Option<f64>,
    #[serde(rename = "Stock_moyen")]
    average_stock: Option<f64>,
    #[serde(rename = "Sorties_annuelles")]
    annual_outflows: Option<f64>,
    #[serde(rename = "Surface_occupée")]
    occupied_area: Option<f64>,
    #[serde(rename = "Surface_totale")]
    total_area: Option<f64>,
    #[serde(rename = "Lignes_préparées")]
    prepared_lines: Option<f64>,
    #[serde(rename = "Heures_travaillées")]
    worked_hours: Option<f64>,
    #[serde(rename = "Stock_physique")]
    physical_stock: Option<f64>,
    #[serde(rename = "Stock_théorique")]
    theoretical_stock: Option<f64>,
    #[serde(rename = "Clients_satisfaits")]
    satisfied_customers: Option<f64>,
    #[serde(rename = "Total_clients_interrogés")]
    surveyed_customers: Option<f64>,
    #[serde(rename = "Nombre_de_réclamations")]
    complaints: Option<f64>,
    #[serde(rename = "Total_commandes")]
    total_orders: Option<f64>,
    #[serde(rename = "Commandes_parfaites")]
    perfect_orders: Option<f64>,
    #[serde(rename = "Valeur_marchandises_endommagées")]
    damaged_goods_value: Option<f64>,
    #[serde(rename = "Nombre_de_livraisons_à_temps")]
    on_time_deliveries: Option<f64>,
    #[serde(rename = "Nombre_total_de_livraisons")]
    total_deliveries: Option<f64>,
    #[serde(rename = "Coût_total_transport")]
    transport_cost: Option<f64>,
    #[serde(rename = "Nombre_unités_transportées")]
    transported_units: Option<f64>,
    #[serde(rename = "Volume_utilisé")]
    used_volume: Option<f64>,
    #[serde(rename = "Capacité_totale")]
    total_capacity: Option<f64>,
    #[serde(rename = "Erreurs_de_picking")]
    picking_errors: Option<f64>,
    #[serde(rename = "Total_lignes_préparées")]
    total_prepared_lines: Option<f64>,
    #[serde(rename = "Coûts_totaux")]
    total_costs: Option<f64>,
    #[serde(rename = "Résultat_opérationnel")]
    operating_result: Option<f64>,
    #[serde(rename = "Chiffre_d_affaires")]
    revenue: Option<f64>,
}

/// A single record of a logistics dataset
///
/// A row can only be constructed by [`Dataset::load`], so every numeric
/// column is either blank or holds a finite value.
#[derive(Debug, Clone)]
pub struct DatasetRow {
    date: NaiveDate,
    warehouse: String,
    figures: Figures,
}

impl DatasetRow {
    /// The date of the record
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The warehouse the record was reported by
    pub fn warehouse(&self) -> &str {
        &self.warehouse
    }

    /// The value of a numeric column, `None` if the cell is blank
    pub fn value(&self, column: Column) -> Option<f64> {
        let f = &self.figures;
        match column {
            Column::EmptyKilometres => f.empty_kilometres,
            Column::TotalKilometres => f.total_kilometres,
            Column::AverageStock => f.average_stock,
            Column::AnnualOutflows => f.annual_outflows,
            Column::OccupiedArea => f.occupied_area,
            Column::TotalArea => f.total_area,
            Column::PreparedLines => f.prepared_lines,
            Column::WorkedHours => f.worked_hours,
            Column::PhysicalStock => f.physical_stock,
            Column::TheoreticalStock => f.theoretical_stock,
            Column::SatisfiedCustomers => f.satisfied_customers,
            Column::SurveyedCustomers => f.surveyed_customers,
            Column::Complaints => f.complaints,
            Column::TotalOrders => f.total_orders,
            Column::PerfectOrders => f.perfect_orders,
            Column::DamagedGoodsValue => f.damaged_goods_value,
            Column::OnTimeDeliveries => f.on_time_deliveries,
            Column::TotalDeliveries => f.total_deliveries,
            Column::TransportCost => f.transport_cost,
            Column::TransportedUnits => f.transported_units,
            Column::UsedVolume => f.used_volume,
            Column::TotalCapacity => f.total_capacity,
            Column::PickingErrors => f.picking_errors,
            Column::TotalPreparedLines => f.total_prepared_lines,
            Column::TotalCosts => f.total_costs,
            Column::OperatingResult => f.operating_result,
            Column::Revenue => f.revenue,
        }
    }
}

/// A validated logistics dataset
///
/// The schema is checked once while loading. Afterwards column access cannot
/// fail, and the dataset holds at least one row.
#[derive(Debug, Clone)]
pub struct Dataset {
    rows: Vec<DatasetRow>,
}

impl Dataset {
    /// Parses a comma separated dataset with a header row
    ///
    /// The dates of all rows are checked first, then the remaining required
    /// columns, then the numeric values row by row.
    pub fn load<R: io::Read>(source: R) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(source);
        let headers = reader.headers()?.clone();
        debug!("dataset header has {} columns", headers.len());

        let date_index = column_index(&headers, DATE_COLUMN)
            .ok_or(DatasetError::MissingColumn(DATE_COLUMN))?;
        let records = reader.records().collect::<Result<Vec<_>, _>>()?;

        let dates = records
            .iter()
            .map(|record| {
                let raw = record.get(date_index).unwrap_or_default();
                parse_date(raw).ok_or_else(|| DatasetError::InvalidDate {
                    line: line_of(record),
                    value: raw.to_owned(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(missing) = REQUIRED_COLUMNS
            .iter()
            .find(|&&name| column_index(&headers, name).is_none())
        {
            return Err(DatasetError::MissingColumn(*missing));
        }
        if records.is_empty() {
            return Err(DatasetError::Empty);
        }

        // the presence of the column was checked above
        let warehouse_index = column_index(&headers, WAREHOUSE_COLUMN).unwrap_or_default();

        let rows = records
            .iter()
            .zip(dates)
            .map(|(record, date)| {
                let figures = record
                    .deserialize::<Figures>(Some(&headers))
                    .map_err(|err| classify_error(err, record, &headers))?;
                let row = DatasetRow {
                    date,
                    warehouse: record.get(warehouse_index).unwrap_or_default().to_owned(),
                    figures,
                };

                let non_finite = Column::ALL
                    .into_iter()
                    .find(|&c| row.value(c).map_or(false, |value| !value.is_finite()));
                if let Some(column) = non_finite {
                    let value = column_index(&headers, column.name())
                        .and_then(|index| record.get(index))
                        .unwrap_or_default();
                    return Err(DatasetError::InvalidNumber {
                        line: line_of(record),
                        column: column.name().to_owned(),
                        value: value.to_owned(),
                    });
                }

                Ok(row)
            })
            .collect::<Result<Vec<_>, _>>()?;
        info!("loaded dataset with {} rows", rows.len());

        Ok(Self { rows })
    }

    /// All rows, in the order of the source file
    pub fn rows(&self) -> &[DatasetRow] {
        &self.rows
    }

    /// The date of the first row
    pub fn first_date(&self) -> NaiveDate {
        // a loaded dataset is never empty
        self.rows[0].date
    }

    /// The arithmetic mean of a column over its non-blank cells
    ///
    /// Returns `None` if every cell of the column is blank. The mean is
    /// accumulated incrementally, so large values don't overflow a running
    /// sum.
    pub fn mean(&self, column: Column) -> Option<f64> {
        let mut mean = None;
        let mut count = 0.0;
        for value in self.rows.iter().filter_map(|row| row.value(column)) {
            count += 1.0;
            let current = mean.unwrap_or(0.0);
            mean = Some(current + (value - current) / count);
        }

        mean
    }
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map_or(0, |position| position.line())
}

fn column_index(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|header| header == name)
}

/// Parses a date, accepting plain dates as well as timestamps
///
/// The time of a timestamp is dropped.
fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|timestamp| timestamp.date())
        })
}

/// Attributes a deserialization failure to the offending column
fn classify_error(err: csv::Error, record: &StringRecord, headers: &StringRecord) -> DatasetError {
    let field = match err.kind() {
        csv::ErrorKind::Deserialize { err, .. } => err.field(),
        _ => None,
    };
    let located = field
        .map(|field| field as usize)
        .and_then(|index| Some((headers.get(index)?, record.get(index)?)));

    match located {
        Some((column, value)) => DatasetError::InvalidNumber {
            line: line_of(record),
            column: column.to_owned(),
            value: value.to_owned(),
        },
        None => DatasetError::Csv(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{csv, csv_without};

    #[test]
    fn keeps_row_order() {
        let source = csv(&[
            &[("Date", "2024-01-05"), ("Entrepôt", "Lyon")],
            &[("Date", "2024-01-06"), ("Entrepôt", "Lille")],
        ]);
        let dataset = Dataset::load(source.as_bytes()).unwrap();

        assert_eq!(dataset.rows().len(), 2);
        assert_eq!(dataset.first_date(), NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(dataset.rows()[1].date(), NaiveDate::from_ymd_opt(2024, 1, 6).unwrap());
        assert_eq!(dataset.rows()[0].warehouse(), "Lyon");
        assert_eq!(dataset.rows()[1].warehouse(), "Lille");
    }

    #[test]
    fn column_mean() {
        let source = csv(&[
            &[("Nombre_de_livraisons_à_temps", "90")],
            &[("Nombre_de_livraisons_à_temps", "95")],
        ]);
        let dataset = Dataset::load(source.as_bytes()).unwrap();

        assert_eq!(dataset.mean(Column::OnTimeDeliveries), Some(92.5));
        assert_eq!(dataset.mean(Column::TotalDeliveries), Some(100.0));
    }

    #[test]
    fn blank_cells_are_skipped() {
        let source = csv(&[&[("Coûts_totaux", "")], &[]]);
        let dataset = Dataset::load(source.as_bytes()).unwrap();

        assert_eq!(dataset.rows()[0].value(Column::TotalCosts), None);
        assert_eq!(dataset.rows()[1].value(Column::TotalCosts), Some(3000.0));
        assert_eq!(dataset.mean(Column::TotalCosts), Some(3000.0));
    }

    #[test]
    fn blank_column_has_no_mean() {
        let source = csv(&[&[("Surface_totale", "")], &[("Surface_totale", "")]]);
        let dataset = Dataset::load(source.as_bytes()).unwrap();

        assert_eq!(dataset.mean(Column::TotalArea), None);
    }

    #[test]
    fn mean_of_huge_values() {
        let source = csv(&[&[("Stock_moyen", "1.5e308")], &[("Stock_moyen", "1.5e308")]]);
        let dataset = Dataset::load(source.as_bytes()).unwrap();

        assert_eq!(dataset.mean(Column::AverageStock), Some(1.5e308));
    }

    #[test]
    fn missing_column() {
        let source = csv_without("Stock_théorique", &[&[]]);
        let err = Dataset::load(source.as_bytes()).unwrap_err();

        assert!(matches!(err, DatasetError::MissingColumn("Stock_théorique")));
        assert_eq!(err.to_string(), "The required column `Stock_théorique` is missing");
    }

    #[test]
    fn missing_date_column() {
        let source = csv_without("Date", &[&[]]);
        let err = Dataset::load(source.as_bytes()).unwrap_err();

        assert!(matches!(err, DatasetError::MissingColumn("Date")));
    }

    #[test]
    fn empty_source() {
        let err = Dataset::load("".as_bytes()).unwrap_err();

        assert!(matches!(err, DatasetError::MissingColumn("Date")));
    }

    #[test]
    fn header_only() {
        let source = csv(&[]);
        let err = Dataset::load(source.as_bytes()).unwrap_err();

        assert!(matches!(err, DatasetError::Empty));
    }

    #[test]
    fn invalid_date() {
        let source = csv(&[&[], &[("Date", "2024-02-30")]]);
        let err = Dataset::load(source.as_bytes()).unwrap_err();

        match err {
            DatasetError::InvalidDate { line, value } => {
                assert_eq!(line, 3);
                assert_eq!(value, "2024-02-30");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_numeric_value() {
        let source = csv(&[&[("Stock_moyen", "beaucoup")]]);
        let err = Dataset::load(source.as_bytes()).unwrap_err();

        match err {
            DatasetError::InvalidNumber { line, column, value } => {
                assert_eq!(line, 2);
                assert_eq!(column, "Stock_moyen");
                assert_eq!(value, "beaucoup");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_date_before_missing_column() {
        let source = csv_without("Stock_théorique", &[&[("Date", "not-a-date")]]);
        let err = Dataset::load(source.as_bytes()).unwrap_err();

        match err {
            DatasetError::InvalidDate { line, value } => {
                assert_eq!(line, 2);
                assert_eq!(value, "not-a-date");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_date_before_invalid_number() {
        let source = csv(&[&[("Stock_moyen", "beaucoup")], &[("Date", "not-a-date")]]);
        let err = Dataset::load(source.as_bytes()).unwrap_err();

        match err {
            DatasetError::InvalidDate { line, value } => {
                assert_eq!(line, 3);
                assert_eq!(value, "not-a-date");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_finite_value() {
        let source = csv(&[&[("Coûts_totaux", "NaN")]]);
        let err = Dataset::load(source.as_bytes()).unwrap_err();

        match err {
            DatasetError::InvalidNumber { column, value, .. } => {
                assert_eq!(column, "Coûts_totaux");
                assert_eq!(value, "NaN");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ragged_row() {
        let source = format!("{}1,2\n", csv(&[&[]]));
        let err = Dataset::load(source.as_bytes()).unwrap_err();

        assert!(matches!(err, DatasetError::Csv(_)));
    }

    #[test]
    fn extra_columns_and_whitespace() {
        let source = "Commentaire, Date , Entrepôt, Kilomètres_à_vide, Capacité_total_km_parcourus, Stock_moyen, \
            Sorties_annuelles, Surface_occupée, Surface_totale, Lignes_préparées, Heures_travaillées, \
            Stock_physique, Stock_théorique, Clients_satisfaits, Total_clients_interrogés, \
            Nombre_de_réclamations, Total_commandes, Commandes_parfaites, Valeur_marchandises_endommagées, \
            Nombre_de_livraisons_à_temps, Nombre_total_de_livraisons, Coût_total_transport, \
            Nombre_unités_transportées, Volume_utilisé, Capacité_totale, Erreurs_de_picking, \
            Total_lignes_préparées, Coûts_totaux, Résultat_opérationnel, Chiffre_d_affaires\n\
            ras, 2024-03-01, Nantes, 10, 100, 100, 500, 70, 100, 300, 10, 98, 100, 95, 100, 2, 100, 95, \
            100, 95, 100, 400, 100, 80, 100, 1, 100, 3000, 1500, 10000\n";
        let dataset = Dataset::load(source.as_bytes()).unwrap();

        let row = &dataset.rows()[0];
        assert_eq!(row.warehouse(), "Nantes");
        assert_eq!(row.value(Column::EmptyKilometres), Some(10.0));
        assert_eq!(row.value(Column::Revenue), Some(10000.0));
    }

    macro_rules! date_test {
        (
            $name:ident
            $raw:literal
            ($year:literal, $month:literal, $day:literal)
        ) => {
            #[test]
            fn $name() {
                let source = csv(&[&[("Date", $raw)]]);
                let dataset = Dataset::load(source.as_bytes()).unwrap();

                assert_eq!(
                    dataset.first_date(),
                    NaiveDate::from_ymd_opt($year, $month, $day).unwrap(),
                );
            }
        };
    }

    date_test!(iso_date "2024-01-05" (2024, 1, 5));
    date_test!(slashed_date "2024/01/05" (2024, 1, 5));
    date_test!(month_first_date "01/05/2024" (2024, 1, 5));
    date_test!(timestamp "2024-01-05 13:45:00" (2024, 1, 5));
    date_test!(iso_timestamp "2024-01-05T13:45:00" (2024, 1, 5));
}
