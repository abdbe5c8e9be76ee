/// Water-quality sample table reader
///
/// Reads CSV text with named columns into typed [`WaterSample`] rows. The four
/// measurement columns are required; position and date are optional. Cells
/// that are empty or not numeric are read as missing.
use chrono::NaiveDate;
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};
use utoipa::ToSchema;

/// Accepted names for the optional date column, in lookup order.
pub const DATE_COLUMNS: [&str; 2] = ["Date", "Date (MM/DD/YYYY)"];

const DATE_FORMATS: [&str; 3] = ["%m/%d/%Y", "%Y-%m-%d", "%Y-%m-%d %H:%M:%S"];

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing column: {0}. Please upload a valid CSV file.")]
    MissingColumn(String),

    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// One sensor sample. `None` marks a missing or unparseable cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WaterSample {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub depth_m: Option<f64>,
    pub temp_c: Option<f64>,
    pub ph: Option<f64>,
    pub odo_mg_l: Option<f64>,
    pub date: Option<NaiveDate>,
}

/// Numeric columns of a sample table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum SampleColumn {
    Latitude,
    Longitude,
    Depth,
    Temperature,
    Ph,
    DissolvedOxygen,
}

impl SampleColumn {
    pub const ALL: [SampleColumn; 6] = [
        SampleColumn::Latitude,
        SampleColumn::Longitude,
        SampleColumn::Depth,
        SampleColumn::Temperature,
        SampleColumn::Ph,
        SampleColumn::DissolvedOxygen,
    ];

    pub const REQUIRED: [SampleColumn; 4] = [
        SampleColumn::Depth,
        SampleColumn::Temperature,
        SampleColumn::Ph,
        SampleColumn::DissolvedOxygen,
    ];

    pub fn header(self) -> &'static str {
        match self {
            SampleColumn::Latitude => "Latitude",
            SampleColumn::Longitude => "Longitude",
            SampleColumn::Depth => "Depth m",
            SampleColumn::Temperature => "Temp °C",
            SampleColumn::Ph => "pH",
            SampleColumn::DissolvedOxygen => "ODO mg/L",
        }
    }

    pub fn from_header(header: &str) -> Option<SampleColumn> {
        SampleColumn::ALL
            .into_iter()
            .find(|c| c.header() == header.trim())
    }

    pub fn value(self, sample: &WaterSample) -> Option<f64> {
        match self {
            SampleColumn::Latitude => sample.latitude,
            SampleColumn::Longitude => sample.longitude,
            SampleColumn::Depth => sample.depth_m,
            SampleColumn::Temperature => sample.temp_c,
            SampleColumn::Ph => sample.ph,
            SampleColumn::DissolvedOxygen => sample.odo_mg_l,
        }
    }

    fn set(self, sample: &mut WaterSample, value: Option<f64>) {
        match self {
            SampleColumn::Latitude => sample.latitude = value,
            SampleColumn::Longitude => sample.longitude = value,
            SampleColumn::Depth => sample.depth_m = value,
            SampleColumn::Temperature => sample.temp_c = value,
            SampleColumn::Ph => sample.ph = value,
            SampleColumn::DissolvedOxygen => sample.odo_mg_l = value,
        }
    }
}

/// A validated sample table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct SampleTable {
    pub samples: Vec<WaterSample>,
    /// Both `Latitude` and `Longitude` columns were present.
    pub has_coordinates: bool,
    /// A date column was present.
    pub has_dates: bool,
}

impl SampleTable {
    /// True if any required measurement is missing in any row.
    pub fn has_missing_values(&self) -> bool {
        self.samples.iter().any(|sample| {
            SampleColumn::REQUIRED
                .iter()
                .any(|column| column.value(sample).is_none())
        })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Read and validate a sample table from CSV text.
///
/// Fails with [`ValidationError::MissingColumn`] naming the first required
/// column that is absent, before any row is read.
#[instrument(skip(csv_text), fields(text_size = csv_text.len()))]
pub fn read_samples(csv_text: &str) -> Result<SampleTable, ValidationError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(csv_text.as_bytes());

    let headers = reader.headers()?.clone();
    let header_index = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}') == name)
    };

    for column in SampleColumn::REQUIRED {
        if header_index(column.header()).is_none() {
            warn!("Sample table is missing required column '{}'", column.header());
            return Err(ValidationError::MissingColumn(column.header().to_string()));
        }
    }

    let column_indexes: Vec<(SampleColumn, usize)> = SampleColumn::ALL
        .into_iter()
        .filter_map(|column| header_index(column.header()).map(|idx| (column, idx)))
        .collect();
    let date_index = DATE_COLUMNS.iter().find_map(|name| header_index(*name));
    let has_coordinates = header_index(SampleColumn::Latitude.header()).is_some()
        && header_index(SampleColumn::Longitude.header()).is_some();

    let mut samples = Vec::new();
    for record in reader.records() {
        let record = record?;
        samples.push(read_row(&record, &column_indexes, date_index));
    }

    debug!("Read {} samples", samples.len());
    Ok(SampleTable {
        samples,
        has_coordinates,
        has_dates: date_index.is_some(),
    })
}

fn read_row(
    record: &StringRecord,
    column_indexes: &[(SampleColumn, usize)],
    date_index: Option<usize>,
) -> WaterSample {
    let mut sample = WaterSample::default();
    for &(column, idx) in column_indexes {
        let value = record
            .get(idx)
            .and_then(|cell| cell.parse::<f64>().ok())
            .filter(|v| v.is_finite());
        column.set(&mut sample, value);
    }
    sample.date = date_index
        .and_then(|idx| record.get(idx))
        .and_then(parse_date);
    sample
}

/// Parse a sample date in any of the accepted formats.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS.iter().find_map(|format| {
        NaiveDate::parse_from_str(value, format)
            .ok()
            .or_else(|| {
                chrono::NaiveDateTime::parse_from_str(value, format)
                    .ok()
                    .map(|dt| dt.date())
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CSV: &str = "\
Date (MM/DD/YYYY),Latitude,Longitude,Depth m,Temp °C,pH,ODO mg/L
10/25/2024,25.91,-80.13,1.2,28.4,8.01,6.5
10/25/2024,25.92,-80.14,2.5,28.1,7.95,3.1
10/26/2024,25.93,-80.15,3.0,27.9,,5.0
";

    #[test]
    fn test_read_samples() {
        let table = read_samples(SAMPLE_CSV).unwrap();

        assert_eq!(table.len(), 3);
        assert!(table.has_coordinates);
        assert!(table.has_dates);
        assert_eq!(table.samples[0].odo_mg_l, Some(6.5));
        assert_eq!(table.samples[1].latitude, Some(25.92));
        assert_eq!(
            table.samples[2].date,
            Some(NaiveDate::from_ymd_opt(2024, 10, 26).unwrap())
        );
    }

    #[test]
    fn test_missing_cell_is_none_and_flagged() {
        let table = read_samples(SAMPLE_CSV).unwrap();
        assert_eq!(table.samples[2].ph, None);
        assert!(table.has_missing_values());
    }

    #[test]
    fn test_missing_required_column_is_named() {
        let csv = "Depth m,Temp °C,ODO mg/L\n1.0,20.0,7.0\n";
        let err = read_samples(csv).unwrap_err();

        match err {
            ValidationError::MissingColumn(name) => assert_eq!(name, "pH"),
            other => panic!("Expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_first_missing_column_reported() {
        let err = read_samples("Latitude,Longitude\n1,2\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing column: Depth m. Please upload a valid CSV file."
        );
    }

    #[test]
    fn test_optional_columns_absent() {
        let csv = "Depth m,Temp °C,pH,ODO mg/L,Chlorophyll RFU\n1.0,20.0,7.5,8.0,0.4\n";
        let table = read_samples(csv).unwrap();

        assert!(!table.has_coordinates);
        assert!(!table.has_dates);
        assert!(!table.has_missing_values());
        assert_eq!(table.samples[0].latitude, None);
    }

    #[test]
    fn test_non_numeric_cells_are_missing() {
        let csv = "Depth m,Temp °C,pH,ODO mg/L\nshallow,20.0,NaN,8.0\n";
        let sample = &read_samples(csv).unwrap().samples[0];
        assert_eq!(sample.depth_m, None);
        assert_eq!(sample.ph, None);
        assert_eq!(sample.odo_mg_l, Some(8.0));
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5);
        assert_eq!(parse_date("03/05/2024"), expected);
        assert_eq!(parse_date("2024-03-05"), expected);
        assert_eq!(parse_date("2024-03-05 14:30:00"), expected);
        assert_eq!(parse_date("March 5"), None);
    }

    #[test]
    fn test_column_headers_round_trip() {
        for column in SampleColumn::ALL {
            assert_eq!(SampleColumn::from_header(column.header()), Some(column));
        }
    }
}
