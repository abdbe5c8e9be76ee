/// CSV export and import of parsed tables.
///
/// Header lines carry the column names (`YY`, `MM`, ... for buoy readings,
/// the sample column names plus `Predicted ...` / `Risk Level` for
/// assessments). Missing values are written as empty cells.
use std::io::{Read, Write};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::assessment::{AssessedSample, ODO_TARGET};
use crate::buoy::feed_parser::coerce;
use crate::buoy::{BuoyColumn, BuoyReading};
use crate::prediction::PredictionTable;
use crate::water_quality::SampleColumn;

pub const RISK_LEVEL_COLUMN: &str = "Risk Level";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown column in readings CSV: {0}")]
    UnknownColumn(String),

    #[error("Exported CSV is not valid UTF-8")]
    Encoding,
}

/// Write readings as CSV, header first, in feed column order.
pub fn write_readings_csv<W: Write>(readings: &[BuoyReading], writer: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(BuoyColumn::ALL.iter().map(|c| c.header()))?;
    for reading in readings {
        wtr.write_record(BuoyColumn::ALL.iter().map(|c| c.format(reading)))?;
    }
    wtr.flush()?;
    Ok(())
}

#[instrument(skip(readings), fields(rows = readings.len()))]
pub fn readings_to_csv(readings: &[BuoyReading]) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_readings_csv(readings, &mut buffer)?;
    debug!("Exported {} bytes of CSV", buffer.len());
    String::from_utf8(buffer).map_err(|_| ExportError::Encoding)
}

/// Read a readings CSV previously written by [`write_readings_csv`].
///
/// Columns are matched by header name, so a subset or reordering of the feed
/// columns is accepted; an unrecognised header is an error.
pub fn read_readings_csv<R: Read>(reader: R) -> Result<Vec<BuoyReading>, ExportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = rdr
        .headers()?
        .iter()
        .map(|h| BuoyColumn::from_header(h).ok_or_else(|| ExportError::UnknownColumn(h.to_string())))
        .collect::<Result<Vec<_>, _>>()?;

    let mut readings = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let mut reading = BuoyReading::default();
        for (column, cell) in columns.iter().zip(record.iter()) {
            column.set(&mut reading, coerce(cell));
        }
        readings.push(reading);
    }
    Ok(readings)
}

/// Write risk-assessed samples: sample columns, predicted ODO, risk level.
pub fn write_assessment_csv<W: Write>(rows: &[AssessedSample], writer: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header: Vec<String> = SampleColumn::ALL.iter().map(|c| c.header().to_string()).collect();
    header.push(PredictionTable::column_name(ODO_TARGET));
    header.push(RISK_LEVEL_COLUMN.to_string());
    wtr.write_record(&header)?;

    for row in rows {
        let mut record: Vec<String> = SampleColumn::ALL
            .iter()
            .map(|c| format_cell(c.value(&row.sample)))
            .collect();
        record.push(format_cell(row.predicted_odo_mg_l));
        record.push(row.risk_level.map(|l| l.to_string()).unwrap_or_default());
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn assessment_to_csv(rows: &[AssessedSample]) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_assessment_csv(rows, &mut buffer)?;
    String::from_utf8(buffer).map_err(|_| ExportError::Encoding)
}

/// Write a prediction table: sample columns then one `Predicted <target>`
/// column per model target.
pub fn write_predictions_csv<W: Write>(table: &PredictionTable, writer: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header: Vec<String> = SampleColumn::ALL.iter().map(|c| c.header().to_string()).collect();
    header.extend(table.targets.iter().map(|t| PredictionTable::column_name(t)));
    wtr.write_record(&header)?;

    for row in &table.rows {
        let mut record: Vec<String> = SampleColumn::ALL
            .iter()
            .map(|c| format_cell(c.value(&row.sample)))
            .collect();
        record.extend(row.predictions.iter().map(|p| format_cell(*p)));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

fn format_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
