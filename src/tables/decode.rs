//! Decoders from raw object bytes into a [`Frame`].

use std::io::Read;

use chrono::NaiveDate;
use flate2::read::GzDecoder;
use polars::prelude::*;

use super::frame::{Frame, Value};
use crate::error::{DashboardError, Result};

/// Storage formats the upstream job may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Parquet,
    Csv,
    GzipCsv,
}

impl Format {
    /// Picks a format from the object key, or `None` for files we don't read.
    pub fn from_key(key: &str) -> Option<Self> {
        let name = key.rsplit('/').next().unwrap_or(key).to_ascii_lowercase();
        if name.ends_with(".parquet") || name.ends_with(".pq") {
            Some(Format::Parquet)
        } else if name.ends_with(".csv") {
            Some(Format::Csv)
        } else if name.ends_with(".csv.gz") || name.ends_with(".gz") {
            Some(Format::GzipCsv)
        } else {
            None
        }
    }
}

/// Decodes one object. `path` is only used for error messages.
pub fn decode(format: Format, bytes: &[u8], path: &str) -> Result<Frame> {
    match format {
        Format::Parquet => frame_from_parquet(bytes).map_err(|e| DashboardError::decode(path, e)),
        Format::Csv => frame_from_csv(bytes).map_err(|e| DashboardError::decode(path, e)),
        Format::GzipCsv => {
            let mut plain = Vec::new();
            GzDecoder::new(bytes)
                .read_to_end(&mut plain)
                .map_err(|e| DashboardError::decode(path, e))?;
            frame_from_csv(&plain).map_err(|e| DashboardError::decode(path, e))
        }
    }
}

fn frame_from_csv(bytes: &[u8]) -> csv::Result<Frame> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(bytes);
    let columns = rdr.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|cell| {
                    if cell.is_empty() {
                        Value::Null
                    } else {
                        Value::Text(cell.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(Frame::new(columns, rows))
}

fn frame_from_parquet(bytes: &[u8]) -> PolarsResult<Frame> {
    let df = ParquetReader::new(std::io::Cursor::new(bytes.to_vec())).finish()?;

    let mut columns = Vec::with_capacity(df.width());
    let mut values = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        columns.push(column.name().to_string());
        values.push(series_values(column.as_materialized_series())?);
    }

    // Transpose to row-major.
    let mut rows: Vec<Vec<Value>> = (0..df.height())
        .map(|_| Vec::with_capacity(columns.len()))
        .collect();
    for column in values {
        for (row, value) in rows.iter_mut().zip(column) {
            row.push(value);
        }
    }

    Ok(Frame::new(columns, rows))
}

fn series_values(series: &Series) -> PolarsResult<Vec<Value>> {
    let values = match series.dtype() {
        DataType::Date => days_values(series)?,
        DataType::Datetime(_, _) => days_values(&series.cast(&DataType::Date)?)?,
        dtype if dtype.is_float() => {
            let cast = series.cast(&DataType::Float64)?;
            cast.f64()?
                .into_iter()
                .map(|v| v.map_or(Value::Null, Value::Float))
                .collect()
        }
        dtype if dtype.is_integer() => {
            let cast = series.cast(&DataType::Int64)?;
            cast.i64()?
                .into_iter()
                .map(|v| v.map_or(Value::Null, Value::Int))
                .collect()
        }
        _ => {
            let cast = series.cast(&DataType::String)?;
            cast.str()?
                .into_iter()
                .map(|v| v.map_or(Value::Null, |t| Value::Text(t.to_string())))
                .collect()
        }
    };
    Ok(values)
}

/// Converts a `Date` series (days since the Unix epoch) into date values.
fn days_values(series: &Series) -> PolarsResult<Vec<Value>> {
    let cast = series.cast(&DataType::Int32)?;
    Ok(cast
        .i32()?
        .into_iter()
        .map(|days| days.and_then(epoch_days_to_date).map_or(Value::Null, Value::Date))
        .collect())
}

fn epoch_days_to_date(days: i32) -> Option<NaiveDate> {
    // 1970-01-01 is day 719_163 of the proleptic Gregorian calendar.
    NaiveDate::from_num_days_from_ce_opt(719_163 + days)
}
