//! A small column-named frame that every storage format decodes into.
//!
//! Parquet and CSV parts are decoded into a [`Frame`], then projected into
//! typed rows through [`AggregateRow`]. Projection is where missing columns
//! and uninterpretable cells surface as schema errors.

use chrono::NaiveDate;

use crate::error::{DashboardError, Result};

/// A single decoded cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
}

/// Decoded rows of one object, stored row-major.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub(crate) columns: Vec<String>,
    pub(crate) rows: Vec<Vec<Value>>,
}

impl Frame {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Projects every row into `T`, failing if any of `T::FIELDS` is absent.
    pub fn project<T: AggregateRow>(&self, table: &str) -> Result<Vec<T>> {
        let positions = T::FIELDS
            .iter()
            .map(|field| {
                self.columns
                    .iter()
                    .position(|c| c.eq_ignore_ascii_case(field))
                    .ok_or_else(|| DashboardError::schema(table, field, "column not found"))
            })
            .collect::<Result<Vec<usize>>>()?;

        self.rows
            .iter()
            .map(|row| {
                let values = positions
                    .iter()
                    .zip(T::FIELDS)
                    .map(|(&i, field)| {
                        row.get(i).ok_or_else(|| {
                            DashboardError::schema(table, field, "row is shorter than the header")
                        })
                    })
                    .collect::<Result<Vec<&Value>>>()?;
                T::from_cells(&Cells {
                    table,
                    fields: T::FIELDS,
                    values,
                })
            })
            .collect()
    }
}

/// A typed row of an aggregate table.
pub trait AggregateRow: Sized {
    /// Column names, in the order `from_cells` indexes them.
    const FIELDS: &'static [&'static str];

    fn from_cells(cells: &Cells<'_>) -> Result<Self>;
}

/// The cells of one row, reordered to match [`AggregateRow::FIELDS`].
pub struct Cells<'a> {
    table: &'a str,
    fields: &'static [&'static str],
    values: Vec<&'a Value>,
}

impl Cells<'_> {
    fn mismatch(&self, n: usize, detail: impl Into<String>) -> DashboardError {
        DashboardError::schema(self.table, self.fields[n], detail)
    }

    /// An additive measure. Nulls and blank text count as zero.
    pub fn number(&self, n: usize) -> Result<f64> {
        match self.values[n] {
            Value::Null => Ok(0.0),
            Value::Int(v) => Ok(*v as f64),
            Value::Float(v) => Ok(*v),
            Value::Text(t) if t.trim().is_empty() => Ok(0.0),
            Value::Text(t) => t
                .trim()
                .parse::<f64>()
                .map_err(|_| self.mismatch(n, format!("`{t}` is not a number"))),
            Value::Date(d) => Err(self.mismatch(n, format!("expected a number, found date {d}"))),
        }
    }

    /// A small non-negative key such as an hour or a day of week.
    pub fn small_int(&self, n: usize) -> Result<u8> {
        let raw = match self.values[n] {
            Value::Int(v) => Some(*v),
            Value::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            Value::Text(t) => {
                let t = t.trim();
                t.parse::<i64>().ok().or_else(|| {
                    t.parse::<f64>()
                        .ok()
                        .filter(|v| v.fract() == 0.0)
                        .map(|v| v as i64)
                })
            }
            _ => None,
        };

        raw.and_then(|v| u8::try_from(v).ok())
            .ok_or_else(|| self.mismatch(n, format!("{:?} is not a small integer key", self.values[n])))
    }

    /// A calendar date, from a native date or `YYYY-MM-DD` text.
    pub fn date(&self, n: usize) -> Result<NaiveDate> {
        match self.values[n] {
            Value::Date(d) => Ok(*d),
            Value::Text(t) => {
                let t = t.trim();
                // Timestamps such as `2025-06-02 00:00:00` keep their date part.
                let day = t.get(..10).unwrap_or(t);
                NaiveDate::parse_from_str(day, "%Y-%m-%d")
                    .map_err(|_| self.mismatch(n, format!("`{t}` is not a date")))
            }
            other => Err(self.mismatch(n, format!("expected a date, found {other:?}"))),
        }
    }

    /// A label. Nulls become the empty string.
    pub fn text(&self, n: usize) -> String {
        match self.values[n] {
            Value::Null => String::new(),
            Value::Text(t) => t.trim().to_string(),
            Value::Int(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Date(d) => d.to_string(),
        }
    }
}
