//! Error types for loading and filtering the aggregate tables.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that halt a dashboard render.
///
/// Zero denominators in KPI or ratio computations are not errors; those
/// computations fall back to `0.0` and never reach this type.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// A required aggregate table has no objects or no rows at its source.
    #[error("aggregate table `{table}` is missing or empty")]
    MissingData { table: String },

    /// A table lacks an expected column, or a cell does not fit the column's type.
    #[error("aggregate table `{table}` has an invalid `{field}` column: {detail}")]
    SchemaMismatch {
        table: String,
        field: String,
        detail: String,
    },

    /// A date or hour range that cannot be applied.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// Listing or reading an object failed.
    #[error("failed to read `{path}`")]
    Storage {
        path: String,
        #[source]
        source: BoxError,
    },

    /// An object was read but could not be decoded.
    #[error("failed to decode `{path}`")]
    Decode {
        path: String,
        #[source]
        source: BoxError,
    },
}

impl DashboardError {
    pub(crate) fn schema(table: &str, field: &str, detail: impl Into<String>) -> Self {
        DashboardError::SchemaMismatch {
            table: table.to_string(),
            field: field.to_string(),
            detail: detail.into(),
        }
    }

    pub(crate) fn storage(path: impl Into<String>, source: impl Into<BoxError>) -> Self {
        DashboardError::Storage {
            path: path.into(),
            source: source.into(),
        }
    }

    pub(crate) fn decode(path: impl Into<String>, source: impl Into<BoxError>) -> Self {
        DashboardError::Decode {
            path: path.into(),
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
