//! Filter sets for rendering several dashboards from one table load.

use std::collections::HashSet;

use serde::Deserialize;

use crate::analyzers::dashboard::FilterParams;
use crate::error::{DashboardError, Result};

/// One named filter set. The name becomes the output file stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub name: String,
    pub params: FilterParams,
}

#[derive(Deserialize)]
struct RawBatchEntry {
    name: Option<String>,
    #[serde(flatten)]
    params: FilterParams,
}

/// Parses a JSON array of `{"name", "date_range", "hour_range", "top_n"}`
/// objects. Unnamed entries get `dashboard_<n>` (1-based).
///
/// Names must be unique and usable as a plain file name.
pub fn parse_batch(content: &str) -> Result<Vec<BatchEntry>> {
    let raw: Vec<RawBatchEntry> = serde_json::from_str(content)
        .map_err(|e| DashboardError::InvalidFilter(format!("batch file: {e}")))?;
    if raw.is_empty() {
        return Err(DashboardError::InvalidFilter(
            "batch file contains no filter sets".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    raw.into_iter()
        .enumerate()
        .map(|(i, entry)| {
            let name = entry.name.unwrap_or_else(|| format!("dashboard_{}", i + 1));
            check_name(&name)?;
            if !seen.insert(name.clone()) {
                return Err(DashboardError::InvalidFilter(format!(
                    "filter set name `{name}` is used more than once"
                )));
            }
            Ok(BatchEntry {
                name,
                params: entry.params,
            })
        })
        .collect()
}

fn check_name(name: &str) -> Result<()> {
    let bad = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if bad {
        return Err(DashboardError::InvalidFilter(format!(
            "filter set name `{name}` is not a plain file name"
        )));
    }
    Ok(())
}
