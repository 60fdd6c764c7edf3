use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use super::decode::{Format, decode};
use super::frame::{AggregateRow, Frame};
use super::SourceTables;
use crate::config::TableLayout;
use crate::error::{DashboardError, Result};
use crate::store::ObjectStore;

/// Loads aggregate tables from an [`ObjectStore`], memoizing decoded tables
/// by storage location.
///
/// Only the unfiltered source data is cached. Tables are immutable once
/// written upstream, so a cached entry never needs invalidating within a run.
pub struct TableLoader {
    store: Box<dyn ObjectStore>,
    cache: HashMap<String, Arc<Vec<Frame>>>,
}

impl TableLoader {
    pub fn new(store: Box<dyn ObjectStore>) -> Self {
        Self {
            store,
            cache: HashMap::new(),
        }
    }

    /// Number of distinct table locations held in the cache.
    pub fn cached_tables(&self) -> usize {
        self.cache.len()
    }

    /// Loads every table named by `layout`. The three core tables are
    /// required; the daily-hour, zone-hour and payment tables are optional.
    #[tracing::instrument(skip(self, layout))]
    pub async fn load_sources(&mut self, layout: &TableLayout) -> Result<SourceTables> {
        let tables = SourceTables {
            daily: self.load_required(&layout.daily).await?,
            hour_dow: self.load_required(&layout.hour_dow).await?,
            zones: self.load_required(&layout.zone).await?,
            daily_hours: self.load_optional(&layout.daily_hour).await?,
            zone_hours: self.load_optional(&layout.zone_hour).await?,
            payments: self.load_optional(&layout.payment_hour).await?,
        };

        info!(
            daily = tables.daily.len(),
            hour_dow = tables.hour_dow.len(),
            zones = tables.zones.len(),
            daily_hours = tables.daily_hours.as_ref().map(Vec::len),
            zone_hours = tables.zone_hours.as_ref().map(Vec::len),
            payments = tables.payments.as_ref().map(Vec::len),
            "Source tables loaded"
        );
        Ok(tables)
    }

    /// Loads a table that must exist and contain at least one row.
    pub async fn load_required<T: AggregateRow>(&mut self, table: &str) -> Result<Vec<T>> {
        match self.load_optional(table).await? {
            Some(rows) if !rows.is_empty() => Ok(rows),
            _ => Err(DashboardError::MissingData {
                table: table.to_string(),
            }),
        }
    }

    /// Loads a table, returning `None` when nothing readable exists under its prefix.
    pub async fn load_optional<T: AggregateRow>(&mut self, table: &str) -> Result<Option<Vec<T>>> {
        let Some(frames) = self.frames(table).await? else {
            return Ok(None);
        };

        let mut rows = Vec::new();
        for frame in frames.iter() {
            rows.extend(frame.project::<T>(table)?);
        }
        Ok(Some(rows))
    }

    async fn frames(&mut self, table: &str) -> Result<Option<Arc<Vec<Frame>>>> {
        let location = self.store.location(table);
        if let Some(frames) = self.cache.get(&location) {
            debug!(location = %location, "Table served from cache");
            return Ok(Some(frames.clone()));
        }

        let keys = self.store.list(table).await?;
        let mut frames = Vec::new();
        for key in keys {
            let Some(format) = Format::from_key(&key) else {
                debug!(key = %key, "Skipping object with unknown format");
                continue;
            };
            let bytes = self.store.get(&key).await?;
            let frame = decode(format, &bytes, &self.store.location(&key))?;
            debug!(key = %key, rows = frame.len(), "Decoded table part");
            frames.push(frame);
        }

        if frames.is_empty() {
            debug!(location = %location, "No data objects found");
            return Ok(None);
        }

        let frames = Arc::new(frames);
        self.cache.insert(location, frames.clone());
        Ok(Some(frames))
    }
}
