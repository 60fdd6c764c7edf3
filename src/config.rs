//! Source location and table layout, read from the environment.
//!
//! `.env` files are loaded by the binary before this runs.

use crate::store::SourceLocation;

const DEFAULT_BUCKET: &str = "nyc-taxi-portfolio-frm";
const DEFAULT_PREFIX: &str = "agg_v3";

/// Prefixes of each aggregate table, relative to the source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    pub daily: String,
    pub hour_dow: String,
    pub zone: String,
    pub daily_hour: String,
    pub zone_hour: String,
    pub payment_hour: String,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            daily: "agg_daily".to_string(),
            hour_dow: "agg_hour_dow".to_string(),
            zone: "agg_zone".to_string(),
            daily_hour: "agg_daily_hour".to_string(),
            zone_hour: "agg_zone_pickup_hour".to_string(),
            payment_hour: "agg_payment_hour".to_string(),
        }
    }
}

impl TableLayout {
    /// Default layout with `TAXI_TABLE_*` overrides applied.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let pick = |key: &str, default: String| lookup(key).filter(|v| !v.is_empty()).unwrap_or(default);
        Self {
            daily: pick("TAXI_TABLE_DAILY", defaults.daily),
            hour_dow: pick("TAXI_TABLE_HOUR_DOW", defaults.hour_dow),
            zone: pick("TAXI_TABLE_ZONE", defaults.zone),
            daily_hour: pick("TAXI_TABLE_DAILY_HOUR", defaults.daily_hour),
            zone_hour: pick("TAXI_TABLE_ZONE_HOUR", defaults.zone_hour),
            payment_hour: pick("TAXI_TABLE_PAYMENT_HOUR", defaults.payment_hour),
        }
    }
}

/// Where the tables live and how they are laid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub location: SourceLocation,
    pub layout: TableLayout,
}

impl SourceConfig {
    /// Reads `TAXI_SOURCE`, falling back to `s3://{BUCKET}/{PREFIX}`.
    /// A non-empty `override_location` (from the CLI) wins over both.
    pub fn from_env(override_location: Option<&str>) -> Self {
        Self::from_lookup(override_location, |key| std::env::var(key).ok())
    }

    fn from_lookup(
        override_location: Option<&str>,
        lookup: impl Fn(&str) -> Option<String> + Copy,
    ) -> Self {
        let location = override_location
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .or_else(|| lookup("TAXI_SOURCE").filter(|v| !v.is_empty()))
            .unwrap_or_else(|| {
                let bucket = lookup("BUCKET")
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| DEFAULT_BUCKET.to_string());
                let prefix = lookup("PREFIX")
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(|| DEFAULT_PREFIX.to_string());
                format!("s3://{}/{}", bucket, prefix)
            });

        Self {
            location: SourceLocation::parse(&location),
            layout: TableLayout::from_lookup(lookup),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> + Copy {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_defaults_point_at_portfolio_bucket() {
        let config = SourceConfig::from_lookup(None, vars(&[]));
        assert_eq!(
            config.location,
            SourceLocation::S3 {
                bucket: "nyc-taxi-portfolio-frm".to_string(),
                prefix: "agg_v3".to_string(),
            }
        );
        assert_eq!(config.layout, TableLayout::default());
    }

    #[test]
    fn test_bucket_and_prefix_vars() {
        let config = SourceConfig::from_lookup(None, vars(&[("BUCKET", "b"), ("PREFIX", "agg_v4")]));
        assert_eq!(config.location.to_string(), "s3://b/agg_v4");
    }

    #[test]
    fn test_empty_bucket_and_prefix_fall_back_to_defaults() {
        let config = SourceConfig::from_lookup(None, vars(&[("BUCKET", ""), ("PREFIX", "")]));
        assert_eq!(config.location.to_string(), "s3://nyc-taxi-portfolio-frm/agg_v3");
    }

    #[test]
    fn test_cli_override_wins() {
        let config = SourceConfig::from_lookup(
            Some("tests/fixtures/agg"),
            vars(&[("TAXI_SOURCE", "s3://other/x")]),
        );
        assert_eq!(config.location, SourceLocation::Local("tests/fixtures/agg".to_string()));
    }

    #[test]
    fn test_table_overrides() {
        let config = SourceConfig::from_lookup(
            None,
            vars(&[
                ("TAXI_SOURCE", "data"),
                ("TAXI_TABLE_DAILY", "agg_daily_v2"),
                ("TAXI_TABLE_ZONE_HOUR", ""),
                ("TAXI_TABLE_DAILY_HOUR", "agg_daily_hour_v2"),
            ]),
        );
        assert_eq!(config.layout.daily, "agg_daily_v2");
        assert_eq!(config.layout.daily_hour, "agg_daily_hour_v2");
        assert_eq!(config.layout.zone_hour, "agg_zone_pickup_hour");
    }
}
