//! Object storage access for the aggregate tables.
//!
//! A source is either an `s3://bucket/prefix` location or a local directory.
//! Both expose the same [`ObjectStore`] trait so the loader never cares
//! where the tables live.

mod client;
mod local;
mod s3;

pub use client::ObjectStore;
pub use local::LocalStore;
pub use s3::{S3Store, client_from_env};

/// A parsed source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    S3 { bucket: String, prefix: String },
    Local(String),
}

impl SourceLocation {
    /// Parses `s3://bucket/prefix`; anything else is treated as a local path.
    pub fn parse(location: &str) -> Self {
        match location.strip_prefix("s3://") {
            Some(rest) => {
                let (bucket, prefix) = rest.split_once('/').unwrap_or((rest, ""));
                SourceLocation::S3 {
                    bucket: bucket.to_string(),
                    prefix: prefix.trim_matches('/').to_string(),
                }
            }
            None => SourceLocation::Local(location.to_string()),
        }
    }

    /// Opens the store this location points at.
    pub async fn open(&self) -> Box<dyn ObjectStore> {
        match self {
            SourceLocation::S3 { bucket, prefix } => {
                Box::new(S3Store::from_env(bucket, prefix).await)
            }
            SourceLocation::Local(root) => Box::new(LocalStore::new(root)),
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceLocation::S3 { bucket, prefix } => write!(f, "s3://{}/{}", bucket, prefix),
            SourceLocation::Local(root) => write!(f, "{}", root),
        }
    }
}
