use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use super::client::{ObjectStore, is_marker};
use crate::error::{DashboardError, Result};

/// An [`ObjectStore`] reading from an S3 bucket under a root prefix.
pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
    root_prefix: String,
}

impl S3Store {
    pub fn new(client: aws_sdk_s3::Client, bucket: &str, root_prefix: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
            root_prefix: root_prefix.trim_matches('/').to_string(),
        }
    }

    /// Creates a store using the ambient AWS configuration, with the region
    /// falling back to `us-east-1` when none is configured.
    pub async fn from_env(bucket: &str, root_prefix: &str) -> Self {
        Self::new(client_from_env().await, bucket, root_prefix)
    }

    fn full_key(&self, key: &str) -> String {
        if self.root_prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}/{}", self.root_prefix, key)
        }
    }

    async fn list_full(&self, full_prefix: &str, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let resp = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(full_prefix)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| DashboardError::storage(self.location(prefix), e))?;

            for object in resp.contents() {
                let Some(full) = object.key() else { continue };
                // Directory placeholders and writer markers carry no rows.
                if full.ends_with('/') {
                    continue;
                }
                let name = full.rsplit('/').next().unwrap_or(full);
                if is_marker(name) {
                    continue;
                }
                keys.push(self.relative_key(full).to_string());
            }

            match resp.next_continuation_token() {
                Some(token) if resp.is_truncated() == Some(true) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }

        Ok(keys)
    }

    fn relative_key<'a>(&self, full: &'a str) -> &'a str {
        if self.root_prefix.is_empty() {
            full
        } else {
            full.strip_prefix(&self.root_prefix)
                .map(|k| k.trim_start_matches('/'))
                .unwrap_or(full)
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    #[tracing::instrument(skip(self), fields(bucket = %self.bucket))]
    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let full = self.full_key(prefix.trim_end_matches('/'));

        // A table is normally a "directory" of part files. Listing with the
        // trailing slash keeps `agg_zone` from also matching `agg_zone_pickup_hour`.
        let mut keys = self.list_full(&format!("{}/", full), prefix).await?;
        if keys.is_empty() {
            keys = self
                .list_full(&full, prefix)
                .await?
                .into_iter()
                .filter(|k| self.full_key(k) == full)
                .collect();
        }

        debug!(objects = keys.len(), "Listed S3 prefix");
        keys.sort();
        Ok(keys)
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(self.full_key(key))
            .send()
            .await
            .map_err(|e| DashboardError::storage(self.location(key), e))?;

        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| DashboardError::storage(self.location(key), e))?;
        Ok(data.into_bytes())
    }

    fn location(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, self.full_key(key))
    }
}

/// Builds an S3 client from the standard AWS credential and region chain,
/// with the region falling back to `us-east-1`.
pub async fn client_from_env() -> aws_sdk_s3::Client {
    let region = aws_config::meta::region::RegionProviderChain::default_provider()
        .or_else("us-east-1");
    let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(region)
        .load()
        .await;
    aws_sdk_s3::Client::new(&config)
}
