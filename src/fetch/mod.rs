// src/fetch/mod.rs

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use tracing::info;

use crate::{dataset::Dataset, error::FetchError};

pub mod s3;

pub use s3::S3Store;

/// Read access to a bucket/key object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the whole object. `Ok(None)` means the key does not exist.
    async fn get(&self, bucket: &str, key: &str) -> Result<Option<Bytes>>;
}

/// Download `bucket/key` and parse it as a CSV dataset.
#[tracing::instrument(level = "debug", skip(store))]
pub async fn fetch_dataset<S>(store: &S, bucket: &str, key: &str) -> Result<Dataset, FetchError>
where
    S: ObjectStore + ?Sized,
{
    info!("reading file '{}' from bucket '{}'", key, bucket);

    let data = match store.get(bucket, key).await {
        Ok(Some(data)) => data,
        Ok(None) => {
            return Err(FetchError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
        }
        Err(cause) => {
            return Err(FetchError::Storage {
                bucket: bucket.to_string(),
                key: key.to_string(),
                cause,
            })
        }
    };

    let dataset = Dataset::from_csv(&data)
        .map_err(|source| FetchError::Parse {
            key: key.to_string(),
            source,
        })?
        .ok_or_else(|| FetchError::Empty {
            key: key.to_string(),
        })?;

    info!(
        bytes = data.len(),
        rows = dataset.num_rows(),
        columns = dataset.num_columns(),
        "CSV file read successfully"
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;
    use anyhow::anyhow;

    #[tokio::test]
    async fn reads_csv_object() {
        let store = MemoryStore::default().with_object(
            "raw",
            "people.csv",
            "name,age\nAnn,30\nBo,41\n",
        );

        let ds = fetch_dataset(&store, "raw", "people.csv").await.unwrap();

        assert_eq!(ds.num_rows(), 2);
        assert_eq!(ds.column_names(), vec!["name", "age"]);
        assert_eq!(store.gets(), 1);
    }

    #[tokio::test]
    async fn missing_object_is_not_found() {
        let store = MemoryStore::default();

        let err = fetch_dataset(&store, "raw", "nope.csv").await.unwrap_err();

        assert!(matches!(err, FetchError::NotFound { ref key, .. } if key == "nope.csv"));
    }

    #[tokio::test]
    async fn storage_failure_keeps_cause() {
        let store = MemoryStore::default().failing(anyhow!("access denied"));

        let err = fetch_dataset(&store, "raw", "people.csv").await.unwrap_err();

        assert!(matches!(err, FetchError::Storage { .. }));
        assert!(err.to_string().contains("access denied"));
    }

    #[tokio::test]
    async fn malformed_csv_is_a_parse_error() {
        let store = MemoryStore::default().with_object(
            "raw",
            "bad.csv",
            "a,b\n1,2\n3,4,5\n",
        );

        let err = fetch_dataset(&store, "raw", "bad.csv").await.unwrap_err();

        assert!(matches!(err, FetchError::Parse { .. }));
    }

    #[tokio::test]
    async fn empty_object_is_rejected() {
        let store = MemoryStore::default().with_object("raw", "empty.csv", "");

        let err = fetch_dataset(&store, "raw", "empty.csv").await.unwrap_err();

        assert!(matches!(err, FetchError::Empty { .. }));
    }
}
