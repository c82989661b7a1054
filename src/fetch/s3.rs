// src/fetch/s3.rs

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::{error::DisplayErrorContext, Client};
use bytes::Bytes;
use tracing::debug;

use super::ObjectStore;

/// [`ObjectStore`] over Amazon S3.
#[derive(Clone)]
pub struct S3Store {
    client: Client,
}

impl S3Store {
    pub fn new(sdk: &SdkConfig) -> Self {
        Self {
            client: Client::new(sdk),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn get(&self, bucket: &str, key: &str) -> Result<Option<Bytes>> {
        let resp = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(resp) => resp,
            Err(err) if err.as_service_error().is_some_and(|e| e.is_no_such_key()) => {
                return Ok(None)
            }
            Err(err) => {
                return Err(anyhow!(
                    "GET s3://{}/{}: {}",
                    bucket,
                    key,
                    DisplayErrorContext(&err)
                ))
            }
        };

        let body = resp
            .body
            .collect()
            .await
            .with_context(|| format!("reading body of s3://{}/{}", bucket, key))?
            .into_bytes();
        debug!(bucket, key, bytes = body.len(), "downloaded object");

        Ok(Some(body))
    }
}
