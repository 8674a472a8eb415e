use aws_sdk_s3::{error::DisplayErrorContext, Client};
use tracing::{debug, error, info};

use crate::{ObjectStore, StorageError, StorageFuture};

/// Object store reading messages from an S3 bucket.
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Creates a new [`S3ObjectStore`] for `bucket` using an existing client.
    pub fn new(client: Client, bucket: String) -> Self {
        info!(bucket = %bucket, "S3 object store initialized");
        Self { client, bucket }
    }

    /// Creates a new [`S3ObjectStore`] for `bucket` from shared SDK configuration.
    pub fn from_conf(sdk_config: &aws_config::SdkConfig, bucket: String) -> Self {
        Self::new(Client::new(sdk_config), bucket)
    }
}

impl ObjectStore for S3ObjectStore {
    fn fetch<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Vec<u8>> {
        Box::pin(async move {
            debug!(bucket = %self.bucket, key = %key, "Fetching object from S3");
            let output = self
                .client
                .get_object()
                .bucket(&self.bucket)
                .key(key)
                .send()
                .await
                .map_err(|e| {
                    let e = e.into_service_error();
                    if e.is_no_such_key() {
                        return StorageError::NotFound;
                    }
                    error!(
                        bucket = %self.bucket,
                        key = %key,
                        error = %DisplayErrorContext(&e),
                        "Failed to fetch object from S3"
                    );
                    StorageError::Backend(DisplayErrorContext(&e).to_string())
                })?;

            let data = output.body.collect().await.map_err(|e| {
                error!(bucket = %self.bucket, key = %key, error = %e, "Failed to read object body");
                StorageError::Backend(e.to_string())
            })?;
            Ok(data.into_bytes().to_vec())
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            self.client
                .delete_object()
                .bucket(&self.bucket)
                .key(key)
                .send()
                .await
                .map_err(|e| {
                    error!(
                        bucket = %self.bucket,
                        key = %key,
                        error = %DisplayErrorContext(&e),
                        "Failed to delete object from S3"
                    );
                    StorageError::Backend(DisplayErrorContext(&e).to_string())
                })?;
            info!(bucket = %self.bucket, key = %key, "Deleted object from S3");
            Ok(())
        })
    }

    fn name(&self) -> &str {
        "s3"
    }
}
