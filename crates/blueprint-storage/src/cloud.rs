use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use blueprint_core::StoragePolicy;
use bytes::BytesMut;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::gcp::{GoogleCloudStorage, GoogleCloudStorageBuilder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, Attributes, ObjectStoreExt, PutOptions, PutPayload, Result as ObjectResult,
};

use crate::keys::StorageKey;
use crate::limit::{BoundedReader, CHUNK_SIZE};
use crate::traits::{Storage, StorageError, StorageResult, StoredObject, UploadReader};
use crate::StorageBackend;

const DEFAULT_PREFIX: &str = "uploads";
const DEFAULT_URL_TTL: Duration = Duration::from_secs(60);

/// Produces time-limited GET URLs for stored objects
#[async_trait]
pub trait UrlSigner: Send + Sync {
    async fn sign_get(&self, path: &Path, expires_in: Duration) -> ObjectResult<String>;
}

#[async_trait]
impl UrlSigner for GoogleCloudStorage {
    async fn sign_get(&self, path: &Path, expires_in: Duration) -> ObjectResult<String> {
        let url = self.signed_url(Method::GET, path, expires_in).await?;
        Ok(url.to_string())
    }
}

#[async_trait]
impl UrlSigner for AmazonS3 {
    async fn sign_get(&self, path: &Path, expires_in: Duration) -> ObjectResult<String> {
        let url = self.signed_url(Method::GET, path, expires_in).await?;
        Ok(url.to_string())
    }
}

/// Cloud object store implementation
///
/// The object store client and the URL signer are injected, so any
/// `object_store` backend (GCS, S3-compatible, in-memory for tests) can be used.
/// Returned locators are pre-signed GET URLs and expire after `url_ttl`.
#[derive(Clone)]
pub struct CloudStorage {
    store: Arc<dyn object_store::ObjectStore>,
    signer: Arc<dyn UrlSigner>,
    bucket: String,
    prefix: String,
    url_ttl: Duration,
}

impl fmt::Debug for CloudStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudStorage")
            .field("bucket", &self.bucket)
            .field("prefix", &self.prefix)
            .field("url_ttl", &self.url_ttl)
            .finish()
    }
}

impl CloudStorage {
    /// Create a CloudStorage over an existing client
    ///
    /// # Arguments
    /// * `store` - Object store client that owns the bucket
    /// * `signer` - Produces pre-signed URLs for stored objects
    /// * `bucket` - Bucket name (used for logging)
    pub fn new(
        store: Arc<dyn object_store::ObjectStore>,
        signer: Arc<dyn UrlSigner>,
        bucket: impl Into<String>,
    ) -> Self {
        CloudStorage {
            store,
            signer,
            bucket: bucket.into(),
            prefix: DEFAULT_PREFIX.to_string(),
            url_ttl: DEFAULT_URL_TTL,
        }
    }

    /// Namespace objects under `prefix` (an empty prefix stores keys at the bucket root).
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into().trim_matches('/').to_string();
        self
    }

    /// Lifetime of the signed URLs returned by `store`.
    pub fn with_url_ttl(mut self, url_ttl: Duration) -> Self {
        self.url_ttl = url_ttl;
        self
    }

    /// Google Cloud Storage client, credentials taken from the environment
    /// (`GOOGLE_SERVICE_ACCOUNT`, `GOOGLE_APPLICATION_CREDENTIALS`, ...).
    pub fn gcs(bucket: String) -> StorageResult<Self> {
        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(bucket.clone())
            .build()
            .map_err(|e| StorageError::BackendUnavailable(e.to_string()))?;

        let store = Arc::new(store);
        Ok(Self::new(store.clone(), store, bucket))
    }

    /// S3 client for AWS or an S3-compatible provider
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint (e.g. "http://localhost:9000" for MinIO)
    pub fn s3(bucket: String, region: String, endpoint_url: Option<String>) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket.clone());

        if let Some(endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder.with_endpoint(endpoint).with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::BackendUnavailable(e.to_string()))?;

        let store = Arc::new(store);
        Ok(Self::new(store.clone(), store, bucket))
    }

    fn object_path(&self, key: &str) -> Path {
        if self.prefix.is_empty() {
            Path::from(key)
        } else {
            Path::from(format!("{}/{}", self.prefix, key))
        }
    }

    /// Read the whole upload while enforcing the size ceiling, before anything
    /// is sent to the object store.
    async fn read_bounded(reader: UploadReader, max_size: u64) -> StorageResult<BytesMut> {
        let capacity = usize::try_from(max_size).unwrap_or(usize::MAX).min(CHUNK_SIZE);
        let mut buffer = BytesMut::with_capacity(capacity);

        let mut reader = BoundedReader::new(reader, max_size);
        while let Some(chunk) = reader.next_chunk().await? {
            buffer.extend_from_slice(chunk);
        }

        Ok(buffer)
    }

    /// Best-effort removal after a failure that happened once the object existed.
    async fn rollback(&self, location: &Path) {
        let result: ObjectResult<_> = self.store.delete(location).await;
        if let Err(e) = result {
            tracing::warn!(
                error = %e,
                bucket = %self.bucket,
                path = %location,
                "Failed to roll back cloud upload"
            );
        }
    }
}

#[async_trait]
impl Storage for CloudStorage {
    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Cloud
    }

    async fn store(
        &self,
        key: &StorageKey,
        content_type: &str,
        reader: UploadReader,
        policy: &StoragePolicy,
    ) -> StorageResult<StoredObject> {
        let start = std::time::Instant::now();
        let location = self.object_path(key.as_str());

        let buffer = Self::read_bounded(reader, policy.max_size())
            .await
            .map_err(|e| {
                tracing::warn!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Cloud storage upload aborted"
                );
                e
            })?;
        let size = buffer.len() as u64;

        let mut attributes = Attributes::new();
        if !content_type.is_empty() {
            attributes.insert(Attribute::ContentType, content_type.to_string().into());
        }
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        let result: ObjectResult<_> = self
            .store
            .put_opts(&location, PutPayload::from(buffer.freeze()), options)
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                content_type = %content_type,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Cloud storage upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        let url = match self.signer.sign_get(&location, self.url_ttl).await {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    "Failed to sign URL for cloud upload"
                );
                self.rollback(&location).await;
                return Err(StorageError::UploadFailed(format!(
                    "Failed to sign URL: {}",
                    e
                )));
            }
        };

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Cloud storage upload successful"
        );

        Ok(StoredObject { locator: url, size })
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let location = self.object_path(storage_key);

        let result: ObjectResult<_> = self.store.get(&location).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(storage_key.to_string()),
            other => StorageError::DownloadFailed(other.to_string()),
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        Ok(bytes.to_vec())
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let location = self.object_path(storage_key);

        let result: ObjectResult<_> = self.store.delete(&location).await;

        match result {
            Ok(()) | Err(ObjectStoreError::NotFound { .. }) => Ok(()),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %storage_key,
                    "Cloud storage delete failed"
                );
                Err(StorageError::DeleteFailed(e.to_string()))
            }
        }
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let location = self.object_path(storage_key);
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::DownloadFailed(e.to_string())),
        }
    }
}
