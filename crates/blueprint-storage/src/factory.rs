#[cfg(feature = "storage-cloud")]
use crate::CloudStorage;
#[cfg(feature = "storage-local")]
use crate::LocalStorage;
use crate::{Storage, StorageBackend, StorageError, StorageResult, UnconfiguredStorage};
#[cfg(feature = "storage-cloud")]
use blueprint_core::CloudProvider;
use blueprint_core::UploadConfig;
use std::sync::Arc;

/// Create a storage backend based on configuration
///
/// Selecting cloud storage without a bucket is not an error here: the returned
/// backend rejects every upload with `BackendUnavailable` until the
/// configuration is fixed.
pub fn create_storage(config: &UploadConfig) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend {
        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let storage = LocalStorage::new(
                config.local_files_dir.clone(),
                config.local_files_base_url.clone(),
            );
            tracing::info!(
                directory = %config.local_files_dir.display(),
                base_url = %config.local_files_base_url,
                "Using local file storage"
            );
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::BackendUnavailable(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),

        StorageBackend::Cloud => {
            let Some(bucket) = config.cloud_bucket.clone() else {
                tracing::warn!("Cloud storage selected without a bucket; uploads will be refused");
                return Ok(Arc::new(UnconfiguredStorage::new(
                    StorageBackend::Cloud,
                    "GCS_BUCKET not configured",
                )));
            };
            create_cloud_storage(config, bucket)
        }
    }
}

#[cfg(feature = "storage-cloud")]
fn create_cloud_storage(config: &UploadConfig, bucket: String) -> StorageResult<Arc<dyn Storage>> {
    let storage = match config.cloud_provider {
        CloudProvider::Gcs => CloudStorage::gcs(bucket.clone())?,
        CloudProvider::S3 => {
            let region = config.s3_region.clone().ok_or_else(|| {
                StorageError::BackendUnavailable(
                    "S3_REGION or AWS_REGION not configured".to_string(),
                )
            })?;
            CloudStorage::s3(bucket.clone(), region, config.s3_endpoint.clone())?
        }
    };

    tracing::info!(
        bucket = %bucket,
        provider = ?config.cloud_provider,
        prefix = %config.cloud_key_prefix,
        "Using cloud object storage"
    );

    Ok(Arc::new(
        storage
            .with_prefix(config.cloud_key_prefix.clone())
            .with_url_ttl(config.signed_url_ttl()),
    ))
}

#[cfg(not(feature = "storage-cloud"))]
fn create_cloud_storage(
    _config: &UploadConfig,
    _bucket: String,
) -> StorageResult<Arc<dyn Storage>> {
    Err(StorageError::BackendUnavailable(
        "Cloud storage backend not available (storage-cloud feature not enabled)".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> UploadConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        UploadConfig::from_lookup(|name| map.get(name).cloned()).unwrap()
    }

    #[cfg(feature = "storage-local")]
    #[test]
    fn local_backend_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_from(&[("LOCAL_FILES_DIR", dir.path().to_str().unwrap())]);
        let storage = create_storage(&config).unwrap();
        assert_eq!(storage.backend_type(), StorageBackend::Local);
        assert!(storage.ensure_available().is_ok());
    }

    #[test]
    fn cloud_without_bucket_is_unavailable_not_fatal() {
        let config = config_from(&[("STORAGE_BACKEND", "cloud")]);
        let storage = create_storage(&config).unwrap();
        assert_eq!(storage.backend_type(), StorageBackend::Cloud);
        assert!(matches!(
            storage.ensure_available(),
            Err(StorageError::BackendUnavailable(_))
        ));
    }

    #[cfg(feature = "storage-cloud")]
    #[test]
    fn s3_requires_a_region() {
        let config = config_from(&[("STORAGE_BACKEND", "s3"), ("CLOUD_BUCKET", "plans")]);
        let result = create_storage(&config);
        assert!(matches!(result, Err(StorageError::BackendUnavailable(_))));
    }
}
