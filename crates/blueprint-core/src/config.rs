//! Configuration module
//!
//! This module loads the upload configuration from the environment: the storage
//! backend selector, the local directory, the cloud bucket and the upload policy.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::policy::{ContentTypeRule, StoragePolicy, DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_MAX_FILE_SIZE};
use crate::storage_types::StorageBackend;

const LOCAL_FILES_DIR: &str = "/tmp/blueprint/uploads";
const LOCAL_FILES_BASE_URL: &str = "/files";
const CLOUD_KEY_PREFIX: &str = "uploads";
const SIGNED_URL_TTL_SECS: u64 = 60;

/// Object store provider used by the cloud backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudProvider {
    Gcs,
    S3,
}

impl FromStr for CloudProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gcs" | "gcp" | "google" => Ok(CloudProvider::Gcs),
            "s3" | "aws" => Ok(CloudProvider::S3),
            _ => Err(anyhow::anyhow!("Invalid cloud provider: {}", s)),
        }
    }
}

/// Upload configuration
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub environment: String,
    pub storage_backend: StorageBackend,
    pub cloud_provider: CloudProvider,
    pub local_files_dir: PathBuf,
    pub local_files_base_url: String,
    pub max_file_size_bytes: u64,
    pub allowed_extensions: Vec<String>,
    pub allowed_content_types: Vec<ContentTypeRule>,
    // Cloud storage configuration; the bucket is checked at the first cloud upload
    pub cloud_bucket: Option<String>,
    pub cloud_key_prefix: String,
    pub signed_url_ttl_secs: u64,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
}

impl UploadConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|name| env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|s| !s.trim().is_empty());

        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let backend_raw = var("STORAGE_BACKEND").unwrap_or_else(|| "local".to_string());
        let storage_backend = backend_raw.parse::<StorageBackend>()?;

        let cloud_provider = match var("CLOUD_PROVIDER") {
            Some(provider) => provider.parse::<CloudProvider>()?,
            None if backend_raw.trim().eq_ignore_ascii_case("s3") => CloudProvider::S3,
            None => CloudProvider::Gcs,
        };

        let max_file_size_bytes = match var("MAX_FILE_SIZE") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| anyhow::anyhow!("MAX_FILE_SIZE must be a number of bytes"))?,
            None => DEFAULT_MAX_FILE_SIZE,
        };

        let allowed_extensions = match var("ALLOWED_EXTENSIONS") {
            Some(raw) => split_csv(&raw),
            None => DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };

        let allowed_content_types = match var("ALLOWED_CONTENT_TYPES") {
            Some(raw) => split_csv(&raw)
                .iter()
                .filter_map(|pattern| ContentTypeRule::parse(pattern))
                .collect(),
            None => StoragePolicy::default_content_type_rules(),
        };

        let signed_url_ttl_secs = var("SIGNED_URL_TTL_SECS")
            .and_then(|s| s.trim().parse().ok())
            .filter(|&secs| secs > 0)
            .unwrap_or(SIGNED_URL_TTL_SECS);

        Ok(UploadConfig {
            environment,
            storage_backend,
            cloud_provider,
            local_files_dir: var("LOCAL_FILES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(LOCAL_FILES_DIR)),
            local_files_base_url: var("LOCAL_FILES_BASE_URL")
                .unwrap_or_else(|| LOCAL_FILES_BASE_URL.to_string()),
            max_file_size_bytes,
            allowed_extensions,
            allowed_content_types,
            cloud_bucket: var("GCS_BUCKET").or_else(|| var("CLOUD_BUCKET")),
            cloud_key_prefix: var("CLOUD_KEY_PREFIX")
                .map(|p| p.trim_matches('/').to_string())
                .unwrap_or_else(|| CLOUD_KEY_PREFIX.to_string()),
            signed_url_ttl_secs,
            s3_region: var("S3_REGION").or_else(|| var("AWS_REGION")),
            s3_endpoint: var("S3_ENDPOINT"),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE must be greater than zero"));
        }

        if self.allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!(
                "ALLOWED_EXTENSIONS must list at least one extension"
            ));
        }

        if self.storage_backend == StorageBackend::Cloud && self.cloud_bucket.is_none() {
            // Not fatal at startup: cloud uploads fail with BackendUnavailable instead.
            tracing::warn!("Cloud storage selected but GCS_BUCKET/CLOUD_BUCKET is not set");
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Build the upload policy shared by all requests.
    pub fn policy(&self) -> StoragePolicy {
        StoragePolicy::new(
            self.allowed_extensions.iter(),
            self.allowed_content_types.clone(),
            self.max_file_size_bytes,
        )
    }

    pub fn signed_url_ttl(&self) -> Duration {
        Duration::from_secs(self.signed_url_ttl_secs)
    }
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<UploadConfig, anyhow::Error> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        UploadConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.storage_backend, StorageBackend::Local);
        assert_eq!(config.cloud_provider, CloudProvider::Gcs);
        assert_eq!(config.local_files_dir, PathBuf::from("/tmp/blueprint/uploads"));
        assert_eq!(config.local_files_base_url, "/files");
        assert_eq!(config.max_file_size_bytes, 10 * 1024 * 1024);
        assert_eq!(config.cloud_key_prefix, "uploads");
        assert_eq!(config.signed_url_ttl(), Duration::from_secs(60));
        assert!(config.cloud_bucket.is_none());
        assert!(!config.is_production());
        config.validate().unwrap();

        let policy = config.policy();
        assert!(policy.allows_extension(".dwg"));
        assert!(policy.allows_content_type("image/vnd.dxf"));
    }

    #[test]
    fn parses_overrides() {
        let config = config_from(&[
            ("ENVIRONMENT", "production"),
            ("STORAGE_BACKEND", "s3"),
            ("CLOUD_BUCKET", "plans"),
            ("MAX_FILE_SIZE", "2048"),
            ("ALLOWED_EXTENSIONS", "PDF, .dwg,,"),
            ("ALLOWED_CONTENT_TYPES", "application/pdf,image/*,*dwg*"),
            ("CLOUD_KEY_PREFIX", "/incoming/"),
            ("SIGNED_URL_TTL_SECS", "300"),
            ("AWS_REGION", "eu-west-1"),
        ])
        .unwrap();

        assert!(config.is_production());
        assert_eq!(config.storage_backend, StorageBackend::Cloud);
        assert_eq!(config.cloud_provider, CloudProvider::S3);
        assert_eq!(config.cloud_bucket.as_deref(), Some("plans"));
        assert_eq!(config.max_file_size_bytes, 2048);
        assert_eq!(config.allowed_extensions, vec!["pdf", ".dwg"]);
        assert_eq!(config.allowed_content_types.len(), 3);
        assert_eq!(config.cloud_key_prefix, "incoming");
        assert_eq!(config.signed_url_ttl_secs, 300);
        assert_eq!(config.s3_region.as_deref(), Some("eu-west-1"));

        let policy = config.policy();
        assert!(policy.allows_extension(".pdf"));
        assert!(!policy.allows_extension(".png"));
        assert!(policy.allows_content_type("application/x-dwg"));
        assert!(!policy.allows_content_type("application/dxf"));
    }

    #[test]
    fn gcs_bucket_takes_precedence() {
        let config = config_from(&[
            ("STORAGE_BACKEND", "gcs"),
            ("GCS_BUCKET", "blueprints"),
            ("CLOUD_BUCKET", "other"),
        ])
        .unwrap();
        assert_eq!(config.cloud_provider, CloudProvider::Gcs);
        assert_eq!(config.cloud_bucket.as_deref(), Some("blueprints"));
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(config_from(&[("STORAGE_BACKEND", "ftp")]).is_err());
        assert!(config_from(&[("MAX_FILE_SIZE", "ten")]).is_err());
        assert!(config_from(&[("CLOUD_PROVIDER", "azure")]).is_err());

        let zero = config_from(&[("MAX_FILE_SIZE", "0")]).unwrap();
        assert!(zero.validate().is_err());

        let no_ext = config_from(&[("ALLOWED_EXTENSIONS", " , ")]).unwrap();
        assert!(no_ext.validate().is_err());
    }

    #[test]
    fn cloud_without_bucket_is_not_a_startup_error() {
        let config = config_from(&[("STORAGE_BACKEND", "cloud")]).unwrap();
        assert!(config.validate().is_ok());
    }
}
