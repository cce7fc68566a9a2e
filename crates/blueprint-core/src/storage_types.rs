use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage backend types
///
/// Exactly one backend is selected per process. It is defined in core because it
/// is used by configuration, by the storage crate and in the upload response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Local,
    Cloud,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(StorageBackend::Local),
            "cloud" | "gcs" | "s3" => Ok(StorageBackend::Cloud),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::Local => write!(f, "local"),
            StorageBackend::Cloud => write!(f, "cloud"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_aliases() {
        assert_eq!("local".parse::<StorageBackend>().unwrap(), StorageBackend::Local);
        assert_eq!("LOCAL".parse::<StorageBackend>().unwrap(), StorageBackend::Local);
        assert_eq!("gcs".parse::<StorageBackend>().unwrap(), StorageBackend::Cloud);
        assert_eq!("s3".parse::<StorageBackend>().unwrap(), StorageBackend::Cloud);
        assert_eq!(" cloud ".parse::<StorageBackend>().unwrap(), StorageBackend::Cloud);
        assert!("nfs".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&StorageBackend::Cloud).unwrap(),
            "\"cloud\""
        );
        assert_eq!(StorageBackend::Local.to_string(), "local");
    }
}
