use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use tf_core::{Config, Error, Result, ResultCache};
use tracing::info;

pub mod backends;

pub use backends::*;

/// A cache backend that can be built from the process configuration.
#[async_trait]
pub trait StorageBackend: ResultCache + Sized + 'static {
    fn get_error_message() -> &'static str;
    async fn from_config(config: &Config) -> Result<Self>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageKind {
    #[default]
    Memory,
    Sqlite,
    DynamoDb,
}

impl FromStr for StorageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            "dynamodb" | "dynamo" => Ok(Self::DynamoDb),
            other => Err(Error::Config(format!(
                "unknown storage backend '{}', expected memory, sqlite or dynamodb",
                other
            ))),
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Memory => "memory",
            Self::Sqlite => "sqlite",
            Self::DynamoDb => "dynamodb",
        };
        f.write_str(name)
    }
}

async fn open<T: StorageBackend>(config: &Config) -> Result<Arc<dyn ResultCache>> {
    let cache = T::from_config(config)
        .await
        .map_err(|e| Error::Storage(format!("{} ({})", T::get_error_message(), e)))?;
    Ok(Arc::new(cache))
}

pub async fn create_cache(kind: StorageKind, config: &Config) -> Result<Arc<dyn ResultCache>> {
    let cache = match kind {
        StorageKind::Memory => open::<MemoryCache>(config).await?,
        #[cfg(feature = "sqlite")]
        StorageKind::Sqlite => open::<SqliteCache>(config).await?,
        #[cfg(feature = "dynamodb")]
        StorageKind::DynamoDb => open::<DynamoDbCache>(config).await?,
        #[allow(unreachable_patterns)]
        other => {
            return Err(Error::Config(format!(
                "storage backend '{}' was not compiled in",
                other
            )))
        }
    };
    info!("💾 Result cache ready (using {})", kind);
    Ok(cache)
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_cache, StorageBackend, StorageKind};
}
