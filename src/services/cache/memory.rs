use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

use crate::services::cache::client::{CacheClient, CacheResult};

/// Process-local cache backend.
///
/// Used when `REDIS_URL` is not configured (development) and in tests.
/// State is lost on restart.
#[derive(Clone, Debug, Default)]
pub struct MemoryCacheClient {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryCacheClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheClient for MemoryCacheClient {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get_string(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set_string(&self, key: &str, value: &str) -> CacheResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
