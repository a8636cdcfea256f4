use async_trait::async_trait;
use serde_json::Value;

use crate::services::cache::CacheClient;
use crate::services::profile::{ProfileDocument, ProfileStore, ProfileStoreError};

const KEY_PREFIX: &str = "profile";

/// Profile store over any [`CacheClient`]: one JSON string per subject at `profile:{subject_id}`.
#[derive(Clone, Debug)]
pub struct KvProfileStore<C: CacheClient> {
    cache: C,
}

impl<C: CacheClient> KvProfileStore<C> {
    pub fn new(cache: C) -> Self {
        Self { cache }
    }

    fn key(subject_id: &str) -> String {
        format!("{KEY_PREFIX}:{subject_id}")
    }

    async fn load(&self, subject_id: &str) -> Result<Option<ProfileDocument>, ProfileStoreError> {
        let Some(raw) = self.cache.get_string(&Self::key(subject_id)).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(doc)) => Ok(Some(doc)),
            _ => Err(ProfileStoreError::Corrupt {
                subject_id: subject_id.to_string(),
            }),
        }
    }

    async fn store(&self, subject_id: &str, doc: &ProfileDocument) -> Result<(), ProfileStoreError> {
        // Serializing a Map<String, Value> cannot fail.
        let raw = Value::Object(doc.clone()).to_string();
        self.cache.set_string(&Self::key(subject_id), &raw).await?;
        Ok(())
    }
}

#[async_trait]
impl<C: CacheClient> ProfileStore for KvProfileStore<C> {
    fn backend_name(&self) -> &'static str {
        self.cache.backend_name()
    }

    async fn get(&self, subject_id: &str) -> Result<Option<ProfileDocument>, ProfileStoreError> {
        self.load(subject_id).await
    }

    async fn put(&self, subject_id: &str, doc: &ProfileDocument) -> Result<(), ProfileStoreError> {
        self.store(subject_id, doc).await?;
        tracing::info!(subject_id, backend = self.backend_name(), "profile saved");
        Ok(())
    }

    async fn set_field(
        &self,
        subject_id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), ProfileStoreError> {
        // GET + SET, not atomic: concurrent writers race (last writer wins).
        let mut doc = self.load(subject_id).await?.unwrap_or_default();
        doc.insert(field.to_string(), value);
        self.store(subject_id, &doc).await
    }
}
