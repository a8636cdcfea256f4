/*
 * Responsibility
 * - subjectId をキーにした profile document (JSON object) の読み書き
 * - backend は CacheClient (valkey / memory) の上に載せる
 * - `role` フィールドは role 変更 API 以外から書き換えさせない
 */
use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::services::cache::CacheError;

pub mod kv;

pub use kv::KvProfileStore;

/// Field of the profile document that holds the subject's role name.
pub const ROLE_FIELD: &str = "role";

pub type ProfileDocument = Map<String, Value>;

#[derive(Debug, Error)]
pub enum ProfileStoreError {
    #[error(transparent)]
    Backend(#[from] CacheError),

    #[error("profile document for '{subject_id}' is not a JSON object")]
    Corrupt { subject_id: String },
}

/// Opaque key-document store holding one profile per subject.
///
/// Every operation touches a single document; there are no multi-document writes.
/// Concurrent writes to the same subject are last-writer-wins.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn get(&self, subject_id: &str) -> Result<Option<ProfileDocument>, ProfileStoreError>;

    async fn put(&self, subject_id: &str, doc: &ProfileDocument) -> Result<(), ProfileStoreError>;

    /// Set one top-level field, creating the document when absent.
    async fn set_field(
        &self,
        subject_id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), ProfileStoreError>;
}

/// Replace a subject's profile with `incoming`, keeping whatever `role` is already stored.
///
/// A `role` key in `incoming` is dropped.
pub async fn replace_preserving_role(
    store: &dyn ProfileStore,
    subject_id: &str,
    incoming: ProfileDocument,
) -> Result<(), ProfileStoreError> {
    let existing = store.get(subject_id).await?;
    let doc = preserve_role(existing.as_ref(), incoming);
    store.put(subject_id, &doc).await
}

fn preserve_role(existing: Option<&ProfileDocument>, mut incoming: ProfileDocument) -> ProfileDocument {
    if incoming.remove(ROLE_FIELD).is_some() {
        tracing::debug!("ignoring role field in profile write");
    }
    if let Some(role) = existing.and_then(|d| d.get(ROLE_FIELD)) {
        incoming.insert(ROLE_FIELD.to_string(), role.clone());
    }
    incoming
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(v: Value) -> ProfileDocument {
        match v {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn incoming_role_is_dropped() {
        let merged = preserve_role(None, doc(json!({"name": "a", "role": "SUPER_ADMIN"})));
        assert_eq!(Value::Object(merged), json!({"name": "a"}));
    }

    #[test]
    fn stored_role_survives_overwrite() {
        let existing = doc(json!({"name": "old", "role": "ADMIN"}));
        let merged = preserve_role(Some(&existing), doc(json!({"name": "new", "role": "STAFF"})));
        assert_eq!(Value::Object(merged), json!({"name": "new", "role": "ADMIN"}));
    }
}
