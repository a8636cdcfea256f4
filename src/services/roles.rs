//! Role resolution and role mutation against the profile store.
//!
//! `resolve_role` never fails outward: a missing document, a missing or unparseable `role`
//! field, a store error and a store timeout all resolve to [`Role::DEFAULT`] (STAFF).

use std::{sync::Arc, time::Duration};

use serde_json::Value;

use crate::model::Role;
use crate::services::profile::{ProfileDocument, ProfileStore, ROLE_FIELD};

/// Outcome of [`RoleResolver::try_update_role`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleUpdate {
    Applied,
    /// The acting role may not assign the requested role. Nothing was written.
    Rejected,
    /// The store write failed or timed out.
    Failed,
}

impl RoleUpdate {
    pub fn is_applied(self) -> bool {
        matches!(self, RoleUpdate::Applied)
    }
}

#[derive(Clone)]
pub struct RoleResolver {
    profiles: Arc<dyn ProfileStore>,
    timeout: Duration,
}

impl std::fmt::Debug for RoleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleResolver")
            .field("backend", &self.profiles.backend_name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RoleResolver {
    pub fn new(profiles: Arc<dyn ProfileStore>, timeout: Duration) -> Self {
        Self { profiles, timeout }
    }

    pub async fn resolve_role(&self, subject_id: &str) -> Role {
        match tokio::time::timeout(self.timeout, self.profiles.get(subject_id)).await {
            Ok(Ok(doc)) => role_in_document(subject_id, doc.as_ref()),
            Ok(Err(err)) => {
                tracing::error!(subject_id, error = %err, "profile lookup failed, defaulting to STAFF");
                Role::DEFAULT
            }
            Err(_) => {
                tracing::warn!(
                    subject_id,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "profile lookup timed out, defaulting to STAFF"
                );
                Role::DEFAULT
            }
        }
    }

    /// Assign `new_role` to `subject_id` on behalf of a caller holding `acting_role`.
    pub async fn try_update_role(
        &self,
        subject_id: &str,
        new_role: Role,
        acting_role: Role,
    ) -> RoleUpdate {
        if !acting_role.can_assign(new_role) {
            tracing::warn!(
                subject_id,
                acting_role = %acting_role,
                new_role = %new_role,
                "role assignment rejected"
            );
            return RoleUpdate::Rejected;
        }

        let write = self.profiles.set_field(
            subject_id,
            ROLE_FIELD,
            Value::String(new_role.as_str().to_string()),
        );

        match tokio::time::timeout(self.timeout, write).await {
            Ok(Ok(())) => {
                tracing::info!(subject_id, acting_role = %acting_role, new_role = %new_role, "role updated");
                RoleUpdate::Applied
            }
            Ok(Err(err)) => {
                tracing::error!(subject_id, error = %err, "role update failed");
                RoleUpdate::Failed
            }
            Err(_) => {
                tracing::error!(subject_id, "role update timed out");
                RoleUpdate::Failed
            }
        }
    }

    pub async fn update_role(&self, subject_id: &str, new_role: Role, acting_role: Role) -> bool {
        self.try_update_role(subject_id, new_role, acting_role)
            .await
            .is_applied()
    }
}

fn role_in_document(subject_id: &str, doc: Option<&ProfileDocument>) -> Role {
    let Some(value) = doc.and_then(|d| d.get(ROLE_FIELD)) else {
        tracing::debug!(subject_id, "no role found, defaulting to STAFF");
        return Role::DEFAULT;
    };

    let Some(raw) = value.as_str() else {
        tracing::warn!(subject_id, value = %value, "role field is not a string, defaulting to STAFF");
        return Role::DEFAULT;
    };

    match raw.parse::<Role>() {
        Ok(role) => {
            tracing::debug!(subject_id, role = %role, "resolved role");
            role
        }
        Err(err) => {
            tracing::warn!(subject_id, error = %err, "invalid role value in profile, defaulting to STAFF");
            Role::DEFAULT
        }
    }
}
