/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - accounts: AccountDirectory, profiles: ProfileStore, roles: RoleResolver, gate: AuthGate
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::{sync::Arc, time::Duration};

use crate::config::{Config, DEFAULT_PUBLIC_PATHS};
use crate::middleware::auth::{AuthGate, PublicPaths};
use crate::services::identity::{AccountDirectory, TokenVerifier};
use crate::services::profile::ProfileStore;
use crate::services::roles::RoleResolver;

/// Authentication knobs that are not backends.
#[derive(Clone, Debug)]
pub struct AuthSettings {
    pub public_paths: Vec<String>,
    pub token_verify_timeout: Duration,
    pub profile_store_timeout: Duration,
}

impl AuthSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            public_paths: config.public_paths.clone(),
            token_verify_timeout: config.token_verify_timeout,
            profile_store_timeout: config.profile_store_timeout,
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            public_paths: vec![DEFAULT_PUBLIC_PATHS.to_string()],
            token_verify_timeout: Duration::from_secs(2),
            profile_store_timeout: Duration::from_secs(2),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountDirectory>,
    pub profiles: Arc<dyn ProfileStore>,
    pub roles: RoleResolver,
    pub gate: AuthGate,
}

impl AppState {
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        accounts: Arc<dyn AccountDirectory>,
        profiles: Arc<dyn ProfileStore>,
        settings: AuthSettings,
    ) -> Self {
        let roles = RoleResolver::new(profiles.clone(), settings.profile_store_timeout);
        let gate = AuthGate::new(
            verifier,
            roles.clone(),
            PublicPaths::new(settings.public_paths),
            settings.token_verify_timeout,
        );

        Self {
            accounts,
            profiles,
            roles,
            gate,
        }
    }
}
