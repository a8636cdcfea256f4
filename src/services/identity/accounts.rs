//! Account directory: the identity provider's user records.
//!
//! Registration (`create`), lookup (`get`) and removal (`delete`) only. Signing in and token
//! issuance belong to the identity provider and are not served here; the Postgres directory
//! keeps passwords as a salted digest so the record can be handed to that flow.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::repos::error::RepoError;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
pub struct Account {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("invalid email address")]
    InvalidEmail,
    #[error("password must be at least {min} characters")]
    WeakPassword { min: usize },
    #[error("email address is already registered")]
    EmailExists,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl AccountError {
    /// Errors caused by the caller's input (as opposed to backend failures).
    pub fn is_rejection(&self) -> bool {
        !matches!(self, AccountError::Repo(_))
    }
}

#[async_trait]
pub trait AccountDirectory: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn create(&self, email: &str, password: &str) -> Result<Account, AccountError>;

    async fn get(&self, uid: &str) -> Result<Option<Account>, AccountError>;

    /// Remove an account. Returns whether one existed.
    async fn delete(&self, uid: &str) -> Result<bool, AccountError>;
}

/// Validate and normalize registration input. Returns the normalized (trimmed, lowercased) email.
pub fn validate_credentials(email: &str, password: &str) -> Result<String, AccountError> {
    let email = email.trim().to_ascii_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(AccountError::InvalidEmail);
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AccountError::WeakPassword {
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(email)
}

pub fn new_uid() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Salted SHA-256 of a password, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigest {
    pub salt: String,
    pub hash: String,
}

impl PasswordDigest {
    pub fn new(password: &str) -> Self {
        let salt = hex::encode(Uuid::new_v4().as_bytes());
        let hash = Self::hash(&salt, password);
        Self { salt, hash }
    }

    fn hash(salt: &str, password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(b"|");
        hasher.update(password.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// In-memory directory for development and tests. Passwords are validated but not kept.
#[derive(Clone, Debug, Default)]
pub struct MemoryAccountDirectory {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
}

impl MemoryAccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountDirectory for MemoryAccountDirectory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, email: &str, password: &str) -> Result<Account, AccountError> {
        let email = validate_credentials(email, password)?;

        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|a| a.email == email) {
            return Err(AccountError::EmailExists);
        }

        let account = Account {
            uid: new_uid(),
            email,
            display_name: None,
            created_at: Utc::now(),
        };
        accounts.insert(account.uid.clone(), account.clone());

        Ok(account)
    }

    async fn get(&self, uid: &str) -> Result<Option<Account>, AccountError> {
        Ok(self.accounts.read().await.get(uid).cloned())
    }

    async fn delete(&self, uid: &str) -> Result<bool, AccountError> {
        Ok(self.accounts.write().await.remove(uid).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_normalized() {
        let email = validate_credentials("  Alice@Example.COM ", "secret1").unwrap();
        assert_eq!(email, "alice@example.com");
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for bad in ["", "alice", "@example.com", "alice@", "alice@example", "a b@example.com"] {
            assert!(
                matches!(validate_credentials(bad, "secret1"), Err(AccountError::InvalidEmail)),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn short_password_is_rejected() {
        let err = validate_credentials("alice@example.com", "12345").unwrap_err();
        assert!(matches!(err, AccountError::WeakPassword { min: 6 }));
        assert!(err.is_rejection());
    }

    #[test]
    fn digest_is_salted() {
        let a = PasswordDigest::new("secret1");
        let b = PasswordDigest::new("secret1");
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
        assert_eq!(a.hash.len(), 64);
    }

    #[tokio::test]
    async fn create_then_get() {
        let dir = MemoryAccountDirectory::new();
        let created = dir.create("alice@example.com", "secret1").await.unwrap();

        let found = dir.get(&created.uid).await.unwrap().unwrap();
        assert_eq!(found.email, "alice@example.com");
        assert_eq!(found.display_name, None);
        assert!(dir.get("unknown").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let dir = MemoryAccountDirectory::new();
        dir.create("alice@example.com", "secret1").await.unwrap();

        let err = dir.create("ALICE@example.com", "secret2").await.unwrap_err();
        assert!(matches!(err, AccountError::EmailExists));
    }

    #[tokio::test]
    async fn deleted_account_frees_its_email() {
        let dir = MemoryAccountDirectory::new();
        let created = dir.create("alice@example.com", "secret1").await.unwrap();

        assert!(dir.delete(&created.uid).await.unwrap());
        assert!(!dir.delete(&created.uid).await.unwrap());
        assert!(dir.get(&created.uid).await.unwrap().is_none());
        dir.create("alice@example.com", "secret1").await.unwrap();
    }
}
