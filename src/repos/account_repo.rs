/*
 * Responsibility
 * - accounts テーブル向け SQLx 操作 (AccountDirectory の Postgres 実装)
 * - email の一意制約違反は AccountError::EmailExists に変換する
 * - schema: migrations/0001_create_accounts.sql
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoError;
use crate::services::identity::accounts::{
    Account, AccountDirectory, AccountError, PasswordDigest, new_uid, validate_credentials,
};

// A uid collision is a backend failure, not a duplicate email.
const PRIMARY_KEY: &str = "accounts_pkey";

#[derive(Debug, FromRow)]
struct AccountRow {
    uid: String,
    email: String,
    #[sqlx(rename = "displayName")]
    display_name: Option<String>,
    #[sqlx(rename = "createdAt")]
    created_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Self {
            uid: row.uid,
            email: row.email,
            display_name: row.display_name,
            created_at: row.created_at,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PgAccountDirectory {
    db: PgPool,
}

impl PgAccountDirectory {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountDirectory for PgAccountDirectory {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn create(&self, email: &str, password: &str) -> Result<Account, AccountError> {
        let email = validate_credentials(email, password)?;
        let digest = PasswordDigest::new(password);

        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO accounts (uid, email, "passwordSalt", "passwordHash")
            VALUES ($1, $2, $3, $4)
            RETURNING uid, email, "displayName", "createdAt"
            "#,
        )
        .bind(new_uid())
        .bind(&email)
        .bind(&digest.salt)
        .bind(&digest.hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match RepoError::from_sqlx(e) {
            RepoError::Conflict { constraint } if constraint.as_deref() != Some(PRIMARY_KEY) => {
                AccountError::EmailExists
            }
            other => AccountError::Repo(other),
        })?;

        Ok(row.into())
    }

    async fn get(&self, uid: &str) -> Result<Option<Account>, AccountError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT uid, email, "displayName", "createdAt"
            FROM accounts
            WHERE uid = $1
            "#,
        )
        .bind(uid)
        .fetch_optional(&self.db)
        .await
        .map_err(RepoError::from)?;

        Ok(row.map(Account::from))
    }

    async fn delete(&self, uid: &str) -> Result<bool, AccountError> {
        let result = sqlx::query(
            r#"
            DELETE FROM accounts
            WHERE uid = $1
            "#,
        )
        .bind(uid)
        .execute(&self.db)
        .await
        .map_err(RepoError::from)?;

        Ok(result.rows_affected() > 0)
    }
}
