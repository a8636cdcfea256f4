/**
 * Responsibility
 * - repo が上位 (AccountDirectory) に伝える意味の定義
 * - unique 制約違反だけは Conflict として区別する (email 重複 → 400)
 */
use thiserror::Error;

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("unique constraint violated ({})", constraint.as_deref().unwrap_or("unknown"))]
    Conflict { constraint: Option<String> },
}

impl RepoError {
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(dbe) = &e
            && dbe.code().as_deref() == Some(UNIQUE_VIOLATION)
        {
            return RepoError::Conflict {
                constraint: dbe.constraint().map(str::to_owned),
            };
        }
        RepoError::Db(e)
    }
}
