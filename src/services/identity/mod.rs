pub mod accounts;
pub mod jwt;
pub mod verifier;

pub use accounts::{Account, AccountDirectory, AccountError, MemoryAccountDirectory};
pub use jwt::JwtTokenVerifier;
pub use verifier::{TokenError, TokenVerifier, VerifiedToken};
