pub mod identity_ctx;
pub mod json;

pub use identity_ctx::{CurrentIdentity, IdentityCtx};
pub use json::ApiJson;
