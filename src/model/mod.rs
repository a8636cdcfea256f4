/*
 * Responsibility
 * - ドメインの値型 (Role など)
 * - HTTP / store に依存しない
 */
pub mod role;

pub use role::{Role, UnknownRole};
