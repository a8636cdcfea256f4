pub mod cache;
pub mod identity;
pub mod profile;
pub mod roles;
