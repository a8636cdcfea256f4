pub mod health;
pub mod profile;
pub mod roles;
pub mod users;
