pub mod profile;
pub mod users;
