pub mod gate;
pub mod public_paths;
pub mod require_role;

pub use gate::AuthGate;
pub use public_paths::PublicPaths;
pub use require_role::{RoleGuard, RoleRequirement};
