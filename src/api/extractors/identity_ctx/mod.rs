/*!
 * Identity context extractor
 *
 * Public API:
 * - IdentityCtx
 * - CurrentIdentity
 */

mod core;
mod types;

pub use core::CurrentIdentity;
pub use types::IdentityCtx;
