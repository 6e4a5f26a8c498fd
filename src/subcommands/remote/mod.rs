//! Subcommands pertaining to remote stack management.

mod auth;
pub use auth::AuthCmd;

mod submit;
pub use submit::SubmitCmd;

mod sync;
pub use sync::SyncCmd;
