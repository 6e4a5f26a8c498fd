//! Subcommands pertaining to local stack management.

mod init;
pub use init::InitCmd;

mod create;
pub use create::CreateCmd;

mod track;
pub use track::TrackCmd;

mod delete;
pub use delete::DeleteCmd;

mod checkout;
pub use checkout::CheckoutCmd;

mod stack;
pub use stack::StackCmd;
