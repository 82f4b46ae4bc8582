#[cfg(feature = "cli")]
pub mod cli;
pub mod policy;

#[cfg(feature = "cli")]
pub use cli::AuditCli;
pub use policy::{PolicyConfig, ServiceOptions};
