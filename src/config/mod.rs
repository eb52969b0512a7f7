#[cfg(feature = "cli")]
pub mod cli;
pub mod policy_file;
pub mod service;

#[cfg(feature = "cli")]
pub use cli::{CliCommand, CliConfig};
pub use policy_file::PolicyFile;
pub use service::ServiceConfig;
