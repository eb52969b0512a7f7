pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliCommand, CliConfig};

pub use adapters::{InMemoryCardStore, RedisCardStore};
pub use config::{PolicyFile, ServiceConfig};
pub use crate::core::service::{extract_bearer_token, ServiceResponse, TokenService};
pub use crate::core::token::TokenGenerator;
pub use crate::core::validator::{ValidationPolicy, Validator};
pub use domain::model::{CardData, CardPayload, CardRecord, StoreKey, Token};
pub use domain::ports::CardStore;
pub use utils::error::{ErrorKind, Result, StoreError, TokenizerError, ValidationError};
