pub mod service;
pub mod token;
pub mod validator;

pub use crate::domain::model::{CardData, CardPayload, CardRecord, StoreKey, Token};
pub use crate::domain::ports::CardStore;
pub use crate::utils::error::Result;
