use crate::utils::error::StoreError;
use crate::utils::logger::mask_card_number;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub const FIELD_CARD_NUMBER: &str = "card_number";
pub const FIELD_CVV: &str = "cvv";
pub const FIELD_EXPIRATION_MONTH: &str = "expiration_month";
pub const FIELD_EXPIRATION_YEAR: &str = "expiration_year";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_TOKEN: &str = "token";

/// 呼叫端送入的卡片資料
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPayload {
    pub card_number: u64,
    pub cvv: u32,
    pub expiration_month: String,
    pub expiration_year: String,
    pub email: String,
}

impl CardPayload {
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

impl fmt::Debug for CardPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardPayload")
            .field("card_number", &mask_card_number(self.card_number))
            .field("cvv", &"***")
            .field("expiration_month", &self.expiration_month)
            .field("expiration_year", &self.expiration_year)
            .field("email", &self.email)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Redis key，例如 `card_tokens:Qm7T0jo2LuphGwMe`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreKey(String);

impl StoreKey {
    pub fn new(prefix: &str, token: &Token) -> Self {
        Self(format!("{}:{}", prefix, token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 寫入存儲的完整紀錄（含 cvv）
#[derive(Clone, PartialEq, Eq)]
pub struct CardRecord {
    pub payload: CardPayload,
    pub token: Token,
}

impl CardRecord {
    pub fn new(payload: CardPayload, token: Token) -> Self {
        Self { payload, token }
    }

    /// Hash 欄位，全部以字串寫入
    pub fn to_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            (FIELD_CARD_NUMBER, self.payload.card_number.to_string()),
            (FIELD_CVV, self.payload.cvv.to_string()),
            (
                FIELD_EXPIRATION_MONTH,
                self.payload.expiration_month.clone(),
            ),
            (FIELD_EXPIRATION_YEAR, self.payload.expiration_year.clone()),
            (FIELD_EMAIL, self.payload.email.clone()),
            (FIELD_TOKEN, self.token.to_string()),
        ]
    }
}

impl fmt::Debug for CardRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardRecord")
            .field("payload", &self.payload)
            .field("token", &"***")
            .finish()
    }
}

/// Redeem 時回傳的資料，型別上就沒有 cvv
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardData {
    pub card_number: u64,
    pub expiration_month: String,
    pub expiration_year: String,
    pub email: String,
    pub token: String,
}

impl CardData {
    /// 從 hash 欄位還原；cvv 欄位在這裡被丟棄
    pub fn from_fields(
        key: &StoreKey,
        mut fields: HashMap<String, String>,
    ) -> Result<Self, StoreError> {
        fields.remove(FIELD_CVV);

        let mut take = |name: &str| {
            fields.remove(name).ok_or_else(|| StoreError::Corrupt {
                key: key.to_string(),
                reason: format!("missing field `{}`", name),
            })
        };

        let card_number = take(FIELD_CARD_NUMBER)?;
        let expiration_month = take(FIELD_EXPIRATION_MONTH)?;
        let expiration_year = take(FIELD_EXPIRATION_YEAR)?;
        let email = take(FIELD_EMAIL)?;
        let token = take(FIELD_TOKEN)?;

        let card_number = card_number.parse::<u64>().map_err(|_| StoreError::Corrupt {
            key: key.to_string(),
            reason: "card_number is not numeric".to_string(),
        })?;

        Ok(Self {
            card_number,
            expiration_month,
            expiration_year,
            email,
            token,
        })
    }
}

impl fmt::Debug for CardData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardData")
            .field("card_number", &mask_card_number(self.card_number))
            .field("expiration_month", &self.expiration_month)
            .field("expiration_year", &self.expiration_year)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}
