use crate::core::token::TokenGenerator;
use crate::core::validator::Validator;
use crate::core::CardStore;
use crate::domain::model::{CardData, CardPayload, CardRecord, StoreKey, Token};
use crate::domain::ports::whole_seconds;
use crate::utils::error::{ErrorKind, Result, TokenizerError};
use crate::utils::logger::{mask_card_number, token_hint};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(900);
pub const DEFAULT_KEY_PREFIX: &str = "card_tokens";

const AUTHORIZATION_HEADER: &str = "Authorization";
const BEARER_PREFIX: &str = "Bearer ";

/// 對外回應：狀態碼加上 JSON 字串
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceResponse {
    pub status_code: u16,
    pub body: String,
}

impl ServiceResponse {
    fn json(status_code: u16, body: Value) -> Self {
        Self {
            status_code,
            body: body.to_string(),
        }
    }

    fn error(status_code: u16, message: impl Into<String>) -> Self {
        Self::json(status_code, json!({ "error": message.into() }))
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }

    pub fn body_json(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.body)
    }
}

impl From<TokenizerError> for ServiceResponse {
    fn from(error: TokenizerError) -> Self {
        Self::error(error.status_code(), error.to_string())
    }
}

pub struct TokenService<S: CardStore> {
    store: S,
    validator: Validator,
    generator: TokenGenerator,
    ttl: Duration,
    key_prefix: String,
}

impl<S: CardStore> TokenService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            validator: Validator::default(),
            generator: TokenGenerator::new(),
            ttl: DEFAULT_TOKEN_TTL,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    /// 存儲以整秒計算過期，不足一秒的部分無條件進位
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Duration::from_secs(whole_seconds(ttl));
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn with_key_prefix(mut self, key_prefix: impl Into<String>) -> Self {
        self.key_prefix = key_prefix.into();
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn key_for(&self, token: &Token) -> StoreKey {
        StoreKey::new(&self.key_prefix, token)
    }

    /// 驗證、產生 token、寫入存儲
    pub async fn issue_token(&self, payload: CardPayload) -> Result<Token> {
        self.validator.validate(&payload)?;

        let token = self.generator.generate();
        let key = self.key_for(&token);
        let record = CardRecord::new(payload, token.clone());

        self.store.put(&key, &record, self.ttl).await?;

        tracing::info!(
            card = %mask_card_number(record.payload.card_number),
            token = %token_hint(token.as_str()),
            ttl_seconds = self.ttl.as_secs(),
            "Card token issued"
        );
        Ok(token)
    }

    pub async fn card_data(&self, token: &Token) -> Result<Option<CardData>> {
        let key = self.key_for(token);
        let card_data = self.store.get(&key).await?;

        tracing::info!(
            token = %token_hint(token.as_str()),
            found = card_data.is_some(),
            "Card token redeemed"
        );
        Ok(card_data)
    }

    /// POST：原始 body → `{token}` 或 `{error}`
    pub async fn issue(&self, raw_body: Option<&str>) -> ServiceResponse {
        let result = async {
            let raw = raw_body.filter(|body| !body.is_empty()).unwrap_or("{}");
            let payload = CardPayload::from_json(raw)?;
            self.issue_token(payload).await
        }
        .await;

        match result {
            Ok(token) => ServiceResponse::json(200, json!({ "token": token })),
            Err(e) => {
                log_failure("issue", &e);
                e.into()
            }
        }
    }

    /// GET：`Authorization: Bearer <token>` → `{cardData}`
    pub async fn redeem(&self, headers: &HashMap<String, String>) -> ServiceResponse {
        let result = async {
            let token = extract_bearer_token(headers)?;
            self.card_data(&token).await
        }
        .await;

        match result {
            Ok(card_data) => ServiceResponse::json(200, json!({ "cardData": card_data })),
            Err(e) => {
                log_failure("redeem", &e);
                e.into()
            }
        }
    }
}

/// 取出 `Bearer ` 之後的全部內容；缺少標頭、前綴不符或空 token 都是未授權
pub fn extract_bearer_token(headers: &HashMap<String, String>) -> Result<Token> {
    headers
        .get(AUTHORIZATION_HEADER)
        .or_else(|| {
            headers
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(AUTHORIZATION_HEADER))
                .map(|(_, value)| value)
        })
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .filter(|token| !token.is_empty())
        .map(Token::new)
        .ok_or(TokenizerError::Unauthorized)
}

fn log_failure(operation: &str, error: &TokenizerError) {
    match error.kind() {
        ErrorKind::Storage | ErrorKind::Config => {
            tracing::error!(operation, kind = ?error.kind(), error = ?error, "Card token request failed")
        }
        kind => tracing::warn!(operation, ?kind, %error, "Card token request rejected"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryCardStore;

    fn headers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn assert_unauthorized(pairs: &[(&str, &str)]) {
        let result = extract_bearer_token(&headers(pairs));
        assert!(
            matches!(result, Err(TokenizerError::Unauthorized)),
            "{pairs:?} should be unauthorized, got {result:?}"
        );
    }

    #[test]
    fn test_extract_bearer_token() {
        let token = extract_bearer_token(&headers(&[("Authorization", "Bearer Qm7T0jo2LuphGwMe")]));
        assert_eq!(token.unwrap(), Token::new("Qm7T0jo2LuphGwMe"));
    }

    #[test]
    fn test_extract_takes_everything_after_first_space() {
        let token = extract_bearer_token(&headers(&[("Authorization", "Bearer abc def")]));
        assert_eq!(token.unwrap(), Token::new("abc def"));
    }

    #[test]
    fn test_extract_rejects_bad_headers() {
        assert_unauthorized(&[]);
        assert_unauthorized(&[("Authorization", "Basic dXNlcjpwYXNz")]);
        assert_unauthorized(&[("Authorization", "bearer abc")]);
        assert_unauthorized(&[("Authorization", "Bearer ")]);
        assert_unauthorized(&[("Authorization", "Bearerabc")]);
    }

    #[test]
    fn test_extract_header_name_case_insensitive() {
        let token = extract_bearer_token(&headers(&[("authorization", "Bearer abc")]));
        assert_eq!(token.unwrap(), Token::new("abc"));
    }

    #[test]
    fn test_error_response_body() {
        let response = ServiceResponse::from(TokenizerError::from(
            crate::utils::error::ValidationError::CardNumber,
        ));
        assert_eq!(response.status_code, 500);
        assert_eq!(response.body, r#"{"error":"Invalid card number"}"#);

        let response = ServiceResponse::from(TokenizerError::Unauthorized);
        assert_eq!(response.status_code, 401);
        assert_eq!(response.body, r#"{"error":"Unauthorized"}"#);
    }

    #[tokio::test]
    async fn test_redeem_with_empty_bearer_is_401() {
        let service = TokenService::new(InMemoryCardStore::new());
        let response = service
            .redeem(&headers(&[("Authorization", "Bearer ")]))
            .await;
        assert_eq!(response.status_code, 401);
        assert_eq!(response.body, r#"{"error":"Unauthorized"}"#);
    }

    #[test]
    fn test_sub_second_ttl_rounds_up() {
        let service = TokenService::new(InMemoryCardStore::new());
        assert_eq!(service.ttl(), DEFAULT_TOKEN_TTL);

        let service = service.with_ttl(Duration::from_millis(1500));
        assert_eq!(service.ttl(), Duration::from_secs(2));

        let service = service.with_ttl(Duration::from_millis(1));
        assert_eq!(service.ttl(), Duration::from_secs(1));

        let service = service.with_ttl(Duration::from_secs(30));
        assert_eq!(service.ttl(), Duration::from_secs(30));
    }
}
