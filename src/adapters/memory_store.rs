use crate::domain::model::{CardData, CardRecord, StoreKey};
use crate::domain::ports::{whole_seconds, CardStore};
use crate::utils::error::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

// `Instant` 無法表示的 TTL 以此為上限
const MAX_RETENTION: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

struct Entry {
    fields: HashMap<String, String>,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// 行為與 Redis hash + EXPIRE 相同的記憶體存儲，用於測試與本地執行
#[derive(Default)]
pub struct InMemoryCardStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryCardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 尚未過期的 key 數量
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// 原始欄位（含 cvv），只給測試檢查寫入內容
    pub async fn raw_fields(&self, key: &StoreKey) -> Option<HashMap<String, String>> {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .get(key.as_str())
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.fields.clone())
    }
}

#[async_trait]
impl CardStore for InMemoryCardStore {
    async fn put(
        &self,
        key: &StoreKey,
        record: &CardRecord,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.is_live(now));

        let entry = entries.entry(key.to_string()).or_insert_with(|| Entry {
            fields: HashMap::new(),
            expires_at: now,
        });
        entry.fields.extend(
            record
                .to_fields()
                .into_iter()
                .map(|(name, value)| (name.to_string(), value)),
        );
        let ttl = Duration::from_secs(whole_seconds(ttl));
        entry.expires_at = now.checked_add(ttl).unwrap_or_else(|| now + MAX_RETENTION);

        Ok(())
    }

    async fn get(&self, key: &StoreKey) -> Result<Option<CardData>, StoreError> {
        let fields = match self.raw_fields(key).await {
            Some(fields) if !fields.is_empty() => fields,
            _ => return Ok(None),
        };

        CardData::from_fields(key, fields).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CardPayload, Token};

    fn record(token: &str) -> CardRecord {
        CardRecord::new(
            CardPayload {
                card_number: 4111111111111111,
                cvv: 123,
                expiration_month: "05".to_string(),
                expiration_year: "2027".to_string(),
                email: "test@gmail.com".to_string(),
            },
            Token::new(token),
        )
    }

    #[tokio::test]
    async fn test_put_then_get_redacts_cvv() {
        let store = InMemoryCardStore::new();
        let key = StoreKey::new("card_tokens", &Token::new("abc"));

        store.put(&key, &record("abc"), Duration::from_secs(900)).await.unwrap();

        let raw = store.raw_fields(&key).await.unwrap();
        assert_eq!(raw.get("cvv").map(String::as_str), Some("123"));

        let data = store.get(&key).await.unwrap().unwrap();
        assert_eq!(data.token, "abc");
        assert!(serde_json::to_value(&data).unwrap().get("cvv").is_none());
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let store = InMemoryCardStore::new();
        let key = StoreKey::new("card_tokens", &Token::new("missing"));
        assert!(store.get(&key).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let store = InMemoryCardStore::new();
        let key = StoreKey::new("card_tokens", &Token::new("abc"));
        store.put(&key, &record("abc"), Duration::from_secs(900)).await.unwrap();

        tokio::time::advance(Duration::from_secs(899)).await;
        assert!(store.get(&key).await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(store.get(&key).await.unwrap().is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sub_second_ttl_lasts_whole_seconds() {
        let store = InMemoryCardStore::new();
        let key = StoreKey::new("card_tokens", &Token::new("abc"));
        store.put(&key, &record("abc"), Duration::from_millis(1500)).await.unwrap();

        tokio::time::advance(Duration::from_millis(1900)).await;
        assert!(store.get(&key).await.unwrap().is_some());

        tokio::time::advance(Duration::from_millis(100)).await;
        assert!(store.get(&key).await.unwrap().is_none());
    }
}
