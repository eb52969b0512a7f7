use crate::domain::model::{CardData, CardRecord, StoreKey};
use crate::utils::error::StoreError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// 卡片存儲後端。
///
/// `put` 必須同時寫入欄位與過期時間，不能留下永不過期的紀錄。
/// `get` 回傳的 [`CardData`] 已經移除 cvv；沒有欄位的 key 視為不存在。
#[async_trait]
pub trait CardStore: Send + Sync {
    async fn put(&self, key: &StoreKey, record: &CardRecord, ttl: Duration)
        -> Result<(), StoreError>;

    async fn get(&self, key: &StoreKey) -> Result<Option<CardData>, StoreError>;
}

#[async_trait]
impl<S: CardStore + ?Sized> CardStore for Arc<S> {
    async fn put(
        &self,
        key: &StoreKey,
        record: &CardRecord,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        (**self).put(key, record, ttl).await
    }

    async fn get(&self, key: &StoreKey) -> Result<Option<CardData>, StoreError> {
        (**self).get(key).await
    }
}

/// 以整秒表示的 TTL，不足一秒的部分進位，至少為 1 秒。
/// Redis `EXPIRE 0` 會立刻刪除 key，所以零或次秒的 TTL 也要保留一秒。
pub fn whole_seconds(ttl: Duration) -> u64 {
    let seconds = ttl.as_secs();
    let seconds = if ttl.subsec_nanos() > 0 {
        seconds.saturating_add(1)
    } else {
        seconds
    };
    seconds.max(1)
}
