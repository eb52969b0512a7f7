//! Redis-backed card store.
//!
//! Each record is one hash under `card_tokens:<token>`. Fields and expiry are
//! written in a single MULTI/EXEC so an entry never outlives its TTL.

use crate::domain::model::{CardData, CardRecord, StoreKey};
use crate::domain::ports::{whole_seconds, CardStore};
use crate::utils::error::StoreError;
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Clone)]
pub struct RedisCardStore {
    connection: ConnectionManager,
}

impl RedisCardStore {
    /// Connect to Redis
    ///
    /// # Arguments
    ///
    /// * `redis_url` - Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url).map_err(|e| StoreError::Connection {
            message: e.to_string(),
        })?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| StoreError::Connection {
                message: e.to_string(),
            })?;

        tracing::debug!("Connected to Redis card store");
        Ok(Self { connection })
    }

    pub fn from_connection(connection: ConnectionManager) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl CardStore for RedisCardStore {
    async fn put(
        &self,
        key: &StoreKey,
        record: &CardRecord,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let fields = record.to_fields();
        let seconds = i64::try_from(whole_seconds(ttl)).unwrap_or(i64::MAX);
        let mut conn = self.connection.clone();

        redis::pipe()
            .atomic()
            .hset_multiple(key.as_str(), &fields)
            .ignore()
            .expire(key.as_str(), seconds)
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(StoreError::write)
    }

    async fn get(&self, key: &StoreKey) -> Result<Option<CardData>, StoreError> {
        let mut conn = self.connection.clone();

        let fields: HashMap<String, String> = conn
            .hgetall(key.as_str())
            .await
            .map_err(StoreError::read)?;

        if fields.is_empty() {
            return Ok(None);
        }

        CardData::from_fields(key, fields).map(Some)
    }
}
