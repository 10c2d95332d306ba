use async_trait::async_trait;
use mailtrail_application::AnalysisCache;
use mailtrail_core::{AppError, AppResult, SessionId};
use mailtrail_domain::ExchangeAnalysis;
use redis::AsyncCommands;

/// Seconds before a cached analysis expires, matching the session lifetime.
const CACHE_TTL_SECONDS: u64 = 24 * 60 * 60;

/// Redis-backed analysis cache.
#[derive(Debug, Clone)]
pub struct RedisAnalysisCache {
    client: redis::Client,
    key_prefix: String,
}

impl RedisAnalysisCache {
    /// Creates a cache over an existing Redis client.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key_for(&self, session_id: SessionId) -> String {
        format!("{}:{}", self.key_prefix, session_id)
    }
}

#[async_trait]
impl AnalysisCache for RedisAnalysisCache {
    async fn get_exchange(&self, session_id: SessionId) -> AppResult<Option<ExchangeAnalysis>> {
        let key = self.key_for(session_id);
        let mut connection = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("redis connection failed: {error}")))?;

        let encoded: Option<String> = connection
            .get(key)
            .await
            .map_err(|error| AppError::Internal(format!("redis read failed: {error}")))?;

        encoded
            .as_deref()
            .map(|value| {
                serde_json::from_str::<ExchangeAnalysis>(value).map_err(|error| {
                    AppError::Internal(format!("cached analysis decode failed: {error}"))
                })
            })
            .transpose()
    }

    async fn put_exchange(
        &self,
        session_id: SessionId,
        analysis: &ExchangeAnalysis,
    ) -> AppResult<()> {
        let key = self.key_for(session_id);
        let encoded = serde_json::to_string(analysis)
            .map_err(|error| AppError::Internal(format!("analysis encode failed: {error}")))?;

        let mut connection = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("redis connection failed: {error}")))?;

        connection
            .set_ex::<_, _, ()>(key, encoded, CACHE_TTL_SECONDS)
            .await
            .map_err(|error| AppError::Internal(format!("redis write failed: {error}")))
    }
}

#[cfg(test)]
mod tests {
    use mailtrail_core::SessionId;

    use super::RedisAnalysisCache;

    #[test]
    fn keys_are_prefixed_per_session() {
        let client = redis::Client::open("redis://127.0.0.1:6379/0");
        let Ok(client) = client else {
            unreachable!();
        };

        let cache = RedisAnalysisCache::new(client, "exchange_analysis");
        let session_id = SessionId::new();

        assert_eq!(
            cache.key_for(session_id),
            format!("exchange_analysis:{session_id}")
        );
    }
}
