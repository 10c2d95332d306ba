use std::collections::HashMap;

use async_trait::async_trait;
use mailtrail_application::AnalysisCache;
use mailtrail_core::{AppResult, SessionId};
use mailtrail_domain::ExchangeAnalysis;
use tokio::sync::RwLock;

/// In-memory analysis cache, used when no Redis endpoint is configured.
#[derive(Debug, Default)]
pub struct InMemoryAnalysisCache {
    entries: RwLock<HashMap<SessionId, ExchangeAnalysis>>,
}

impl InMemoryAnalysisCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl AnalysisCache for InMemoryAnalysisCache {
    async fn get_exchange(&self, session_id: SessionId) -> AppResult<Option<ExchangeAnalysis>> {
        Ok(self.entries.read().await.get(&session_id).cloned())
    }

    async fn put_exchange(
        &self,
        session_id: SessionId,
        analysis: &ExchangeAnalysis,
    ) -> AppResult<()> {
        self.entries
            .write()
            .await
            .insert(session_id, analysis.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mailtrail_application::AnalysisCache;
    use mailtrail_core::SessionId;
    use mailtrail_domain::ExchangeAnalysis;

    use super::InMemoryAnalysisCache;

    fn analysis() -> ExchangeAnalysis {
        ExchangeAnalysis {
            total_operations: 1,
            unique_mailboxes: 1,
            operations_by_type: Vec::new(),
            operations_by_user: Vec::new(),
            operation_details: Vec::new(),
            detailed_operations: Vec::new(),
        }
    }

    #[tokio::test]
    async fn cached_analyses_round_trip() {
        let cache = InMemoryAnalysisCache::new();
        let session_id = SessionId::new();

        let missing = cache
            .get_exchange(session_id)
            .await
            .unwrap_or_else(|_| unreachable!());
        assert!(missing.is_none());

        let stored = cache.put_exchange(session_id, &analysis()).await;
        assert!(stored.is_ok());

        let found = cache
            .get_exchange(session_id)
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(found.map(|cached| cached.total_operations), Some(1));
    }
}
