use std::collections::HashMap;

use async_trait::async_trait;
use mailtrail_application::SessionRepository;
use mailtrail_core::{AppResult, SessionId};
use mailtrail_domain::AnalysisSession;
use tokio::sync::RwLock;

/// In-memory session repository.
///
/// Sessions live for the lifetime of the process; nothing is persisted
/// across restarts.
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<SessionId, AnalysisSession>>,
}

impl InMemorySessionRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn save(&self, session_id: SessionId, session: AnalysisSession) -> AppResult<()> {
        self.sessions.write().await.insert(session_id, session);
        Ok(())
    }

    async fn find(&self, session_id: SessionId) -> AppResult<Option<AnalysisSession>> {
        Ok(self.sessions.read().await.get(&session_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use mailtrail_application::SessionRepository;
    use mailtrail_core::SessionId;
    use mailtrail_domain::{AnalysisSession, LogDataset, UserDirectory};

    use super::InMemorySessionRepository;

    fn session() -> AnalysisSession {
        AnalysisSession {
            dataset: LogDataset::new(vec!["Operation".to_owned()], Vec::new())
                .unwrap_or_else(|_| unreachable!()),
            users: UserDirectory::new(),
            filename: "export.csv".to_owned(),
        }
    }

    #[tokio::test]
    async fn saved_sessions_are_found_by_id() {
        let repository = InMemorySessionRepository::new();
        let session_id = SessionId::new();

        let saved = repository.save(session_id, session()).await;
        assert!(saved.is_ok());

        let found = repository
            .find(session_id)
            .await
            .unwrap_or_else(|_| unreachable!());
        assert!(found.is_some());

        let missing = repository
            .find(SessionId::new())
            .await
            .unwrap_or_else(|_| unreachable!());
        assert!(missing.is_none());
    }
}
