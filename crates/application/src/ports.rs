use async_trait::async_trait;
use mailtrail_core::{AppResult, SessionId};
use mailtrail_domain::{AnalysisSession, ExchangeAnalysis, LogDataset};

/// Parser port turning an uploaded log export into a dataset.
pub trait LogFileParser: Send + Sync {
    /// Parses a log export file into columns and rows.
    fn parse_dataset(&self, bytes: &[u8]) -> AppResult<LogDataset>;

    /// Parses a two-column user-mapping file into (principal, display name)
    /// pairs.
    fn parse_user_pairs(&self, bytes: &[u8]) -> AppResult<Vec<(String, String)>>;
}

/// Repository port for analysis sessions.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Stores a session under its identifier.
    async fn save(&self, session_id: SessionId, session: AnalysisSession) -> AppResult<()>;

    /// Returns one session by identifier.
    async fn find(&self, session_id: SessionId) -> AppResult<Option<AnalysisSession>>;
}

/// Cache port for precomputed exchange analyses.
///
/// The cache only ever holds the unfiltered analysis of a session; filtered
/// requests are always recomputed.
#[async_trait]
pub trait AnalysisCache: Send + Sync {
    /// Returns the cached unfiltered exchange analysis for a session.
    async fn get_exchange(&self, session_id: SessionId) -> AppResult<Option<ExchangeAnalysis>>;

    /// Stores the unfiltered exchange analysis for a session.
    async fn put_exchange(
        &self,
        session_id: SessionId,
        analysis: &ExchangeAnalysis,
    ) -> AppResult<()>;
}
