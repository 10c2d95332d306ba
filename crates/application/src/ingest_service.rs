use std::sync::Arc;

use mailtrail_core::{AppError, AppResult, SessionId};
use mailtrail_domain::{AnalysisSession, DatasetFilter, UserDirectory};
use serde::Serialize;
use tracing::{info, warn};

use crate::analysis_service::AnalysisService;
use crate::ports::{LogFileParser, SessionRepository};

/// Receipt returned after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadReceipt {
    /// Identifier of the registered analysis session.
    pub session_id: SessionId,
    /// Detected log flavor.
    pub log_type: String,
    /// Original upload file name.
    pub filename: String,
    /// Number of parsed data rows.
    pub rows: usize,
    /// Number of parsed columns.
    pub columns: usize,
}

/// Application service registering uploaded log exports.
#[derive(Clone)]
pub struct IngestService {
    parser: Arc<dyn LogFileParser>,
    sessions: Arc<dyn SessionRepository>,
    analysis: AnalysisService,
}

impl IngestService {
    /// Creates a new ingest service.
    #[must_use]
    pub fn new(
        parser: Arc<dyn LogFileParser>,
        sessions: Arc<dyn SessionRepository>,
        analysis: AnalysisService,
    ) -> Self {
        Self {
            parser,
            sessions,
            analysis,
        }
    }

    /// Parses an uploaded export, registers it under a fresh session, and
    /// precomputes the exchange analysis so the first dashboard request is
    /// served from the cache. The precompute is best-effort: a cache failure
    /// is logged and never fails the upload.
    pub async fn ingest(
        &self,
        filename: &str,
        contents: &[u8],
        user_map: Option<&[u8]>,
    ) -> AppResult<UploadReceipt> {
        if !has_csv_extension(filename) {
            return Err(AppError::Validation(
                "seuls les fichiers CSV sont acceptés".to_owned(),
            ));
        }

        let dataset = self.parser.parse_dataset(contents)?;
        let users = match user_map {
            Some(bytes) => UserDirectory::from_pairs(self.parser.parse_user_pairs(bytes)?),
            None => UserDirectory::new(),
        };

        let session_id = SessionId::new();
        let receipt = UploadReceipt {
            session_id,
            log_type: dataset.log_type().as_str().to_owned(),
            filename: filename.to_owned(),
            rows: dataset.row_count(),
            columns: dataset.column_count(),
        };

        self.sessions
            .save(
                session_id,
                AnalysisSession {
                    dataset,
                    users,
                    filename: filename.to_owned(),
                },
            )
            .await?;

        info!(
            %session_id,
            log_type = receipt.log_type.as_str(),
            rows = receipt.rows,
            "log export registered"
        );

        if let Err(error) = self
            .analysis
            .exchange(session_id, &DatasetFilter::default())
            .await
        {
            warn!(%session_id, %error, "exchange analysis precompute failed");
        }

        Ok(receipt)
    }
}

fn has_csv_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(stem, extension)| !stem.is_empty() && extension.eq_ignore_ascii_case("csv"))
}
