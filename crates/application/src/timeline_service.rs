use mailtrail_core::{AppError, AppResult, SessionId};
use mailtrail_domain::{
    DatasetFilter, FilterCriteria, LogDetail, PageSize, RawSegment, TimelineState, TimelineView,
    highlight_matches, project,
};
use serde::{Deserialize, Serialize};

use crate::analysis_service::AnalysisService;

/// One timeline page request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TimelineQuery {
    /// Filter criteria over the session's operation set.
    #[serde(default)]
    pub criteria: FilterCriteria,
    /// Requested page, clamped server-side; defaults to the first page.
    #[serde(default)]
    pub page: Option<usize>,
    /// Rows per page; defaults to fifteen.
    #[serde(default)]
    pub page_size: Option<usize>,
}

/// Detail projection of one record plus its optional search highlighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailProjection {
    /// The projected detail views.
    pub detail: LogDetail,
    /// Raw-JSON segments for the active search query, absent without one.
    pub highlighted: Option<Vec<RawSegment>>,
}

/// Application service running the timeline pipeline
/// (filter -> paginate -> render) over a session's exchange operations.
#[derive(Clone)]
pub struct TimelineService {
    analysis: AnalysisService,
}

impl TimelineService {
    /// Creates a new timeline service.
    #[must_use]
    pub fn new(analysis: AnalysisService) -> Self {
        Self { analysis }
    }

    /// Builds the timeline view for one page request.
    pub async fn timeline(
        &self,
        session_id: SessionId,
        query: TimelineQuery,
    ) -> AppResult<TimelineView> {
        let mut state = self.state(session_id).await?;

        let page_size = match query.page_size {
            Some(value) => PageSize::new(value)?,
            None => PageSize::default(),
        };
        state.set_page_size(page_size);
        state.apply_criteria(query.criteria);
        state.set_page(query.page.unwrap_or(1));

        Ok(state.view())
    }

    /// Projects one record identified by its stable original-collection
    /// index, optionally highlighting the search query in its raw JSON.
    pub async fn detail(
        &self,
        session_id: SessionId,
        record_index: usize,
        highlight: Option<&str>,
    ) -> AppResult<DetailProjection> {
        let state = self.state(session_id).await?;

        let record = state.record_at(record_index).ok_or_else(|| {
            AppError::NotFound(format!(
                "aucune opération à l'index {record_index} pour la session '{session_id}'"
            ))
        })?;

        let detail = project(record);
        let highlighted = highlight
            .map(str::trim)
            .filter(|query| !query.is_empty())
            .map(|query| highlight_matches(detail.raw_json.as_str(), query));

        Ok(DetailProjection {
            detail,
            highlighted,
        })
    }

    async fn state(&self, session_id: SessionId) -> AppResult<TimelineState> {
        let analysis = self
            .analysis
            .exchange(session_id, &DatasetFilter::default())
            .await?;

        Ok(TimelineState::with_records(analysis.detailed_operations))
    }
}
