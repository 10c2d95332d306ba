use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use mailtrail_application::{AnalysisKind, AnalysisPayload};
use mailtrail_core::SessionId;
use mailtrail_domain::DatasetFilter;

use crate::dto::AnalysisFilterRequest;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn analysis_handler(
    State(state): State<AppState>,
    Path((session_id, analysis_type)): Path<(String, String)>,
    Json(payload): Json<AnalysisFilterRequest>,
) -> ApiResult<Json<AnalysisPayload>> {
    let session_id = SessionId::from_str(session_id.as_str())?;
    let kind = AnalysisKind::from_str(analysis_type.as_str())?;
    let filter = DatasetFilter::try_from(payload)?;

    let results = state
        .analysis_service
        .analyze(session_id, kind, &filter)
        .await?;

    Ok(Json(results))
}
