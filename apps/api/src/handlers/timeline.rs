use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use mailtrail_core::SessionId;

use crate::dto::{DetailRequest, DetailResponse, TimelineRequest, TimelineViewResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn timeline_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(payload): Json<TimelineRequest>,
) -> ApiResult<Json<TimelineViewResponse>> {
    let session_id = SessionId::from_str(session_id.as_str())?;

    let view = state
        .timeline_service
        .timeline(session_id, payload.into())
        .await?;

    Ok(Json(TimelineViewResponse::from(view)))
}

pub async fn detail_handler(
    State(state): State<AppState>,
    Path((session_id, record_index)): Path<(String, usize)>,
    Json(payload): Json<DetailRequest>,
) -> ApiResult<Json<DetailResponse>> {
    let session_id = SessionId::from_str(session_id.as_str())?;

    let projection = state
        .timeline_service
        .detail(session_id, record_index, payload.highlight.as_deref())
        .await?;

    Ok(Json(DetailResponse::from(projection)))
}
