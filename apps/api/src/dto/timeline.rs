use mailtrail_application::TimelineQuery;
use mailtrail_domain::{FilterCriteria, TimelineRow, TimelineView};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Timeline page request: filter inputs plus the page window.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/timeline-request.ts"
)]
pub struct TimelineRequest {
    #[serde(default)]
    pub include_ip: Option<String>,
    #[serde(default)]
    pub exclude_ip: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub operation: Option<String>,
    /// Requested page, clamped server-side.
    #[serde(default)]
    pub page: Option<usize>,
    /// Rows per page, default fifteen.
    #[serde(default)]
    pub page_size: Option<usize>,
}

impl From<TimelineRequest> for TimelineQuery {
    fn from(request: TimelineRequest) -> Self {
        Self {
            criteria: FilterCriteria {
                include_ip: request.include_ip,
                exclude_ip: request.exclude_ip,
                user: request.user,
                operation: request.operation,
            },
            page: request.page,
            page_size: request.page_size,
        }
    }
}

/// One rendered timeline row.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/timeline-row-response.ts"
)]
pub struct TimelineRowResponse {
    pub record_index: usize,
    pub timestamp_label: String,
    pub operation_label: String,
    pub display_label: String,
    pub hover_title: String,
    pub user_label: String,
}

impl From<TimelineRow> for TimelineRowResponse {
    fn from(row: TimelineRow) -> Self {
        Self {
            record_index: row.record_index,
            timestamp_label: row.timestamp_label,
            operation_label: row.operation_label,
            display_label: row.display_label,
            hover_title: row.hover_title,
            user_label: row.user_label,
        }
    }
}

/// Timeline table and pagination control view model.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/timeline-view-response.ts"
)]
pub struct TimelineViewResponse {
    pub rows: Vec<TimelineRowResponse>,
    pub page: usize,
    pub total_pages: usize,
    pub total_records: usize,
    pub page_label: String,
    pub previous_enabled: bool,
    pub next_enabled: bool,
    pub is_empty: bool,
}

impl From<TimelineView> for TimelineViewResponse {
    fn from(view: TimelineView) -> Self {
        Self {
            rows: view.rows.into_iter().map(TimelineRowResponse::from).collect(),
            page: view.page,
            total_pages: view.total_pages,
            total_records: view.total_records,
            page_label: view.page_label,
            previous_enabled: view.previous_enabled,
            next_enabled: view.next_enabled,
            is_empty: view.is_empty,
        }
    }
}
