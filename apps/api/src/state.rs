use mailtrail_application::{AnalysisService, IngestService, TimelineService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub ingest_service: IngestService,
    pub analysis_service: AnalysisService,
    pub timeline_service: TimelineService,
}
