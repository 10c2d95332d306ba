mod analysis;
mod common;
mod detail;
mod timeline;
mod upload;

pub use analysis::AnalysisFilterRequest;
pub use common::HealthResponse;
pub use detail::{DetailRequest, DetailResponse, LogDetailResponse, RawSegmentResponse};
pub use timeline::{TimelineRequest, TimelineRowResponse, TimelineViewResponse};
pub use upload::UploadResponse;
