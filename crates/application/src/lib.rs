//! Application services and ports orchestrating the Mailtrail analyses.

#![forbid(unsafe_code)]

mod analysis_service;
mod ingest_service;
mod ports;
mod timeline_service;

pub use analysis_service::{AnalysisKind, AnalysisPayload, AnalysisService};
pub use ingest_service::{IngestService, UploadReceipt};
pub use ports::{AnalysisCache, LogFileParser, SessionRepository};
pub use timeline_service::{DetailProjection, TimelineQuery, TimelineService};
