//! Domain entities and invariants: the timeline core (filter engine,
//! paginator, timeline state machine, detail projector) plus the dataset and
//! analysis models it is fed from.

#![forbid(unsafe_code)]

mod analysis;
mod dataset;
mod detail;
mod filter;
/// Display formatting helpers shared by the renderer and the projector.
pub mod format;
mod operation;
mod pagination;
mod timeline;

pub use analysis::{
    CountEntry, DatasetFilter, DatasetSummary, DateRange, ExchangeAnalysis, FileActivity,
    FileOperationsAnalysis, FileOperationsSummary, ItemExtract, MailboxActivity,
    OperationDetailGroup, UserActivityAnalysis, UserFileActivity, UserStats,
};
pub use dataset::{AnalysisSession, LogDataset, LogType, UserDirectory};
pub use detail::{
    AccessedFolder, AffectedItemDetail, DetailField, FieldGroup, FolderDetail, FolderItemDetail,
    FoldersView, GenericView, InfoPanel, ItemDetail, ItemsView, LogDetail, MailAccessView,
    MoveView, MovedItem, OperationDetailView, RawSegment, RuleView, UpdateView, highlight_matches,
    project,
};
pub use filter::{FilterCriteria, apply_filters};
pub use operation::{OperationKind, OperationRecord};
pub use pagination::{Page, PageSize, paginate, total_pages};
pub use timeline::{RequestToken, TimelineRow, TimelineState, TimelineView};
