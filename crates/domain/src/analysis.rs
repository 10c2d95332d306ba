//! Analysis result models exchanged between the analysis services, the
//! cache, and the HTTP layer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::operation::OperationRecord;

/// Dataset-level filter criteria accepted by every analysis kind.
///
/// Every field is optional; blank values mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetFilter {
    /// Case-insensitive substring matched against the user column.
    #[serde(default)]
    pub user: Option<String>,
    /// Comma-separated list of exact operation tags to keep.
    #[serde(default)]
    pub actions: Option<String>,
    /// Case-insensitive substring matched against the source file name.
    #[serde(default)]
    pub files: Option<String>,
    /// Substring the client IP must contain.
    #[serde(default)]
    pub ips: Option<String>,
    /// Substring that rejects a row when its client IP contains it.
    #[serde(default)]
    pub exclude_ips: Option<String>,
    /// Inclusive range start.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Inclusive range end.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl DatasetFilter {
    /// Returns whether no criterion is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        fn blank(value: Option<&str>) -> bool {
            value.is_none_or(|text| text.trim().is_empty())
        }

        blank(self.user.as_deref())
            && blank(self.actions.as_deref())
            && blank(self.files.as_deref())
            && blank(self.ips.as_deref())
            && blank(self.exclude_ips.as_deref())
            && self.start_date.is_none()
            && self.end_date.is_none()
    }

    /// Splits the action list into trimmed, non-empty tags.
    #[must_use]
    pub fn action_list(&self) -> Vec<&str> {
        self.actions
            .as_deref()
            .map(|actions| {
                actions
                    .split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// One key/count pair of a breakdown, ordered by descending count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountEntry {
    /// Breakdown key (operation tag, file name, user, ...).
    pub key: String,
    /// Occurrence count.
    pub count: usize,
}

/// Overall dataset summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// Detected log flavor.
    pub log_type: String,
    /// Total record count.
    pub total_records: usize,
    /// Column names of the export.
    pub columns: Vec<String>,
    /// First and last creation dates as found in the export.
    pub date_range: DateRange,
}

/// First/last timestamps of a dataset, raw text as exported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First row's creation date.
    pub start: String,
    /// Last row's creation date.
    pub end: String,
}

/// Headline numbers of the file-operations analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOperationsSummary {
    /// Rows after filtering.
    pub total_operations: usize,
    /// Distinct file names.
    pub unique_files: usize,
    /// Distinct users.
    pub unique_users: usize,
}

/// Per-file activity details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileActivity {
    /// File name.
    pub file: String,
    /// Operation count on the file.
    pub count: usize,
    /// Up to five users touching the file.
    pub users: Vec<String>,
    /// Operation breakdown on the file.
    pub operations: Vec<CountEntry>,
}

/// Per-user file activity details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFileActivity {
    /// Display name of the user.
    pub user: String,
    /// Operation count.
    pub count: usize,
    /// Operation breakdown.
    pub operations: Vec<CountEntry>,
    /// Distinct files touched.
    pub unique_files: usize,
}

/// File-operations analysis payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOperationsAnalysis {
    /// Headline numbers.
    pub summary: FileOperationsSummary,
    /// Most-touched files.
    pub top_files: Vec<CountEntry>,
    /// Operation breakdown.
    pub operations: Vec<CountEntry>,
    /// Per-file details.
    pub files_by_user: Vec<FileActivity>,
    /// Per-user details.
    pub top_users_detail: Vec<UserFileActivity>,
}

/// Per-user statistics of the user-activity analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    /// Display name of the user.
    pub user: String,
    /// Operation count.
    pub operations: usize,
    /// Distinct files touched.
    pub unique_files: usize,
    /// Earliest action timestamp (raw text).
    pub first_action: String,
    /// Latest action timestamp (raw text).
    pub last_action: String,
    /// Operation breakdown.
    pub operations_breakdown: Vec<CountEntry>,
}

/// User-activity analysis payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserActivityAnalysis {
    /// Most active users (display-name mapped).
    pub top_users: Vec<CountEntry>,
    /// Per-user statistics.
    pub user_stats: Vec<UserStats>,
}

/// Per-mailbox activity of the exchange analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailboxActivity {
    /// Display name of the mailbox owner.
    pub user: String,
    /// Total operations by the mailbox.
    pub total: usize,
    /// Operation breakdown.
    pub operations: Vec<CountEntry>,
}

/// One extracted item shown in the per-operation accordion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemExtract {
    /// Event time.
    pub timestamp: Option<DateTime<Utc>>,
    /// Item subject or synthesized label.
    pub subject: String,
    /// Folder path or synthesized label.
    pub folder: String,
    /// Item size in bytes.
    pub size: u64,
}

/// Item extracts grouped by operation tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDetailGroup {
    /// Operation tag.
    pub operation: String,
    /// Extracted items, capped at one hundred per operation.
    pub entries: Vec<ItemExtract>,
}

/// Exchange analysis payload; `detailed_operations` feeds the timeline core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeAnalysis {
    /// Rows after filtering.
    pub total_operations: usize,
    /// Distinct mailboxes touched.
    pub unique_mailboxes: usize,
    /// Operation breakdown.
    pub operations_by_type: Vec<CountEntry>,
    /// Per-mailbox activity (display-name mapped).
    pub operations_by_user: Vec<MailboxActivity>,
    /// Item extracts per operation tag.
    pub operation_details: Vec<OperationDetailGroup>,
    /// Timeline records, ordered timestamp-descending.
    pub detailed_operations: Vec<OperationRecord>,
}

#[cfg(test)]
mod tests {
    use super::DatasetFilter;

    #[test]
    fn blank_filter_is_empty() {
        let filter = DatasetFilter {
            user: Some("  ".to_owned()),
            ..DatasetFilter::default()
        };
        assert!(filter.is_empty());
    }

    #[test]
    fn action_list_trims_and_drops_blanks() {
        let filter = DatasetFilter {
            actions: Some("HardDelete, SoftDelete,,  Move".to_owned()),
            ..DatasetFilter::default()
        };
        assert_eq!(
            filter.action_list(),
            vec!["HardDelete", "SoftDelete", "Move"]
        );
    }

    #[test]
    fn date_bound_makes_filter_active() {
        let filter = DatasetFilter {
            start_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1),
            ..DatasetFilter::default()
        };
        assert!(!filter.is_empty());
    }
}
