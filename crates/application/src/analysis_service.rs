use std::collections::{BTreeMap, HashMap, HashSet};
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use mailtrail_core::{AppError, AppResult, SessionId};
use mailtrail_domain::format::parse_audit_timestamp;
use mailtrail_domain::{
    AnalysisSession, CountEntry, DatasetFilter, DatasetSummary, DateRange, ExchangeAnalysis,
    FileActivity, FileOperationsAnalysis, FileOperationsSummary, ItemExtract, LogDataset,
    MailboxActivity, OperationDetailGroup, OperationKind, OperationRecord, UserActivityAnalysis,
    UserFileActivity, UserStats,
};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::ports::{AnalysisCache, SessionRepository};

const TOP_FILES_LIMIT: usize = 15;
const FILE_DETAIL_LIMIT: usize = 10;
const FILE_USER_LIMIT: usize = 5;
const TOP_USERS_LIMIT: usize = 15;
const USER_STATS_LIMIT: usize = 20;
const DETAIL_GROUP_LIMIT: usize = 100;
const EXTRACTS_PER_ROW_LIMIT: usize = 3;

/// Supported analysis kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKind {
    /// Overall dataset summary.
    Summary,
    /// File operation breakdown.
    FileOperations,
    /// Per-user activity breakdown.
    UserActivity,
    /// Mailbox operation analysis feeding the timeline.
    Exchange,
}

impl FromStr for AnalysisKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "summary" => Ok(Self::Summary),
            "file_operations" => Ok(Self::FileOperations),
            "user_activity" => Ok(Self::UserActivity),
            "exchange" => Ok(Self::Exchange),
            _ => Err(AppError::Validation(format!(
                "type d'analyse inconnu : '{value}'"
            ))),
        }
    }
}

/// Analysis payload for one kind, serialized transparently.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AnalysisPayload {
    /// Summary payload.
    Summary(DatasetSummary),
    /// File operations payload.
    FileOperations(FileOperationsAnalysis),
    /// User activity payload.
    UserActivity(UserActivityAnalysis),
    /// Exchange payload.
    Exchange(ExchangeAnalysis),
}

/// Application service running dataset analyses.
#[derive(Clone)]
pub struct AnalysisService {
    sessions: Arc<dyn SessionRepository>,
    cache: Arc<dyn AnalysisCache>,
}

impl AnalysisService {
    /// Creates a new analysis service.
    #[must_use]
    pub fn new(sessions: Arc<dyn SessionRepository>, cache: Arc<dyn AnalysisCache>) -> Self {
        Self { sessions, cache }
    }

    /// Runs one analysis kind over a session's dataset.
    pub async fn analyze(
        &self,
        session_id: SessionId,
        kind: AnalysisKind,
        filter: &DatasetFilter,
    ) -> AppResult<AnalysisPayload> {
        match kind {
            AnalysisKind::Summary => {
                let session = self.session(session_id).await?;
                Ok(AnalysisPayload::Summary(compute_summary(&session)))
            }
            AnalysisKind::FileOperations => {
                let session = self.session(session_id).await?;
                Ok(AnalysisPayload::FileOperations(compute_file_operations(
                    &session, filter,
                )))
            }
            AnalysisKind::UserActivity => {
                let session = self.session(session_id).await?;
                Ok(AnalysisPayload::UserActivity(compute_user_activity(
                    &session, filter,
                )))
            }
            AnalysisKind::Exchange => Ok(AnalysisPayload::Exchange(
                self.exchange(session_id, filter).await?,
            )),
        }
    }

    /// Returns the exchange analysis, serving the unfiltered variant from the
    /// cache when possible. Cache failures are logged and never fatal.
    pub async fn exchange(
        &self,
        session_id: SessionId,
        filter: &DatasetFilter,
    ) -> AppResult<ExchangeAnalysis> {
        if filter.is_empty() {
            match self.cache.get_exchange(session_id).await {
                Ok(Some(cached)) => return Ok(cached),
                Ok(None) => {}
                Err(error) => warn!(%session_id, %error, "analysis cache read failed"),
            }
        }

        let session = self.session(session_id).await?;
        let analysis = compute_exchange(&session, filter);

        if filter.is_empty()
            && let Err(error) = self.cache.put_exchange(session_id, &analysis).await
        {
            warn!(%session_id, %error, "analysis cache write failed");
        }

        Ok(analysis)
    }

    async fn session(&self, session_id: SessionId) -> AppResult<AnalysisSession> {
        self.sessions
            .find(session_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("session '{session_id}' introuvable")))
    }
}

fn compute_summary(session: &AnalysisSession) -> DatasetSummary {
    let dataset = &session.dataset;
    let last_row = dataset.row_count().checked_sub(1);

    DatasetSummary {
        log_type: dataset.log_type().as_str().to_owned(),
        total_records: dataset.row_count(),
        columns: dataset.columns().to_vec(),
        date_range: DateRange {
            start: dataset
                .value(0, "CreationDate")
                .unwrap_or_default()
                .to_owned(),
            end: last_row
                .and_then(|row| dataset.value(row, "CreationDate"))
                .unwrap_or_default()
                .to_owned(),
        },
    }
}

fn compute_file_operations(
    session: &AnalysisSession,
    filter: &DatasetFilter,
) -> FileOperationsAnalysis {
    let dataset = &session.dataset;
    let rows = filtered_rows(dataset, filter);

    let files: Vec<&str> = rows
        .iter()
        .filter_map(|&row| dataset.value(row, "SourceFileName"))
        .collect();
    let users: Vec<&str> = rows
        .iter()
        .filter_map(|&row| dataset.value(row, "UserId"))
        .collect();

    let mut top_files = value_counts(files.iter().copied());
    top_files.truncate(TOP_FILES_LIMIT);

    let files_by_user = distinct_in_order(files.iter().copied())
        .into_iter()
        .take(FILE_DETAIL_LIMIT)
        .map(|file| {
            let file_rows: Vec<usize> = rows
                .iter()
                .copied()
                .filter(|&row| dataset.value(row, "SourceFileName") == Some(file))
                .collect();

            FileActivity {
                file: file.to_owned(),
                count: file_rows.len(),
                users: distinct_in_order(
                    file_rows
                        .iter()
                        .filter_map(|&row| dataset.value(row, "UserId")),
                )
                .into_iter()
                .take(FILE_USER_LIMIT)
                .map(|user| session.users.display_name(user).to_owned())
                .collect(),
                operations: value_counts(
                    file_rows
                        .iter()
                        .filter_map(|&row| dataset.value(row, "Operation")),
                ),
            }
        })
        .collect();

    let top_users_detail = value_counts(users.iter().copied())
        .into_iter()
        .take(FILE_DETAIL_LIMIT)
        .map(|entry| {
            let user_rows: Vec<usize> = rows
                .iter()
                .copied()
                .filter(|&row| dataset.value(row, "UserId") == Some(entry.key.as_str()))
                .collect();

            UserFileActivity {
                user: session.users.display_name(entry.key.as_str()).to_owned(),
                count: entry.count,
                operations: value_counts(
                    user_rows
                        .iter()
                        .filter_map(|&row| dataset.value(row, "Operation")),
                ),
                unique_files: distinct_in_order(
                    user_rows
                        .iter()
                        .filter_map(|&row| dataset.value(row, "SourceFileName")),
                )
                .len(),
            }
        })
        .collect();

    FileOperationsAnalysis {
        summary: FileOperationsSummary {
            total_operations: rows.len(),
            unique_files: distinct_in_order(files.iter().copied()).len(),
            unique_users: distinct_in_order(users.iter().copied()).len(),
        },
        top_files,
        operations: value_counts(
            rows.iter()
                .filter_map(|&row| dataset.value(row, "Operation")),
        ),
        files_by_user,
        top_users_detail,
    }
}

fn compute_user_activity(
    session: &AnalysisSession,
    filter: &DatasetFilter,
) -> UserActivityAnalysis {
    let dataset = &session.dataset;
    let rows = filtered_rows(dataset, filter);

    let users: Vec<&str> = rows
        .iter()
        .filter_map(|&row| dataset.value(row, "UserId"))
        .collect();

    let top_users = value_counts(users.iter().copied())
        .into_iter()
        .take(TOP_USERS_LIMIT)
        .map(|entry| CountEntry {
            key: session.users.display_name(entry.key.as_str()).to_owned(),
            count: entry.count,
        })
        .collect();

    let user_stats = distinct_in_order(users.iter().copied())
        .into_iter()
        .take(USER_STATS_LIMIT)
        .map(|user| {
            let user_rows: Vec<usize> = rows
                .iter()
                .copied()
                .filter(|&row| dataset.value(row, "UserId") == Some(user))
                .collect();

            let dates: Vec<&str> = user_rows
                .iter()
                .filter_map(|&row| dataset.value(row, "CreationDate"))
                .collect();

            UserStats {
                user: session.users.display_name(user).to_owned(),
                operations: user_rows.len(),
                unique_files: distinct_in_order(
                    user_rows
                        .iter()
                        .filter_map(|&row| dataset.value(row, "SourceFileName")),
                )
                .len(),
                first_action: dates.iter().min().copied().unwrap_or_default().to_owned(),
                last_action: dates.iter().max().copied().unwrap_or_default().to_owned(),
                operations_breakdown: value_counts(
                    user_rows
                        .iter()
                        .filter_map(|&row| dataset.value(row, "Operation")),
                ),
            }
        })
        .collect();

    UserActivityAnalysis {
        top_users,
        user_stats,
    }
}

fn compute_exchange(session: &AnalysisSession, filter: &DatasetFilter) -> ExchangeAnalysis {
    let dataset = &session.dataset;
    let rows = filtered_rows(dataset, filter);

    let mut unique_mailboxes: HashSet<String> = HashSet::new();
    let mut users_by_operation: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
    let mut details_by_type: BTreeMap<String, Vec<ItemExtract>> = BTreeMap::new();
    let mut records: Vec<OperationRecord> = Vec::new();

    for &row in &rows {
        let operation = dataset.value(row, "Operation").unwrap_or("Unknown");
        let audit: Option<Value> = dataset
            .value(row, "AuditData")
            .and_then(|raw| serde_json::from_str(raw).ok());

        let user = dataset
            .value(row, "MailboxOwnerUPN")
            .or_else(|| dataset.value(row, "UserId"))
            .map(ToOwned::to_owned)
            .or_else(|| {
                audit.as_ref().and_then(|payload| {
                    str_field(payload, "MailboxOwnerUPN")
                        .or_else(|| str_field(payload, "UserId"))
                        .map(ToOwned::to_owned)
                })
            });

        let Some(user) = user.as_deref() else {
            continue;
        };

        unique_mailboxes.insert(user.to_owned());
        *users_by_operation
            .entry(operation.to_owned())
            .or_default()
            .entry(user.to_owned())
            .or_default() += 1;

        // Item extraction and the timeline itself need the raw payload.
        if let Some(audit) = audit.as_ref() {
            let timestamp = str_field(audit, "CreationTime").and_then(parse_audit_timestamp);

            let extracts = extract_items(operation, audit, timestamp);
            let group = details_by_type.entry(operation.to_owned()).or_default();
            let available = DETAIL_GROUP_LIMIT.saturating_sub(group.len());
            group.extend(extracts.into_iter().take(available));

            if let Some(record) = timeline_record(operation, audit, user, timestamp) {
                records.push(record);
            }
        }
    }

    // Most recent first; records without a timestamp sort last.
    records.sort_by(|left, right| right.timestamp.cmp(&left.timestamp));
    records.retain(|record| record_passes(record, filter));

    let operations_by_user = regroup_by_user(&users_by_operation)
        .into_iter()
        .map(|(user, operations)| MailboxActivity {
            user: session.users.display_name(user.as_str()).to_owned(),
            total: operations.iter().map(|entry| entry.count).sum(),
            operations,
        })
        .collect();

    ExchangeAnalysis {
        total_operations: rows.len(),
        unique_mailboxes: unique_mailboxes.len(),
        operations_by_type: value_counts(
            rows.iter()
                .map(|&row| dataset.value(row, "Operation").unwrap_or("Unknown")),
        ),
        operations_by_user,
        operation_details: details_by_type
            .into_iter()
            .map(|(operation, entries)| OperationDetailGroup { operation, entries })
            .collect(),
        detailed_operations: records,
    }
}

/// Builds one timeline record from a row's audit payload, mirroring the
/// per-kind extraction rules of the exchange export:
/// mail access takes one representative item from the first non-empty folder,
/// inbox rules synthesize their label from the parameter list, everything
/// else reads the subject from the payload, its item, or its first affected
/// item.
fn timeline_record(
    operation: &str,
    audit: &Value,
    user: &str,
    timestamp: Option<DateTime<Utc>>,
) -> Option<OperationRecord> {
    let base = |subject: Option<String>, folder: Option<String>, size: Option<u64>| {
        OperationRecord {
            timestamp,
            operation: operation.to_owned(),
            subject,
            folder,
            user: Some(user.to_owned()),
            client_ip: str_field(audit, "ClientIPAddress")
                .or_else(|| str_field(audit, "ClientIP"))
                .map(ToOwned::to_owned),
            size,
            full_data: Some(audit.clone()),
        }
    };

    match OperationKind::classify(operation) {
        OperationKind::MailAccess if has_folders(audit) => {
            let folders = audit.get("Folders").and_then(Value::as_array)?;
            let (folder, item) = folders.iter().find_map(|folder| {
                folder
                    .get("FolderItems")
                    .and_then(Value::as_array)
                    .and_then(|items| items.first())
                    .map(|item| (folder, item))
            })?;

            Some(base(
                str_field(item, "Subject").map(ToOwned::to_owned),
                str_field(folder, "Path").map(ToOwned::to_owned),
                item.get("SizeInBytes").and_then(Value::as_u64),
            ))
        }
        OperationKind::InboxRule => {
            let parameters = parameter_map(audit);
            let lookup = |name: &str| {
                parameters
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| value.as_str())
            };

            let subject = lookup("Name")
                .map(|name| format!("Rule: {name}"))
                .unwrap_or_else(|| "Inbox Rule".to_owned());
            let folder = lookup("From").map(|from| format!("From: {from}"));

            Some(base(Some(subject), folder, None))
        }
        _ => {
            let item = audit.get("Item");
            let affected = audit
                .get("AffectedItems")
                .and_then(Value::as_array)
                .and_then(|items| items.first());

            let subject = str_field(audit, "Subject")
                .or_else(|| item.and_then(|item| str_field(item, "Subject")))
                .or_else(|| affected.and_then(|item| str_field(item, "Subject")))
                .map(ToOwned::to_owned);
            let folder = item
                .or(affected)
                .and_then(|item| item.get("ParentFolder"))
                .and_then(|folder| str_field(folder, "Path"))
                .map(ToOwned::to_owned);
            let size = item
                .or(affected)
                .and_then(|item| item.get("SizeInBytes"))
                .and_then(Value::as_u64);

            Some(base(subject, folder, size))
        }
    }
}

/// Extracts up to three accordion items from one row's payload.
fn extract_items(
    operation: &str,
    audit: &Value,
    timestamp: Option<DateTime<Utc>>,
) -> Vec<ItemExtract> {
    match OperationKind::classify(operation) {
        OperationKind::MailAccess if has_folders(audit) => audit
            .get("Folders")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .flat_map(|folder| {
                let path = str_field(folder, "Path").unwrap_or_default().to_owned();
                folder
                    .get("FolderItems")
                    .and_then(Value::as_array)
                    .map(Vec::as_slice)
                    .unwrap_or_default()
                    .iter()
                    .map(move |item| ItemExtract {
                        timestamp,
                        subject: str_field(item, "Subject").unwrap_or_default().to_owned(),
                        folder: path.clone(),
                        size: item.get("SizeInBytes").and_then(Value::as_u64).unwrap_or(0),
                    })
            })
            .take(EXTRACTS_PER_ROW_LIMIT)
            .collect(),
        OperationKind::InboxRule => {
            let parameters = parameter_map(audit);
            let lookup = |name: &str| {
                parameters
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| value.as_str())
            };

            let name = lookup("Name");
            let from = lookup("From");
            if name.is_none() && from.is_none() {
                return Vec::new();
            }

            vec![ItemExtract {
                timestamp,
                subject: name
                    .map(|name| format!("Rule: {name}"))
                    .unwrap_or_else(|| "Inbox Rule Change".to_owned()),
                folder: from
                    .map(|from| format!("From: {from}"))
                    .or_else(|| lookup("Identity").map(ToOwned::to_owned))
                    .unwrap_or_else(|| "N/A".to_owned()),
                size: 0,
            }]
        }
        _ => {
            let item = audit.get("Item");
            let affected = audit
                .get("AffectedItems")
                .and_then(Value::as_array)
                .and_then(|items| items.first());

            let subject = str_field(audit, "Subject")
                .or_else(|| item.and_then(|item| str_field(item, "Subject")))
                .or_else(|| affected.and_then(|item| str_field(item, "Subject")))
                .unwrap_or_default();
            let folder = item
                .or(affected)
                .and_then(|item| item.get("ParentFolder"))
                .and_then(|folder| str_field(folder, "Path"))
                .unwrap_or_default();
            let size = item
                .or(affected)
                .and_then(|item| item.get("SizeInBytes"))
                .and_then(Value::as_u64)
                .unwrap_or(0);

            if subject.is_empty() && folder.is_empty() && size == 0 {
                return Vec::new();
            }

            vec![ItemExtract {
                timestamp,
                subject: subject.to_owned(),
                folder: folder.to_owned(),
                size,
            }]
        }
    }
}

/// Row-level dataset filter. Column-scoped criteria are skipped when the
/// column is absent from the export, except the user criterion which then
/// matches nothing.
fn filtered_rows(dataset: &LogDataset, filter: &DatasetFilter) -> Vec<usize> {
    let actions = filter.action_list();

    (0..dataset.row_count())
        .filter(|&row| {
            if let Some(user) = active(filter.user.as_deref())
                && !dataset
                    .value(row, "UserId")
                    .is_some_and(|cell| contains_ignore_case(cell, user))
            {
                return false;
            }

            if !actions.is_empty()
                && dataset.has_column("Operation")
                && !dataset
                    .value(row, "Operation")
                    .is_some_and(|cell| actions.contains(&cell))
            {
                return false;
            }

            if let Some(keyword) = active(filter.files.as_deref())
                && dataset.has_column("SourceFileName")
                && !dataset
                    .value(row, "SourceFileName")
                    .is_some_and(|cell| contains_ignore_case(cell, keyword))
            {
                return false;
            }

            if let Some(needle) = active(filter.ips.as_deref())
                && dataset.has_column("ClientIPAddress")
                && !dataset
                    .value(row, "ClientIPAddress")
                    .is_some_and(|cell| cell.contains(needle))
            {
                return false;
            }

            if let Some(needle) = active(filter.exclude_ips.as_deref())
                && dataset
                    .value(row, "ClientIPAddress")
                    .is_some_and(|cell| cell.contains(needle))
            {
                return false;
            }

            if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
                let Some(date) = row_date(dataset, row) else {
                    return false;
                };
                if date < start || date > end {
                    return false;
                }
            }

            true
        })
        .collect()
}

/// Record-level pass for criteria only resolvable from the extracted
/// records, e.g. the client IP carried inside the audit payload.
fn record_passes(record: &OperationRecord, filter: &DatasetFilter) -> bool {
    if let Some(needle) = active(filter.ips.as_deref())
        && !record
            .client_ip
            .as_deref()
            .is_some_and(|ip| ip.contains(needle))
    {
        return false;
    }

    if let Some(needle) = active(filter.exclude_ips.as_deref())
        && record
            .client_ip
            .as_deref()
            .is_some_and(|ip| ip.contains(needle))
    {
        return false;
    }

    if let Some(user) = active(filter.user.as_deref())
        && !record
            .user
            .as_deref()
            .is_some_and(|value| contains_ignore_case(value, user))
    {
        return false;
    }

    let actions = filter.action_list();
    if !actions.is_empty() && !actions.contains(&record.operation.as_str()) {
        return false;
    }

    if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
        let Some(date) = record.timestamp.map(|timestamp| timestamp.date_naive()) else {
            return false;
        };
        if date < start || date > end {
            return false;
        }
    }

    true
}

fn regroup_by_user(
    users_by_operation: &BTreeMap<String, BTreeMap<String, usize>>,
) -> Vec<(String, Vec<CountEntry>)> {
    let mut by_user: BTreeMap<String, Vec<CountEntry>> = BTreeMap::new();
    for (operation, users) in users_by_operation {
        for (user, count) in users {
            by_user.entry(user.clone()).or_default().push(CountEntry {
                key: operation.clone(),
                count: *count,
            });
        }
    }

    let mut grouped: Vec<(String, Vec<CountEntry>)> = by_user.into_iter().collect();
    grouped.sort_by(|left, right| {
        let left_total: usize = left.1.iter().map(|entry| entry.count).sum();
        let right_total: usize = right.1.iter().map(|entry| entry.count).sum();
        right_total.cmp(&left_total).then(left.0.cmp(&right.0))
    });
    grouped
}

fn row_date(dataset: &LogDataset, row: usize) -> Option<NaiveDate> {
    let raw = dataset.value(row, "CreationDate")?;

    if let Some(parsed) = parse_audit_timestamp(raw) {
        return Some(parsed.date_naive());
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|value| value.date())
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}

fn value_counts<'a>(values: impl Iterator<Item = &'a str>) -> Vec<CountEntry> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }

    let mut entries: Vec<CountEntry> = counts
        .into_iter()
        .map(|(key, count)| CountEntry {
            key: key.to_owned(),
            count,
        })
        .collect();
    entries.sort_by(|left, right| right.count.cmp(&left.count).then(left.key.cmp(&right.key)));
    entries
}

fn distinct_in_order<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    values.filter(|value| seen.insert(*value)).collect()
}

fn parameter_map(payload: &Value) -> Vec<(String, String)> {
    payload
        .get("Parameters")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .filter_map(|parameter| {
            let name = str_field(parameter, "Name")?;
            let value = parameter.get("Value")?;
            let value = match value.as_str() {
                Some(text) => text.to_owned(),
                None => value.to_string(),
            };
            Some((name.to_owned(), value))
        })
        .collect()
}

fn has_folders(audit: &Value) -> bool {
    audit
        .get("Folders")
        .and_then(Value::as_array)
        .is_some_and(|folders| !folders.is_empty())
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

fn active(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|trimmed| !trimmed.is_empty())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::str::FromStr;
    use std::sync::Arc;

    use async_trait::async_trait;
    use mailtrail_core::{AppError, AppResult, SessionId};
    use mailtrail_domain::{
        AnalysisSession, DatasetFilter, ExchangeAnalysis, LogDataset, UserDirectory,
    };
    use serde_json::json;
    use tokio::sync::Mutex;

    use super::{AnalysisKind, AnalysisPayload, AnalysisService};
    use crate::ports::{AnalysisCache, SessionRepository};

    struct FakeSessionRepository {
        sessions: Mutex<HashMap<SessionId, AnalysisSession>>,
    }

    impl FakeSessionRepository {
        fn new() -> Self {
            Self {
                sessions: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl SessionRepository for FakeSessionRepository {
        async fn save(&self, session_id: SessionId, session: AnalysisSession) -> AppResult<()> {
            self.sessions.lock().await.insert(session_id, session);
            Ok(())
        }

        async fn find(&self, session_id: SessionId) -> AppResult<Option<AnalysisSession>> {
            Ok(self.sessions.lock().await.get(&session_id).cloned())
        }
    }

    #[derive(Default)]
    struct FakeAnalysisCache {
        entries: Mutex<HashMap<SessionId, ExchangeAnalysis>>,
        fail_reads: bool,
    }

    #[async_trait]
    impl AnalysisCache for FakeAnalysisCache {
        async fn get_exchange(&self, session_id: SessionId) -> AppResult<Option<ExchangeAnalysis>> {
            if self.fail_reads {
                return Err(AppError::Internal("cache offline".to_owned()));
            }
            Ok(self.entries.lock().await.get(&session_id).cloned())
        }

        async fn put_exchange(
            &self,
            session_id: SessionId,
            analysis: &ExchangeAnalysis,
        ) -> AppResult<()> {
            self.entries
                .lock()
                .await
                .insert(session_id, analysis.clone());
            Ok(())
        }
    }

    fn audit_row(operation: &str, payload: &serde_json::Value) -> Vec<String> {
        vec![
            "2024-05-01".to_owned(),
            operation.to_owned(),
            String::new(),
            payload.to_string(),
        ]
    }

    fn exchange_session() -> AnalysisSession {
        let columns = vec![
            "CreationDate".to_owned(),
            "Operation".to_owned(),
            "MailboxOwnerUPN".to_owned(),
            "AuditData".to_owned(),
        ];

        let rows = vec![
            audit_row(
                "MailItemsAccessed",
                &json!({
                    "CreationTime": "2024-05-01T08:10:00",
                    "Operation": "MailItemsAccessed",
                    "UserId": "alice@contoso.com",
                    "ClientIPAddress": "10.0.0.5",
                    "Folders": [
                        {"Path": "\\Inbox", "FolderItems": [
                            {"Subject": "budget", "SizeInBytes": 2048},
                            {"Subject": "agenda"},
                        ]},
                    ],
                }),
            ),
            audit_row(
                "New-InboxRule",
                &json!({
                    "CreationTime": "2024-05-01T09:00:00",
                    "Operation": "New-InboxRule",
                    "UserId": "bob@contoso.com",
                    "ClientIPAddress": "192.168.1.9",
                    "Parameters": [
                        {"Name": "Name", "Value": "Archive"},
                        {"Name": "MoveToFolder", "Value": "Archive"},
                    ],
                }),
            ),
            // No attributable user: counted in totals, absent from the timeline.
            audit_row(
                "HardDelete",
                &json!({
                    "CreationTime": "2024-05-01T07:00:00",
                    "Operation": "HardDelete",
                }),
            ),
        ];

        AnalysisSession {
            dataset: LogDataset::new(columns, rows).unwrap_or_else(|_| unreachable!()),
            users: UserDirectory::from_pairs(vec![(
                "alice@contoso.com".to_owned(),
                "Alice A.".to_owned(),
            )]),
            filename: "export.csv".to_owned(),
        }
    }

    async fn service_with_session() -> (AnalysisService, SessionId) {
        let sessions = Arc::new(FakeSessionRepository::new());
        let cache = Arc::new(FakeAnalysisCache::default());
        let session_id = SessionId::new();
        let saved = sessions.save(session_id, exchange_session()).await;
        assert!(saved.is_ok());

        (AnalysisService::new(sessions, cache), session_id)
    }

    #[test]
    fn analysis_kind_parses_known_values_only() {
        assert!(AnalysisKind::from_str("exchange").is_ok());
        assert!(AnalysisKind::from_str("summary").is_ok());
        assert!(AnalysisKind::from_str("entra").is_err());
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let (service, _) = service_with_session().await;

        let result = service
            .exchange(SessionId::new(), &DatasetFilter::default())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn exchange_extracts_timeline_sorted_most_recent_first() {
        let (service, session_id) = service_with_session().await;

        let analysis = service
            .exchange(session_id, &DatasetFilter::default())
            .await
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(analysis.total_operations, 3);
        assert_eq!(analysis.unique_mailboxes, 2);
        // The userless HardDelete row never reaches the timeline.
        assert_eq!(analysis.detailed_operations.len(), 2);
        assert_eq!(analysis.detailed_operations[0].operation, "New-InboxRule");
        assert_eq!(
            analysis.detailed_operations[0].subject.as_deref(),
            Some("Rule: Archive")
        );
        assert_eq!(
            analysis.detailed_operations[1].subject.as_deref(),
            Some("budget")
        );
        assert_eq!(
            analysis.detailed_operations[1].folder.as_deref(),
            Some("\\Inbox")
        );
        assert_eq!(analysis.detailed_operations[1].size, Some(2048));
    }

    #[tokio::test]
    async fn exchange_counts_every_filtered_row_by_type() {
        let (service, session_id) = service_with_session().await;

        let analysis = service
            .exchange(session_id, &DatasetFilter::default())
            .await
            .unwrap_or_else(|_| unreachable!());

        let hard_delete = analysis
            .operations_by_type
            .iter()
            .find(|entry| entry.key == "HardDelete");
        assert_eq!(hard_delete.map(|entry| entry.count), Some(1));

        let alice = analysis
            .operations_by_user
            .iter()
            .find(|activity| activity.user == "Alice A.");
        assert_eq!(alice.map(|activity| activity.total), Some(1));
    }

    #[tokio::test]
    async fn exchange_ip_filters_apply_to_extracted_records() {
        let (service, session_id) = service_with_session().await;

        let included = service
            .exchange(
                session_id,
                &DatasetFilter {
                    ips: Some("10.0".to_owned()),
                    ..DatasetFilter::default()
                },
            )
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(included.detailed_operations.len(), 1);
        assert_eq!(
            included.detailed_operations[0].operation,
            "MailItemsAccessed"
        );

        let excluded = service
            .exchange(
                session_id,
                &DatasetFilter {
                    exclude_ips: Some("10.0".to_owned()),
                    ..DatasetFilter::default()
                },
            )
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(excluded.detailed_operations.len(), 1);
        assert_eq!(excluded.detailed_operations[0].operation, "New-InboxRule");
    }

    #[tokio::test]
    async fn unfiltered_exchange_is_served_from_cache_once_computed() {
        let sessions = Arc::new(FakeSessionRepository::new());
        let cache = Arc::new(FakeAnalysisCache::default());
        let session_id = SessionId::new();
        let saved = sessions.save(session_id, exchange_session()).await;
        assert!(saved.is_ok());

        let service = AnalysisService::new(sessions.clone(), cache);
        let first = service
            .exchange(session_id, &DatasetFilter::default())
            .await
            .unwrap_or_else(|_| unreachable!());

        // Replace the session; the cached analysis must still be returned.
        let replaced = sessions
            .save(
                session_id,
                AnalysisSession {
                    dataset: LogDataset::new(vec!["Operation".to_owned()], Vec::new())
                        .unwrap_or_else(|_| unreachable!()),
                    users: UserDirectory::new(),
                    filename: "other.csv".to_owned(),
                },
            )
            .await;
        assert!(replaced.is_ok());

        let second = service
            .exchange(session_id, &DatasetFilter::default())
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn cache_failures_fall_back_to_computation() {
        let sessions = Arc::new(FakeSessionRepository::new());
        let cache = Arc::new(FakeAnalysisCache {
            fail_reads: true,
            ..FakeAnalysisCache::default()
        });
        let session_id = SessionId::new();
        let saved = sessions.save(session_id, exchange_session()).await;
        assert!(saved.is_ok());

        let service = AnalysisService::new(sessions, cache);
        let analysis = service
            .exchange(session_id, &DatasetFilter::default())
            .await;
        assert!(analysis.is_ok());
    }

    #[tokio::test]
    async fn summary_reports_type_and_date_range() {
        let (service, session_id) = service_with_session().await;

        let payload = service
            .analyze(session_id, AnalysisKind::Summary, &DatasetFilter::default())
            .await
            .unwrap_or_else(|_| unreachable!());

        let AnalysisPayload::Summary(summary) = payload else {
            panic!("expected a summary payload");
        };
        assert_eq!(summary.log_type, "exchange");
        assert_eq!(summary.total_records, 3);
        assert_eq!(summary.date_range.start, "2024-05-01");
    }

    #[tokio::test]
    async fn user_activity_maps_display_names() {
        let (service, session_id) = service_with_session().await;

        let payload = service
            .analyze(
                session_id,
                AnalysisKind::UserActivity,
                &DatasetFilter::default(),
            )
            .await
            .unwrap_or_else(|_| unreachable!());

        let AnalysisPayload::UserActivity(activity) = payload else {
            panic!("expected a user activity payload");
        };
        // The exchange export has no UserId column, so the breakdown is empty
        // rather than an error.
        assert!(activity.top_users.is_empty());
    }

    #[tokio::test]
    async fn action_filter_keeps_exact_operations_only() {
        let (service, session_id) = service_with_session().await;

        let analysis = service
            .exchange(
                session_id,
                &DatasetFilter {
                    actions: Some("New-InboxRule".to_owned()),
                    ..DatasetFilter::default()
                },
            )
            .await
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(analysis.total_operations, 1);
        assert_eq!(analysis.detailed_operations.len(), 1);
    }
}
