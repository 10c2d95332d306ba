use std::collections::HashMap;

use mailtrail_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Detected log export flavor, derived from the column set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogType {
    /// Sign-in log export.
    Entra,
    /// Mailbox audit export.
    Exchange,
    /// File operation audit export.
    Purview,
    /// Unrecognized column set.
    Unknown,
}

impl LogType {
    /// Detects the log flavor from a column set.
    #[must_use]
    pub fn detect(columns: &[String]) -> Self {
        let has = |name: &str| columns.iter().any(|column| column == name);

        if (has("User") || has("Username")) && has("Status") && has("Application") {
            return Self::Entra;
        }

        if has("MailboxOwnerUPN") || has("ClientInfoString") {
            return Self::Exchange;
        }

        if has("SourceFileName") || has("Operation") {
            return Self::Purview;
        }

        Self::Unknown
    }

    /// Returns the stable wire value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entra => "entra",
            Self::Exchange => "exchange",
            Self::Purview => "purview",
            Self::Unknown => "unknown",
        }
    }
}

/// One parsed log export: column names plus row-major string cells.
///
/// Cells are stored as raw text; empty cells read back as absent, matching
/// how a tabular import treats blanks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogDataset {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    #[serde(skip)]
    column_index: HashMap<String, usize>,
}

impl LogDataset {
    /// Creates a dataset from parsed columns and rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> AppResult<Self> {
        if columns.is_empty() {
            return Err(AppError::Validation(
                "dataset must have at least one column".to_owned(),
            ));
        }

        let column_index = columns
            .iter()
            .enumerate()
            .map(|(index, name)| (name.clone(), index))
            .collect();

        Ok(Self {
            columns,
            rows,
            column_index,
        })
    }

    /// Returns the column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the number of data rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns whether the dataset has a column with this name.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column_lookup(name).is_some()
    }

    /// Returns one cell by row and column name; absent for unknown columns,
    /// short rows, and empty cells.
    #[must_use]
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_lookup(column)?;
        self.rows
            .get(row)?
            .get(index)
            .map(String::as_str)
            .filter(|cell| !cell.is_empty())
    }

    /// Detects the log flavor of this dataset.
    #[must_use]
    pub fn log_type(&self) -> LogType {
        LogType::detect(&self.columns)
    }

    fn column_lookup(&self, name: &str) -> Option<usize> {
        if self.column_index.is_empty() {
            // Deserialized datasets skip the index; fall back to a scan.
            return self.columns.iter().position(|column| column == name);
        }

        self.column_index.get(name).copied()
    }
}

/// Optional mapping from user principal names to display names, loaded from
/// the secondary upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDirectory(HashMap<String, String>);

impl UserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a directory from two-column rows (UPN, display name), skipping
    /// rows where either side is blank.
    #[must_use]
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        Self(
            pairs
                .into_iter()
                .filter_map(|(upn, name)| {
                    let upn = upn.trim().to_owned();
                    let name = name.trim().to_owned();
                    (!upn.is_empty() && !name.is_empty()).then_some((upn, name))
                })
                .collect(),
        )
    }

    /// Resolves a principal to its display name, falling back to the
    /// principal itself.
    #[must_use]
    pub fn display_name<'a>(&'a self, principal: &'a str) -> &'a str {
        self.0.get(principal).map_or(principal, String::as_str)
    }

    /// Returns the number of mapped principals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the directory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One uploaded dataset with its optional user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSession {
    /// The parsed log export.
    pub dataset: LogDataset,
    /// Display-name mapping applied wherever users are listed.
    pub users: UserDirectory,
    /// Original upload file name.
    pub filename: String,
}

#[cfg(test)]
mod tests {
    use super::{LogDataset, LogType, UserDirectory};

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| (*name).to_owned()).collect()
    }

    #[test]
    fn detects_exchange_from_mailbox_columns() {
        assert_eq!(
            LogType::detect(&columns(&["CreationDate", "MailboxOwnerUPN", "Operation"])),
            LogType::Exchange
        );
        assert_eq!(
            LogType::detect(&columns(&["ClientInfoString"])),
            LogType::Exchange
        );
    }

    #[test]
    fn detects_entra_before_purview() {
        assert_eq!(
            LogType::detect(&columns(&["User", "Status", "Application", "Operation"])),
            LogType::Entra
        );
    }

    #[test]
    fn detects_purview_and_unknown() {
        assert_eq!(
            LogType::detect(&columns(&["SourceFileName", "UserId"])),
            LogType::Purview
        );
        assert_eq!(LogType::detect(&columns(&["Whatever"])), LogType::Unknown);
    }

    #[test]
    fn empty_cells_read_back_as_absent() {
        let dataset = LogDataset::new(
            columns(&["Operation", "UserId"]),
            vec![vec!["Update".to_owned(), String::new()]],
        )
        .unwrap_or_else(|_| unreachable!());

        assert_eq!(dataset.value(0, "Operation"), Some("Update"));
        assert_eq!(dataset.value(0, "UserId"), None);
        assert_eq!(dataset.value(0, "Missing"), None);
        assert_eq!(dataset.value(1, "Operation"), None);
    }

    #[test]
    fn dataset_requires_columns() {
        assert!(LogDataset::new(Vec::new(), Vec::new()).is_err());
    }

    #[test]
    fn directory_skips_blank_pairs_and_falls_back() {
        let directory = UserDirectory::from_pairs(vec![
            ("alice@contoso.com".to_owned(), "Alice A.".to_owned()),
            ("  ".to_owned(), "Ghost".to_owned()),
        ]);

        assert_eq!(directory.len(), 1);
        assert_eq!(directory.display_name("alice@contoso.com"), "Alice A.");
        assert_eq!(directory.display_name("bob@contoso.com"), "bob@contoso.com");
    }
}
