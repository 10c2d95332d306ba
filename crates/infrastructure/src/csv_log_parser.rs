use mailtrail_application::LogFileParser;
use mailtrail_core::{AppError, AppResult};
use mailtrail_domain::LogDataset;

/// CSV adapter for the log parser port.
///
/// Rows are read flexibly: short rows are padded by the dataset accessor and
/// the `AuditData` column may embed quoted JSON, which the CSV quoting rules
/// handle.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvLogParser;

impl CsvLogParser {
    /// Creates the parser.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl LogFileParser for CsvLogParser {
    fn parse_dataset(&self, contents: &[u8]) -> AppResult<LogDataset> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(contents);

        let columns: Vec<String> = reader
            .headers()
            .map_err(|error| AppError::Validation(format!("fichier CSV invalide : {error}")))?
            .iter()
            .map(ToOwned::to_owned)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record
                .map_err(|error| AppError::Validation(format!("fichier CSV invalide : {error}")))?;
            rows.push(record.iter().map(ToOwned::to_owned).collect());
        }

        LogDataset::new(columns, rows)
    }

    fn parse_user_pairs(&self, contents: &[u8]) -> AppResult<Vec<(String, String)>> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(contents);

        let mut pairs = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|error| {
                AppError::Validation(format!("fichier de correspondance invalide : {error}"))
            })?;

            if let (Some(principal), Some(name)) = (record.get(0), record.get(1)) {
                pairs.push((principal.to_owned(), name.to_owned()));
            }
        }

        Ok(pairs)
    }
}
