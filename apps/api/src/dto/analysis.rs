use chrono::NaiveDate;
use mailtrail_core::AppError;
use mailtrail_domain::DatasetFilter;
use serde::Deserialize;
use ts_rs::TS;

/// Dataset-level filter criteria accepted by the analysis endpoints.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/analysis-filter-request.ts"
)]
pub struct AnalysisFilterRequest {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub actions: Option<String>,
    #[serde(default)]
    pub files: Option<String>,
    #[serde(default)]
    pub ips: Option<String>,
    #[serde(default)]
    pub exclude_ips: Option<String>,
    /// Inclusive range start, `YYYY-MM-DD`.
    #[serde(default)]
    pub start_date: Option<String>,
    /// Inclusive range end, `YYYY-MM-DD`.
    #[serde(default)]
    pub end_date: Option<String>,
}

impl TryFrom<AnalysisFilterRequest> for DatasetFilter {
    type Error = AppError;

    fn try_from(request: AnalysisFilterRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            user: request.user,
            actions: request.actions,
            files: request.files,
            ips: request.ips,
            exclude_ips: request.exclude_ips,
            start_date: parse_date(request.start_date.as_deref())?,
            end_date: parse_date(request.end_date.as_deref())?,
        })
    }
}

fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(|trimmed| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .map_err(|_| AppError::Validation(format!("date invalide : '{trimmed}'")))
        })
        .transpose()
}
