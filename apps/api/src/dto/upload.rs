use mailtrail_application::UploadReceipt;
use serde::Serialize;
use ts_rs::TS;

/// Upload receipt returned to the dashboard.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/upload-response.ts"
)]
pub struct UploadResponse {
    pub session_id: String,
    pub log_type: String,
    pub filename: String,
    pub rows: usize,
    pub columns: usize,
}

impl From<UploadReceipt> for UploadResponse {
    fn from(receipt: UploadReceipt) -> Self {
        Self {
            session_id: receipt.session_id.to_string(),
            log_type: receipt.log_type,
            filename: receipt.filename,
            rows: receipt.rows,
            columns: receipt.columns,
        }
    }
}
