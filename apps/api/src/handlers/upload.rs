use axum::Json;
use axum::extract::{Multipart, State};
use mailtrail_core::AppError;

use crate::dto::UploadResponse;
use crate::error::ApiResult;
use crate::state::AppState;

const FILE_FIELD: &str = "file";
const USER_MAP_FIELD: &str = "user_map_file";

pub async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut user_map: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| AppError::Validation(format!("formulaire invalide : {error}")))?
    {
        let name = field.name().map(ToOwned::to_owned);
        match name.as_deref() {
            Some(FILE_FIELD) => {
                let filename = field
                    .file_name()
                    .map(ToOwned::to_owned)
                    .ok_or_else(|| AppError::Validation("aucun fichier fourni".to_owned()))?;
                let contents = field.bytes().await.map_err(|error| {
                    AppError::Validation(format!("lecture du fichier impossible : {error}"))
                })?;
                upload = Some((filename, contents.to_vec()));
            }
            Some(USER_MAP_FIELD) => {
                let contents = field.bytes().await.map_err(|error| {
                    AppError::Validation(format!("lecture du fichier impossible : {error}"))
                })?;
                user_map = Some(contents.to_vec());
            }
            _ => {}
        }
    }

    let (filename, contents) =
        upload.ok_or_else(|| AppError::Validation("aucun fichier fourni".to_owned()))?;

    let receipt = state
        .ingest_service
        .ingest(filename.as_str(), &contents, user_map.as_deref())
        .await?;

    Ok(Json(UploadResponse::from(receipt)))
}
