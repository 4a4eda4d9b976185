// src/handlers/uploads.rs

use axum::extract::Multipart;

use crate::{common::error::AppError, models::media::IncomingFile};

/// Junta todas as partes de arquivo do multipart. Parte sem nome de arquivo é ignorada.
pub async fn read_files(mut multipart: Multipart) -> Result<Vec<IncomingFile>, AppError> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed upload: {e}")))?
    {
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Could not read '{name}': {e}")))?;

        files.push(IncomingFile {
            name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
    Ok(files)
}
