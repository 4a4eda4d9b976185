// src/models/media.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Upload validado que pertence a exatamente um produto ou item da galeria.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaAttachment {
    pub id: Uuid,
    /// Referência servida localmente para preview, ex. `/media/0190...jpg`.
    pub url: String,
    pub name: String,
    /// Bytes.
    pub size: u64,
    #[serde(rename = "type")]
    #[schema(example = "image/jpeg")]
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub is_uploading: bool,
    pub created_at: DateTime<Utc>,
}

impl MediaAttachment {
    /// Nome do arquivo dentro do diretório de mídia.
    pub fn stored_name(&self) -> String {
        self.url.rsplit('/').next().unwrap_or_default().to_string()
    }
}

#[derive(Debug, Clone)]
pub struct MediaPolicy {
    pub max_files: usize,
    pub max_size: u64,
    /// Tipos MIME de primeiro nível aceitos (`image`, `video`).
    pub accepted_types: Vec<String>,
}

impl Default for MediaPolicy {
    fn default() -> Self {
        Self {
            max_files: 10,
            max_size: 10 * 1024 * 1024,
            accepted_types: vec!["image".to_string(), "video".to_string()],
        }
    }
}

/// Arquivo bruto, como chega do upload multipart.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl IncomingFile {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Registros que têm uma coleção de anexos.
pub trait HasMedia {
    fn media(&self) -> &[MediaAttachment];
    fn media_mut(&mut self) -> &mut Vec<MediaAttachment>;
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AltTextPayload {
    pub alt_text: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaUploadResponse {
    pub media: Vec<MediaAttachment>,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
