// src/services/media_service.rs

use std::path::PathBuf;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        media::{HasMedia, IncomingFile, MediaAttachment, MediaPolicy, MediaUploadResponse},
        record::DomainRecord,
        session::BranchAccess,
    },
    services::record_store::RecordStore,
};

pub const MEDIA_URL_PREFIX: &str = "/media";

#[derive(Debug, Default)]
pub struct IngestOutcome {
    /// Anexos aceitos, com os bytes ainda por gravar.
    pub accepted: Vec<(MediaAttachment, Vec<u8>)>,
    pub errors: Vec<String>,
}

fn accepted_type(content_type: &str, policy: &MediaPolicy) -> bool {
    content_type
        .parse::<mime::Mime>()
        .map(|m| policy.accepted_types.iter().any(|t| t == m.type_().as_str()))
        .unwrap_or(false)
}

/// Extensão em minúsculas tirada do nome; senão, do subtipo MIME.
fn extension_for(file: &IncomingFile) -> String {
    let from_name = file
        .name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    from_name
        .or_else(|| {
            file.content_type
                .parse::<mime::Mime>()
                .ok()
                .map(|m| m.subtype().as_str().to_ascii_lowercase())
                .filter(|s| s.chars().all(|c| c.is_ascii_alphanumeric()))
        })
        .unwrap_or_else(|| "bin".to_string())
}

fn size_label(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    match bytes {
        b if b >= MB && b % MB == 0 => format!("{} MB", b / MB),
        b if b >= MB => format!("{:.1} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{} KB", b / KB),
        b => format!("{b} bytes"),
    }
}

/// Para cada arquivo, nesta ordem: tamanho, tipo, espaço restante.
/// As recusas são acumuladas; os arquivos válidos do lote entram mesmo assim.
pub fn ingest(files: Vec<IncomingFile>, policy: &MediaPolicy, existing_count: usize) -> IngestOutcome {
    let mut outcome = IngestOutcome::default();
    let max_size = size_label(policy.max_size);

    for file in files {
        if file.size() > policy.max_size {
            outcome
                .errors
                .push(format!("{}: file is larger than {}", file.name, max_size));
            continue;
        }
        if !accepted_type(&file.content_type, policy) {
            outcome
                .errors
                .push(format!("{}: only image and video files are accepted", file.name));
            continue;
        }
        if existing_count + outcome.accepted.len() >= policy.max_files {
            outcome.errors.push(format!(
                "{}: no more than {} files per item",
                file.name, policy.max_files
            ));
            continue;
        }

        let id = Uuid::now_v7();
        let attachment = MediaAttachment {
            id,
            url: format!("{MEDIA_URL_PREFIX}/{id}.{}", extension_for(&file)),
            name: file.name.clone(),
            size: file.size(),
            content_type: file.content_type.clone(),
            alt_text: None,
            is_uploading: true,
            created_at: Utc::now(),
        };
        outcome.accepted.push((attachment, file.bytes));
    }
    outcome
}

/// Um aviso único para o lote inteiro.
pub fn combined_message(errors: &[String]) -> Option<String> {
    if errors.is_empty() {
        return None;
    }
    Some(format!("Some files were not added: {}", errors.join("; ")))
}

#[derive(Clone)]
pub struct MediaService {
    dir: PathBuf,
    policy: MediaPolicy,
}

impl MediaService {
    pub fn new(dir: PathBuf, policy: MediaPolicy) -> Self {
        Self { dir, policy }
    }

    pub fn policy(&self) -> &MediaPolicy {
        &self.policy
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    async fn stage(&self, accepted: Vec<(MediaAttachment, Vec<u8>)>) -> Result<Vec<MediaAttachment>, AppError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::StorageError(format!("media directory: {e}")))?;

        let mut staged = Vec::with_capacity(accepted.len());
        for (mut attachment, bytes) in accepted {
            let path = self.dir.join(attachment.stored_name());
            if let Err(e) = tokio::fs::write(&path, &bytes).await {
                self.release(&staged).await;
                return Err(AppError::StorageError(format!("writing {}: {e}", path.display())));
            }
            attachment.is_uploading = false;
            staged.push(attachment);
        }
        Ok(staged)
    }

    /// Melhor esforço: arquivo que não pode ser apagado só gera log.
    pub async fn release(&self, attachments: &[MediaAttachment]) {
        for attachment in attachments {
            let path = self.dir.join(attachment.stored_name());
            if let Err(e) = tokio::fs::remove_file(&path).await {
                tracing::warn!("Could not remove media file {}: {}", path.display(), e);
            }
        }
    }

    pub async fn attach<T>(
        &self,
        store: &RecordStore<T>,
        branch_id: &str,
        record_id: Uuid,
        files: Vec<IncomingFile>,
    ) -> Result<MediaUploadResponse, AppError>
    where
        T: DomainRecord + HasMedia,
    {
        // 1. Filtra o lote contra o que o registro já tem
        let existing = store.get(branch_id, record_id).await?.media().len();
        let IngestOutcome { accepted, mut errors } = ingest(files, &self.policy, existing);
        // 2. Grava os arquivos no disco
        let staged = self.stage(accepted).await?;

        // 3. Anexa sob o lock do store (a coleção pode ter crescido desde a leitura)
        let max_files = self.policy.max_files;
        let to_attach = staged.clone();
        let result = store
            .update_with(branch_id, record_id, move |record| {
                let room = max_files.saturating_sub(record.media().len());
                let mut overflow = to_attach;
                let take = room.min(overflow.len());
                let admitted: Vec<MediaAttachment> = overflow.drain(..take).collect();
                record.media_mut().extend(admitted.iter().cloned());
                Ok((admitted, overflow))
            })
            .await;

        let (admitted, overflow) = match result {
            Ok((_, pair)) => pair,
            Err(e) => {
                self.release(&staged).await;
                return Err(e);
            }
        };
        // 4. O que não coube é apagado do disco e reportado
        if !overflow.is_empty() {
            for attachment in &overflow {
                errors.push(format!(
                    "{}: no more than {} files per item",
                    attachment.name, max_files
                ));
            }
            self.release(&overflow).await;
        }

        if !errors.is_empty() {
            tracing::warn!("{} upload(s) rejected for {} {}", errors.len(), T::LABEL, record_id);
        }
        Ok(MediaUploadResponse {
            message: combined_message(&errors),
            media: admitted,
            errors,
        })
    }

    pub async fn detach<T>(
        &self,
        store: &RecordStore<T>,
        branch_id: &str,
        record_id: Uuid,
        media_id: Uuid,
    ) -> Result<T, AppError>
    where
        T: DomainRecord + HasMedia,
    {
        let (record, removed) = store
            .update_with(branch_id, record_id, move |record| {
                let media = record.media_mut();
                let position = media
                    .iter()
                    .position(|m| m.id == media_id)
                    .ok_or_else(|| AppError::NotFound(format!("No attachment with id {media_id}")))?;
                Ok(media.remove(position))
            })
            .await?;

        self.release(std::slice::from_ref(&removed)).await;
        Ok(record)
    }

    /// Aceita qualquer texto; vazio limpa o alt.
    pub async fn update_alt_text<T>(
        &self,
        store: &RecordStore<T>,
        branch_id: &str,
        record_id: Uuid,
        media_id: Uuid,
        alt_text: String,
    ) -> Result<MediaAttachment, AppError>
    where
        T: DomainRecord + HasMedia,
    {
        let (_, attachment) = store
            .update_with(branch_id, record_id, move |record| {
                let attachment = record
                    .media_mut()
                    .iter_mut()
                    .find(|m| m.id == media_id)
                    .ok_or_else(|| AppError::NotFound(format!("No attachment with id {media_id}")))?;
                attachment.alt_text = Some(alt_text).filter(|t| !t.trim().is_empty());
                Ok(attachment.clone())
            })
            .await?;
        Ok(attachment)
    }

    /// Apaga o registro e os arquivos dele.
    pub async fn delete_record<T>(
        &self,
        actor: &BranchAccess,
        store: &RecordStore<T>,
        branch_id: &str,
        record_id: Uuid,
    ) -> Result<T, AppError>
    where
        T: DomainRecord + HasMedia,
    {
        let removed = store.delete(actor, branch_id, record_id).await?;
        self.release(removed.media()).await;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::MemoryStateStore,
        models::{
            admin::AdminRole,
            gallery::{GalleryDraft, GalleryItem},
        },
    };
    use std::sync::Arc;

    fn image(name: &str, size: usize) -> IncomingFile {
        IncomingFile {
            name: name.into(),
            content_type: "image/jpeg".into(),
            bytes: vec![0u8; size],
        }
    }

    fn policy(max_files: usize) -> MediaPolicy {
        MediaPolicy {
            max_files,
            max_size: 1024,
            ..Default::default()
        }
    }

    #[test]
    fn batch_is_capped_by_remaining_room() {
        let files = vec![image("a.jpg", 10), image("b.jpg", 10), image("c.jpg", 10)];
        let outcome = ingest(files, &policy(2), 1);

        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.errors.len(), 2);
    }

    #[test]
    fn never_admits_more_than_the_room_left() {
        for existing in 0..6 {
            for batch in 0..8 {
                let files = (0..batch).map(|i| image(&format!("{i}.png"), 1)).collect();
                let outcome = ingest(files, &policy(5), existing);
                assert!(outcome.accepted.len() <= 5usize.saturating_sub(existing));
                assert_eq!(outcome.accepted.len() + outcome.errors.len(), batch);
            }
        }
    }

    #[test]
    fn size_and_type_are_checked() {
        let mut pdf = image("menu.pdf", 10);
        pdf.content_type = "application/pdf".into();
        let mut clip = image("clip.mp4", 10);
        clip.content_type = "video/mp4".into();
        let files = vec![image("big.jpg", 2048), pdf, image("empty.jpg", 0), clip];

        let outcome = ingest(files, &policy(10), 0);
        let names: Vec<&str> = outcome.accepted.iter().map(|(a, _)| a.name.as_str()).collect();
        assert_eq!(names, vec!["empty.jpg", "clip.mp4"]);
        assert_eq!(outcome.errors[0], "big.jpg: file is larger than 1 KB");
        assert!(outcome.errors[1].starts_with("menu.pdf"));
    }

    #[test]
    fn size_limit_is_reported_in_a_readable_unit() {
        assert_eq!(size_label(10 * 1024 * 1024), "10 MB");
        assert_eq!(size_label(1536 * 1024), "1.5 MB");
        assert_eq!(size_label(512 * 1024), "512 KB");
        assert_eq!(size_label(900), "900 bytes");
    }

    #[test]
    fn duplicate_names_get_distinct_ids() {
        let outcome = ingest(vec![image("x.jpg", 1), image("x.jpg", 1)], &policy(10), 0);
        let (a, b) = (&outcome.accepted[0].0, &outcome.accepted[1].0);
        assert_ne!(a.id, b.id);
        assert_ne!(a.url, b.url);
        assert!(a.url.starts_with("/media/") && a.url.ends_with(".jpg"));
    }

    #[test]
    fn combined_message_joins_errors() {
        assert_eq!(combined_message(&[]), None);
        let message = combined_message(&["a: too big".into(), "b: bad type".into()]).unwrap();
        assert!(message.contains("a: too big; b: bad type"));
    }

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("salon-media-{}", Uuid::now_v7()))
    }

    async fn gallery_item(store: &RecordStore<GalleryItem>) -> GalleryItem {
        store
            .add(
                "powai",
                GalleryDraft {
                    title: "Bridal".into(),
                    category: "Makeup".into(),
                    description: String::new(),
                    featured: false,
                },
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn attach_alt_text_detach_and_delete() {
        let dir = temp_dir();
        let service = MediaService::new(dir.clone(), policy(3));
        let store: RecordStore<GalleryItem> = RecordStore::new(Arc::new(MemoryStateStore::new()));
        let item = gallery_item(&store).await;

        let upload = service
            .attach(&store, "powai", item.id, vec![image("a.jpg", 4), image("b.jpg", 4)])
            .await
            .unwrap();
        assert_eq!(upload.media.len(), 2);
        assert!(upload.errors.is_empty());
        assert!(upload.media.iter().all(|m| !m.is_uploading));
        let first = upload.media[0].clone();
        assert!(dir.join(first.stored_name()).exists());

        let updated = service
            .update_alt_text(&store, "powai", item.id, first.id, "Bride in red".into())
            .await
            .unwrap();
        assert_eq!(updated.alt_text.as_deref(), Some("Bride in red"));

        let after = service.detach(&store, "powai", item.id, first.id).await.unwrap();
        assert_eq!(after.media.len(), 1);
        assert!(!dir.join(first.stored_name()).exists());

        let owner = BranchAccess::new(Uuid::nil(), AdminRole::SuperAdmin, vec!["powai".into()], None);
        let removed = service.delete_record(&owner, &store, "powai", item.id).await.unwrap();
        assert!(!dir.join(removed.media[0].stored_name()).exists());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn attach_to_missing_record_is_not_found() {
        let service = MediaService::new(temp_dir(), policy(3));
        let store: RecordStore<GalleryItem> = RecordStore::new(Arc::new(MemoryStateStore::new()));
        let result = service
            .attach(&store, "powai", Uuid::now_v7(), vec![image("a.jpg", 4)])
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
