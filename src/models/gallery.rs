// src/models/gallery.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    media::{HasMedia, MediaAttachment},
    record::DomainRecord,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub id: Uuid,
    pub branch_id: String,
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub media: Vec<MediaAttachment>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GalleryDraft {
    #[validate(length(min = 1, message = "Title is required."))]
    pub title: String,
    #[validate(length(min = 1, message = "Category is required."))]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub featured: bool,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GalleryPatch {
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub featured: Option<bool>,
}

impl HasMedia for GalleryItem {
    fn media(&self) -> &[MediaAttachment] {
        &self.media
    }

    fn media_mut(&mut self) -> &mut Vec<MediaAttachment> {
        &mut self.media
    }
}

impl DomainRecord for GalleryItem {
    type Draft = GalleryDraft;
    type Patch = GalleryPatch;

    const COLLECTION: &'static str = "gallery";
    const LABEL: &'static str = "gallery item";
    const DELETE_REQUIRES_SUPER_ADMIN: bool = true;

    fn id(&self) -> Uuid {
        self.id
    }

    fn create(id: Uuid, branch_id: &str, draft: GalleryDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            branch_id: branch_id.to_string(),
            title: draft.title,
            category: draft.category,
            description: draft.description,
            featured: draft.featured,
            media: Vec::new(),
            created_at: now,
            updated_at: None,
        }
    }

    fn merge(&mut self, patch: GalleryPatch, now: DateTime<Utc>) {
        if let Some(v) = patch.title {
            self.title = v;
        }
        if let Some(v) = patch.category {
            self.category = v;
        }
        if let Some(v) = patch.description {
            self.description = v;
        }
        if let Some(v) = patch.featured {
            self.featured = v;
        }
        self.updated_at = Some(now);
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GallerySort {
    /// Mais novos primeiro.
    #[default]
    Date,
    Title,
    Category,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase", default)]
#[into_params(parameter_in = Query)]
pub struct GalleryQuery {
    /// Busca em título ou descrição.
    pub search: Option<String>,
    pub category: Option<String>,
    #[param(value_type = Option<String>, example = "date")]
    pub sort: Option<GallerySort>,
}
