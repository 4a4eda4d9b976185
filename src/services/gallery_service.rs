// src/services/gallery_service.rs

use crate::{
    common::text,
    models::gallery::{GalleryItem, GalleryQuery, GallerySort},
};

pub fn filter(records: &[GalleryItem], query: &GalleryQuery) -> Vec<GalleryItem> {
    let term = query.search.as_deref().unwrap_or_default();
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"));

    records
        .iter()
        .filter(|g| text::contains_ci(&g.title, term) || text::contains_ci(&g.description, term))
        .filter(|g| category.is_none_or(|c| c.eq_ignore_ascii_case(&g.category)))
        .cloned()
        .collect()
}

pub fn sort(records: &[GalleryItem], key: GallerySort) -> Vec<GalleryItem> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| match key {
        GallerySort::Date => b.created_at.cmp(&a.created_at),
        GallerySort::Title => text::compare_text(&a.title, &b.title),
        GallerySort::Category => text::compare_text(&a.category, &b.category),
    });
    sorted
}

pub fn list_view(records: &[GalleryItem], query: &GalleryQuery) -> Vec<GalleryItem> {
    sort(&filter(records, query), query.sort.unwrap_or_default())
}
