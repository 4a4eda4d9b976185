// src/services/catalog_service.rs

use crate::{
    common::text,
    models::catalog::{CatalogQuery, ServiceOffering, Stylist},
};

fn wanted_category(query: &CatalogQuery) -> Option<&str> {
    query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
}

/// Ordem por nome dentro da categoria; categorias na ordem em que aparecem.
pub fn filter_services(records: &[ServiceOffering], query: &CatalogQuery) -> Vec<ServiceOffering> {
    let term = query.search.as_deref().unwrap_or_default();
    let category = wanted_category(query);

    records
        .iter()
        .filter(|s| {
            text::contains_ci(&s.name, term)
                || text::contains_ci(&s.description, term)
                || text::contains_ci(&s.category, term)
        })
        .filter(|s| category.is_none_or(|c| c.eq_ignore_ascii_case(&s.category)))
        .cloned()
        .collect()
}

/// `category` é comparada com as especialidades.
pub fn filter_stylists(records: &[Stylist], query: &CatalogQuery) -> Vec<Stylist> {
    let term = query.search.as_deref().unwrap_or_default();
    let category = wanted_category(query);

    let mut result: Vec<Stylist> = records
        .iter()
        .filter(|s| text::contains_ci(&s.name, term) || text::contains_ci(&s.title, term))
        .filter(|s| {
            category.is_none_or(|c| s.specialties.iter().any(|sp| sp.eq_ignore_ascii_case(c)))
        })
        .cloned()
        .collect();
    result.sort_by(|a, b| text::compare_text(&a.name, &b.name));
    result
}

/// Profissionais exibidos no site de agendamento.
pub fn public_stylists(records: &[Stylist]) -> Vec<Stylist> {
    let active: Vec<Stylist> = records.iter().filter(|s| s.is_active).cloned().collect();
    filter_stylists(&active, &CatalogQuery::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{catalog::StylistDraft, record::DomainRecord};
    use chrono::Utc;
    use uuid::Uuid;

    fn seeded_services() -> Vec<ServiceOffering> {
        ServiceOffering::defaults("powai")
            .into_iter()
            .map(|d| ServiceOffering::create(Uuid::now_v7(), "powai", d, Utc::now()))
            .collect()
    }

    #[test]
    fn category_filter_is_case_insensitive() {
        let query = CatalogQuery {
            category: Some("nails".into()),
            ..Default::default()
        };
        let result = filter_services(&seeded_services(), &query);
        assert!(!result.is_empty());
        assert!(result.iter().all(|s| s.category == "Nails"));
    }

    #[test]
    fn inactive_stylists_are_hidden_publicly() {
        let mut stylists: Vec<Stylist> = Stylist::defaults("thane")
            .into_iter()
            .map(|d: StylistDraft| Stylist::create(Uuid::now_v7(), "thane", d, Utc::now()))
            .collect();
        stylists[0].is_active = false;

        let visible = public_stylists(&stylists);
        assert_eq!(visible.len(), stylists.len() - 1);
        assert!(visible.iter().all(|s| s.is_active));
    }
}
