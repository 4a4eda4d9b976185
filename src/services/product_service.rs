// src/services/product_service.rs

use crate::{
    common::text,
    models::product::{Product, ProductQuery, ProductSort},
};

fn category_matches(category: Option<&str>, value: &str) -> bool {
    match category.map(str::trim) {
        None | Some("") => true,
        Some(c) if c.eq_ignore_ascii_case("all") => true,
        Some(c) => c.eq_ignore_ascii_case(value),
    }
}

pub fn filter(records: &[Product], query: &ProductQuery) -> Vec<Product> {
    let term = query.search.as_deref().unwrap_or_default();
    records
        .iter()
        .filter(|p| {
            text::contains_ci(&p.name, term)
                || text::contains_ci(&p.brand, term)
                || text::contains_ci(&p.description, term)
        })
        .filter(|p| category_matches(query.category.as_deref(), &p.category))
        .filter(|p| query.stock.matches(&p.stock_state()))
        .cloned()
        .collect()
}

/// Preço e estoque ordenam crescente, igual a nome e categoria.
pub fn sort(records: &[Product], key: ProductSort) -> Vec<Product> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| match key {
        ProductSort::Name => text::compare_text(&a.name, &b.name),
        ProductSort::Category => text::compare_text(&a.category, &b.category),
        ProductSort::Price => a.price.cmp(&b.price),
        ProductSort::Stock => a.stock.cmp(&b.stock),
    });
    sorted
}

pub fn list_view(records: &[Product], query: &ProductQuery) -> Vec<Product> {
    sort(&filter(records, query), query.sort.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{product::StockState, record::Filter};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn product(name: &str, category: &str, price: i64, stock: u32) -> Product {
        Product {
            id: Uuid::now_v7(),
            branch_id: "powai".into(),
            name: name.into(),
            category: category.into(),
            brand: "Luxe".into(),
            description: String::new(),
            price: Decimal::from(price),
            stock,
            low_stock_threshold: 5,
            media: vec![],
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("Shampoo", "Hair Care", 450, 20),
            product("Serum", "Hair Care", 1200, 3),
            product("Face Wash", "Skin Care", 300, 0),
        ]
    }

    #[test]
    fn stock_states() {
        let records = catalog();
        assert_eq!(records[0].stock_state(), StockState::InStock);
        assert_eq!(records[1].stock_state(), StockState::LowStock);
        assert_eq!(records[2].stock_state(), StockState::OutOfStock);
    }

    #[test]
    fn stock_and_category_filters_combine() {
        let query = ProductQuery {
            category: Some("hair care".into()),
            stock: Filter::Only(StockState::LowStock),
            ..Default::default()
        };
        let result = filter(&catalog(), &query);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Serum");
    }

    #[test]
    fn all_category_is_no_filter() {
        let records = catalog();
        let query = ProductQuery {
            category: Some("all".into()),
            ..Default::default()
        };
        assert_eq!(filter(&records, &query), records);
    }

    #[test]
    fn price_sort_is_ascending() {
        let names: Vec<String> = sort(&catalog(), ProductSort::Price)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Face Wash", "Shampoo", "Serum"]);
    }
}
