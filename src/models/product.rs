// src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::{
    media::{HasMedia, MediaAttachment},
    record::{DomainRecord, Filter},
};

pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub branch_id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub stock: u32,
    #[serde(default = "default_threshold")]
    pub low_stock_threshold: u32,
    #[serde(default)]
    pub media: Vec<MediaAttachment>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_threshold() -> u32 {
    DEFAULT_LOW_STOCK_THRESHOLD
}

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("Price cannot be negative.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    #[validate(length(min = 1, message = "Product name is required."))]
    pub name: String,
    #[validate(length(min = 1, message = "Category is required."))]
    pub category: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub description: String,
    #[validate(custom(function = "validate_not_negative"))]
    pub price: Decimal,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub low_stock_threshold: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<u32>,
    pub low_stock_threshold: Option<u32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StockState {
    InStock,
    LowStock,
    OutOfStock,
}

impl Product {
    pub fn stock_state(&self) -> StockState {
        if self.stock == 0 {
            StockState::OutOfStock
        } else if self.stock <= self.low_stock_threshold {
            StockState::LowStock
        } else {
            StockState::InStock
        }
    }
}

impl HasMedia for Product {
    fn media(&self) -> &[MediaAttachment] {
        &self.media
    }

    fn media_mut(&mut self) -> &mut Vec<MediaAttachment> {
        &mut self.media
    }
}

impl DomainRecord for Product {
    type Draft = ProductDraft;
    type Patch = ProductPatch;

    const COLLECTION: &'static str = "products";
    const LABEL: &'static str = "product";
    const DELETE_REQUIRES_SUPER_ADMIN: bool = true;

    fn id(&self) -> Uuid {
        self.id
    }

    fn create(id: Uuid, branch_id: &str, draft: ProductDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            branch_id: branch_id.to_string(),
            name: draft.name,
            category: draft.category,
            brand: draft.brand,
            description: draft.description,
            price: draft.price,
            stock: draft.stock,
            low_stock_threshold: draft.low_stock_threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD),
            media: Vec::new(),
            created_at: now,
            updated_at: None,
        }
    }

    fn merge(&mut self, patch: ProductPatch, now: DateTime<Utc>) {
        if let Some(v) = patch.name {
            self.name = v;
        }
        if let Some(v) = patch.category {
            self.category = v;
        }
        if let Some(v) = patch.brand {
            self.brand = v;
        }
        if let Some(v) = patch.description {
            self.description = v;
        }
        if let Some(v) = patch.price {
            self.price = v;
        }
        if let Some(v) = patch.stock {
            self.stock = v;
        }
        if let Some(v) = patch.low_stock_threshold {
            self.low_stock_threshold = v;
        }
        self.updated_at = Some(now);
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Name,
    Category,
    Price,
    Stock,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase", default)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    /// Busca em nome, marca ou descrição.
    pub search: Option<String>,
    #[param(value_type = Option<String>, example = "Hair Care")]
    pub category: Option<String>,
    #[param(value_type = Option<String>, example = "low_stock")]
    pub stock: Filter<StockState>,
    #[param(value_type = Option<String>, example = "price")]
    pub sort: Option<ProductSort>,
}
