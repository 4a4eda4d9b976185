// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::record::DomainRecord;

// --- 1. Serviços oferecidos pela filial ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOffering {
    pub id: Uuid,
    pub branch_id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub duration_minutes: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDraft {
    #[validate(length(min = 1, message = "Service name is required."))]
    pub name: String,
    #[validate(length(min = 1, message = "Category is required."))]
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[validate(range(min = 5, message = "Duration must be at least 5 minutes."))]
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServicePatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub duration_minutes: Option<u32>,
}

impl DomainRecord for ServiceOffering {
    type Draft = ServiceDraft;
    type Patch = ServicePatch;

    const COLLECTION: &'static str = "services";
    const LABEL: &'static str = "service";

    fn id(&self) -> Uuid {
        self.id
    }

    fn create(id: Uuid, branch_id: &str, draft: ServiceDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            branch_id: branch_id.to_string(),
            name: draft.name,
            category: draft.category,
            description: draft.description,
            price: draft.price,
            duration_minutes: draft.duration_minutes,
            created_at: now,
            updated_at: None,
        }
    }

    fn merge(&mut self, patch: ServicePatch, now: DateTime<Utc>) {
        if let Some(v) = patch.name {
            self.name = v;
        }
        if let Some(v) = patch.category {
            self.category = v;
        }
        if let Some(v) = patch.description {
            self.description = v;
        }
        if let Some(v) = patch.price {
            self.price = v;
        }
        if let Some(v) = patch.duration_minutes {
            self.duration_minutes = v;
        }
        self.updated_at = Some(now);
    }

    fn defaults(_branch_id: &str) -> Vec<ServiceDraft> {
        let service = |name: &str, category: &str, description: &str, price: i64, minutes: u32| ServiceDraft {
            name: name.to_string(),
            category: category.to_string(),
            description: description.to_string(),
            price: Decimal::from(price),
            duration_minutes: minutes,
        };

        vec![
            service("Haircut & Styling", "Hair", "Precision cut with blow-dry finish", 800, 45),
            service("Global Hair Colour", "Hair", "Full-length colour with ammonia-free dye", 3500, 120),
            service("Keratin Treatment", "Hair", "Smoothing treatment for frizz control", 6000, 150),
            service("Classic Facial", "Skin", "Cleanse, exfoliate and hydrate", 1500, 60),
            service("De-Tan Pack", "Skin", "Brightening pack for sun tan", 900, 30),
            service("Manicure", "Nails", "Shape, cuticle care and polish", 700, 40),
            service("Gel Extensions", "Nails", "Gel nail extensions with finish", 2200, 90),
            service("Bridal Makeup", "Makeup", "HD bridal makeup with draping", 15000, 180),
            service("Party Makeup", "Makeup", "Evening look with lashes", 3500, 75),
        ]
    }
}

// --- 2. Profissionais da filial ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Stylist {
    pub id: Uuid,
    pub branch_id: String,
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub experience_years: u32,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StylistDraft {
    #[validate(length(min = 1, message = "Stylist name is required."))]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub experience_years: u32,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

fn active_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StylistPatch {
    pub name: Option<String>,
    pub title: Option<String>,
    pub specialties: Option<Vec<String>>,
    pub experience_years: Option<u32>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

impl DomainRecord for Stylist {
    type Draft = StylistDraft;
    type Patch = StylistPatch;

    const COLLECTION: &'static str = "stylists";
    const LABEL: &'static str = "stylist";

    fn id(&self) -> Uuid {
        self.id
    }

    fn create(id: Uuid, branch_id: &str, draft: StylistDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            branch_id: branch_id.to_string(),
            name: draft.name,
            title: draft.title,
            specialties: draft.specialties,
            experience_years: draft.experience_years,
            bio: draft.bio,
            image_url: draft.image_url,
            is_active: draft.is_active,
            created_at: now,
            updated_at: None,
        }
    }

    fn merge(&mut self, patch: StylistPatch, now: DateTime<Utc>) {
        if let Some(v) = patch.name {
            self.name = v;
        }
        if let Some(v) = patch.title {
            self.title = v;
        }
        if let Some(v) = patch.specialties {
            self.specialties = v;
        }
        if let Some(v) = patch.experience_years {
            self.experience_years = v;
        }
        if let Some(v) = patch.bio {
            self.bio = v;
        }
        if let Some(v) = patch.image_url {
            self.image_url = Some(v);
        }
        if let Some(v) = patch.is_active {
            self.is_active = v;
        }
        self.updated_at = Some(now);
    }

    fn defaults(branch_id: &str) -> Vec<StylistDraft> {
        let stylist = |name: &str, title: &str, specialties: &[&str], years: u32| StylistDraft {
            name: name.to_string(),
            title: title.to_string(),
            specialties: specialties.iter().map(|s| s.to_string()).collect(),
            experience_years: years,
            bio: String::new(),
            image_url: None,
            is_active: true,
        };

        match branch_id {
            "powai" => vec![
                stylist("Meera Kapoor", "Senior Stylist", &["Hair", "Colour"], 9),
                stylist("Arjun Rao", "Stylist", &["Hair"], 4),
                stylist("Sana Shaikh", "Makeup Artist", &["Makeup", "Skin"], 6),
            ],
            "thane" => vec![
                stylist("Kavya Iyer", "Senior Stylist", &["Hair", "Keratin"], 8),
                stylist("Rohan Patil", "Nail Technician", &["Nails"], 3),
            ],
            "vashi" => vec![
                stylist("Neha Joshi", "Stylist", &["Hair", "Skin"], 5),
                stylist("Imran Khan", "Makeup Artist", &["Makeup"], 7),
            ],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase", default)]
#[into_params(parameter_in = Query)]
pub struct CatalogQuery {
    pub search: Option<String>,
    pub category: Option<String>,
}
