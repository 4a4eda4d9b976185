// src/models/branch.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BranchStatus {
    #[default]
    Active,
    Inactive,
}

// ---
// Filial (um salão físico; a unidade de particionamento dos dados)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    #[schema(example = "powai")]
    pub id: String,
    #[schema(example = "Powai")]
    pub name: String,
    pub location: String,
    pub address: String,
    pub phone: String,
    pub whatsapp: String,
    pub manager: String,
    pub email: String,
    #[serde(default)]
    pub status: BranchStatus,
    pub color: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BranchDraft {
    #[validate(length(min = 1, message = "Branch name is required."))]
    #[schema(example = "Andheri West")]
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub whatsapp: String,
    #[serde(default)]
    pub manager: String,
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,
    #[serde(default)]
    pub status: BranchStatus,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BranchPatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub manager: Option<String>,
    pub email: Option<String>,
    pub status: Option<BranchStatus>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// Projeção pronta para os seletores de filial.
#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BranchOption {
    pub value: String,
    pub label: String,
    pub location: String,
    pub color: String,
    pub icon: String,
}

impl Branch {
    pub fn from_draft(id: String, draft: BranchDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name.trim().to_string(),
            location: draft.location,
            address: draft.address,
            phone: draft.phone,
            whatsapp: draft.whatsapp,
            manager: draft.manager,
            email: draft.email.unwrap_or_default(),
            status: draft.status,
            color: draft.color.unwrap_or_else(|| "#6b7280".to_string()),
            icon: draft.icon.unwrap_or_else(|| "store".to_string()),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    pub fn merge(&mut self, patch: BranchPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(whatsapp) = patch.whatsapp {
            self.whatsapp = whatsapp;
        }
        if let Some(manager) = patch.manager {
            self.manager = manager;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(icon) = patch.icon {
            self.icon = icon;
        }
        self.updated_at = Some(now);
    }

    pub fn is_active(&self) -> bool {
        self.status == BranchStatus::Active
    }

    pub fn to_option(&self) -> BranchOption {
        BranchOption {
            value: self.id.clone(),
            label: self.name.clone(),
            location: self.location.clone(),
            color: self.color.clone(),
            icon: self.icon.clone(),
        }
    }
}

/// Filiais que já vêm com o produto e nunca podem ser apagadas.
pub const DEFAULT_BRANCH_IDS: [&str; 3] = ["powai", "thane", "vashi"];

pub fn is_default_branch(id: &str) -> bool {
    DEFAULT_BRANCH_IDS.contains(&id)
}

/// Registro padrão, usado quando não há nada gravado ou o gravado não serve.
pub fn default_branches() -> Vec<Branch> {
    let seed = |id: &str, name: &str, location: &str, address: &str, phone: &str, manager: &str, color: &str| Branch {
        id: id.to_string(),
        name: name.to_string(),
        location: location.to_string(),
        address: address.to_string(),
        phone: phone.to_string(),
        whatsapp: phone.to_string(),
        manager: manager.to_string(),
        email: format!("{id}@salon.example"),
        status: BranchStatus::Active,
        color: color.to_string(),
        icon: "scissors".to_string(),
        created_at: None,
        updated_at: None,
    };

    vec![
        seed(
            "powai",
            "Powai",
            "Powai, Mumbai",
            "Shop 4, Hiranandani Gardens, Powai, Mumbai 400076",
            "+91 98200 11111",
            "Priya Sharma",
            "#db2777",
        ),
        seed(
            "thane",
            "Thane",
            "Thane West",
            "Ground Floor, Eastern Express Hwy, Thane West 400601",
            "+91 98200 22222",
            "Rahul Mehta",
            "#7c3aed",
        ),
        seed(
            "vashi",
            "Vashi",
            "Vashi, Navi Mumbai",
            "Sector 17, Vashi, Navi Mumbai 400703",
            "+91 98200 33333",
            "Anita Desai",
            "#0891b2",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_the_immutable_set() {
        let ids: Vec<String> = default_branches().into_iter().map(|b| b.id).collect();
        for id in DEFAULT_BRANCH_IDS {
            assert!(ids.iter().any(|i| i == id));
        }
    }

    #[test]
    fn merge_only_touches_given_fields() {
        let mut branch = default_branches().remove(0);
        let before = branch.clone();
        let now = Utc::now();

        branch.merge(
            BranchPatch {
                manager: Some("New Manager".into()),
                ..Default::default()
            },
            now,
        );

        assert_eq!(branch.manager, "New Manager");
        assert_eq!(branch.name, before.name);
        assert_eq!(branch.updated_at, Some(now));
    }

    #[test]
    fn option_projection_keeps_display_fields() {
        let branch = default_branches().remove(1);
        let option = branch.to_option();
        assert_eq!(option.value, "thane");
        assert_eq!(option.label, "Thane");
        assert_eq!(option.color, branch.color);
    }
}
