// src/models/admin.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    #[default]
    Admin,
    SuperAdmin,
}

// ---
// Admin como é gravado (o hash fica aqui; a API nunca o expõe)
// ---
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub password_hash: Option<String>,
    pub role: AdminRole,
    pub branches: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Admin {
    pub fn is_super_admin(&self) -> bool {
        self.role == AdminRole::SuperAdmin
    }

    /// O identificador do login é comparado com username ou email, sem diferenciar maiúsculas.
    pub fn matches_identifier(&self, identifier: &str) -> bool {
        let identifier = identifier.trim();
        self.username.eq_ignore_ascii_case(identifier) || self.email.eq_ignore_ascii_case(identifier)
    }

    pub fn profile(&self) -> AdminProfile {
        AdminProfile {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role,
            branches: self.branches.clone(),
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Visão pública da conta de admin.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    pub id: Uuid,
    #[schema(example = "frontdesk.powai")]
    pub username: String,
    pub email: String,
    pub role: AdminRole,
    #[schema(example = json!(["powai"]))]
    pub branches: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload de criação/edição. `password` é obrigatório na criação e opcional na edição.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminDraft {
    #[validate(length(min = 1, message = "Username is required."))]
    pub username: String,

    #[validate(
        length(min = 1, message = "Email is required."),
        email(message = "Enter a valid email address.")
    )]
    pub email: String,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub role: AdminRole,

    #[validate(length(min = 1, message = "Select at least one branch."))]
    #[serde(default)]
    pub branches: Vec<String>,

    #[serde(default)]
    pub is_active: Option<bool>,
}

// ---
// Login
// ---
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    /// Username ou email.
    #[serde(default, alias = "username", alias = "email")]
    pub identifier: String,
    #[serde(default)]
    pub password: String,
}

// Claims do token do admin
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: AdminRole,
    pub exp: usize,
    pub iat: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Admin {
        let now = Utc::now();
        Admin {
            id: Uuid::now_v7(),
            username: "FrontDesk".into(),
            email: "desk@salon.example".into(),
            password_hash: Some("hash".into()),
            role: AdminRole::Admin,
            branches: vec!["powai".into()],
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn identifier_matches_username_or_email() {
        let admin = admin();
        assert!(admin.matches_identifier("frontdesk"));
        assert!(admin.matches_identifier(" DESK@salon.example "));
        assert!(!admin.matches_identifier("someone"));
    }

    #[test]
    fn profile_never_carries_the_hash() {
        let json = serde_json::to_value(admin().profile()).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "admin");
    }

    #[test]
    fn login_payload_accepts_username_or_email_keys() {
        let by_user: LoginPayload =
            serde_json::from_str(r#"{"username":"a","password":"p"}"#).unwrap();
        let by_email: LoginPayload =
            serde_json::from_str(r#"{"email":"a@b.c","password":"p"}"#).unwrap();
        assert_eq!(by_user.identifier, "a");
        assert_eq!(by_email.identifier, "a@b.c");
    }
}
