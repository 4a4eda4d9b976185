// src/models/client.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::record::DomainRecord;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    pub branch_id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Total gasto ("Total" na exportação).
    #[serde(default)]
    pub total_spent: Decimal,
    /// Número de agendamentos ("Appointments" na exportação).
    #[serde(default)]
    pub appointments: u32,
    #[serde(default)]
    pub last_visit: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientDraft {
    #[validate(length(min = 1, message = "Client name is required."))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub total_spent: Decimal,
    #[serde(default)]
    pub appointments: u32,
    #[serde(default)]
    pub last_visit: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub total_spent: Option<Decimal>,
    pub appointments: Option<u32>,
    pub last_visit: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl DomainRecord for Client {
    type Draft = ClientDraft;
    type Patch = ClientPatch;

    const COLLECTION: &'static str = "clients";
    const LABEL: &'static str = "client";

    fn id(&self) -> Uuid {
        self.id
    }

    fn create(id: Uuid, branch_id: &str, draft: ClientDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            branch_id: branch_id.to_string(),
            name: draft.name,
            email: draft.email.filter(|e| !e.trim().is_empty()),
            phone: draft.phone.filter(|p| !p.trim().is_empty()),
            total_spent: draft.total_spent,
            appointments: draft.appointments,
            last_visit: draft.last_visit,
            notes: draft.notes,
            created_at: now,
            updated_at: None,
        }
    }

    fn merge(&mut self, patch: ClientPatch, now: DateTime<Utc>) {
        if let Some(v) = patch.name {
            self.name = v;
        }
        if let Some(v) = patch.email {
            self.email = Some(v).filter(|e| !e.trim().is_empty());
        }
        if let Some(v) = patch.phone {
            self.phone = Some(v).filter(|p| !p.trim().is_empty());
        }
        if let Some(v) = patch.total_spent {
            self.total_spent = v;
        }
        if let Some(v) = patch.appointments {
            self.appointments = v;
        }
        if let Some(v) = patch.last_visit {
            self.last_visit = Some(v);
        }
        if let Some(v) = patch.notes {
            self.notes = v;
        }
        self.updated_at = Some(now);
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClientSort {
    #[default]
    Name,
    Total,
    Appointments,
    Recent,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase", default)]
#[into_params(parameter_in = Query)]
pub struct ClientQuery {
    /// Busca em nome, email ou telefone.
    pub search: Option<String>,
    #[param(value_type = Option<String>, example = "name")]
    pub sort: Option<ClientSort>,
}

// ---
// Resumo da importação
// ---

#[derive(Debug, Clone, Serialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    /// Linha no arquivo de origem, a partir de 1, contando o cabeçalho.
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported: usize,
    pub rejected: Vec<RowError>,
    pub failed: Vec<RowError>,
    pub message: String,
}
