// src/models/appointment.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::record::{DomainRecord, Filter};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Confirmed,
    #[default]
    Pending,
    Cancelled,
    Completed,
}

/// Como o cliente quer receber a confirmação.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookingType {
    Whatsapp,
    Phone,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub branch_id: String,
    pub client_name: String,
    #[serde(default)]
    pub client_email: String,
    pub client_phone: String,
    /// Lista dos serviços agendados, para exibição.
    pub service: String,
    #[serde(default)]
    pub service_ids: Vec<Uuid>,
    /// Nome(s) para exibição, ou "No preference".
    pub stylist: String,
    #[serde(default)]
    pub stylist_ids: Vec<Uuid>,
    pub date: NaiveDate,
    #[schema(value_type = String, example = "10:30:00")]
    pub time: NaiveTime,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub booking_type: Option<BookingType>,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDraft {
    #[validate(length(min = 1, message = "Client name is required."))]
    pub client_name: String,
    #[serde(default)]
    pub client_email: String,
    #[validate(length(min = 1, message = "Client phone is required."))]
    pub client_phone: String,
    #[validate(length(min = 1, message = "Service is required."))]
    pub service: String,
    #[serde(default)]
    pub service_ids: Vec<Uuid>,
    #[serde(default)]
    pub stylist: String,
    #[serde(default)]
    pub stylist_ids: Vec<Uuid>,
    pub date: NaiveDate,
    #[schema(value_type = String, example = "10:30:00")]
    pub time: NaiveTime,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub booking_type: Option<BookingType>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPatch {
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub service: Option<String>,
    pub stylist: Option<String>,
    pub date: Option<NaiveDate>,
    #[schema(value_type = Option<String>)]
    pub time: Option<NaiveTime>,
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
}

impl DomainRecord for Appointment {
    type Draft = AppointmentDraft;
    type Patch = AppointmentPatch;

    const COLLECTION: &'static str = "appointments";
    const LABEL: &'static str = "appointment";
    const DELETE_REQUIRES_SUPER_ADMIN: bool = true;

    fn id(&self) -> Uuid {
        self.id
    }

    fn create(id: Uuid, branch_id: &str, draft: AppointmentDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            branch_id: branch_id.to_string(),
            client_name: draft.client_name,
            client_email: draft.client_email,
            client_phone: draft.client_phone,
            service: draft.service,
            service_ids: draft.service_ids,
            stylist: draft.stylist,
            stylist_ids: draft.stylist_ids,
            date: draft.date,
            time: draft.time,
            status: draft.status,
            booking_type: draft.booking_type,
            notes: draft.notes,
            created_at: now,
            updated_at: None,
        }
    }

    fn merge(&mut self, patch: AppointmentPatch, now: DateTime<Utc>) {
        if let Some(v) = patch.client_name {
            self.client_name = v;
        }
        if let Some(v) = patch.client_email {
            self.client_email = v;
        }
        if let Some(v) = patch.client_phone {
            self.client_phone = v;
        }
        if let Some(v) = patch.service {
            self.service = v;
        }
        if let Some(v) = patch.stylist {
            self.stylist = v;
        }
        if let Some(v) = patch.date {
            self.date = v;
        }
        if let Some(v) = patch.time {
            self.time = v;
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        if let Some(v) = patch.notes {
            self.notes = v;
        }
        self.updated_at = Some(now);
    }
}

// ---
// Listagem: filtro + ordenação
// ---

/// Faixas de data relativas; a hora é ignorada.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DateBucket {
    Today,
    Tomorrow,
    ThisWeek,
    Upcoming,
    Past,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentSort {
    #[default]
    Date,
    Client,
    Status,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase", default)]
#[into_params(parameter_in = Query)]
pub struct AppointmentQuery {
    /// Busca em nome, email e telefone do cliente, serviço ou profissional.
    pub search: Option<String>,
    #[param(value_type = Option<String>, example = "pending")]
    pub status: Filter<AppointmentStatus>,
    #[param(value_type = Option<String>, example = "today")]
    pub date: Filter<DateBucket>,
    #[param(value_type = Option<String>, example = "date")]
    pub sort: Option<AppointmentSort>,
}
