// src/services/booking_service.rs

use std::{collections::HashSet, sync::Arc, time::Duration};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    common::{error::AppError, text},
    models::{
        appointment::{Appointment, AppointmentDraft, AppointmentStatus, BookingType},
        booking::{AppointmentRef, BookingConfirmation, BookingRequest, StylistPreference, ALL_FIELDS},
        catalog::{ServiceOffering, Stylist},
    },
    services::{
        branch_service::BranchRegistry,
        notification::{send_with_timeout, NotificationSink, OutboundMessage},
        record_store::RecordStore,
    },
};

const NO_PREFERENCE_LABEL: &str = "No preference";

#[derive(Clone)]
pub struct BookingService {
    registry: Arc<BranchRegistry>,
    services: RecordStore<ServiceOffering>,
    stylists: RecordStore<Stylist>,
    appointments: RecordStore<Appointment>,
    notifier: Arc<dyn NotificationSink>,
    notify_timeout: Duration,
}

/// Um profissional só pode ter um agendamento não cancelado por horário.
fn slot_taken(existing: &[Appointment], draft: &AppointmentDraft) -> bool {
    if draft.stylist_ids.is_empty() {
        return false;
    }
    existing.iter().any(|a| {
        a.status != AppointmentStatus::Cancelled
            && a.date == draft.date
            && a.time == draft.time
            && a.stylist_ids.iter().any(|id| draft.stylist_ids.contains(id))
    })
}

impl BookingService {
    pub fn new(
        registry: Arc<BranchRegistry>,
        services: RecordStore<ServiceOffering>,
        stylists: RecordStore<Stylist>,
        appointments: RecordStore<Appointment>,
        notifier: Arc<dyn NotificationSink>,
        notify_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            services,
            stylists,
            appointments,
            notifier,
            notify_timeout,
        }
    }

    pub async fn submit(&self, request: BookingRequest, today: NaiveDate) -> Result<BookingConfirmation, AppError> {
        // 1. Valida o formulário inteiro (mesmas regras das etapas do site)
        request.check(today, ALL_FIELDS)?;

        // 2. A filial precisa existir e estar ativa
        let branch = self
            .registry
            .get(request.branch.trim())
            .await
            .filter(|b| b.is_active())
            .ok_or_else(|| AppError::field("branch", "unknown_branch", "Please select a branch."))?;

        // 3. Os serviços escolhidos têm que ser desta filial
        let catalog = self.services.list(&branch.id).await?;
        let wanted: HashSet<Uuid> = request.services.iter().copied().collect();
        let chosen: Vec<&ServiceOffering> = catalog.iter().filter(|s| wanted.contains(&s.id)).collect();
        if chosen.len() != wanted.len() {
            return Err(AppError::field(
                "services",
                "unknown_service",
                "One of the selected services is not offered at this branch.",
            ));
        }

        // 4. Profissional: "sem preferência" ou profissionais ativos da filial
        let preference = StylistPreference::parse(&request.stylists)
            .map_err(|_| AppError::field("stylists", "invalid_stylists", "Unknown stylist selected."))?;
        let stylist_ids = preference.stylist_ids();
        let stylist_label = if stylist_ids.is_empty() {
            NO_PREFERENCE_LABEL.to_string()
        } else {
            let roster = self.stylists.list(&branch.id).await?;
            let names: Vec<String> = stylist_ids
                .iter()
                .map(|id| roster.iter().find(|s| s.id == *id && s.is_active).map(|s| s.name.clone()))
                .collect::<Option<_>>()
                .ok_or_else(|| {
                    AppError::field(
                        "stylists",
                        "unknown_stylist",
                        "One of the selected stylists is not available at this branch.",
                    )
                })?;
            names.join(", ")
        };

        // O `check` acima já garantiu que estes campos existem
        let (Some(date), Some(time), Some(booking_type)) = (request.date, request.time, request.booking_type) else {
            return Err(AppError::BadRequest("Incomplete booking.".into()));
        };

        let draft = AppointmentDraft {
            client_name: request.full_name.trim().to_string(),
            client_email: request.email.clone().unwrap_or_default().trim().to_string(),
            client_phone: text::digits_only(&request.mobile),
            service: chosen.iter().map(|s| s.name.as_str()).collect::<Vec<_>>().join(", "),
            service_ids: chosen.iter().map(|s| s.id).collect(),
            stylist: stylist_label,
            stylist_ids,
            date,
            time,
            status: AppointmentStatus::Pending,
            booking_type: Some(booking_type),
            notes: request.notes.trim().to_string(),
        };

        // 5. Grava como pendente, recusando horário já ocupado pelo mesmo profissional
        let candidate = draft.clone();
        let appointment = self
            .appointments
            .add_checked(&branch.id, draft, move |existing| {
                if slot_taken(existing, &candidate) {
                    tracing::warn!(
                        "Booking refused: {} at {} is already taken for the chosen stylist",
                        candidate.date,
                        candidate.time.format("%H:%M")
                    );
                    return Err(AppError::Conflict(
                        "That time slot is already booked for the selected stylist. Please pick another slot."
                            .into(),
                    ));
                }
                Ok(())
            })
            .await?;

        tracing::info!(
            "📅 Booking {} received for branch '{}' on {} at {}",
            appointment.id,
            branch.id,
            appointment.date,
            appointment.time.format("%H:%M")
        );

        // 6. Aviso por WhatsApp (falha aqui não desfaz o agendamento)
        let notifications_sent = match booking_type {
            BookingType::Whatsapp => self.notify(&branch.name, &appointment).await,
            BookingType::Phone => false,
        };

        let message = match booking_type {
            BookingType::Whatsapp => "Your booking request is in. We will confirm it on WhatsApp shortly.",
            BookingType::Phone => "Your booking request is in. We will call you to confirm it shortly.",
        };

        Ok(BookingConfirmation {
            success: true,
            appointment: AppointmentRef { id: appointment.id },
            notifications_sent,
            email_sent: false,
            sms_sent: false,
            channel: booking_type,
            message: message.to_string(),
        })
    }

    /// Envio lento ou com erro só gera log; o agendamento continua valendo.
    async fn notify(&self, branch_name: &str, appointment: &Appointment) -> bool {
        let message = OutboundMessage {
            to: appointment.client_phone.clone(),
            branch: appointment.branch_id.clone(),
            text: format!(
                "Hi {}, we received your booking at {} for {} on {} at {}. We will confirm it here shortly.",
                appointment.client_name,
                branch_name,
                appointment.service,
                appointment.date.format("%d %b %Y"),
                appointment.time.format("%H:%M")
            ),
        };

        match send_with_timeout(self.notifier.as_ref(), &message, self.notify_timeout).await {
            Ok(note) => {
                tracing::debug!("Booking notification for {}: {}", appointment.id, note);
                true
            }
            Err(e) => {
                tracing::warn!("Booking notification for {} failed: {}", appointment.id, e);
                false
            }
        }
    }
}
