// src/services/appointment_service.rs

use std::cmp::Ordering;

use chrono::{Datelike, Duration, NaiveDate};

use crate::{
    common::text,
    models::appointment::{Appointment, AppointmentQuery, AppointmentSort, AppointmentStatus, DateBucket},
};

/// Janela de domingo a sábado que contém `today`.
pub fn week_bounds(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = today - Duration::days(i64::from(today.weekday().num_days_from_sunday()));
    (start, start + Duration::days(6))
}

pub fn in_bucket(bucket: DateBucket, date: NaiveDate, today: NaiveDate) -> bool {
    match bucket {
        DateBucket::Today => date == today,
        DateBucket::Tomorrow => today.succ_opt() == Some(date),
        DateBucket::ThisWeek => {
            let (start, end) = week_bounds(today);
            start <= date && date <= end
        }
        DateBucket::Upcoming => date >= today,
        DateBucket::Past => date < today,
    }
}

fn matches_search(appointment: &Appointment, term: &str) -> bool {
    [
        appointment.client_name.as_str(),
        appointment.client_email.as_str(),
        appointment.client_phone.as_str(),
        appointment.service.as_str(),
        appointment.stylist.as_str(),
    ]
    .iter()
    .any(|field| text::contains_ci(field, term))
}

/// Busca E status E faixa de data. Mantém a ordem de entrada.
pub fn filter(records: &[Appointment], query: &AppointmentQuery, today: NaiveDate) -> Vec<Appointment> {
    let term = query.search.as_deref().unwrap_or_default();

    records
        .iter()
        .filter(|a| matches_search(a, term))
        .filter(|a| query.status.matches(&a.status))
        .filter(|a| {
            query
                .date
                .as_option()
                .is_none_or(|bucket| in_bucket(*bucket, a.date, today))
        })
        .cloned()
        .collect()
}

fn status_label(status: AppointmentStatus) -> &'static str {
    match status {
        AppointmentStatus::Confirmed => "confirmed",
        AppointmentStatus::Pending => "pending",
        AppointmentStatus::Cancelled => "cancelled",
        AppointmentStatus::Completed => "completed",
    }
}

/// Estável; `Date` é cronológico por data e depois hora.
pub fn sort(records: &[Appointment], key: AppointmentSort) -> Vec<Appointment> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| -> Ordering {
        match key {
            AppointmentSort::Date => (a.date, a.time).cmp(&(b.date, b.time)),
            AppointmentSort::Client => text::compare_text(&a.client_name, &b.client_name),
            AppointmentSort::Status => status_label(a.status).cmp(status_label(b.status)),
        }
    });
    sorted
}

pub fn list_view(records: &[Appointment], query: &AppointmentQuery, today: NaiveDate) -> Vec<Appointment> {
    sort(&filter(records, query, today), query.sort.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::Filter;
    use chrono::{NaiveTime, Utc};
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // quarta-feira
    fn today() -> NaiveDate {
        date(2026, 3, 11)
    }

    fn appointment(client: &str, on: NaiveDate, hour: u32, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: Uuid::now_v7(),
            branch_id: "powai".into(),
            client_name: client.into(),
            client_email: format!("{}@mail.example", client.to_lowercase()),
            client_phone: "9876543210".into(),
            service: "Haircut".into(),
            service_ids: vec![],
            stylist: "No preference".into(),
            stylist_ids: vec![],
            date: on,
            time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            status,
            booking_type: None,
            notes: String::new(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn today_filter_excludes_tomorrow() {
        let records = vec![
            appointment("Asha", today(), 10, AppointmentStatus::Pending),
            appointment("Bina", today().succ_opt().unwrap(), 10, AppointmentStatus::Pending),
        ];
        let query = AppointmentQuery {
            date: Filter::Only(DateBucket::Today),
            ..Default::default()
        };

        let result = filter(&records, &query, today());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].client_name, "Asha");
    }

    #[test]
    fn this_week_is_sunday_to_saturday() {
        assert_eq!(week_bounds(today()), (date(2026, 3, 8), date(2026, 3, 14)));
        // Domingo e sábado são as próprias bordas da janela
        assert_eq!(week_bounds(date(2026, 3, 8)).0, date(2026, 3, 8));
        assert_eq!(week_bounds(date(2026, 3, 14)).1, date(2026, 3, 14));

        assert!(in_bucket(DateBucket::ThisWeek, date(2026, 3, 8), today()));
        assert!(in_bucket(DateBucket::ThisWeek, date(2026, 3, 14), today()));
        assert!(!in_bucket(DateBucket::ThisWeek, date(2026, 3, 7), today()));
        assert!(!in_bucket(DateBucket::ThisWeek, date(2026, 3, 15), today()));
    }

    #[test]
    fn upcoming_and_past_partition_every_date() {
        let start = today() - Duration::days(30);
        for offset in 0..60 {
            let day = start + Duration::days(offset);
            let past = in_bucket(DateBucket::Past, day, today());
            let upcoming = in_bucket(DateBucket::Upcoming, day, today());
            assert!(past ^ upcoming, "{day} must be in exactly one of past/upcoming");
            if in_bucket(DateBucket::Today, day, today()) || in_bucket(DateBucket::Tomorrow, day, today()) {
                assert!(upcoming);
            }
        }
    }

    #[test]
    fn default_query_returns_everything_in_order() {
        let records = vec![
            appointment("Chitra", today(), 12, AppointmentStatus::Completed),
            appointment("Asha", date(2025, 1, 1), 10, AppointmentStatus::Cancelled),
            appointment("Bina", date(2027, 1, 1), 9, AppointmentStatus::Confirmed),
        ];
        let before = records.clone();

        let result = filter(&records, &AppointmentQuery::default(), today());
        assert_eq!(result, records);
        assert_eq!(records, before);
    }

    #[test]
    fn search_and_status_are_combined() {
        let records = vec![
            appointment("Asha", today(), 10, AppointmentStatus::Pending),
            appointment("Asha", today(), 11, AppointmentStatus::Confirmed),
            appointment("Bina", today(), 12, AppointmentStatus::Pending),
        ];
        let query = AppointmentQuery {
            search: Some("ASHA".into()),
            status: Filter::Only(AppointmentStatus::Pending),
            ..Default::default()
        };

        let result = filter(&records, &query, today());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].time.to_string(), "10:00:00");
    }

    #[test]
    fn date_sort_uses_date_then_time() {
        let records = vec![
            appointment("Late", today(), 15, AppointmentStatus::Pending),
            appointment("Early", today(), 9, AppointmentStatus::Pending),
            appointment("Yesterday", today().pred_opt().unwrap(), 18, AppointmentStatus::Pending),
        ];

        let names: Vec<String> = sort(&records, AppointmentSort::Date)
            .into_iter()
            .map(|a| a.client_name)
            .collect();
        assert_eq!(names, vec!["Yesterday", "Early", "Late"]);
    }

    #[test]
    fn sort_keeps_membership_and_is_stable() {
        let records = vec![
            appointment("bina", today(), 10, AppointmentStatus::Pending),
            appointment("Asha", today(), 11, AppointmentStatus::Pending),
            appointment("Bina", today(), 12, AppointmentStatus::Pending),
        ];

        let by_status = sort(&records, AppointmentSort::Status);
        assert_eq!(by_status, records);

        let by_client: Vec<String> = sort(&records, AppointmentSort::Client)
            .into_iter()
            .map(|a| a.client_name)
            .collect();
        assert_eq!(by_client, vec!["Asha", "Bina", "bina"]);
    }
}
