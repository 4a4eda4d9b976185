// src/models/booking.rs

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use crate::{
    common::{error::AppError, text},
    models::{
        appointment::BookingType,
        catalog::{ServiceOffering, Stylist},
    },
};

pub const NO_PREFERENCE: &str = "no-preference";

/// Horários de meia em meia hora no calendário, das 10:00 às 19:30.
pub fn time_slots() -> Vec<NaiveTime> {
    (10..20)
        .flat_map(|hour| [0, 30].into_iter().map(move |minute| (hour, minute)))
        .filter_map(|(hour, minute)| NaiveTime::from_hms_opt(hour, minute, 0))
        .collect()
}

// ---
// Preferência de profissional: "sem preferência" OU um conjunto não vazio
// ---
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StylistPreference {
    #[default]
    NoPreference,
    Specific(BTreeSet<Uuid>),
}

impl StylistPreference {
    /// Formato no JSON: `["no-preference"]`, `[]` (a mesma coisa) ou lista de ids de profissionais.
    pub fn parse(values: &[String]) -> Result<Self, &'static str> {
        if values.is_empty() || (values.len() == 1 && values[0] == NO_PREFERENCE) {
            return Ok(StylistPreference::NoPreference);
        }
        if values.iter().any(|v| v == NO_PREFERENCE) {
            return Err("Choose either no preference or specific stylists, not both.");
        }
        values
            .iter()
            .map(|v| Uuid::parse_str(v).map_err(|_| "Unknown stylist selected."))
            .collect::<Result<BTreeSet<_>, _>>()
            .map(StylistPreference::Specific)
    }

    pub fn to_wire(&self) -> Vec<String> {
        match self {
            StylistPreference::NoPreference => vec![NO_PREFERENCE.to_string()],
            StylistPreference::Specific(ids) => ids.iter().map(Uuid::to_string).collect(),
        }
    }

    pub fn stylist_ids(&self) -> Vec<Uuid> {
        match self {
            StylistPreference::NoPreference => Vec::new(),
            StylistPreference::Specific(ids) => ids.iter().copied().collect(),
        }
    }
}

// ---
// Payload do POST /api/appointments
// ---
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    #[serde(default)]
    #[schema(example = "powai")]
    pub branch: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    #[schema(example = "98765 43210")]
    pub mobile: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub services: Vec<Uuid>,
    #[serde(default)]
    #[schema(example = json!(["no-preference"]))]
    pub stylists: Vec<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "10:30:00")]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub booking_type: Option<BookingType>,
    #[serde(default)]
    pub notes: String,
}

pub const BRANCH_FIELDS: &[&str] = &["branch"];
pub const DETAIL_FIELDS: &[&str] = &["fullName", "mobile", "services"];
pub const STYLIST_FIELDS: &[&str] = &["stylists"];
pub const SCHEDULE_FIELDS: &[&str] = &["date", "time", "bookingType"];
pub const ALL_FIELDS: &[&str] = &[
    "branch",
    "fullName",
    "mobile",
    "services",
    "stylists",
    "date",
    "time",
    "bookingType",
];

fn push(
    errors: &mut ValidationErrors,
    fields: &[&'static str],
    field: &'static str,
    code: &'static str,
    message: &'static str,
) {
    if fields.contains(&field) {
        let mut error = ValidationError::new(code);
        error.message = Some(message.into());
        errors.add(field, error);
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StageQuery {
    pub stage: BookingStage,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageCheck {
    pub stage: BookingStage,
    pub next: BookingStage,
}

impl BookingRequest {
    /// Validação de uma etapa só; o resto do payload pode vir vazio.
    pub fn check_stage(&self, today: NaiveDate, stage: BookingStage) -> Result<StageCheck, ValidationErrors> {
        self.check(today, stage.fields())?;
        Ok(StageCheck {
            stage,
            next: stage.next(),
        })
    }

    /// Valida só os campos listados; `ALL_FIELDS` é a validação completa antes do envio.
    pub fn check(&self, today: NaiveDate, fields: &[&'static str]) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.branch.trim().is_empty() {
            push(&mut errors, fields, "branch", "required", "Please select a branch.");
        }
        if self.full_name.trim().is_empty() {
            push(&mut errors, fields, "fullName", "required", "Full name is required.");
        }
        if text::digits_only(&self.mobile).len() != 10 {
            push(
                &mut errors,
                fields,
                "mobile",
                "invalid_mobile",
                "Enter a valid 10-digit mobile number.",
            );
        }
        if self.services.is_empty() {
            push(&mut errors, fields, "services", "required", "Select at least one service.");
        }
        if let Err(message) = StylistPreference::parse(&self.stylists) {
            push(&mut errors, fields, "stylists", "invalid_stylists", message);
        }
        match self.date {
            None => push(&mut errors, fields, "date", "required", "Please choose a date."),
            Some(date) if date < today => push(
                &mut errors,
                fields,
                "date",
                "past_date",
                "The date cannot be in the past.",
            ),
            Some(_) => {}
        }
        match self.time {
            None => push(&mut errors, fields, "time", "required", "Please choose a time slot."),
            Some(time) if !time_slots().contains(&time) => push(
                &mut errors,
                fields,
                "time",
                "invalid_slot",
                "Please choose one of the available time slots.",
            ),
            Some(_) => {}
        }
        if self.booking_type.is_none() {
            push(
                &mut errors,
                fields,
                "bookingType",
                "required",
                "Choose how you would like your booking confirmed.",
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRef {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    pub success: bool,
    pub appointment: AppointmentRef,
    pub notifications_sent: bool,
    pub email_sent: bool,
    pub sms_sent: bool,
    /// Canal que o salão vai usar para confirmar.
    pub channel: BookingType,
    pub message: String,
}

// =========================================================================
//  FORMULÁRIO DE AGENDAMENTO (filial -> dados + serviços -> profissional -> horário -> revisão)
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookingStage {
    #[default]
    Branch,
    Details,
    Stylist,
    Schedule,
    Review,
}

impl BookingStage {
    /// Campos validados ao sair desta etapa.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            BookingStage::Branch => BRANCH_FIELDS,
            BookingStage::Details => DETAIL_FIELDS,
            BookingStage::Stylist => STYLIST_FIELDS,
            BookingStage::Schedule => SCHEDULE_FIELDS,
            BookingStage::Review => ALL_FIELDS,
        }
    }

    pub fn next(self) -> Self {
        match self {
            BookingStage::Branch => BookingStage::Details,
            BookingStage::Details => BookingStage::Stylist,
            BookingStage::Stylist => BookingStage::Schedule,
            BookingStage::Schedule | BookingStage::Review => BookingStage::Review,
        }
    }

    fn previous(self) -> Self {
        match self {
            BookingStage::Branch | BookingStage::Details => BookingStage::Branch,
            BookingStage::Stylist => BookingStage::Details,
            BookingStage::Schedule => BookingStage::Stylist,
            BookingStage::Review => BookingStage::Schedule,
        }
    }
}

/// Sub-estado do seletor de serviços dentro da etapa de dados.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ServicePicker {
    #[default]
    CategoryList,
    CategoryDetail(String),
    Search(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedService {
    pub id: Uuid,
    pub name: String,
    pub category: String,
}

/// Modelo do formulário do site de agendamento (etapas, seletor de serviços,
/// profissional, horário). O servidor não guarda este estado: valida cada etapa
/// com `BookingRequest::check_stage` e o envio final com `ALL_FIELDS`.
#[derive(Debug, Clone, Default)]
pub struct BookingForm {
    pub stage: BookingStage,
    pub branch: Option<String>,
    pub full_name: String,
    pub mobile: String,
    pub email: Option<String>,
    pub selected: Vec<SelectedService>,
    pub picker: ServicePicker,
    /// Categorias que o cliente marcou como concluídas.
    finished: BTreeSet<String>,
    pub stylists: StylistPreference,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub booking_type: Option<BookingType>,
    pub notes: String,
}

impl BookingForm {
    pub fn new() -> Self {
        Self::default()
    }

    // --- filial ---

    /// Trocar de filial descarta serviços e profissionais escolhidos na anterior.
    pub fn select_branch(&mut self, branch_id: &str) {
        if self.branch.as_deref() == Some(branch_id) {
            return;
        }
        self.branch = Some(branch_id.to_string());
        self.selected.clear();
        self.finished.clear();
        self.picker = ServicePicker::CategoryList;
        self.stylists = StylistPreference::NoPreference;
    }

    // --- seleção de serviços ---

    /// Categorias ainda não concluídas, mais a que está aberta.
    pub fn visible_categories(&self, catalog: &[ServiceOffering]) -> Vec<String> {
        let open = match &self.picker {
            ServicePicker::CategoryDetail(category) => Some(category.as_str()),
            _ => None,
        };

        let mut categories: Vec<String> = Vec::new();
        for service in catalog {
            let category = &service.category;
            if categories.contains(category) {
                continue;
            }
            if self.finished.contains(category) && open != Some(category.as_str()) {
                continue;
            }
            categories.push(category.clone());
        }
        categories
    }

    /// Abrir uma categoria concluída reabre para edição.
    pub fn open_category(&mut self, category: &str) {
        self.finished.remove(category);
        self.picker = ServicePicker::CategoryDetail(category.to_string());
    }

    pub fn services_in_open_category<'a>(&self, catalog: &'a [ServiceOffering]) -> Vec<&'a ServiceOffering> {
        match &self.picker {
            ServicePicker::CategoryDetail(category) => {
                catalog.iter().filter(|s| &s.category == category).collect()
            }
            _ => Vec::new(),
        }
    }

    pub fn is_selected(&self, service_id: Uuid) -> bool {
        self.selected.iter().any(|s| s.id == service_id)
    }

    /// Marca/desmarca; retorna se o serviço ficou selecionado.
    pub fn toggle_service(&mut self, service: &ServiceOffering) -> bool {
        if self.is_selected(service.id) {
            self.selected.retain(|s| s.id != service.id);
            false
        } else {
            self.selected.push(SelectedService {
                id: service.id,
                name: service.name.clone(),
                category: service.category.clone(),
            });
            true
        }
    }

    /// "Concluir categoria": volta para a lista; a categoria conta como concluída
    /// quando tem pelo menos um serviço selecionado.
    pub fn finish_category(&mut self) {
        if let ServicePicker::CategoryDetail(category) = &self.picker {
            if self.selected.iter().any(|s| &s.category == category) {
                self.finished.insert(category.clone());
            }
        }
        self.picker = ServicePicker::CategoryList;
    }

    /// "Adicionar serviços de outra categoria".
    pub fn add_from_another_category(&mut self) {
        self.finish_category();
    }

    pub fn is_finished(&self, category: &str) -> bool {
        self.finished.contains(category)
    }

    /// A busca só liga/desliga a partir da lista de categorias.
    pub fn toggle_search(&mut self) {
        self.picker = match &self.picker {
            ServicePicker::CategoryList => ServicePicker::Search(String::new()),
            ServicePicker::Search(_) => ServicePicker::CategoryList,
            detail @ ServicePicker::CategoryDetail(_) => detail.clone(),
        };
    }

    pub fn set_search_query(&mut self, query: &str) {
        if let ServicePicker::Search(current) = &mut self.picker {
            *current = query.to_string();
        }
    }

    /// Só fica ativa com mais de dois caracteres.
    pub fn search_results<'a>(&self, catalog: &'a [ServiceOffering]) -> Vec<&'a ServiceOffering> {
        let ServicePicker::Search(query) = &self.picker else {
            return Vec::new();
        };
        let query = query.trim();
        if query.chars().count() <= 2 {
            return Vec::new();
        }
        catalog
            .iter()
            .filter(|s| {
                text::contains_ci(&s.name, query)
                    || text::contains_ci(&s.description, query)
                    || text::contains_ci(&s.category, query)
            })
            .collect()
    }

    /// Adiciona direto na seleção, sem abrir a categoria.
    pub fn select_search_result(&mut self, service: &ServiceOffering) {
        if !self.is_selected(service.id) {
            self.toggle_service(service);
        }
    }

    // --- preferência de profissional ---

    pub fn available_stylists<'a>(&self, stylists: &'a [Stylist]) -> Vec<&'a Stylist> {
        let Some(branch) = self.branch.as_deref() else {
            return Vec::new();
        };
        stylists
            .iter()
            .filter(|s| s.is_active && s.branch_id == branch)
            .collect()
    }

    pub fn choose_no_preference(&mut self) {
        self.stylists = StylistPreference::NoPreference;
    }

    /// Escolher um profissional tira o "sem preferência"; remover o último volta para ele.
    pub fn toggle_stylist(&mut self, stylist_id: Uuid) {
        match &mut self.stylists {
            StylistPreference::NoPreference => {
                self.stylists = StylistPreference::Specific(BTreeSet::from([stylist_id]));
            }
            StylistPreference::Specific(ids) => {
                if !ids.remove(&stylist_id) {
                    ids.insert(stylist_id);
                }
                if ids.is_empty() {
                    self.stylists = StylistPreference::NoPreference;
                }
            }
        }
    }

    // --- horário ---

    pub fn choose_date(&mut self, date: NaiveDate, today: NaiveDate) -> Result<(), AppError> {
        if date < today {
            return Err(AppError::field(
                "date",
                "past_date",
                "The date cannot be in the past.",
            ));
        }
        self.date = Some(date);
        Ok(())
    }

    pub fn choose_time(&mut self, time: NaiveTime) -> Result<(), AppError> {
        if !time_slots().contains(&time) {
            return Err(AppError::field(
                "time",
                "invalid_slot",
                "Please choose one of the available time slots.",
            ));
        }
        self.time = Some(time);
        Ok(())
    }

    // --- transições de etapa ---

    /// Valida a etapa atual e avança; se falhar, a etapa não muda.
    pub fn advance(&mut self, today: NaiveDate) -> Result<BookingStage, AppError> {
        let check = self.to_request().check_stage(today, self.stage)?;
        self.stage = check.next;
        Ok(self.stage)
    }

    pub fn back(&mut self) -> BookingStage {
        self.stage = self.stage.previous();
        self.stage
    }

    /// Validação completa antes do envio.
    pub fn validate(&self, today: NaiveDate) -> Result<BookingRequest, AppError> {
        let request = self.to_request();
        request.check(today, ALL_FIELDS)?;
        Ok(request)
    }

    pub fn to_request(&self) -> BookingRequest {
        BookingRequest {
            branch: self.branch.clone().unwrap_or_default(),
            full_name: self.full_name.trim().to_string(),
            mobile: self.mobile.clone(),
            email: self.email.clone().filter(|e| !e.trim().is_empty()),
            services: self.selected.iter().map(|s| s.id).collect(),
            stylists: self.stylists.to_wire(),
            date: self.date,
            time: self.time,
            booking_type: self.booking_type,
            notes: self.notes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn offering(name: &str, category: &str) -> ServiceOffering {
        ServiceOffering {
            id: Uuid::now_v7(),
            branch_id: "powai".into(),
            name: name.into(),
            category: category.into(),
            description: format!("{name} service"),
            price: Decimal::from(500),
            duration_minutes: 30,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn catalog() -> Vec<ServiceOffering> {
        vec![
            offering("Haircut", "Hair"),
            offering("Hair Spa", "Hair"),
            offering("Classic Facial", "Skin"),
            offering("Manicure", "Nails"),
        ]
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn slot(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn slots_are_half_hourly() {
        let slots = time_slots();
        assert_eq!(slots.first(), Some(&slot(10, 0)));
        assert_eq!(slots.last(), Some(&slot(19, 30)));
        assert_eq!(slots.len(), 20);
    }

    #[test]
    fn finished_categories_leave_the_list_until_reopened() {
        let catalog = catalog();
        let mut form = BookingForm::new();
        form.select_branch("powai");

        form.open_category("Hair");
        form.toggle_service(&catalog[0]);
        form.finish_category();

        assert!(form.is_finished("Hair"));
        assert_eq!(form.visible_categories(&catalog), vec!["Skin", "Nails"]);

        form.open_category("Hair");
        assert!(!form.is_finished("Hair"));
        assert_eq!(form.visible_categories(&catalog), vec!["Hair", "Skin", "Nails"]);
    }

    #[test]
    fn done_without_selection_does_not_finish_category() {
        let catalog = catalog();
        let mut form = BookingForm::new();
        form.open_category("Skin");
        assert_eq!(form.services_in_open_category(&catalog).len(), 1);
        form.add_from_another_category();

        assert_eq!(form.picker, ServicePicker::CategoryList);
        assert!(!form.is_finished("Skin"));
    }

    #[test]
    fn toggle_service_is_a_checklist() {
        let catalog = catalog();
        let mut form = BookingForm::new();
        form.open_category("Hair");
        assert!(form.toggle_service(&catalog[0]));
        assert!(form.toggle_service(&catalog[1]));
        assert!(!form.toggle_service(&catalog[0]));
        assert_eq!(form.selected.len(), 1);
        assert_eq!(form.selected[0].name, "Hair Spa");
    }

    #[test]
    fn search_needs_more_than_two_characters() {
        let catalog = catalog();
        let mut form = BookingForm::new();
        form.toggle_search();

        form.set_search_query("ha");
        assert!(form.search_results(&catalog).is_empty());

        form.set_search_query("hair");
        let names: Vec<&str> = form.search_results(&catalog).iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Haircut", "Hair Spa"]);

        form.set_search_query("ski");
        assert_eq!(form.search_results(&catalog).len(), 1);
    }

    #[test]
    fn selecting_a_search_result_stays_in_search() {
        let catalog = catalog();
        let mut form = BookingForm::new();
        form.toggle_search();
        form.set_search_query("mani");
        let hit = form.search_results(&catalog)[0].clone();

        form.select_search_result(&hit);
        form.select_search_result(&hit);

        assert_eq!(form.selected.len(), 1);
        assert!(matches!(form.picker, ServicePicker::Search(_)));
        form.toggle_search();
        assert_eq!(form.picker, ServicePicker::CategoryList);
    }

    #[test]
    fn search_cannot_be_toggled_inside_a_category() {
        let mut form = BookingForm::new();
        form.open_category("Hair");
        form.toggle_search();
        assert_eq!(form.picker, ServicePicker::CategoryDetail("Hair".into()));
    }

    #[test]
    fn stylist_preference_is_exclusive() {
        let mut form = BookingForm::new();
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();

        form.toggle_stylist(a);
        form.toggle_stylist(b);
        assert_eq!(form.stylists, StylistPreference::Specific(BTreeSet::from([a, b])));

        form.choose_no_preference();
        assert_eq!(form.stylists, StylistPreference::NoPreference);

        form.toggle_stylist(a);
        form.toggle_stylist(a);
        assert_eq!(form.stylists, StylistPreference::NoPreference);
    }

    #[test]
    fn stylist_wire_format() {
        assert_eq!(
            StylistPreference::parse(&[NO_PREFERENCE.to_string()]),
            Ok(StylistPreference::NoPreference)
        );
        assert!(StylistPreference::parse(&[NO_PREFERENCE.to_string(), Uuid::nil().to_string()]).is_err());
        assert!(StylistPreference::parse(&["not-an-id".to_string()]).is_err());
    }

    #[test]
    fn past_dates_and_unknown_slots_are_rejected() {
        let mut form = BookingForm::new();
        assert!(form.choose_date(today().pred_opt().unwrap(), today()).is_err());
        assert!(form.choose_date(today(), today()).is_ok());
        assert!(form.choose_time(slot(10, 15)).is_err());
        assert!(form.choose_time(slot(10, 30)).is_ok());
    }

    #[test]
    fn advance_blocks_on_the_current_stage_only() {
        let catalog = catalog();
        let mut form = BookingForm::new();

        assert!(form.advance(today()).is_err());
        assert_eq!(form.stage, BookingStage::Branch);

        form.select_branch("powai");
        assert_eq!(form.advance(today()).unwrap(), BookingStage::Details);

        form.full_name = "Jane Doe".into();
        form.mobile = "98765-43210".into();
        assert!(form.advance(today()).is_err());

        form.open_category("Hair");
        form.toggle_service(&catalog[0]);
        assert_eq!(form.advance(today()).unwrap(), BookingStage::Stylist);
        assert_eq!(form.advance(today()).unwrap(), BookingStage::Schedule);

        form.choose_date(today(), today()).unwrap();
        form.choose_time(slot(11, 0)).unwrap();
        form.booking_type = Some(BookingType::Whatsapp);
        assert_eq!(form.advance(today()).unwrap(), BookingStage::Review);

        let request = form.validate(today()).unwrap();
        assert_eq!(request.services, vec![catalog[0].id]);
        assert_eq!(request.stylists, vec![NO_PREFERENCE.to_string()]);

        assert_eq!(form.back(), BookingStage::Schedule);
    }

    #[test]
    fn full_validation_reports_every_missing_field() {
        let request = BookingRequest::default();
        let errors = request.check(today(), ALL_FIELDS).unwrap_err();
        let fields = errors.field_errors();
        for field in ["branch", "fullName", "mobile", "services", "date", "time", "bookingType"] {
            assert!(fields.keys().any(|k| *k == field), "missing error for {field}");
        }
        assert!(!fields.keys().any(|k| *k == "stylists"));
    }

    #[test]
    fn mobile_must_have_ten_digits() {
        let mut request = BookingRequest {
            mobile: "+91 98765 43210".into(),
            ..Default::default()
        };
        assert!(request.check(today(), &["mobile"]).is_err());
        request.mobile = "(987) 654-3210".into();
        assert!(request.check(today(), &["mobile"]).is_ok());
    }

    #[test]
    fn changing_branch_resets_branch_specific_choices() {
        let catalog = catalog();
        let mut form = BookingForm::new();
        form.select_branch("powai");
        form.toggle_service(&catalog[0]);
        form.toggle_stylist(Uuid::now_v7());

        form.select_branch("thane");
        assert!(form.selected.is_empty());
        assert_eq!(form.stylists, StylistPreference::NoPreference);
    }

    #[test]
    fn stage_check_only_looks_at_that_stage() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let request = BookingRequest {
            branch: "powai".into(),
            ..Default::default()
        };

        let check = request.check_stage(today, BookingStage::Branch).unwrap();
        assert_eq!(check.next, BookingStage::Details);

        let errors = request.check_stage(today, BookingStage::Details).unwrap_err();
        let fields = errors.field_errors();
        for field in ["fullName", "mobile", "services"] {
            assert!(fields.keys().any(|k| *k == field), "missing {field}");
        }
        assert!(!fields.keys().any(|k| *k == "branch"));
    }
}
