// src/services/client_service.rs

use std::{cmp::Ordering, io::Cursor, path::Path, str::FromStr};

use calamine::{Data, Reader, Xls, Xlsb, Xlsx};
use rust_decimal::Decimal;
use validator::Validate;

use crate::{
    common::{error::AppError, text},
    models::client::{Client, ClientDraft, ClientQuery, ClientSort, ImportSummary, RowError},
    services::record_store::RecordStore,
};

pub const EXPORT_HEADER: [&str; 4] = ["Name", "Number", "Total", "Appointments"];

const PDF_GUIDANCE: &str = "PDF files cannot be imported. Export the client list from your spreadsheet as CSV or Excel (.xlsx) and upload that file instead.";

// =========================================================================
//  1. LISTAGEM
// =========================================================================

pub fn filter(records: &[Client], query: &ClientQuery) -> Vec<Client> {
    let term = query.search.as_deref().unwrap_or_default();
    records
        .iter()
        .filter(|c| {
            text::contains_ci(&c.name, term)
                || c.email.as_deref().is_some_and(|e| text::contains_ci(e, term))
                || c.phone.as_deref().is_some_and(|p| text::contains_ci(p, term))
        })
        .cloned()
        .collect()
}

/// Nome crescente; total gasto, número de visitas e última visita decrescentes.
pub fn sort(records: &[Client], key: ClientSort) -> Vec<Client> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| match key {
        ClientSort::Name => text::compare_text(&a.name, &b.name),
        ClientSort::Total => b.total_spent.cmp(&a.total_spent),
        ClientSort::Appointments => b.appointments.cmp(&a.appointments),
        ClientSort::Recent => match (a.last_visit, b.last_visit) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    });
    sorted
}

pub fn list_view(records: &[Client], query: &ClientQuery) -> Vec<Client> {
    sort(&filter(records, query), query.sort.unwrap_or_default())
}

// =========================================================================
//  2. EXPORTAÇÃO
// =========================================================================

/// Coloca aspas quando precisa e neutraliza fórmulas de planilha.
pub fn csv_escape(value: &str) -> String {
    let value = if value.starts_with(['=', '+', '-', '@']) {
        format!("'{value}")
    } else {
        value.to_string()
    };

    if value.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value
    }
}

pub fn export_csv(records: &[Client]) -> String {
    let mut out = EXPORT_HEADER.join(",");
    out.push('\n');

    for client in records {
        let cells = [
            client.name.clone(),
            client.phone.clone().unwrap_or_default(),
            client.total_spent.to_string(),
            client.appointments.to_string(),
        ];
        let line: Vec<String> = cells.iter().map(|c| csv_escape(c)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

// =========================================================================
//  3. IMPORTAÇÃO: leitura do arquivo
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Csv,
    Excel,
}

pub fn detect_kind(file_name: &str) -> Result<ImportKind, AppError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" | "txt" => Ok(ImportKind::Csv),
        "xlsx" | "xlsm" | "xlsb" | "xls" => Ok(ImportKind::Excel),
        "pdf" => Err(AppError::UnsupportedFormat(PDF_GUIDANCE.to_string())),
        _ => Err(AppError::UnsupportedFormat(
            "Unsupported file type. Upload a .csv or .xlsx file.".to_string(),
        )),
    }
}

/// Estilo RFC 4180: campo entre aspas pode ter vírgula, aspas duplicadas e quebra de linha.
pub fn parse_csv(input: &str) -> Result<Vec<Vec<String>>, AppError> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = input.trim_start_matches('\u{feff}').chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(ch);
            }
            continue;
        }

        match ch {
            '"' if field.is_empty() => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            _ => field.push(ch),
        }
    }

    if in_quotes {
        return Err(AppError::ImportFormat(
            "The CSV file has an unterminated quoted field.".to_string(),
        ));
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    Ok(rows)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        // Telefone costuma vir do Excel como float inteiro
        Data::Float(f) if f.fract() == 0.0 => format!("{f:.0}"),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::Error(_) => String::new(),
    }
}

fn first_sheet_rows<RS, R>(workbook: &mut R) -> Result<Vec<Vec<String>>, AppError>
where
    RS: std::io::Read + std::io::Seek,
    R: Reader<RS>,
{
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| AppError::ImportFormat("The workbook has no worksheets.".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|_| AppError::ImportFormat(format!("Could not read worksheet '{sheet}'.")))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect())
}

/// Primeira planilha; a primeira linha é o cabeçalho.
pub fn read_excel(bytes: &[u8]) -> Result<Vec<Vec<String>>, AppError> {
    const OLE_MAGIC: [u8; 4] = [0xD0, 0xCF, 0x11, 0xE0];

    if bytes.starts_with(&OLE_MAGIC) {
        let mut workbook: Xls<_> = Xls::new(Cursor::new(bytes))
            .map_err(|_| AppError::ImportFormat("The .xls file could not be opened.".to_string()))?;
        return first_sheet_rows(&mut workbook);
    }

    if let Ok(mut workbook) = Xlsx::new(Cursor::new(bytes)) {
        return first_sheet_rows(&mut workbook);
    }
    if let Ok(mut workbook) = Xlsb::new(Cursor::new(bytes)) {
        return first_sheet_rows(&mut workbook);
    }

    Err(AppError::ImportFormat(
        "The file is not a readable Excel workbook.".to_string(),
    ))
}

// =========================================================================
//  4. IMPORTAÇÃO: linhas -> rascunhos
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Name,
    Phone,
    Email,
    Total,
    Appointments,
}

fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Comparação exata com a tabela de sinônimos, sem espaços nas pontas e sem diferenciar maiúsculas.
fn column_for(header: &str) -> Option<Column> {
    match normalize_header(header).as_str() {
        "name" | "full name" | "client name" | "customer name" => Some(Column::Name),
        "phone" | "mobile" | "phone number" | "number" | "mobile number" | "contact" => {
            Some(Column::Phone)
        }
        "email" | "email address" | "e-mail" => Some(Column::Email),
        "total" | "total spent" | "spent" => Some(Column::Total),
        "appointments" | "visits" | "appointment count" => Some(Column::Appointments),
        _ => None,
    }
}

#[derive(Debug, Default)]
struct ColumnMap {
    name: Option<usize>,
    phone: Option<usize>,
    email: Option<usize>,
    total: Option<usize>,
    appointments: Option<usize>,
}

impl ColumnMap {
    fn from_header(header: &[String]) -> Self {
        let mut map = ColumnMap::default();
        for (index, cell) in header.iter().enumerate() {
            let slot = match column_for(cell) {
                Some(Column::Name) => &mut map.name,
                Some(Column::Phone) => &mut map.phone,
                Some(Column::Email) => &mut map.email,
                Some(Column::Total) => &mut map.total,
                Some(Column::Appointments) => &mut map.appointments,
                None => continue,
            };
            // Vale a primeira coluna que bater
            slot.get_or_insert(index);
        }
        map
    }
}

fn cell(row: &[String], index: Option<usize>) -> Option<String> {
    index
        .and_then(|i| row.get(i))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    Decimal::from_str(&cleaned).ok()
}

#[derive(Debug, Default)]
pub struct ParsedImport {
    /// (número da linha a partir de 1, rascunho)
    pub drafts: Vec<(usize, ClientDraft)>,
    pub rejected: Vec<RowError>,
}

fn row_to_draft(row: &[String], columns: &ColumnMap) -> Result<ClientDraft, String> {
    let name = cell(row, columns.name).ok_or("missing name")?;
    let phone = cell(row, columns.phone);
    let email = cell(row, columns.email);
    if phone.is_none() && email.is_none() {
        return Err("needs a phone number or an email".to_string());
    }

    let total_spent = match cell(row, columns.total) {
        Some(raw) => parse_amount(&raw).ok_or_else(|| format!("total '{raw}' is not a number"))?,
        None => Decimal::ZERO,
    };
    let appointments = match cell(row, columns.appointments) {
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| format!("appointments '{raw}' is not a whole number"))?,
        None => 0,
    };

    let draft = ClientDraft {
        name,
        email,
        phone,
        total_spent,
        appointments,
        ..Default::default()
    };
    draft
        .validate()
        .map_err(|_| "invalid email address".to_string())?;
    Ok(draft)
}

/// Mesma estratégia de cabeçalho e mesmos campos obrigatórios para CSV e Excel:
/// a linha precisa de nome e de telefone ou email.
pub fn rows_to_drafts(rows: &[Vec<String>]) -> Result<ParsedImport, AppError> {
    let Some((header, body)) = rows.split_first() else {
        return Err(AppError::ImportFormat("The file is empty.".to_string()));
    };

    let columns = ColumnMap::from_header(header);
    if columns.name.is_none() {
        return Err(AppError::ImportFormat(
            "No name column found. Add a header such as 'Name' or 'Client Name'.".to_string(),
        ));
    }
    if columns.phone.is_none() && columns.email.is_none() {
        return Err(AppError::ImportFormat(
            "No phone or email column found. Add a header such as 'Phone' or 'Email'.".to_string(),
        ));
    }

    let mut parsed = ParsedImport::default();
    for (index, row) in body.iter().enumerate() {
        // cabeçalho é a linha 1
        let row_number = index + 2;
        if row.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        match row_to_draft(row, &columns) {
            Ok(draft) => parsed.drafts.push((row_number, draft)),
            Err(reason) => {
                tracing::warn!("Import row {} rejected: {}", row_number, reason);
                parsed.rejected.push(RowError {
                    row: row_number,
                    reason,
                });
            }
        }
    }
    Ok(parsed)
}

// =========================================================================
//  5. SERVIÇO
// =========================================================================

#[derive(Clone)]
pub struct ClientService {
    pub records: RecordStore<Client>,
}

impl ClientService {
    pub fn new(records: RecordStore<Client>) -> Self {
        Self { records }
    }

    pub async fn decode(&self, file_name: &str, bytes: Vec<u8>) -> Result<Vec<Vec<String>>, AppError> {
        match detect_kind(file_name)? {
            ImportKind::Csv => {
                let text = String::from_utf8(bytes).map_err(|_| {
                    AppError::ImportFormat("The CSV file is not valid UTF-8 text.".to_string())
                })?;
                parse_csv(&text)
            }
            ImportKind::Excel => tokio::task::spawn_blocking(move || read_excel(&bytes))
                .await
                .map_err(|e| anyhow::anyhow!("Excel import task failed: {}", e))?,
        }
    }

    /// Adiciona as linhas uma a uma, na ordem do arquivo. Linha que falha ao gravar
    /// vai para o log e para o resumo, sem parar o resto do lote.
    pub async fn import(
        &self,
        branch_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<ImportSummary, AppError> {
        // 1. Lê o arquivo (CSV ou Excel) e monta os rascunhos
        let rows = self.decode(file_name, bytes).await?;
        let parsed = rows_to_drafts(&rows)?;

        // 2. Grava linha a linha

        let mut imported = 0;
        let mut failed = Vec::new();
        for (row, draft) in parsed.drafts {
            match self.records.add(branch_id, draft).await {
                Ok(_) => imported += 1,
                Err(e) => {
                    tracing::error!("Import row {} could not be saved: {}", row, e);
                    failed.push(RowError {
                        row,
                        reason: "could not be saved".to_string(),
                    });
                }
            }
        }

        // 3. Resumo
        let skipped = parsed.rejected.len() + failed.len();
        tracing::info!(
            "📥 Client import into '{}': {} imported, {} skipped",
            branch_id,
            imported,
            skipped
        );

        Ok(ImportSummary {
            imported,
            rejected: parsed.rejected,
            failed,
            message: format!("Imported {imported} client(s); {skipped} row(s) skipped."),
        })
    }

    pub async fn export(&self, branch_id: &str) -> Result<String, AppError> {
        let records = self.records.list(branch_id).await?;
        Ok(export_csv(&sort(&records, ClientSort::Name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStateStore;
    use chrono::{NaiveDate, Utc};
    use std::sync::Arc;
    use uuid::Uuid;

    fn service() -> ClientService {
        ClientService::new(RecordStore::new(Arc::new(MemoryStateStore::new())))
    }

    fn client(name: &str, total: i64, visits: u32, last: Option<NaiveDate>) -> Client {
        Client {
            id: Uuid::now_v7(),
            branch_id: "powai".into(),
            name: name.into(),
            email: Some(format!("{}@mail.example", name.to_lowercase())),
            phone: Some("9876543210".into()),
            total_spent: Decimal::from(total),
            appointments: visits,
            last_visit: last,
            notes: String::new(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn csv_with_missing_name_imports_one_row() {
        let rows = parse_csv("Name,Email\nJane Doe,jane@x.com\n,missing@x.com").unwrap();
        let parsed = rows_to_drafts(&rows).unwrap();

        assert_eq!(parsed.drafts.len(), 1);
        assert_eq!(parsed.drafts[0].1.name, "Jane Doe");
        assert_eq!(parsed.rejected, vec![RowError { row: 3, reason: "missing name".into() }]);
    }

    #[test]
    fn header_synonyms_are_matched_exactly_and_case_insensitively() {
        let rows = parse_csv("  CLIENT   Name ,Mobile Number,Total Spent,Visits,Phone Type\nAsha,98765 43210,\"1,500\",4,home\n").unwrap();
        let parsed = rows_to_drafts(&rows).unwrap();

        let draft = &parsed.drafts[0].1;
        assert_eq!(draft.name, "Asha");
        assert_eq!(draft.phone.as_deref(), Some("98765 43210"));
        assert_eq!(draft.total_spent, Decimal::from(1500));
        assert_eq!(draft.appointments, 4);
    }

    #[test]
    fn rows_need_phone_or_email() {
        let rows = parse_csv("Name,Phone,Email\nAsha,,\nBina,,bina@x.com\nChitra,9876543210,\n").unwrap();
        let parsed = rows_to_drafts(&rows).unwrap();

        let names: Vec<&str> = parsed.drafts.iter().map(|(_, d)| d.name.as_str()).collect();
        assert_eq!(names, vec!["Bina", "Chitra"]);
        assert_eq!(parsed.rejected.len(), 1);
        assert_eq!(parsed.rejected[0].row, 2);
    }

    #[test]
    fn missing_name_column_is_a_format_error() {
        let rows = parse_csv("Email,Phone\na@x.com,1\n").unwrap();
        assert!(matches!(rows_to_drafts(&rows), Err(AppError::ImportFormat(_))));
    }

    #[test]
    fn importing_twice_yields_identical_content() {
        let text = "Name,Phone,Total\nAsha,9876543210,250\nBina,9123456780,0\n";
        let first = rows_to_drafts(&parse_csv(text).unwrap()).unwrap();
        let second = rows_to_drafts(&parse_csv(text).unwrap()).unwrap();
        assert_eq!(first.drafts, second.drafts);
    }

    #[test]
    fn csv_parser_handles_quotes_and_crlf() {
        let rows = parse_csv("a,\"b, c\",\"say \"\"hi\"\"\"\r\n\"multi\nline\",x,\r\n").unwrap();
        assert_eq!(rows[0], vec!["a", "b, c", "say \"hi\""]);
        assert_eq!(rows[1], vec!["multi\nline", "x", ""]);
        assert!(parse_csv("a,\"open").is_err());
    }

    #[test]
    fn export_escapes_and_neutralises_formulas() {
        let mut tricky = client("Doe, \"JD\" Jr", 1200, 3, None);
        tricky.phone = Some("=HYPERLINK(\"x\")".into());
        let csv = export_csv(&[tricky]);

        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Name,Number,Total,Appointments"));
        assert_eq!(
            lines.next(),
            Some("\"Doe, \"\"JD\"\" Jr\",\"'=HYPERLINK(\"\"x\"\")\",1200,3")
        );
    }

    #[test]
    fn exported_csv_parses_back() {
        let original = client("Mehta, Ravi", 300, 2, None);
        let rows = parse_csv(&export_csv(&[original])).unwrap();
        assert_eq!(rows[1][0], "Mehta, Ravi");
    }

    #[test]
    fn pdf_and_unknown_files_are_unsupported() {
        assert!(matches!(detect_kind("clients.PDF"), Err(AppError::UnsupportedFormat(_))));
        assert!(matches!(detect_kind("clients.docx"), Err(AppError::UnsupportedFormat(_))));
        assert_eq!(detect_kind("clients.xlsx").unwrap(), ImportKind::Excel);
        assert_eq!(detect_kind("clients.csv").unwrap(), ImportKind::Csv);
    }

    #[test]
    fn garbage_excel_bytes_are_a_format_error() {
        assert!(matches!(read_excel(b"not a workbook"), Err(AppError::ImportFormat(_))));
    }

    #[test]
    fn search_covers_name_email_phone() {
        let records = vec![client("Asha", 0, 0, None), client("Bina", 0, 0, None)];
        let query = ClientQuery {
            search: Some("bina@".into()),
            ..Default::default()
        };
        assert_eq!(filter(&records, &query).len(), 1);
        assert_eq!(filter(&records, &ClientQuery::default()), records);
    }

    #[test]
    fn sort_keys() {
        let d = |day| NaiveDate::from_ymd_opt(2026, 1, day);
        let records = vec![
            client("bina", 100, 1, d(5)),
            client("Asha", 900, 7, None),
            client("Chitra", 500, 3, d(20)),
        ];
        let names = |sorted: Vec<Client>| sorted.into_iter().map(|c| c.name).collect::<Vec<_>>();

        assert_eq!(names(sort(&records, ClientSort::Name)), vec!["Asha", "bina", "Chitra"]);
        assert_eq!(names(sort(&records, ClientSort::Total)), vec!["Asha", "Chitra", "bina"]);
        assert_eq!(names(sort(&records, ClientSort::Appointments)), vec!["Asha", "Chitra", "bina"]);
        assert_eq!(names(sort(&records, ClientSort::Recent)), vec!["Chitra", "bina", "Asha"]);
    }

    #[tokio::test]
    async fn import_adds_records_in_file_order() {
        let service = service();
        let summary = service
            .import(
                "powai",
                "clients.csv",
                b"Name,Email\nJane Doe,jane@x.com\n,missing@x.com\nRavi,ravi@x.com".to_vec(),
            )
            .await
            .unwrap();

        assert_eq!(summary.imported, 2);
        assert_eq!(summary.rejected.len(), 1);
        let names: Vec<String> = service
            .records
            .list("powai")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Jane Doe", "Ravi"]);
    }

    #[tokio::test]
    async fn pdf_import_changes_nothing() {
        let service = service();
        let result = service.import("powai", "clients.pdf", b"%PDF-1.4".to_vec()).await;
        assert!(matches!(result, Err(AppError::UnsupportedFormat(_))));
        assert!(service.records.list("powai").await.unwrap().is_empty());
    }
}
