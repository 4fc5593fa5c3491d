use crate::error::app_error::AppError;
use crate::models::work_log::WorkLog;
use chrono::NaiveDate;
use rocket::http::{ContentType, Status};
use rocket::response::{Responder, Response};
use rocket::Request;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::io::Cursor;

pub const SHEET_NAME: &str = "Work hours";

/// Render entries, in the order given, as an `.xlsx` workbook: a bold header
/// row, one row per entry, a blank row and a bold total.
#[allow(clippy::result_large_err)]
pub fn build_workbook(entries: &[WorkLog]) -> Result<Vec<u8>, AppError> {
    write_workbook(entries).map_err(|e| AppError::export("Failed to build spreadsheet", e))
}

fn write_workbook(entries: &[WorkLog]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;
        sheet.set_column_width(0, 15)?;
        sheet.set_column_width(1, 50)?;
        sheet.set_column_width(2, 10)?;

        sheet.write_string_with_format(0, 0, "Date", &bold)?;
        sheet.write_string_with_format(0, 1, "Description", &bold)?;
        sheet.write_string_with_format(0, 2, "Hours", &bold)?;

        let mut row: u32 = 1;
        for entry in entries {
            sheet.write_string(row, 0, entry.date.format("%d.%m.%Y").to_string())?;
            sheet.write_string(row, 1, &entry.description)?;
            sheet.write_number(row, 2, entry.hours)?;
            row += 1;
        }

        let total: f64 = entries.iter().map(|e| e.hours).sum();
        row += 1;
        sheet.write_string_with_format(row, 1, "TOTAL", &bold)?;
        sheet.write_number_with_format(row, 2, total, &bold)?;
    }

    workbook.save_to_buffer()
}

pub fn file_name(username: &str, today: NaiveDate) -> String {
    format!("worklog_{}_{}.xlsx", username, today.format("%Y-%m-%d"))
}

/// An `.xlsx` attachment. The name is sent both as a plain ASCII fallback and
/// percent-encoded (RFC 5987) so non-ASCII usernames survive.
#[derive(Debug)]
pub struct SpreadsheetDownload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl SpreadsheetDownload {
    pub fn content_type() -> ContentType {
        ContentType::new("application", "vnd.openxmlformats-officedocument.spreadsheetml.sheet")
    }

    pub fn content_disposition(&self) -> String {
        let fallback: String = self
            .file_name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
            .collect();

        format!("attachment; filename=\"{}\"; filename*=UTF-8''{}", fallback, urlencoding::encode(&self.file_name))
    }
}

impl<'r> Responder<'r, 'static> for SpreadsheetDownload {
    fn respond_to(self, _: &'r Request<'_>) -> rocket::response::Result<'static> {
        let disposition = self.content_disposition();
        Response::build()
            .status(Status::Ok)
            .header(Self::content_type())
            .raw_header("Content-Disposition", disposition)
            .sized_body(self.bytes.len(), Cursor::new(self.bytes))
            .ok()
    }
}
