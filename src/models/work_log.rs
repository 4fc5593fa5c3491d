use crate::error::app_error::AppError;
use chrono::NaiveDate;
use rocket::FromForm;
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use validator::Validate;

pub const MAX_HOURS_PER_ENTRY: f64 = 24.0;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct WorkLog {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub description: String,
    pub hours: f64,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Validate, JsonSchema)]
pub struct WorkLogRequest {
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0.0, max = 24.0, message = "hours must be between 0 and 24"))]
    pub hours: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct WorkLogResponse {
    pub id: i64,
    pub date: NaiveDate,
    pub description: String,
    pub hours: f64,
}

#[derive(Serialize, Deserialize, Debug, JsonSchema)]
pub struct WorkLogListResponse {
    pub data: Vec<WorkLogResponse>,
}

#[derive(Serialize, Deserialize, Debug, JsonSchema)]
pub struct WorkLogCreatedResponse {
    pub message: String,
    pub id: i64,
}

#[derive(Serialize, Deserialize, Debug, JsonSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Raw entry form as submitted by the web UI; every field arrives as text.
#[derive(FromForm, Debug, Default)]
pub struct WorkLogForm {
    pub date: String,
    pub description: String,
    pub hours: String,
}

/// Listing filter. Date bounds are inclusive; `search` is a case-insensitive
/// substring of the description.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub search: Option<String>,
}

#[allow(clippy::result_large_err)]
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| AppError::BadRequest(format!("{} must be a date in YYYY-MM-DD format", field)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl EntryFilter {
    /// Build a filter from query-string values. Blank values count as absent.
    #[allow(clippy::result_large_err)]
    pub fn from_query(date_from: Option<String>, date_to: Option<String>, search: Option<String>) -> Result<Self, AppError> {
        let date_from = non_empty(date_from).map(|v| parse_date("date_from", &v)).transpose()?;
        let date_to = non_empty(date_to).map(|v| parse_date("date_to", &v)).transpose()?;

        Ok(Self {
            date_from,
            date_to,
            search: non_empty(search),
        })
    }

    /// In-process twin of the repository filter. Search folds case with Unicode
    /// lowercasing, which agrees with Postgres `LOWER()` on a UTF-8 database
    /// with a non-C collation.
    pub fn matches(&self, entry: &WorkLog) -> bool {
        if self.date_from.is_some_and(|from| entry.date < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| entry.date > to) {
            return false;
        }
        match &self.search {
            Some(needle) => entry.description.to_lowercase().contains(&needle.to_lowercase()),
            None => true,
        }
    }
}

impl TryFrom<&WorkLogForm> for WorkLogRequest {
    type Error = AppError;

    fn try_from(form: &WorkLogForm) -> Result<Self, Self::Error> {
        let date = parse_date("date", &form.date)?;
        let hours = form
            .hours
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|h| h.is_finite())
            .ok_or_else(|| AppError::BadRequest("hours must be a number".to_string()))?;

        let request = WorkLogRequest {
            date,
            description: form.description.trim().to_string(),
            hours,
        };
        request.validate()?;
        Ok(request)
    }
}

impl From<&WorkLog> for WorkLogResponse {
    fn from(entry: &WorkLog) -> Self {
        Self {
            id: entry.id,
            date: entry.date,
            description: entry.description.clone(),
            hours: entry.hours,
        }
    }
}

impl From<&WorkLog> for WorkLogForm {
    fn from(entry: &WorkLog) -> Self {
        Self {
            date: entry.date.format("%Y-%m-%d").to_string(),
            description: entry.description.clone(),
            hours: entry.hours.to_string(),
        }
    }
}
