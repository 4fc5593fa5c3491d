use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;

/// One chart point per entry, in input order. `labels[i]` belongs to `hours[i]`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, JsonSchema)]
pub struct DailySeries {
    pub labels: Vec<String>,
    pub hours: Vec<f64>,
}

/// Hours summed over one calendar month or ISO week.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct PeriodTotal {
    /// Sortable key: `2024-01` for months, `2024-W01` for ISO weeks.
    pub key: String,
    /// Display label: `01/2024` for months, same as `key` for weeks.
    pub label: String,
    pub total_hours: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, JsonSchema)]
pub struct WorkStats {
    pub total_hours: f64,
    /// Number of entries, not distinct calendar days.
    pub days_count: usize,
    pub avg_hours: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, JsonSchema)]
pub struct WorkReport {
    pub daily: DailySeries,
    /// Chronological.
    pub monthly: Vec<PeriodTotal>,
    /// Chronological by ISO week-year, then week number.
    pub weekly: Vec<PeriodTotal>,
    #[serde(flatten)]
    pub stats: WorkStats,
}
