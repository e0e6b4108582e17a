use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Append-only audit entry for total-compensation changes.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct SalaryHistoryEntry {
    #[schema(example = 5)]
    pub id: u64,

    #[schema(example = 1)]
    pub employee_id: u64,

    #[schema(example = 10000.0)]
    pub previous_total: f64,

    #[schema(example = 12000.0)]
    pub new_total: f64,

    #[schema(example = "2025-02-01T09:30:00Z", format = "date-time", value_type = String)]
    pub changed_at: DateTime<Utc>,
}
