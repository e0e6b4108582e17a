use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Immutable record of one crediting event. At most one row exists per
/// (employee, month, year); the UNIQUE KEY in the store enforces it.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct PayrollRecord {
    #[schema(example = 3)]
    pub id: u64,

    #[schema(example = 1)]
    pub employee_id: u64,

    #[schema(example = 2)]
    pub month: u16,

    #[schema(example = 2025)]
    pub year: u16,

    /// Total compensation at credit time.
    #[schema(example = 10000.0)]
    pub gross_amount: f64,

    /// Sum of the deductions applied by this event.
    #[schema(example = 800.0)]
    pub deduction_amount: f64,

    /// gross - deductions. Not clamped; may be negative.
    #[schema(example = 9200.0)]
    pub net_amount: f64,

    #[schema(example = "2025-02-28T12:00:00Z", format = "date-time", value_type = String)]
    pub payment_date: DateTime<Utc>,

    #[schema(example = "Credited")]
    pub status: String,
}
