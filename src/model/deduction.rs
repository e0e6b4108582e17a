use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Pending deductions are mutable; once a crediting event applies them they
/// become part of the payroll audit trail and deletion is refused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, sqlx::Type, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum DeductionStatus {
    Pending,
    Applied,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Deduction {
    #[schema(example = 7)]
    pub id: u64,

    #[schema(example = 1)]
    pub employee_id: u64,

    #[schema(example = "Unpaid leave")]
    pub reason: String,

    #[schema(example = 500.0)]
    pub amount: f64,

    /// Target period, 1-12.
    #[schema(example = 2)]
    pub month: u16,

    #[schema(example = 2025)]
    pub year: u16,

    #[schema(example = "pending")]
    pub status: DeductionStatus,

    #[schema(example = "2025-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}
