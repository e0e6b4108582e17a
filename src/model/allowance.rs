use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A labeled amount on top of the standard components, e.g. "Internet
/// Allowance". Contributes additively to the owner's total compensation.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Allowance {
    #[schema(example = 10)]
    pub id: u64,

    #[schema(example = 1)]
    pub employee_id: u64,

    #[schema(example = "Internet Allowance")]
    pub label: String,

    #[schema(example = 500.0)]
    pub amount: f64,

    #[schema(example = "2025-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}
