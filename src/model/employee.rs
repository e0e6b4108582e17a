use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An employee row. `employee_code` is the external-facing identifier;
/// NULL marks a record created before codes existed (backfilled by the
/// seed-codes batch). `total_compensation` always equals the five standard
/// components plus the sum of variable allowances once a mutation commits.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_code": "8f14e45f-ceea-467f-a0e6-7f1e7fb45c7d",
        "name": "John Doe",
        "email": "john.doe@company.com",
        "role": "Engineer",
        "profile_image": null,
        "total_compensation": 12000.0,
        "basic": 4800.0,
        "housing_allowance": 2400.0,
        "dearness_allowance": 1200.0,
        "travel_allowance": 600.0,
        "special_allowance": 3000.0,
        "created_at": "2025-01-01T00:00:00Z"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "8f14e45f-ceea-467f-a0e6-7f1e7fb45c7d", nullable = true)]
    pub employee_code: Option<String>,

    #[schema(example = "John Doe")]
    pub name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[schema(example = "Engineer")]
    pub role: String,

    #[schema(nullable = true)]
    pub profile_image: Option<String>,

    #[schema(example = 12000.0)]
    pub total_compensation: f64,

    #[schema(example = 4800.0)]
    pub basic: f64,

    #[schema(example = 2400.0)]
    pub housing_allowance: f64,

    #[schema(example = 1200.0)]
    pub dearness_allowance: f64,

    #[schema(example = 600.0)]
    pub travel_allowance: f64,

    #[schema(example = 3000.0)]
    pub special_allowance: f64,

    #[schema(example = "2025-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Employee {
    /// A record predating the breakdown columns: a real total but a
    /// zero-valued split. Such rows are healed on read or by the
    /// heal-breakdowns batch.
    pub fn has_legacy_breakdown(&self) -> bool {
        self.total_compensation > 0.0 && self.basic == 0.0
    }
}
