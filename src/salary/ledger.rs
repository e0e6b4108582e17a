use crate::{
    error::ApiError,
    model::employee::Employee,
    salary::{breakup::standard_breakup, ensure_amount, history},
};
use sqlx::{MySql, MySqlPool, Transaction};
use tracing::info;

/// Lock the employee row for the rest of the transaction. Every mutation
/// that can affect a payroll outcome goes through this first, so
/// composition updates, deduction changes and crediting serialize per
/// employee.
pub async fn lock_employee(
    tx: &mut Transaction<'_, MySql>,
    employee_id: u64,
) -> Result<Employee, ApiError> {
    sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ? FOR UPDATE")
        .bind(employee_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| ApiError::not_found("Employee", employee_id.to_string()))
}

pub async fn fetch_employee(pool: &MySqlPool, employee_id: u64) -> Result<Employee, ApiError> {
    sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
        .bind(employee_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Employee", employee_id.to_string()))
}

/// Top-down overwrite: derive the standard split from `new_total` and
/// persist all five components plus the total in one statement.
pub async fn apply_total(
    tx: &mut Transaction<'_, MySql>,
    employee_id: u64,
    new_total: f64,
) -> Result<(), ApiError> {
    let b = standard_breakup(new_total);

    sqlx::query(
        r#"
        UPDATE employees
        SET total_compensation = ?,
            basic = ?,
            housing_allowance = ?,
            dearness_allowance = ?,
            travel_allowance = ?,
            special_allowance = ?
        WHERE id = ?
        "#,
    )
    .bind(new_total)
    .bind(b.basic)
    .bind(b.housing)
    .bind(b.dearness)
    .bind(b.travel)
    .bind(b.special)
    .bind(employee_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Bottom-up derive: total_compensation = Σ(standard components) +
/// Σ(variable allowances). Runs inside the mutating transaction and
/// returns the persisted total. Never re-derives the standard split.
pub async fn recompute_total(
    tx: &mut Transaction<'_, MySql>,
    employee_id: u64,
) -> Result<f64, ApiError> {
    let components: f64 = sqlx::query_scalar(
        r#"
        SELECT basic + housing_allowance + dearness_allowance
             + travel_allowance + special_allowance
        FROM employees
        WHERE id = ?
        "#,
    )
    .bind(employee_id)
    .fetch_one(&mut **tx)
    .await?;

    let extras: Option<f64> =
        sqlx::query_scalar("SELECT SUM(amount) FROM allowances WHERE employee_id = ?")
            .bind(employee_id)
            .fetch_one(&mut **tx)
            .await?;

    let total = components + extras.unwrap_or(0.0);

    sqlx::query("UPDATE employees SET total_compensation = ? WHERE id = ?")
        .bind(total)
        .bind(employee_id)
        .execute(&mut **tx)
        .await?;

    Ok(total)
}

/// Full top-down protocol: lock, overwrite the split, append a history
/// entry when the total actually changed, commit.
pub async fn update_total(
    pool: &MySqlPool,
    employee_id: u64,
    new_total: f64,
) -> Result<Employee, ApiError> {
    ensure_amount(new_total, "total_compensation")?;

    let mut tx = pool.begin().await?;
    let current = lock_employee(&mut tx, employee_id).await?;

    apply_total(&mut tx, employee_id, new_total).await?;

    if new_total != current.total_compensation {
        history::record(&mut tx, employee_id, current.total_compensation, new_total).await?;
    }

    tx.commit().await?;

    fetch_employee(pool, employee_id).await
}

/// Partial standard-component overrides for the bottom-up protocol.
#[derive(Debug, Default)]
pub struct ComponentOverrides {
    pub basic: Option<f64>,
    pub housing_allowance: Option<f64>,
    pub dearness_allowance: Option<f64>,
    pub travel_allowance: Option<f64>,
    pub special_allowance: Option<f64>,
}

impl ComponentOverrides {
    pub fn is_empty(&self) -> bool {
        self.basic.is_none()
            && self.housing_allowance.is_none()
            && self.dearness_allowance.is_none()
            && self.travel_allowance.is_none()
            && self.special_allowance.is_none()
    }

    fn validate(&self) -> Result<(), ApiError> {
        for (value, what) in [
            (self.basic, "basic"),
            (self.housing_allowance, "housing_allowance"),
            (self.dearness_allowance, "dearness_allowance"),
            (self.travel_allowance, "travel_allowance"),
            (self.special_allowance, "special_allowance"),
        ] {
            if let Some(v) = value {
                ensure_amount(v, what)?;
            }
        }
        Ok(())
    }
}

/// Full bottom-up protocol: lock, apply the partial override, recompute
/// the derived total inside the same transaction, commit. Does not append
/// history.
pub async fn update_components(
    pool: &MySqlPool,
    employee_id: u64,
    overrides: &ComponentOverrides,
) -> Result<Employee, ApiError> {
    if overrides.is_empty() {
        return Err(ApiError::validation("no component values provided"));
    }
    overrides.validate()?;

    let mut tx = pool.begin().await?;
    lock_employee(&mut tx, employee_id).await?;

    sqlx::query(
        r#"
        UPDATE employees
        SET basic = COALESCE(?, basic),
            housing_allowance = COALESCE(?, housing_allowance),
            dearness_allowance = COALESCE(?, dearness_allowance),
            travel_allowance = COALESCE(?, travel_allowance),
            special_allowance = COALESCE(?, special_allowance)
        WHERE id = ?
        "#,
    )
    .bind(overrides.basic)
    .bind(overrides.housing_allowance)
    .bind(overrides.dearness_allowance)
    .bind(overrides.travel_allowance)
    .bind(overrides.special_allowance)
    .bind(employee_id)
    .execute(&mut **tx)
    .await?;

    recompute_total(&mut tx, employee_id).await?;

    tx.commit().await?;

    fetch_employee(pool, employee_id).await
}

/// Compatibility shim for rows created before the breakdown columns: a
/// positive total with a zero basic gets one top-down pass, persisted
/// under the row lock. Idempotent; healed rows short-circuit. The total
/// itself does not change, so no history entry is appended.
pub async fn heal_if_legacy(pool: &MySqlPool, employee: Employee) -> Result<Employee, ApiError> {
    if !employee.has_legacy_breakdown() {
        return Ok(employee);
    }

    let mut tx = pool.begin().await?;
    let current = lock_employee(&mut tx, employee.id).await?;

    // Re-check under the lock; a concurrent heal may have won.
    if current.has_legacy_breakdown() {
        apply_total(&mut tx, current.id, current.total_compensation).await?;
        info!(
            employee_id = current.id,
            total = current.total_compensation,
            "Healed legacy salary breakdown"
        );
    }

    tx.commit().await?;

    fetch_employee(pool, employee.id).await
}
