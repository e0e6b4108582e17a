use crate::{
    error::ApiError,
    model::payroll_record::PayrollRecord,
    salary::{ensure_period, ledger},
};
use sqlx::MySqlPool;
use tracing::info;

/// Credit one period for one employee. The whole sequence runs in a single
/// transaction under the employee row lock:
///
/// 1. advisory existence check (fail fast, no side effects)
/// 2. sum the pending deductions scoped to the exact period
/// 3. net = gross - deductions (negative surfaced as-is)
/// 4. insert the payroll record
/// 5. flip the gathered deductions to applied
///
/// The UNIQUE KEY on (employee_id, month, year) is authoritative: when two
/// calls race past the check, one insert hits the constraint and maps to
/// `AlreadyCredited`, so exactly one record exists.
pub async fn credit_period(
    pool: &MySqlPool,
    employee_id: u64,
    month: u16,
    year: u16,
) -> Result<PayrollRecord, ApiError> {
    ensure_period(month, year)?;

    let mut tx = pool.begin().await?;
    let employee = ledger::lock_employee(&mut tx, employee_id).await?;

    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM payroll_records
            WHERE employee_id = ? AND month = ? AND year = ?
        )
        "#,
    )
    .bind(employee_id)
    .bind(month)
    .bind(year)
    .fetch_one(&mut **tx)
    .await?;

    if exists {
        return Err(ApiError::AlreadyCredited { month, year });
    }

    let deduction_amount: f64 = sqlx::query_scalar::<_, Option<f64>>(
        r#"
        SELECT SUM(amount)
        FROM deductions
        WHERE employee_id = ? AND month = ? AND year = ? AND status = 'pending'
        "#,
    )
    .bind(employee_id)
    .bind(month)
    .bind(year)
    .fetch_one(&mut **tx)
    .await?
    .unwrap_or(0.0);

    let gross_amount = employee.total_compensation;
    let net_amount = gross_amount - deduction_amount;

    let inserted = sqlx::query(
        r#"
        INSERT INTO payroll_records
            (employee_id, month, year, gross_amount, deduction_amount, net_amount, status)
        VALUES (?, ?, ?, ?, ?, ?, 'Credited')
        "#,
    )
    .bind(employee_id)
    .bind(month)
    .bind(year)
    .bind(gross_amount)
    .bind(deduction_amount)
    .bind(net_amount)
    .execute(&mut **tx)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.code() == Some("23000".into()) {
                return ApiError::AlreadyCredited { month, year };
            }
        }
        ApiError::Database(e)
    })?;

    let record_id = inserted.last_insert_id();

    sqlx::query(
        r#"
        UPDATE deductions
        SET status = 'applied'
        WHERE employee_id = ? AND month = ? AND year = ? AND status = 'pending'
        "#,
    )
    .bind(employee_id)
    .bind(month)
    .bind(year)
    .execute(&mut **tx)
    .await?;

    tx.commit().await?;

    info!(
        employee_id,
        month, year, gross_amount, deduction_amount, net_amount, "Salary credited"
    );

    let record = sqlx::query_as::<_, PayrollRecord>(
        "SELECT * FROM payroll_records WHERE id = ?",
    )
    .bind(record_id)
    .fetch_one(pool)
    .await?;

    Ok(record)
}

pub async fn list_records(
    pool: &MySqlPool,
    employee_id: u64,
) -> Result<Vec<PayrollRecord>, ApiError> {
    let records = sqlx::query_as::<_, PayrollRecord>(
        r#"
        SELECT *
        FROM payroll_records
        WHERE employee_id = ?
        ORDER BY year DESC, month DESC
        "#,
    )
    .bind(employee_id)
    .fetch_all(pool)
    .await?;

    Ok(records)
}

pub async fn latest_record(
    pool: &MySqlPool,
    employee_id: u64,
) -> Result<Option<PayrollRecord>, ApiError> {
    let record = sqlx::query_as::<_, PayrollRecord>(
        r#"
        SELECT *
        FROM payroll_records
        WHERE employee_id = ?
        ORDER BY year DESC, month DESC
        LIMIT 1
        "#,
    )
    .bind(employee_id)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}
