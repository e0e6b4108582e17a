use crate::{error::ApiError, model::salary_history::SalaryHistoryEntry};
use sqlx::{MySql, MySqlPool, Transaction};

/// Append one immutable audit entry. Invoked by the top-down protocol
/// whenever the resulting total differs from the prior total; the
/// bottom-up recompute intentionally never calls this.
pub async fn record(
    tx: &mut Transaction<'_, MySql>,
    employee_id: u64,
    previous_total: f64,
    new_total: f64,
) -> Result<(), ApiError> {
    sqlx::query(
        r#"
        INSERT INTO salary_history (employee_id, previous_total, new_total)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(previous_total)
    .bind(new_total)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

pub async fn list(
    pool: &MySqlPool,
    employee_id: u64,
) -> Result<Vec<SalaryHistoryEntry>, ApiError> {
    let entries = sqlx::query_as::<_, SalaryHistoryEntry>(
        r#"
        SELECT id, employee_id, previous_total, new_total, changed_at
        FROM salary_history
        WHERE employee_id = ?
        ORDER BY changed_at DESC, id DESC
        "#,
    )
    .bind(employee_id)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}
