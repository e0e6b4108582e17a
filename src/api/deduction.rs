use crate::{
    auth::auth::AuthUser,
    error::ApiError,
    model::deduction::Deduction,
    resolver,
    salary::{ensure_amount, ensure_period, ledger},
};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateDeduction {
    #[schema(example = "Unpaid leave")]
    pub reason: String,
    #[schema(example = 500.0)]
    pub amount: f64,
    #[schema(example = 2)]
    pub month: u16,
    #[schema(example = 2025)]
    pub year: u16,
}

/// Record a deduction against a target period. Always created pending;
/// corrections are delete-and-recreate while still pending.
#[utoipa::path(
    post,
    path = "/api/employees/{code}/deductions",
    params(("code", Path, description = "External employee code")),
    request_body = CreateDeduction,
    responses(
        (status = 201, description = "Deduction recorded", body = Deduction),
        (status = 400, description = "Invalid amount or period"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Deduction",
    security(("bearer_auth" = []))
)]
pub async fn add_deduction(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
    payload: web::Json<CreateDeduction>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    if payload.reason.trim().is_empty() {
        return Err(ApiError::validation("reason must not be empty"));
    }
    ensure_amount(payload.amount, "amount")?;
    ensure_period(payload.month, payload.year)?;

    let code = path.into_inner();
    let employee_id = resolver::resolve_code(pool.get_ref(), &code).await?;

    // The employee lock keeps this insert from sliding between a
    // concurrent credit's deduction sum and its pending->applied flip.
    let mut tx = pool.begin().await?;
    ledger::lock_employee(&mut tx, employee_id).await?;

    let result = sqlx::query(
        r#"
        INSERT INTO deductions (employee_id, reason, amount, month, year)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(payload.reason.trim())
    .bind(payload.amount)
    .bind(payload.month)
    .bind(payload.year)
    .execute(&mut *tx)
    .await?;

    let deduction_id = result.last_insert_id();

    tx.commit().await?;

    let deduction = sqlx::query_as::<_, Deduction>("SELECT * FROM deductions WHERE id = ?")
        .bind(deduction_id)
        .fetch_one(pool.get_ref())
        .await?;

    Ok(HttpResponse::Created().json(deduction))
}

#[utoipa::path(
    get,
    path = "/api/employees/{code}/deductions",
    params(("code", Path, description = "External employee code")),
    responses(
        (status = 200, description = "Deductions, newest first", body = [Deduction]),
        (status = 404, description = "Employee not found")
    ),
    tag = "Deduction",
    security(("bearer_auth" = []))
)]
pub async fn list_deductions(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let code = path.into_inner();
    let employee_id = resolver::resolve_code(pool.get_ref(), &code).await?;

    let deductions = sqlx::query_as::<_, Deduction>(
        r#"
        SELECT *
        FROM deductions
        WHERE employee_id = ?
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(employee_id)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(deductions))
}

/// Delete a pending deduction. Applied deductions are part of the payroll
/// audit trail and deletion is refused.
#[utoipa::path(
    delete,
    path = "/api/employees/{code}/deductions/{deduction_id}",
    params(
        ("code", Path, description = "External employee code"),
        ("deduction_id", Path, description = "Deduction ID")
    ),
    responses(
        (status = 200, description = "Deduction deleted"),
        (status = 404, description = "Employee or deduction not found"),
        (status = 409, description = "Deduction already applied")
    ),
    tag = "Deduction",
    security(("bearer_auth" = []))
)]
pub async fn delete_deduction(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<(String, u64)>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    let (code, deduction_id) = path.into_inner();
    let employee_id = resolver::resolve_code(pool.get_ref(), &code).await?;

    let mut tx = pool.begin().await?;
    ledger::lock_employee(&mut tx, employee_id).await?;

    let result = sqlx::query(
        "DELETE FROM deductions WHERE id = ? AND employee_id = ? AND status = 'pending'",
    )
    .bind(deduction_id)
    .bind(employee_id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        // distinguish an applied row from a missing one
        let status: Option<String> = sqlx::query_scalar(
            "SELECT status FROM deductions WHERE id = ? AND employee_id = ?",
        )
        .bind(deduction_id)
        .bind(employee_id)
        .fetch_optional(&mut *tx)
        .await?;

        return match status.as_deref() {
            Some("applied") => Err(ApiError::Conflict(
                "An applied deduction cannot be deleted".to_string(),
            )),
            _ => Err(ApiError::not_found("Deduction", deduction_id.to_string())),
        };
    }

    tx.commit().await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Deduction deleted"
    })))
}
