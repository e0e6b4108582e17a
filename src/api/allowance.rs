use crate::{
    auth::auth::AuthUser,
    error::ApiError,
    model::allowance::Allowance,
    resolver,
    salary::{ensure_amount, ledger},
};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateAllowance {
    #[schema(example = "Internet Allowance")]
    pub label: String,
    #[schema(example = 500.0)]
    pub amount: f64,
}

/// Add a variable allowance. Bottom-up mutation: the employee total is
/// recomputed inside the same transaction.
#[utoipa::path(
    post,
    path = "/api/employees/{code}/allowances",
    params(("code", Path, description = "External employee code")),
    request_body = CreateAllowance,
    responses(
        (status = 201, description = "Allowance added", body = Allowance),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Allowance",
    security(("bearer_auth" = []))
)]
pub async fn add_allowance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
    payload: web::Json<CreateAllowance>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    if payload.label.trim().is_empty() {
        return Err(ApiError::validation("label must not be empty"));
    }
    ensure_amount(payload.amount, "amount")?;

    let code = path.into_inner();
    let employee_id = resolver::resolve_code(pool.get_ref(), &code).await?;

    let mut tx = pool.begin().await?;
    ledger::lock_employee(&mut tx, employee_id).await?;

    let result = sqlx::query(
        "INSERT INTO allowances (employee_id, label, amount) VALUES (?, ?, ?)",
    )
    .bind(employee_id)
    .bind(payload.label.trim())
    .bind(payload.amount)
    .execute(&mut *tx)
    .await?;

    let allowance_id = result.last_insert_id();

    ledger::recompute_total(&mut tx, employee_id).await?;

    tx.commit().await?;

    let allowance = sqlx::query_as::<_, Allowance>("SELECT * FROM allowances WHERE id = ?")
        .bind(allowance_id)
        .fetch_one(pool.get_ref())
        .await?;

    Ok(HttpResponse::Created().json(allowance))
}

#[utoipa::path(
    get,
    path = "/api/employees/{code}/allowances",
    params(("code", Path, description = "External employee code")),
    responses(
        (status = 200, description = "Allowances, newest first", body = [Allowance]),
        (status = 404, description = "Employee not found")
    ),
    tag = "Allowance",
    security(("bearer_auth" = []))
)]
pub async fn list_allowances(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let code = path.into_inner();
    let employee_id = resolver::resolve_code(pool.get_ref(), &code).await?;

    let allowances = sqlx::query_as::<_, Allowance>(
        r#"
        SELECT *
        FROM allowances
        WHERE employee_id = ?
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(employee_id)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(allowances))
}

/// Remove a variable allowance and recompute the derived total.
#[utoipa::path(
    delete,
    path = "/api/employees/{code}/allowances/{allowance_id}",
    params(
        ("code", Path, description = "External employee code"),
        ("allowance_id", Path, description = "Allowance ID")
    ),
    responses(
        (status = 200, description = "Allowance removed"),
        (status = 404, description = "Employee or allowance not found")
    ),
    tag = "Allowance",
    security(("bearer_auth" = []))
)]
pub async fn delete_allowance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<(String, u64)>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    let (code, allowance_id) = path.into_inner();
    let employee_id = resolver::resolve_code(pool.get_ref(), &code).await?;

    let mut tx = pool.begin().await?;
    ledger::lock_employee(&mut tx, employee_id).await?;

    let result = sqlx::query("DELETE FROM allowances WHERE id = ? AND employee_id = ?")
        .bind(allowance_id)
        .bind(employee_id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Allowance", allowance_id.to_string()));
    }

    ledger::recompute_total(&mut tx, employee_id).await?;

    tx.commit().await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Allowance removed"
    })))
}
