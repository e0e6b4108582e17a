use crate::{
    auth::auth::AuthUser,
    error::ApiError,
    model::employee::Employee,
    resolver,
    salary::{breakup::standard_breakup, ensure_amount, history, ledger},
};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, info};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "john@email.com", format = "email")]
    pub email: String,
    #[schema(example = "Engineer")]
    pub role: String,
    #[schema(nullable = true)]
    pub profile_image: Option<String>,
    #[schema(example = 12000.0)]
    pub total_compensation: f64,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    #[schema(example = 1)]
    pub page: Option<u32>,
    #[schema(example = 20)]
    pub per_page: Option<u32>,
    /// Matches name, email or role.
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub profile_image: Option<String>,
}

/// The caller picks the protocol; it is never inferred from which fields
/// happen to be present.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CompositionUpdate {
    /// Top-down: overwrite the standard split from a new total.
    Total { total: f64 },
    /// Bottom-up: override individual components; the total is recomputed.
    Components {
        basic: Option<f64>,
        housing_allowance: Option<f64>,
        dearness_allowance: Option<f64>,
        travel_allowance: Option<f64>,
        special_allowance: Option<f64>,
    },
}

#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    #[schema(example = 42)]
    pub count: i64,
    #[schema(example = 504000.0)]
    pub total_compensation_sum: f64,
    /// Rounded to two decimals.
    #[schema(example = 12000.0)]
    pub average_compensation: f64,
    #[schema(example = "Jane Doe", nullable = true)]
    pub highest_paid_name: Option<String>,
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    Str(&'a str),
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created with computed breakdown", body = Employee),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::validation("name must not be empty"));
    }
    if payload.email.trim().is_empty() {
        return Err(ApiError::validation("email must not be empty"));
    }
    ensure_amount(payload.total_compensation, "total_compensation")?;

    let code = Uuid::new_v4().to_string();
    let b = standard_breakup(payload.total_compensation);

    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        INSERT INTO employees
            (employee_code, name, email, role, profile_image,
             total_compensation, basic, housing_allowance,
             dearness_allowance, travel_allowance, special_allowance)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&code)
    .bind(name)
    .bind(payload.email.trim())
    .bind(&payload.role)
    .bind(&payload.profile_image)
    .bind(payload.total_compensation)
    .bind(b.basic)
    .bind(b.housing)
    .bind(b.dearness)
    .bind(b.travel)
    .bind(b.special)
    .execute(&mut *tx)
    .await?;

    let employee_id = result.last_insert_id();

    // creation is a 0 -> initial transition
    if payload.total_compensation != 0.0 {
        history::record(&mut tx, employee_id, 0.0, payload.total_compensation).await?;
    }

    tx.commit().await?;

    resolver::register_code(&code, employee_id).await;

    let employee = ledger::fetch_employee(pool.get_ref(), employee_id).await?;

    info!(employee_id, code = %code, "Employee created");

    Ok(HttpResponse::Created().json(employee))
}

#[utoipa::path(
    get,
    path = "/api/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse)
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn list_employees(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> Result<HttpResponse, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    let like;
    if let Some(search) = query.search.as_deref() {
        where_sql.push_str(" AND (name LIKE ? OR email LIKE ? OR role LIKE ?)");
        like = format!("%{}%", search);
        args.push(FilterValue::Str(&like));
        args.push(FilterValue::Str(&like));
        args.push(FilterValue::Str(&like));
    }

    let count_sql = format!("SELECT COUNT(*) FROM employees{}", where_sql);
    debug!(sql = %count_sql, "Counting employees");

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await?;

    let data_sql = format!(
        "SELECT * FROM employees{} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        where_sql
    );
    debug!(sql = %data_sql, page, per_page, "Fetching employees");

    let mut data_q = sqlx::query_as::<_, Employee>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let employees = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: employees,
        page,
        per_page,
        total,
    }))
}

/// Employee compensation statistics
#[utoipa::path(
    get,
    path = "/api/employees/stats",
    responses(
        (status = 200, description = "Aggregate compensation stats", body = StatsResponse)
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn employee_stats(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees")
        .fetch_one(pool.get_ref())
        .await?;

    let sum: Option<f64> = sqlx::query_scalar("SELECT SUM(total_compensation) FROM employees")
        .fetch_one(pool.get_ref())
        .await?;

    let avg: Option<f64> = sqlx::query_scalar("SELECT AVG(total_compensation) FROM employees")
        .fetch_one(pool.get_ref())
        .await?;

    let highest_paid_name: Option<String> = sqlx::query_scalar(
        "SELECT name FROM employees ORDER BY total_compensation DESC LIMIT 1",
    )
    .fetch_optional(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(StatsResponse {
        count,
        total_compensation_sum: sum.unwrap_or(0.0),
        average_compensation: (avg.unwrap_or(0.0) * 100.0).round() / 100.0,
        highest_paid_name,
    }))
}

/// Get Employee by external code
#[utoipa::path(
    get,
    path = "/api/employees/{code}",
    params(("code", Path, description = "External employee code")),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn get_employee(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let code = path.into_inner();
    let employee_id = resolver::resolve_code(pool.get_ref(), &code).await?;

    let employee = ledger::fetch_employee(pool.get_ref(), employee_id).await?;
    let employee = ledger::heal_if_legacy(pool.get_ref(), employee).await?;

    Ok(HttpResponse::Ok().json(employee))
}

/// Update profile fields
#[utoipa::path(
    put,
    path = "/api/employees/{code}",
    params(("code", Path, description = "External employee code")),
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 400, description = "No fields provided"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
    payload: web::Json<UpdateProfile>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    if payload.name.is_none()
        && payload.email.is_none()
        && payload.role.is_none()
        && payload.profile_image.is_none()
    {
        return Err(ApiError::validation("No fields provided for update"));
    }

    let code = path.into_inner();
    let employee_id = resolver::resolve_code(pool.get_ref(), &code).await?;

    sqlx::query(
        r#"
        UPDATE employees
        SET name = COALESCE(?, name),
            email = COALESCE(?, email),
            role = COALESCE(?, role),
            profile_image = COALESCE(?, profile_image)
        WHERE id = ?
        "#,
    )
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(&payload.role)
    .bind(&payload.profile_image)
    .bind(employee_id)
    .execute(pool.get_ref())
    .await?;

    let employee = ledger::fetch_employee(pool.get_ref(), employee_id).await?;

    Ok(HttpResponse::Ok().json(employee))
}

/// Update salary composition (top-down or bottom-up)
#[utoipa::path(
    put,
    path = "/api/employees/{code}/composition",
    params(("code", Path, description = "External employee code")),
    request_body = CompositionUpdate,
    responses(
        (status = 200, description = "Composition updated", body = Employee),
        (status = 400, description = "Invalid amounts or empty component set"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn update_composition(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
    payload: web::Json<CompositionUpdate>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    let code = path.into_inner();
    let employee_id = resolver::resolve_code(pool.get_ref(), &code).await?;

    let employee = match payload.into_inner() {
        CompositionUpdate::Total { total } => {
            ledger::update_total(pool.get_ref(), employee_id, total).await?
        }
        CompositionUpdate::Components {
            basic,
            housing_allowance,
            dearness_allowance,
            travel_allowance,
            special_allowance,
        } => {
            let overrides = ledger::ComponentOverrides {
                basic,
                housing_allowance,
                dearness_allowance,
                travel_allowance,
                special_allowance,
            };
            ledger::update_components(pool.get_ref(), employee_id, &overrides).await?
        }
    };

    Ok(HttpResponse::Ok().json(employee))
}

/// Delete Employee (cascades allowances, deductions, payroll and history)
#[utoipa::path(
    delete,
    path = "/api/employees/{code}",
    params(("code", Path, description = "External employee code")),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn delete_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let code = path.into_inner();
    let employee_id = resolver::resolve_code(pool.get_ref(), &code).await?;

    let result = sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(employee_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Employee", code));
    }

    resolver::unregister_code(&code).await;

    info!(employee_id, code = %code, "Employee deleted");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Deleted successfully"
    })))
}

/// Assign codes to employees that predate external identifiers.
/// Row-by-row on purpose: partial progress survives a failure and the
/// next run picks up where this one stopped.
#[utoipa::path(
    post,
    path = "/api/employees/seed-codes",
    responses(
        (status = 200, description = "Backfill complete"),
        (status = 403, description = "Admin only")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn seed_employee_codes(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let ids: Vec<u64> =
        sqlx::query_scalar("SELECT id FROM employees WHERE employee_code IS NULL")
            .fetch_all(pool.get_ref())
            .await?;

    let mut assigned = 0u64;

    for id in ids {
        let code = Uuid::new_v4().to_string();

        let result = sqlx::query(
            "UPDATE employees SET employee_code = ? WHERE id = ? AND employee_code IS NULL",
        )
        .bind(&code)
        .bind(id)
        .execute(pool.get_ref())
        .await?;

        if result.rows_affected() == 1 {
            resolver::register_code(&code, id).await;
            assigned += 1;
        }
    }

    info!(assigned, "Employee code backfill complete");

    Ok(HttpResponse::Ok().json(json!({ "assigned": assigned })))
}

/// Explicit migration pass for rows created before the breakdown columns.
#[utoipa::path(
    post,
    path = "/api/employees/heal-breakdowns",
    responses(
        (status = 200, description = "Migration complete"),
        (status = 403, description = "Admin only")
    ),
    tag = "Employee",
    security(("bearer_auth" = []))
)]
pub async fn heal_breakdowns(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let ids: Vec<u64> = sqlx::query_scalar(
        "SELECT id FROM employees WHERE total_compensation > 0 AND basic = 0",
    )
    .fetch_all(pool.get_ref())
    .await?;

    let mut healed = 0u64;

    for id in ids {
        let employee = ledger::fetch_employee(pool.get_ref(), id).await?;
        if employee.has_legacy_breakdown() {
            ledger::heal_if_legacy(pool.get_ref(), employee).await?;
            healed += 1;
        }
    }

    info!(healed, "Legacy breakdown migration complete");

    Ok(HttpResponse::Ok().json(json!({ "healed": healed })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composition_update_is_tagged_not_inferred() {
        let total: CompositionUpdate =
            serde_json::from_str(r#"{"mode": "total", "total": 12000.0}"#).unwrap();
        assert!(matches!(total, CompositionUpdate::Total { total } if total == 12000.0));

        let components: CompositionUpdate =
            serde_json::from_str(r#"{"mode": "components", "basic": 5000.0}"#).unwrap();
        match components {
            CompositionUpdate::Components { basic, housing_allowance, .. } => {
                assert_eq!(basic, Some(5000.0));
                assert_eq!(housing_allowance, None);
            }
            other => panic!("wrong variant: {:?}", other),
        }

        // a payload without the tag is rejected outright
        assert!(serde_json::from_str::<CompositionUpdate>(r#"{"total": 12000.0}"#).is_err());
    }
}
