use crate::{
    auth::auth::AuthUser,
    error::ApiError,
    mail::{Mailer, payslip_html, payslip_subject},
    model::{allowance::Allowance, deduction::Deduction, payroll_record::PayrollRecord},
    resolver,
    salary::{crediting, ensure_period, history, ledger, projection},
};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::warn;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreditRequest {
    #[schema(example = 2)]
    pub month: u16,
    #[schema(example = 2025)]
    pub year: u16,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PeriodQuery {
    #[schema(example = 2)]
    pub month: u16,
    #[schema(example = 2025)]
    pub year: u16,
}

#[derive(Deserialize, ToSchema)]
pub struct PayslipRequest {
    /// Defaults to the most recent credited period.
    pub month: Option<u16>,
    pub year: Option<u16>,
}

fn notify_credited(mailer: &Option<Mailer>, pool: &MySqlPool, record: &PayrollRecord) {
    let Some(mailer) = mailer.clone() else {
        return;
    };

    // Outside the transactional boundary on purpose: a mail failure is
    // logged by the mailer and never affects the credit.
    let pool = pool.clone();
    let employee_id = record.employee_id;
    let record_month = record.month;
    let record_year = record.year;

    actix_web::rt::spawn(async move {
        let employee = match ledger::fetch_employee(&pool, employee_id).await {
            Ok(e) => e,
            Err(_) => {
                warn!(employee_id, "Skipping credit notification: employee fetch failed");
                return;
            }
        };

        let record = sqlx::query_as::<_, PayrollRecord>(
            "SELECT * FROM payroll_records WHERE employee_id = ? AND month = ? AND year = ?",
        )
        .bind(employee_id)
        .bind(record_month)
        .bind(record_year)
        .fetch_optional(&pool)
        .await;

        if let Ok(Some(record)) = record {
            let body = payslip_html(&employee, &record);
            mailer
                .send(&employee.email, &payslip_subject(&record), body)
                .await;
        }
    });
}

/// Credit one month's salary. At most one crediting event can exist per
/// (employee, month, year); repeats get a 409.
#[utoipa::path(
    post,
    path = "/api/employees/{code}/credit-salary",
    params(("code", Path, description = "External employee code")),
    request_body = CreditRequest,
    responses(
        (status = 201, description = "Salary credited", body = PayrollRecord),
        (status = 400, description = "Malformed period"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Period already credited")
    ),
    tag = "Payroll",
    security(("bearer_auth" = []))
)]
pub async fn credit_salary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    mailer: web::Data<Option<Mailer>>,
    path: web::Path<String>,
    payload: web::Json<CreditRequest>,
) -> Result<HttpResponse, ApiError> {
    auth.require_hr_or_admin()?;

    let code = path.into_inner();
    let employee_id = resolver::resolve_code(pool.get_ref(), &code).await?;

    let record =
        crediting::credit_period(pool.get_ref(), employee_id, payload.month, payload.year)
            .await?;

    notify_credited(mailer.get_ref(), pool.get_ref(), &record);

    Ok(HttpResponse::Created().json(record))
}

#[utoipa::path(
    get,
    path = "/api/employees/{code}/payroll",
    params(("code", Path, description = "External employee code")),
    responses(
        (status = 200, description = "Payroll records, newest first", body = [PayrollRecord]),
        (status = 404, description = "Employee not found")
    ),
    tag = "Payroll",
    security(("bearer_auth" = []))
)]
pub async fn payroll_history(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let code = path.into_inner();
    let employee_id = resolver::resolve_code(pool.get_ref(), &code).await?;

    let records = crediting::list_records(pool.get_ref(), employee_id).await?;

    Ok(HttpResponse::Ok().json(records))
}

#[utoipa::path(
    get,
    path = "/api/employees/{code}/history",
    params(("code", Path, description = "External employee code")),
    responses(
        (status = 200, description = "Salary history, newest first", body = [crate::model::salary_history::SalaryHistoryEntry]),
        (status = 404, description = "Employee not found")
    ),
    tag = "Payroll",
    security(("bearer_auth" = []))
)]
pub async fn salary_history(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let code = path.into_inner();
    let employee_id = resolver::resolve_code(pool.get_ref(), &code).await?;

    let entries = history::list(pool.get_ref(), employee_id).await?;

    Ok(HttpResponse::Ok().json(entries))
}

/// Itemized earnings and pending deductions for one period, with a
/// payout summary. Does not credit anything.
#[utoipa::path(
    get,
    path = "/api/employees/{code}/projection",
    params(
        ("code", Path, description = "External employee code"),
        PeriodQuery
    ),
    responses(
        (status = 200, description = "Salary projection", body = projection::SalaryProjection),
        (status = 400, description = "Malformed period"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Payroll",
    security(("bearer_auth" = []))
)]
pub async fn salary_projection(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
    query: web::Query<PeriodQuery>,
) -> Result<HttpResponse, ApiError> {
    ensure_period(query.month, query.year)?;

    let code = path.into_inner();
    let employee_id = resolver::resolve_code(pool.get_ref(), &code).await?;

    let employee = ledger::fetch_employee(pool.get_ref(), employee_id).await?;
    let employee = ledger::heal_if_legacy(pool.get_ref(), employee).await?;

    let allowances = sqlx::query_as::<_, Allowance>(
        "SELECT * FROM allowances WHERE employee_id = ? ORDER BY id",
    )
    .bind(employee_id)
    .fetch_all(pool.get_ref())
    .await?;

    let pending = sqlx::query_as::<_, Deduction>(
        r#"
        SELECT *
        FROM deductions
        WHERE employee_id = ? AND month = ? AND year = ? AND status = 'pending'
        ORDER BY id
        "#,
    )
    .bind(employee_id)
    .bind(query.month)
    .bind(query.year)
    .fetch_all(pool.get_ref())
    .await?;

    let projection = projection::project(query.month, query.year, &employee, &allowances, &pending);

    Ok(HttpResponse::Ok().json(projection))
}

/// Queue a payslip email for a credited period (defaults to the latest).
#[utoipa::path(
    post,
    path = "/api/employees/{code}/send-payslip",
    params(("code", Path, description = "External employee code")),
    request_body = PayslipRequest,
    responses(
        (status = 202, description = "Pay slip queued for delivery"),
        (status = 404, description = "Employee or payroll record not found"),
        (status = 503, description = "Mail transport not configured")
    ),
    tag = "Payroll",
    security(("bearer_auth" = []))
)]
pub async fn send_payslip(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    mailer: web::Data<Option<Mailer>>,
    path: web::Path<String>,
    payload: web::Json<PayslipRequest>,
) -> Result<HttpResponse, ApiError> {
    let code = path.into_inner();
    let employee_id = resolver::resolve_code(pool.get_ref(), &code).await?;

    let Some(mailer) = mailer.get_ref().clone() else {
        return Ok(HttpResponse::ServiceUnavailable().json(json!({
            "message": "Mail transport is not configured"
        })));
    };

    let employee = ledger::fetch_employee(pool.get_ref(), employee_id).await?;

    let record = match (payload.month, payload.year) {
        (Some(month), Some(year)) => {
            ensure_period(month, year)?;
            sqlx::query_as::<_, PayrollRecord>(
                "SELECT * FROM payroll_records WHERE employee_id = ? AND month = ? AND year = ?",
            )
            .bind(employee_id)
            .bind(month)
            .bind(year)
            .fetch_optional(pool.get_ref())
            .await?
        }
        (None, None) => crediting::latest_record(pool.get_ref(), employee_id).await?,
        _ => {
            return Err(ApiError::validation(
                "month and year must be provided together",
            ));
        }
    };

    let Some(record) = record else {
        return Err(ApiError::not_found("Payroll record", code));
    };

    let subject = payslip_subject(&record);
    let body = payslip_html(&employee, &record);
    let recipient = employee.email.clone();

    actix_web::rt::spawn(async move {
        mailer.send(&recipient, &subject, body).await;
    });

    Ok(HttpResponse::Accepted().json(json!({
        "message": "Pay slip queued for delivery"
    })))
}
