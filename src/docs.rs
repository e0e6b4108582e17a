use crate::api::allowance::CreateAllowance;
use crate::api::deduction::CreateDeduction;
use crate::api::employee::{
    CompositionUpdate, CreateEmployee, EmployeeListResponse, EmployeeQuery, StatsResponse,
    UpdateProfile,
};
use crate::api::payroll::{CreditRequest, PayslipRequest, PeriodQuery};
use crate::model::allowance::Allowance;
use crate::model::deduction::{Deduction, DeductionStatus};
use crate::model::employee::Employee;
use crate::model::payroll_record::PayrollRecord;
use crate::model::salary_history::SalaryHistoryEntry;
use crate::salary::projection::{
    DeductionLine, EarningLine, ProjectionSummary, SalaryProjection,
};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "EmployeeHub API",
        version = "1.0.0",
        description = r#"
## EmployeeHub

HR/payroll record keeper: employee profiles, salary composition,
allowances, deductions, monthly payroll crediting, and a salary-history
audit trail.

### Key Features
- **Employee Management** — profiles with an external employee code and a
  computed salary breakdown (basic / housing / dearness / travel / special)
- **Salary Composition** — top-down (new total) or bottom-up (component
  override) updates; variable allowances on top of the standard split
- **Deductions** — dated, period-scoped entries that stay pending until a
  crediting event applies them
- **Payroll Crediting** — one immutable record per employee and month,
  enforced by the store
- **Audit Trail** — immutable salary history on every total change

### Security
Endpoints under the API prefix require **JWT Bearer authentication**.
Deleting employees and running migrations require the **Admin** role.

Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::employee_stats,
        crate::api::employee::get_employee,
        crate::api::employee::update_profile,
        crate::api::employee::update_composition,
        crate::api::employee::delete_employee,
        crate::api::employee::seed_employee_codes,
        crate::api::employee::heal_breakdowns,

        crate::api::allowance::add_allowance,
        crate::api::allowance::list_allowances,
        crate::api::allowance::delete_allowance,

        crate::api::deduction::add_deduction,
        crate::api::deduction::list_deductions,
        crate::api::deduction::delete_deduction,

        crate::api::payroll::credit_salary,
        crate::api::payroll::payroll_history,
        crate::api::payroll::salary_history,
        crate::api::payroll::salary_projection,
        crate::api::payroll::send_payslip
    ),
    components(
        schemas(
            Employee,
            Allowance,
            Deduction,
            DeductionStatus,
            PayrollRecord,
            SalaryHistoryEntry,
            CreateEmployee,
            EmployeeQuery,
            EmployeeListResponse,
            UpdateProfile,
            CompositionUpdate,
            StatsResponse,
            CreateAllowance,
            CreateDeduction,
            CreditRequest,
            PeriodQuery,
            PayslipRequest,
            SalaryProjection,
            EarningLine,
            DeductionLine,
            ProjectionSummary
        )
    ),
    tags(
        (name = "Employee", description = "Employee management APIs"),
        (name = "Allowance", description = "Variable allowance APIs"),
        (name = "Deduction", description = "Deduction tracking APIs"),
        (name = "Payroll", description = "Payroll crediting and projection APIs"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
