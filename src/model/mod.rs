pub mod allowance;
pub mod deduction;
pub mod employee;
pub mod payroll_record;
pub mod role;
pub mod salary_history;
pub mod user;
