use crate::model::{allowance::Allowance, deduction::Deduction, employee::Employee};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct EarningLine {
    #[schema(example = "Basic")]
    pub label: String,
    #[schema(example = 4000.0)]
    pub amount: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeductionLine {
    #[schema(example = "Unpaid leave")]
    pub reason: String,
    #[schema(example = 300.0)]
    pub amount: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectionSummary {
    #[schema(example = 6500.0)]
    pub total_earnings: f64,
    #[schema(example = 300.0)]
    pub total_deductions: f64,
    #[schema(example = 6200.0)]
    pub net_pay: f64,
    /// Share of earnings actually paid out, rounded to one decimal.
    #[schema(example = 95.4)]
    pub payout_percentage: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SalaryProjection {
    #[schema(example = 2)]
    pub month: u16,
    #[schema(example = 2025)]
    pub year: u16,
    pub earnings: Vec<EarningLine>,
    pub deductions: Vec<DeductionLine>,
    pub summary: ProjectionSummary,
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Itemize one period: the five standard components, every variable
/// allowance, and the pending deductions scoped to that period. Pure;
/// callers fetch the rows.
pub fn project(
    month: u16,
    year: u16,
    employee: &Employee,
    allowances: &[Allowance],
    pending: &[Deduction],
) -> SalaryProjection {
    let mut earnings = vec![
        EarningLine {
            label: "Basic".to_string(),
            amount: employee.basic,
        },
        EarningLine {
            label: "House Rent Allowance".to_string(),
            amount: employee.housing_allowance,
        },
        EarningLine {
            label: "Dearness Allowance".to_string(),
            amount: employee.dearness_allowance,
        },
        EarningLine {
            label: "Travel Allowance".to_string(),
            amount: employee.travel_allowance,
        },
        EarningLine {
            label: "Special Allowance".to_string(),
            amount: employee.special_allowance,
        },
    ];

    for a in allowances {
        earnings.push(EarningLine {
            label: a.label.clone(),
            amount: a.amount,
        });
    }

    let deductions: Vec<DeductionLine> = pending
        .iter()
        .map(|d| DeductionLine {
            reason: d.reason.clone(),
            amount: d.amount,
        })
        .collect();

    let total_earnings: f64 = earnings.iter().map(|e| e.amount).sum();
    let total_deductions: f64 = deductions.iter().map(|d| d.amount).sum();
    let net_pay = total_earnings - total_deductions;

    let payout_percentage = if total_earnings > 0.0 {
        round1((total_earnings - total_deductions) / total_earnings * 100.0)
    } else {
        0.0
    };

    SalaryProjection {
        month,
        year,
        earnings,
        deductions,
        summary: ProjectionSummary {
            total_earnings,
            total_deductions,
            net_pay,
            payout_percentage,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::deduction::DeductionStatus;

    fn employee(basic: f64, hra: f64) -> Employee {
        Employee {
            id: 1,
            employee_code: Some("code".to_string()),
            name: "Test".to_string(),
            email: "t@example.com".to_string(),
            role: "Engineer".to_string(),
            profile_image: None,
            total_compensation: basic + hra,
            basic,
            housing_allowance: hra,
            dearness_allowance: 0.0,
            travel_allowance: 0.0,
            special_allowance: 0.0,
            created_at: None,
        }
    }

    fn allowance(label: &str, amount: f64) -> Allowance {
        Allowance {
            id: 1,
            employee_id: 1,
            label: label.to_string(),
            amount,
            created_at: None,
        }
    }

    fn deduction(reason: &str, amount: f64) -> Deduction {
        Deduction {
            id: 1,
            employee_id: 1,
            reason: reason.to_string(),
            amount,
            month: 2,
            year: 2025,
            status: DeductionStatus::Pending,
            created_at: None,
        }
    }

    #[test]
    fn itemizes_and_summarizes() {
        let emp = employee(4000.0, 2000.0);
        let allowances = [allowance("Internet Allowance", 500.0)];
        let pending = [deduction("Late arrival", 300.0)];

        let p = project(2, 2025, &emp, &allowances, &pending);

        assert_eq!(p.earnings.len(), 6);
        assert_eq!(p.deductions.len(), 1);
        assert_eq!(p.summary.total_earnings, 6500.0);
        assert_eq!(p.summary.total_deductions, 300.0);
        assert_eq!(p.summary.net_pay, 6200.0);
        assert_eq!(p.summary.payout_percentage, 95.4);
    }

    #[test]
    fn zero_earnings_has_zero_payout() {
        let emp = employee(0.0, 0.0);
        let p = project(1, 2025, &emp, &[], &[deduction("Advance", 100.0)]);
        assert_eq!(p.summary.total_earnings, 0.0);
        assert_eq!(p.summary.net_pay, -100.0);
        assert_eq!(p.summary.payout_percentage, 0.0);
    }

    #[test]
    fn no_deductions_pays_out_fully() {
        let emp = employee(5000.0, 0.0);
        let p = project(3, 2025, &emp, &[], &[]);
        assert_eq!(p.summary.total_deductions, 0.0);
        assert_eq!(p.summary.payout_percentage, 100.0);
    }
}
