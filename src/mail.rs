use crate::{
    config::Config,
    model::{employee::Employee, payroll_record::PayrollRecord},
    salary::month_name,
};
use anyhow::{Context, Result};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType, transport::smtp::authentication::Credentials,
};
use tracing::{error, info, warn};

/// Outbound mail is a fire-and-forget collaborator: `send` reports
/// success or failure and never propagates into the engine's
/// transactional state.
#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl Mailer {
    /// None when SMTP credentials are missing; dispatch is then disabled
    /// and callers respond accordingly.
    pub fn from_config(config: &Config) -> Option<Mailer> {
        if config.email_user.is_empty() || config.email_pass.is_empty() {
            warn!("EMAIL_USER/EMAIL_PASS not set; mail dispatch disabled");
            return None;
        }

        let transport = match AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host) {
            Ok(builder) => builder
                .credentials(Credentials::new(
                    config.email_user.clone(),
                    config.email_pass.clone(),
                ))
                .build(),
            Err(e) => {
                error!(error = %e, host = %config.smtp_host, "Failed to build mail transport");
                return None;
            }
        };

        Some(Mailer {
            transport,
            from: format!("\"EmployeeHub Admin\" <{}>", config.email_user),
        })
    }

    pub async fn send(&self, recipient: &str, subject: &str, html_body: String) -> bool {
        let message = match self.compose(recipient, subject, html_body) {
            Ok(m) => m,
            Err(e) => {
                error!(error = %e, recipient, "Failed to compose mail");
                return false;
            }
        };

        match self.transport.send(message).await {
            Ok(_) => {
                info!(recipient, "Mail sent");
                true
            }
            Err(e) => {
                error!(error = %e, recipient, "Failed to send mail");
                false
            }
        }
    }

    fn compose(&self, recipient: &str, subject: &str, html_body: String) -> Result<Message> {
        Message::builder()
            .from(self.from.parse().context("invalid sender address")?)
            .to(recipient.parse().context("invalid recipient address")?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body)
            .context("failed to build message")
    }
}

pub fn payslip_subject(record: &PayrollRecord) -> String {
    format!(
        "Your Salary Slip for {} {}",
        month_name(record.month),
        record.year
    )
}

pub fn payslip_html(employee: &Employee, record: &PayrollRecord) -> String {
    format!(
        r#"<h2>Salary Slip - {month} {year}</h2>
<p>Dear {name},</p>
<p>Your salary for {month} {year} has been credited.</p>
<table border="1" cellpadding="6" cellspacing="0">
  <tr><td>Gross Amount</td><td>{gross:.2}</td></tr>
  <tr><td>Deductions</td><td>{deduction:.2}</td></tr>
  <tr><td><b>Net Amount</b></td><td><b>{net:.2}</b></td></tr>
</table>
<p>Regards,<br/>EmployeeHub Admin</p>"#,
        month = month_name(record.month),
        year = record.year,
        name = employee.name,
        gross = record.gross_amount,
        deduction = record.deduction_amount,
        net = record.net_amount,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn payslip_names_the_period_and_amounts() {
        let employee = Employee {
            id: 1,
            employee_code: Some("c".to_string()),
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            role: "Engineer".to_string(),
            profile_image: None,
            total_compensation: 10000.0,
            basic: 4000.0,
            housing_allowance: 2000.0,
            dearness_allowance: 1000.0,
            travel_allowance: 500.0,
            special_allowance: 2500.0,
            created_at: None,
        };
        let record = PayrollRecord {
            id: 1,
            employee_id: 1,
            month: 2,
            year: 2025,
            gross_amount: 10000.0,
            deduction_amount: 800.0,
            net_amount: 9200.0,
            payment_date: Utc::now(),
            status: "Credited".to_string(),
        };

        assert_eq!(payslip_subject(&record), "Your Salary Slip for February 2025");

        let body = payslip_html(&employee, &record);
        assert!(body.contains("Jane"));
        assert!(body.contains("9200.00"));
        assert!(body.contains("February 2025"));
    }
}
