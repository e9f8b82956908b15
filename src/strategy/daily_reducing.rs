use rust_decimal::Decimal;
use tracing::{debug, info};

use super::{
    calculation_failed, due_date, level_emi, AmortisationStrategy, CalculationContext, LoanTerms,
};
use crate::audit::AuditTrail;
use crate::decimal::{Money, Rate};
use crate::errors::{CalculationCause, CalculationError};
use crate::request::CalculationRequest;
use crate::schedule::{EmiSchedule, InstallmentLedger, ScheduleTotals};
use crate::types::AmortisationMethod;

/// Daily reducing balance.
///
/// The installment amount is the level EMI, but each period's interest accrues
/// daily on the outstanding balance for the actual days between due dates
/// (Actual/365), so longer months carry more interest.
#[derive(Debug, Clone, Copy, Default)]
pub struct DailyReducingStrategy;

impl DailyReducingStrategy {
    fn build(
        &self,
        request: &CalculationRequest,
        ctx: &CalculationContext<'_>,
    ) -> Result<EmiSchedule, CalculationCause> {
        let terms = LoanTerms::from_request(request)?;
        let monthly_rate = terms.monthly_rate(&ctx.numeric);
        let daily_rate = Rate::daily_from_annual_percent(terms.annual_rate, ctx.numeric.rate_scale);
        let emi = level_emi(terms.principal, monthly_rate, terms.tenure)?;

        let mut ledger = InstallmentLedger::with_capacity(terms.tenure);
        let mut outstanding = terms.principal;
        let mut period_start = terms.start_date;
        for i in 1..=terms.tenure {
            let due = due_date(terms.start_date, i)?;
            let days = (due - period_start).num_days();

            let (principal, interest) = if i == terms.tenure {
                (outstanding, emi - outstanding)
            } else {
                let interest = accrued_interest(outstanding, daily_rate, days)?;
                (emi - interest, interest)
            };

            outstanding = ledger.record(due, outstanding, emi, principal, interest)?;
            period_start = due;
        }
        let installments = ledger.finish();
        let totals = ScheduleTotals::from_installments(&installments);

        let audit_trail = AuditTrail {
            method: AmortisationMethod::DailyReducing,
            principal: terms.principal,
            annual_rate: terms.annual_rate,
            periodic_rate: monthly_rate,
            tenure: terms.tenure,
            emi,
            regulatory_version: ctx.regulatory_version,
        }
        .to_string();

        Ok(EmiSchedule {
            loan_id: request.loan_id.clone(),
            calculated_at: ctx.calculated_at,
            emi,
            total_interest: totals.interest,
            total_payment: terms.principal + totals.interest,
            installments,
            audit_trail,
            calculation_method: self.name().to_string(),
            cached: false,
        })
    }
}

/// `round(balance × daily rate × days, 2)`
fn accrued_interest(
    balance: Money,
    daily_rate: Rate,
    days: i64,
) -> Result<Money, CalculationCause> {
    balance
        .as_decimal()
        .checked_mul(daily_rate.as_decimal())
        .and_then(|v| v.checked_mul(Decimal::from(days)))
        .map(Money::from_decimal)
        .ok_or(CalculationCause::Overflow { operation: "daily accrual" })
}

impl AmortisationStrategy for DailyReducingStrategy {
    fn calculate(
        &self,
        request: &CalculationRequest,
        ctx: &CalculationContext<'_>,
    ) -> Result<EmiSchedule, CalculationError> {
        debug!(loan_id = %request.loan_id, "Starting daily reducing calculation");

        let schedule = self
            .build(request, ctx)
            .map_err(|cause| calculation_failed(request, self.name(), cause))?;

        info!(
            loan_id = %schedule.loan_id,
            emi = %schedule.emi,
            total_interest = %schedule.total_interest,
            "Calculation completed"
        );
        Ok(schedule)
    }

    fn name(&self) -> &'static str {
        AmortisationMethod::DailyReducing.as_str()
    }
}
