use tracing::{debug, info};

use super::{
    calculation_failed, due_date, level_emi, period_interest, AmortisationStrategy,
    CalculationContext, LoanTerms,
};
use crate::audit::AuditTrail;
use crate::decimal::{Money, Rate};
use crate::errors::{CalculationCause, CalculationError};
use crate::request::CalculationRequest;
use crate::schedule::{EmiSchedule, Installment, InstallmentLedger, ScheduleTotals};
use crate::types::AmortisationMethod;

/// Reducing balance (equal EMI).
///
/// EMI stays constant for the whole tenure and interest is charged on the
/// outstanding principal, so the principal share of each installment grows while
/// the interest share shrinks:
///
/// `EMI = P × r × (1+r)^n / ((1+r)^n − 1)` with `r = annual% / 12 / 100`.
///
/// The last installment repays whatever balance is left and its interest is
/// whatever remains of the EMI, so the schedule always closes at exactly zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReducingBalanceStrategy;

impl ReducingBalanceStrategy {
    fn build(
        &self,
        request: &CalculationRequest,
        ctx: &CalculationContext<'_>,
    ) -> Result<EmiSchedule, CalculationCause> {
        let terms = LoanTerms::from_request(request)?;
        let monthly_rate = terms.monthly_rate(&ctx.numeric);
        let emi = level_emi(terms.principal, monthly_rate, terms.tenure)?;

        let installments = generate_installments(&terms, emi, monthly_rate)?;

        let totals = ScheduleTotals::from_installments(&installments);
        let total_payment = terms.principal + totals.interest;

        let audit_trail = AuditTrail {
            method: AmortisationMethod::ReducingBalance,
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
            total_payment,
            installments,
            audit_trail,
            calculation_method: self.name().to_string(),
            cached: false,
        })
    }
}

fn generate_installments(
    terms: &LoanTerms,
    emi: Money,
    monthly_rate: Rate,
) -> Result<Vec<Installment>, CalculationCause> {
    let mut ledger = InstallmentLedger::with_capacity(terms.tenure);
    let mut outstanding = terms.principal;

    for i in 1..=terms.tenure {
        let (principal, interest) = if i == terms.tenure {
            // absorb accumulated rounding drift into the final interest
            (outstanding, emi - outstanding)
        } else {
            let interest = period_interest(outstanding, monthly_rate)?;
            (emi - interest, interest)
        };

        let due = due_date(terms.start_date, i)?;
        outstanding = ledger.record(due, outstanding, emi, principal, interest)?;
    }

    Ok(ledger.finish())
}

impl AmortisationStrategy for ReducingBalanceStrategy {
    fn calculate(
        &self,
        request: &CalculationRequest,
        ctx: &CalculationContext<'_>,
    ) -> Result<EmiSchedule, CalculationError> {
        debug!(loan_id = %request.loan_id, "Starting reducing balance calculation");

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
        AmortisationMethod::ReducingBalance.as_str()
    }
}
