use rust_decimal::Decimal;
use tracing::{debug, info};

use super::{
    calculation_failed, due_date, period_interest, AmortisationStrategy, CalculationContext,
    LoanTerms,
};
use crate::audit::AuditTrail;
use crate::decimal::Money;
use crate::errors::{CalculationCause, CalculationError};
use crate::request::CalculationRequest;
use crate::schedule::{EmiSchedule, InstallmentLedger, ScheduleTotals};
use crate::types::AmortisationMethod;

/// Flat rate: interest on the original principal for every period.
///
/// `EMI = (P + P × r × n) / n`; each installment carries the same
/// `round(P × r, 2)` of interest except the last, which settles the remaining
/// balance exactly.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatRateStrategy;

impl FlatRateStrategy {
    fn build(
        &self,
        request: &CalculationRequest,
        ctx: &CalculationContext<'_>,
    ) -> Result<EmiSchedule, CalculationCause> {
        let terms = LoanTerms::from_request(request)?;
        let monthly_rate = terms.monthly_rate(&ctx.numeric);
        let n = Decimal::from(terms.tenure);

        let total_interest = terms
            .principal
            .as_decimal()
            .checked_mul(monthly_rate.as_decimal())
            .and_then(|v| v.checked_mul(n))
            .ok_or(CalculationCause::Overflow { operation: "flat interest" })?;
        let emi = (terms.principal.as_decimal() + total_interest)
            .checked_div(n)
            .map(Money::from_decimal)
            .ok_or(CalculationCause::DivisionByZero { operation: "emi" })?;
        let flat_interest = period_interest(terms.principal, monthly_rate)?;

        let mut ledger = InstallmentLedger::with_capacity(terms.tenure);
        let mut outstanding = terms.principal;
        for i in 1..=terms.tenure {
            let (principal, interest) = if i == terms.tenure {
                (outstanding, emi - outstanding)
            } else {
                (emi - flat_interest, flat_interest)
            };
            let due = due_date(terms.start_date, i)?;
            outstanding = ledger.record(due, outstanding, emi, principal, interest)?;
        }
        let installments = ledger.finish();
        let totals = ScheduleTotals::from_installments(&installments);

        let audit_trail = AuditTrail {
            method: AmortisationMethod::FlatRate,
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

impl AmortisationStrategy for FlatRateStrategy {
    fn calculate(
        &self,
        request: &CalculationRequest,
        ctx: &CalculationContext<'_>,
    ) -> Result<EmiSchedule, CalculationError> {
        debug!(loan_id = %request.loan_id, "Starting flat rate calculation");

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
        AmortisationMethod::FlatRate.as_str()
    }
}
