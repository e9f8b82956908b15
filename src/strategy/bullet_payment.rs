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

/// Bullet payment: interest only each period, the whole principal at maturity.
///
/// The schedule's `emi` is the periodic interest; the final installment's `emi`
/// is that interest plus the outstanding principal.
#[derive(Debug, Clone, Copy, Default)]
pub struct BulletPaymentStrategy;

impl BulletPaymentStrategy {
    fn build(
        &self,
        request: &CalculationRequest,
        ctx: &CalculationContext<'_>,
    ) -> Result<EmiSchedule, CalculationCause> {
        let terms = LoanTerms::from_request(request)?;
        let monthly_rate = terms.monthly_rate(&ctx.numeric);
        let interest = period_interest(terms.principal, monthly_rate)?;

        let mut ledger = InstallmentLedger::with_capacity(terms.tenure);
        let mut outstanding = terms.principal;
        for i in 1..=terms.tenure {
            let principal = if i == terms.tenure { outstanding } else { Money::ZERO };
            let due = due_date(terms.start_date, i)?;
            outstanding = ledger.record(due, outstanding, principal + interest, principal, interest)?;
        }
        let installments = ledger.finish();
        let totals = ScheduleTotals::from_installments(&installments);

        let audit_trail = AuditTrail {
            method: AmortisationMethod::BulletPayment,
            principal: terms.principal,
            annual_rate: terms.annual_rate,
            periodic_rate: monthly_rate,
            tenure: terms.tenure,
            emi: interest,
            regulatory_version: ctx.regulatory_version,
        }
        .to_string();

        Ok(EmiSchedule {
            loan_id: request.loan_id.clone(),
            calculated_at: ctx.calculated_at,
            emi: interest,
            total_interest: totals.interest,
            total_payment: terms.principal + totals.interest,
            installments,
            audit_trail,
            calculation_method: self.name().to_string(),
            cached: false,
        })
    }
}

impl AmortisationStrategy for BulletPaymentStrategy {
    fn calculate(
        &self,
        request: &CalculationRequest,
        ctx: &CalculationContext<'_>,
    ) -> Result<EmiSchedule, CalculationError> {
        debug!(loan_id = %request.loan_id, "Starting bullet payment calculation");

        let schedule = self
            .build(request, ctx)
            .map_err(|cause| calculation_failed(request, self.name(), cause))?;

        info!(
            loan_id = %schedule.loan_id,
            periodic_interest = %schedule.emi,
            total_interest = %schedule.total_interest,
            "Calculation completed"
        );
        Ok(schedule)
    }

    fn name(&self) -> &'static str {
        AmortisationMethod::BulletPayment.as_str()
    }
}
