pub mod bullet_payment;
pub mod daily_reducing;
pub mod flat_rate;
pub mod reducing_balance;

use chrono::{DateTime, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::error;

use crate::config::{NumericPolicy, MAX_TENURE_MONTHS};
use crate::decimal::{Money, Rate};
use crate::errors::{CalculationCause, CalculationError, ValidationError};
use crate::request::CalculationRequest;
use crate::schedule::EmiSchedule;
use crate::types::AmortisationMethod;
use crate::validation::{check_principal_scale, check_tenure};

pub use bullet_payment::BulletPaymentStrategy;
pub use daily_reducing::DailyReducingStrategy;
pub use flat_rate::FlatRateStrategy;
pub use reducing_balance::ReducingBalanceStrategy;

/// per-call inputs that do not come from the request
#[derive(Debug, Clone, Copy)]
pub struct CalculationContext<'a> {
    pub calculated_at: DateTime<Utc>,
    pub numeric: NumericPolicy,
    pub regulatory_version: &'a str,
}

/// contract every amortisation method implements
pub trait AmortisationStrategy: Send + Sync {
    /// compute the full schedule; never returns a partial one
    fn calculate(
        &self,
        request: &CalculationRequest,
        ctx: &CalculationContext<'_>,
    ) -> Result<EmiSchedule, CalculationError>;

    /// case-insensitive exact match against [`Self::name`]
    fn supports(&self, method: &str) -> bool {
        self.name().eq_ignore_ascii_case(method)
    }

    /// canonical method identifier
    fn name(&self) -> &'static str;
}

/// the built-in strategy for a method, if one exists
pub fn builtin(method: AmortisationMethod) -> Option<Box<dyn AmortisationStrategy>> {
    match method {
        AmortisationMethod::ReducingBalance => Some(Box::new(ReducingBalanceStrategy)),
        AmortisationMethod::FlatRate => Some(Box::new(FlatRateStrategy)),
        AmortisationMethod::BulletPayment => Some(Box::new(BulletPaymentStrategy)),
        AmortisationMethod::DailyReducing => Some(Box::new(DailyReducingStrategy)),
        // need step size and interval inputs the request model does not carry
        AmortisationMethod::StepUp | AmortisationMethod::StepDown => None,
    }
}

/// strategies available for dispatch, searched in registration order
pub struct StrategyRegistry {
    strategies: Vec<Box<dyn AmortisationStrategy>>,
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl StrategyRegistry {
    pub fn empty() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for method in AmortisationMethod::ALL {
            if let Some(strategy) = builtin(method) {
                registry.register(strategy);
            }
        }
        registry
    }

    /// add a strategy; earlier registrations win on overlapping names
    pub fn register(&mut self, strategy: Box<dyn AmortisationStrategy>) {
        self.strategies.push(strategy);
    }

    /// first strategy whose `supports` accepts the method name
    pub fn find(&self, method: &str) -> Option<&dyn AmortisationStrategy> {
        self.strategies
            .iter()
            .find(|s| s.supports(method))
            .map(|s| s.as_ref())
    }

    pub fn resolve(
        &self,
        method: AmortisationMethod,
    ) -> std::result::Result<&dyn AmortisationStrategy, ValidationError> {
        self.find(method.as_str()).ok_or_else(|| {
            ValidationError::new(format!(
                "No calculator registered for amortisation method {}",
                method
            ))
        })
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

/// request terms after the strategy-level re-check
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LoanTerms {
    pub principal: Money,
    pub annual_rate: Decimal,
    pub tenure: u32,
    pub start_date: NaiveDate,
}

impl LoanTerms {
    /// Re-checks the arithmetic preconditions. Requests reach a strategy only
    /// after validation, so a failure here is reported as a calculation fault.
    pub(crate) fn from_request(
        request: &CalculationRequest,
    ) -> std::result::Result<Self, CalculationCause> {
        let principal = request
            .principal
            .filter(|p| *p > Decimal::ZERO)
            .ok_or_else(|| ValidationError::new("Principal must be greater than zero"))?;
        check_principal_scale(principal)?;

        let annual_rate = request
            .interest_rate
            .filter(|r| *r >= Decimal::ZERO)
            .ok_or_else(|| ValidationError::new("Interest rate must be non-negative"))?;

        let tenure = check_tenure(request.tenure, MAX_TENURE_MONTHS)?;

        let start_date = request
            .start_date
            .ok_or_else(|| ValidationError::new("Start date is required"))?;

        Ok(Self {
            principal: Money::from_decimal(principal),
            annual_rate,
            tenure,
            start_date,
        })
    }

    pub(crate) fn monthly_rate(&self, numeric: &NumericPolicy) -> Rate {
        Rate::monthly_from_annual_percent(self.annual_rate, numeric.rate_scale)
    }
}

/// start date advanced by whole calendar months, clamped to the month's last day
pub(crate) fn due_date(
    start: NaiveDate,
    months: u32,
) -> std::result::Result<NaiveDate, CalculationCause> {
    start
        .checked_add_months(Months::new(months))
        .ok_or(CalculationCause::DateOutOfRange { start, months })
}

/// `(1 + r)^n` by repeated checked multiplication
pub(crate) fn compound_factor(
    rate: Rate,
    periods: u32,
) -> std::result::Result<Decimal, CalculationCause> {
    let base = Decimal::ONE + rate.as_decimal();
    let mut factor = Decimal::ONE;
    for _ in 0..periods {
        factor = factor
            .checked_mul(base)
            .ok_or(CalculationCause::Overflow { operation: "compound factor" })?;
    }
    Ok(factor)
}

/// level installment `P × r × (1+r)^n / ((1+r)^n − 1)`, or `P / n` when `r` is zero.
/// Rounded half-up to currency scale only at the final division.
pub(crate) fn level_emi(
    principal: Money,
    rate: Rate,
    tenure: u32,
) -> std::result::Result<Money, CalculationCause> {
    if tenure == 0 {
        return Err(CalculationCause::DivisionByZero { operation: "emi" });
    }

    if rate.is_zero() {
        return principal
            .checked_div(Decimal::from(tenure))
            .ok_or(CalculationCause::DivisionByZero { operation: "emi" });
    }

    let compound = compound_factor(rate, tenure)?;
    let numerator = principal
        .as_decimal()
        .checked_mul(rate.as_decimal())
        .and_then(|v| v.checked_mul(compound))
        .ok_or(CalculationCause::Overflow { operation: "emi numerator" })?;
    let denominator = compound - Decimal::ONE;
    if denominator.is_zero() {
        return Err(CalculationCause::DivisionByZero { operation: "emi denominator" });
    }

    numerator
        .checked_div(denominator)
        .map(Money::from_decimal)
        .ok_or(CalculationCause::Overflow { operation: "emi division" })
}

/// periodic interest `round(balance × rate, 2)`
pub(crate) fn period_interest(
    balance: Money,
    rate: Rate,
) -> std::result::Result<Money, CalculationCause> {
    balance
        .checked_mul(rate.as_decimal())
        .ok_or(CalculationCause::Overflow { operation: "period interest" })
}

/// wrap and log a failed calculation
pub(crate) fn calculation_failed(
    request: &CalculationRequest,
    strategy: &str,
    cause: CalculationCause,
) -> CalculationError {
    error!(
        loan_id = %request.loan_id,
        strategy,
        cause = %cause,
        "Calculation failed"
    );
    CalculationError::new(request.loan_id.clone(), cause)
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::CalculationContext;
    use crate::config::NumericPolicy;
    use crate::request::CalculationRequest;
    use crate::types::AmortisationMethod;

    pub fn ctx() -> CalculationContext<'static> {
        CalculationContext {
            calculated_at: Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap(),
            numeric: NumericPolicy::default(),
            regulatory_version: "RBI-2024-v1",
        }
    }

    pub fn request(
        method: AmortisationMethod,
        principal: Decimal,
        rate: Decimal,
        tenure: i32,
    ) -> CalculationRequest {
        CalculationRequest::builder()
            .loan_id("LN-TEST")
            .principal(principal)
            .interest_rate(rate)
            .tenure(tenure)
            .method(method)
            .start_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .build()
    }
}
