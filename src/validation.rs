use rust_decimal::Decimal;

use crate::config::RequestLimits;
use crate::decimal::CURRENCY_SCALE;
use crate::errors::ValidationError;
use crate::request::CalculationRequest;
use crate::types::AmortisationMethod;

/// checks a request against domain constraints before any arithmetic runs
#[derive(Debug, Clone)]
pub struct RequestValidator {
    limits: RequestLimits,
}

impl RequestValidator {
    pub fn new(limits: RequestLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &RequestLimits {
        &self.limits
    }

    /// Reports the first violated constraint, in this order: loan id,
    /// principal sign, principal range, principal scale, rate sign, rate ceiling, tenure,
    /// start date, method. Returns the parsed method when everything holds.
    pub fn validate(
        &self,
        request: &CalculationRequest,
    ) -> std::result::Result<AmortisationMethod, ValidationError> {
        if request.loan_id.trim().is_empty() {
            return Err(ValidationError::new("Loan ID is required"));
        }

        let principal = match request.principal {
            Some(p) if p > Decimal::ZERO => p,
            _ => return Err(ValidationError::new("Principal must be greater than zero")),
        };

        if principal < self.limits.min_principal.as_decimal() {
            return Err(ValidationError::new(format!(
                "Principal must be at least {}",
                self.limits.min_principal
            )));
        }
        if principal > self.limits.max_principal.as_decimal() {
            return Err(ValidationError::new(format!(
                "Principal cannot exceed {}",
                self.limits.max_principal
            )));
        }
        check_principal_scale(principal)?;

        let rate = match request.interest_rate {
            Some(r) if r >= Decimal::ZERO => r,
            _ => return Err(ValidationError::new("Interest rate must be non-negative")),
        };
        if rate > self.limits.max_annual_rate {
            return Err(ValidationError::new(format!(
                "Interest rate cannot exceed {}%",
                self.limits.max_annual_rate
            )));
        }

        check_tenure(request.tenure, self.limits.max_tenure_months)?;

        if request.start_date.is_none() {
            return Err(ValidationError::new("Start date is required"));
        }

        match request.method() {
            None => Err(ValidationError::new("Amortisation method is required")),
            Some(Err(unknown)) => Err(ValidationError::new(format!(
                "Unrecognized amortisation method: {}",
                unknown.0
            ))),
            Some(Ok(method)) => Ok(method),
        }
    }
}

/// principal is taken as given, so it must already be at currency scale
pub(crate) fn check_principal_scale(
    principal: Decimal,
) -> std::result::Result<(), ValidationError> {
    if principal.normalize().scale() > CURRENCY_SCALE {
        return Err(ValidationError::new(format!(
            "Principal cannot have more than {} decimal places",
            CURRENCY_SCALE
        )));
    }
    Ok(())
}

/// tenure must be present and within `1..=max_months`
pub(crate) fn check_tenure(
    tenure: Option<i32>,
    max_months: i32,
) -> std::result::Result<u32, ValidationError> {
    let tenure = match tenure {
        Some(t) if t > 0 => t,
        _ => return Err(ValidationError::new("Tenure must be greater than zero")),
    };
    if tenure > max_months {
        return Err(ValidationError::new(format!(
            "Tenure cannot exceed {} months",
            max_months
        )));
    }
    Ok(tenure as u32)
}
