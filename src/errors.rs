use chrono::NaiveDate;
use thiserror::Error;

/// request rejected before any arithmetic ran
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// proximate cause of a failed calculation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalculationCause {
    #[error("arithmetic overflow in {operation}")]
    Overflow {
        operation: &'static str,
    },

    #[error("division by zero in {operation}")]
    DivisionByZero {
        operation: &'static str,
    },

    #[error("due date out of range: {start} plus {months} months")]
    DateOutOfRange {
        start: NaiveDate,
        months: u32,
    },

    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),
}

/// arithmetic could not complete for a request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("calculation failed for loan {loan_id}: {message}")]
pub struct CalculationError {
    pub loan_id: String,
    pub message: String,
    #[source]
    pub cause: CalculationCause,
}

impl CalculationError {
    pub fn new(loan_id: impl Into<String>, cause: CalculationCause) -> Self {
        Self {
            loan_id: loan_id.into(),
            message: "Failed to calculate amortisation schedule".to_string(),
            cause,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmortisationError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Calculation(#[from] CalculationError),

    #[error("schedule not found for loan {loan_id}")]
    ScheduleNotFound {
        loan_id: String,
    },

    #[error("installment {number} not found in schedule for loan {loan_id}")]
    InstallmentNotFound {
        loan_id: String,
        number: u32,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },
}

impl AmortisationError {
    /// HTTP status class a transport layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            AmortisationError::Validation(_) => 400,
            AmortisationError::ScheduleNotFound { .. }
            | AmortisationError::InstallmentNotFound { .. } => 404,
            AmortisationError::Calculation(_) | AmortisationError::InvalidConfiguration { .. } => {
                500
            }
        }
    }

    /// true when the caller can fix the request and try again
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

pub type Result<T> = std::result::Result<T, AmortisationError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_status_codes() {
        let validation: AmortisationError = ValidationError::new("Loan ID is required").into();
        assert_eq!(validation.status_code(), 400);
        assert!(validation.is_client_error());

        let calculation: AmortisationError = CalculationError::new(
            "LN-1",
            CalculationCause::Overflow { operation: "emi numerator" },
        )
        .into();
        assert_eq!(calculation.status_code(), 500);
        assert!(!calculation.is_client_error());

        let missing = AmortisationError::ScheduleNotFound { loan_id: "LN-1".to_string() };
        assert_eq!(missing.status_code(), 404);
    }

    #[test]
    fn test_calculation_error_keeps_cause() {
        let err = CalculationError::new(
            "LN-42",
            CalculationCause::InvalidInput(ValidationError::new("Tenure cannot exceed 360 months")),
        );

        assert_eq!(
            err.to_string(),
            "calculation failed for loan LN-42: Failed to calculate amortisation schedule"
        );
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "invalid input: Tenure cannot exceed 360 months");
    }

    #[test]
    fn test_validation_error_has_no_source() {
        let err = ValidationError::new("Start date is required");
        assert!(err.source().is_none());
        assert_eq!(err.to_string(), "Start date is required");
    }
}
