use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// unique identifier for a loan as assigned by the loan management system
pub type LoanId = String;

/// loan product types; informational only, never changes the arithmetic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductType {
    /// residential mortgage loan
    HomeLoan,
    /// unsecured personal loan
    PersonalLoan,
    /// auto/vehicle financing
    VehicleLoan,
    /// loan against gold
    GoldLoan,
    /// SME/business financing
    BusinessLoan,
    /// student loan
    EducationLoan,
    /// loan secured by property
    LoanAgainstProperty,
}

impl ProductType {
    pub fn display_name(&self) -> &'static str {
        match self {
            ProductType::HomeLoan => "Home Loan",
            ProductType::PersonalLoan => "Personal Loan",
            ProductType::VehicleLoan => "Vehicle Loan",
            ProductType::GoldLoan => "Gold Loan",
            ProductType::BusinessLoan => "Business Loan",
            ProductType::EducationLoan => "Education Loan",
            ProductType::LoanAgainstProperty => "Loan Against Property",
        }
    }
}

/// amortisation method; selects the strategy that computes a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AmortisationMethod {
    /// equal EMI, interest on the outstanding principal
    ReducingBalance,
    /// interest on the original principal for the whole tenure
    FlatRate,
    /// periodic interest, principal at maturity
    BulletPayment,
    /// interest accrued daily on the outstanding balance
    DailyReducing,
    /// EMI increases at predefined intervals
    StepUp,
    /// EMI decreases at predefined intervals
    StepDown,
}

impl AmortisationMethod {
    pub const ALL: [AmortisationMethod; 6] = [
        AmortisationMethod::ReducingBalance,
        AmortisationMethod::FlatRate,
        AmortisationMethod::BulletPayment,
        AmortisationMethod::DailyReducing,
        AmortisationMethod::StepUp,
        AmortisationMethod::StepDown,
    ];

    /// canonical identifier, e.g. `REDUCING_BALANCE`
    pub fn as_str(&self) -> &'static str {
        match self {
            AmortisationMethod::ReducingBalance => "REDUCING_BALANCE",
            AmortisationMethod::FlatRate => "FLAT_RATE",
            AmortisationMethod::BulletPayment => "BULLET_PAYMENT",
            AmortisationMethod::DailyReducing => "DAILY_REDUCING",
            AmortisationMethod::StepUp => "STEP_UP",
            AmortisationMethod::StepDown => "STEP_DOWN",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AmortisationMethod::ReducingBalance => "Reducing Balance",
            AmortisationMethod::FlatRate => "Flat Rate",
            AmortisationMethod::BulletPayment => "Bullet Payment",
            AmortisationMethod::DailyReducing => "Daily Reducing",
            AmortisationMethod::StepUp => "Step-up EMI",
            AmortisationMethod::StepDown => "Step-down EMI",
        }
    }

    /// formula text recorded in the audit trail
    pub fn formula(&self) -> &'static str {
        match self {
            AmortisationMethod::ReducingBalance => "EMI = P × r × (1+r)^n / ((1+r)^n - 1)",
            AmortisationMethod::FlatRate => "EMI = (P + (P × r × n)) / n",
            AmortisationMethod::BulletPayment => "Interest periodic, Principal at end",
            AmortisationMethod::DailyReducing => "Interest = Outstanding × Daily Rate × Days",
            AmortisationMethod::StepUp => "EMI increases at predefined intervals",
            AmortisationMethod::StepDown => "EMI decreases at predefined intervals",
        }
    }
}

impl fmt::Display for AmortisationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// error returned when a method identifier is not one of the known methods
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized amortisation method: {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for AmortisationMethod {
    type Err = UnknownMethod;

    /// case-insensitive exact match against the canonical identifier
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AmortisationMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownMethod(s.to_string()))
    }
}

/// payment status of an installment in a retrieved schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    PartiallyPaid,
    Overdue,
    Waived,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse_is_case_insensitive() {
        assert_eq!(
            "reducing_balance".parse::<AmortisationMethod>().unwrap(),
            AmortisationMethod::ReducingBalance
        );
        assert_eq!(
            "Flat_Rate".parse::<AmortisationMethod>().unwrap(),
            AmortisationMethod::FlatRate
        );
        assert!("REDUCING".parse::<AmortisationMethod>().is_err());
        assert!("".parse::<AmortisationMethod>().is_err());
        assert!(" REDUCING_BALANCE ".parse::<AmortisationMethod>().is_err());

        let err = "EQUAL_PRINCIPAL".parse::<AmortisationMethod>().unwrap_err();
        assert_eq!(err.to_string(), "unrecognized amortisation method: EQUAL_PRINCIPAL");
    }

    #[test]
    fn test_method_serde_uses_canonical_ids() {
        let json = serde_json::to_string(&AmortisationMethod::BulletPayment).unwrap();
        assert_eq!(json, "\"BULLET_PAYMENT\"");

        for method in AmortisationMethod::ALL {
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, format!("\"{}\"", method.as_str()));
        }
    }

    #[test]
    fn test_product_type_serde() {
        let product: ProductType = serde_json::from_str("\"LOAN_AGAINST_PROPERTY\"").unwrap();
        assert_eq!(product, ProductType::LoanAgainstProperty);
        assert_eq!(product.display_name(), "Loan Against Property");
    }
}
