use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::{AmortisationMethod, LoanId, ProductType, UnknownMethod};

/// default payment frequency
pub const MONTHLY: &str = "MONTHLY";

fn default_frequency() -> String {
    MONTHLY.to_string()
}

/// loan parameters for a schedule calculation.
///
/// Numeric and date fields are optional at the type level so a request decoded
/// from an external body can be checked by [`crate::validation::RequestValidator`]
/// and rejected with the first missing field rather than a decode failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationRequest {
    #[serde(default)]
    pub loan_id: LoanId,
    #[serde(default)]
    pub principal: Option<Decimal>,
    /// annual rate in percent (8.5 for 8.5%)
    #[serde(default)]
    pub interest_rate: Option<Decimal>,
    /// months
    #[serde(default)]
    pub tenure: Option<i32>,
    #[serde(default)]
    pub product_type: Option<ProductType>,
    #[serde(default)]
    pub amortisation_method: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default = "default_frequency")]
    pub frequency: String,
    #[serde(default)]
    pub options: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub requested_by: Option<String>,
}

impl CalculationRequest {
    pub fn builder() -> CalculationRequestBuilder {
        CalculationRequestBuilder::new()
    }

    /// decode a request body
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// parsed amortisation method, `None` when absent
    pub fn method(&self) -> Option<Result<AmortisationMethod, UnknownMethod>> {
        self.amortisation_method.as_deref().map(str::parse)
    }

    /// true only when the option is present and set to boolean `true`
    pub fn is_option_enabled(&self, key: &str) -> bool {
        matches!(self.options.get(key), Some(serde_json::Value::Bool(true)))
    }

    /// tenure as an unsigned month count when positive
    pub fn tenure_months(&self) -> Option<u32> {
        self.tenure.and_then(|t| u32::try_from(t).ok()).filter(|t| *t > 0)
    }
}

/// builder for calculation requests
#[derive(Debug, Clone)]
pub struct CalculationRequestBuilder {
    loan_id: Option<String>,
    principal: Option<Decimal>,
    interest_rate: Option<Decimal>,
    tenure: Option<i32>,
    product_type: Option<ProductType>,
    amortisation_method: Option<String>,
    start_date: Option<NaiveDate>,
    frequency: Option<String>,
    options: HashMap<String, serde_json::Value>,
    requested_by: Option<String>,
}

impl Default for CalculationRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CalculationRequestBuilder {
    pub fn new() -> Self {
        Self {
            loan_id: None,
            principal: None,
            interest_rate: None,
            tenure: None,
            product_type: None,
            amortisation_method: None,
            start_date: None,
            frequency: None,
            options: HashMap::new(),
            requested_by: None,
        }
    }

    pub fn loan_id(mut self, loan_id: impl Into<String>) -> Self {
        self.loan_id = Some(loan_id.into());
        self
    }

    pub fn principal(mut self, principal: Decimal) -> Self {
        self.principal = Some(principal);
        self
    }

    /// annual rate in percent
    pub fn interest_rate(mut self, rate: Decimal) -> Self {
        self.interest_rate = Some(rate);
        self
    }

    pub fn tenure(mut self, months: i32) -> Self {
        self.tenure = Some(months);
        self
    }

    pub fn product_type(mut self, product_type: ProductType) -> Self {
        self.product_type = Some(product_type);
        self
    }

    pub fn method(mut self, method: AmortisationMethod) -> Self {
        self.amortisation_method = Some(method.as_str().to_string());
        self
    }

    /// raw method identifier, parsed later by the validator
    pub fn method_name(mut self, method: impl Into<String>) -> Self {
        self.amortisation_method = Some(method.into());
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn frequency(mut self, frequency: impl Into<String>) -> Self {
        self.frequency = Some(frequency.into());
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    pub fn requested_by(mut self, user: impl Into<String>) -> Self {
        self.requested_by = Some(user.into());
        self
    }

    /// assemble the request; constraints are checked by the validator, not here
    pub fn build(self) -> CalculationRequest {
        CalculationRequest {
            loan_id: self.loan_id.unwrap_or_default(),
            principal: self.principal,
            interest_rate: self.interest_rate,
            tenure: self.tenure,
            product_type: self.product_type,
            amortisation_method: self.amortisation_method,
            start_date: self.start_date,
            frequency: self.frequency.unwrap_or_else(default_frequency),
            options: self.options,
            requested_by: self.requested_by,
        }
    }
}
