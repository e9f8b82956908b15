use rust_decimal::Decimal;
use std::fmt;

use crate::decimal::{Money, Rate};
use crate::types::AmortisationMethod;

/// compliance record of how a schedule's EMI was derived.
///
/// Rendered once into [`crate::schedule::EmiSchedule::audit_trail`]; the text is
/// stored downstream and never parsed back.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditTrail<'a> {
    pub method: AmortisationMethod,
    pub principal: Money,
    pub annual_rate: Decimal,
    pub periodic_rate: Rate,
    pub tenure: u32,
    pub emi: Money,
    pub regulatory_version: &'a str,
}

impl fmt::Display for AuditTrail<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Amortisation Method: {} | Formula: {} | Parameters: P={}, Annual Rate={}%, Monthly Rate={}, n={} | Calculated EMI: {} | Regulatory Version: {}",
            self.method.as_str(),
            self.method.formula(),
            self.principal,
            self.annual_rate,
            self.periodic_rate,
            self.tenure,
            self.emi,
            self.regulatory_version,
        )
    }
}
