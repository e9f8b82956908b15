use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{AmortisationError, CalculationCause, Result};
use crate::types::{LoanId, PaymentStatus};

/// one period of a repayment schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installment {
    pub installment_number: u32,
    pub due_date: NaiveDate,
    pub opening_balance: Money,
    pub emi: Money,
    pub principal: Money,
    pub interest: Money,
    pub closing_balance: Money,
    pub cumulative_principal: Money,
    pub cumulative_interest: Money,
    // populated only on schedules retrieved with payment history
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_paid: Option<Money>,
}

impl Installment {
    /// copy of this installment carrying a recorded payment
    pub fn with_payment(
        &self,
        status: PaymentStatus,
        payment_date: Option<NaiveDate>,
        amount_paid: Option<Money>,
    ) -> Installment {
        Installment {
            payment_status: Some(status),
            payment_date,
            amount_paid,
            ..self.clone()
        }
    }
}

/// complete repayment schedule for one loan.
///
/// Created once by a strategy and never mutated afterwards; the `with_*`
/// methods return modified copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmiSchedule {
    pub loan_id: LoanId,
    pub calculated_at: DateTime<Utc>,
    pub emi: Money,
    pub total_interest: Money,
    pub total_payment: Money,
    #[serde(rename = "schedule")]
    pub installments: Vec<Installment>,
    pub audit_trail: String,
    pub calculation_method: String,
    #[serde(default)]
    pub cached: bool,
}

/// totals recomputed from the installments of a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleTotals {
    pub principal: Money,
    pub interest: Money,
    pub payment: Money,
}

impl ScheduleTotals {
    pub fn from_installments(installments: &[Installment]) -> Self {
        let principal: Money = installments.iter().map(|i| i.principal).sum();
        let interest: Money = installments.iter().map(|i| i.interest).sum();
        Self {
            principal,
            interest,
            payment: principal + interest,
        }
    }
}

impl EmiSchedule {
    pub fn installment_count(&self) -> usize {
        self.installments.len()
    }

    /// installment by its 1-based number
    pub fn installment(&self, number: u32) -> Option<&Installment> {
        let index = number.checked_sub(1)? as usize;
        self.installments.get(index)
    }

    /// principal the schedule amortises
    pub fn principal(&self) -> Money {
        self.installments
            .first()
            .map(|i| i.opening_balance)
            .unwrap_or(Money::ZERO)
    }

    pub fn totals(&self) -> ScheduleTotals {
        ScheduleTotals::from_installments(&self.installments)
    }

    pub fn maturity_date(&self) -> Option<NaiveDate> {
        self.installments.last().map(|i| i.due_date)
    }

    /// copy flagged as served from a cache
    pub fn with_cached(&self) -> EmiSchedule {
        EmiSchedule {
            cached: true,
            ..self.clone()
        }
    }

    /// copy with one installment's payment fields set; `self` is left untouched
    pub fn with_payment_recorded(
        &self,
        number: u32,
        status: PaymentStatus,
        payment_date: Option<NaiveDate>,
        amount_paid: Option<Money>,
    ) -> Result<EmiSchedule> {
        let target = self
            .installment(number)
            .ok_or_else(|| AmortisationError::InstallmentNotFound {
                loan_id: self.loan_id.clone(),
                number,
            })?
            .with_payment(status, payment_date, amount_paid);

        let mut updated = self.clone();
        updated.installments[(number - 1) as usize] = target;
        Ok(updated)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// running state while a strategy emits installments
#[derive(Debug)]
pub(crate) struct InstallmentLedger {
    installments: Vec<Installment>,
    cumulative_principal: Money,
    cumulative_interest: Money,
}

impl InstallmentLedger {
    pub(crate) fn with_capacity(tenure: u32) -> Self {
        Self {
            installments: Vec::with_capacity(tenure as usize),
            cumulative_principal: Money::ZERO,
            cumulative_interest: Money::ZERO,
        }
    }

    /// append the next installment and return its closing balance
    pub(crate) fn record(
        &mut self,
        due_date: NaiveDate,
        opening_balance: Money,
        emi: Money,
        principal: Money,
        interest: Money,
    ) -> std::result::Result<Money, CalculationCause> {
        let closing_balance = opening_balance
            .checked_sub(principal)
            .ok_or(CalculationCause::Overflow { operation: "closing balance" })?;
        self.cumulative_principal = self
            .cumulative_principal
            .checked_add(principal)
            .ok_or(CalculationCause::Overflow { operation: "cumulative principal" })?;
        self.cumulative_interest = self
            .cumulative_interest
            .checked_add(interest)
            .ok_or(CalculationCause::Overflow { operation: "cumulative interest" })?;

        self.installments.push(Installment {
            installment_number: self.installments.len() as u32 + 1,
            due_date,
            opening_balance,
            emi,
            principal,
            interest,
            closing_balance,
            cumulative_principal: self.cumulative_principal,
            cumulative_interest: self.cumulative_interest,
            payment_status: None,
            payment_date: None,
            amount_paid: None,
        });

        Ok(closing_balance)
    }

    pub(crate) fn finish(self) -> Vec<Installment> {
        self.installments
    }
}
