use chrono::{DateTime, Utc};
use hourglass_rs::{SafeTimeProvider, TimeSource};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::errors::Result;
use crate::request::CalculationRequest;
use crate::schedule::EmiSchedule;
use crate::strategy::{AmortisationStrategy, CalculationContext, StrategyRegistry};
use crate::validation::RequestValidator;

/// Entry point into the calculation core: validates a request, picks the
/// strategy for its method and returns the computed schedule.
///
/// Holds no per-request state, so one engine can serve any number of threads.
pub struct AmortisationEngine {
    config: EngineConfig,
    validator: RequestValidator,
    registry: StrategyRegistry,
}

impl AmortisationEngine {
    /// engine with the built-in strategies
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_registry(config, StrategyRegistry::with_builtins())
    }

    pub fn with_registry(config: EngineConfig, registry: StrategyRegistry) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            validator: RequestValidator::new(config.limits.clone()),
            config,
            registry,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// compute a schedule, stamping it with the provider's current time
    pub fn calculate(
        &self,
        request: &CalculationRequest,
        time_provider: &SafeTimeProvider,
    ) -> Result<EmiSchedule> {
        self.calculate_at(request, time_provider.now())
    }

    /// compute a schedule against the system clock
    pub fn calculate_now(&self, request: &CalculationRequest) -> Result<EmiSchedule> {
        let time = SafeTimeProvider::new(TimeSource::System);
        self.calculate(request, &time)
    }

    /// Compute independent requests in parallel. Results keep the input order
    /// and share one calculation timestamp.
    pub fn calculate_batch(
        &self,
        requests: &[CalculationRequest],
        time_provider: &SafeTimeProvider,
    ) -> Vec<Result<EmiSchedule>> {
        let calculated_at = time_provider.now();
        requests
            .par_iter()
            .map(|request| self.calculate_at(request, calculated_at))
            .collect()
    }

    fn calculate_at(
        &self,
        request: &CalculationRequest,
        calculated_at: DateTime<Utc>,
    ) -> Result<EmiSchedule> {
        info!(
            loan_id = %request.loan_id,
            product_type = ?request.product_type,
            method = request.amortisation_method.as_deref().unwrap_or("-"),
            requested_by = request.requested_by.as_deref().unwrap_or("-"),
            "Received calculation request"
        );

        let method = self.validator.validate(request).map_err(|e| {
            warn!(loan_id = %request.loan_id, reason = %e, "Calculation request rejected");
            e
        })?;

        let strategy = self.registry.resolve(method).map_err(|e| {
            warn!(loan_id = %request.loan_id, reason = %e, "Calculation request rejected");
            e
        })?;

        let ctx = CalculationContext {
            calculated_at,
            numeric: self.config.numeric,
            regulatory_version: &self.config.regulatory_version,
        };
        let schedule = strategy.calculate(request, &ctx)?;

        info!(
            loan_id = %schedule.loan_id,
            emi = %schedule.emi,
            installments = schedule.installment_count(),
            "Schedule calculated"
        );
        Ok(schedule)
    }

    /// first registered strategy whose `supports` accepts the method name
    pub fn strategy_for(&self, method: &str) -> Option<&dyn AmortisationStrategy> {
        self.registry.find(method)
    }

    pub fn supported_methods(&self) -> Vec<&'static str> {
        self.registry.names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Money;
    use crate::errors::AmortisationError;
    use crate::types::AmortisationMethod;
    use chrono::{NaiveDate, TimeZone};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn engine() -> AmortisationEngine {
        AmortisationEngine::new(EngineConfig::default()).unwrap()
    }

    fn time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
        ))
    }

    fn home_loan() -> CalculationRequest {
        CalculationRequest::builder()
            .loan_id("HL-2024-0001")
            .principal(dec!(1000000))
            .interest_rate(dec!(8.5))
            .tenure(240)
            .method(AmortisationMethod::ReducingBalance)
            .start_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .requested_by("officer-17")
            .build()
    }

    #[test]
    fn test_calculate_dispatches_by_method() {
        let time = time();
        let schedule = engine().calculate(&home_loan(), &time).unwrap();

        assert_eq!(schedule.calculation_method, "REDUCING_BALANCE");
        assert_eq!(schedule.emi, Money::from_str_exact("8678.23").unwrap());
        assert_eq!(schedule.calculated_at, time.now());

        let mut request = home_loan();
        request.amortisation_method = Some("flat_rate".to_string());
        let schedule = engine().calculate(&request, &time).unwrap();
        assert_eq!(schedule.calculation_method, "FLAT_RATE");
    }

    #[test]
    fn test_validation_runs_first() {
        let mut request = home_loan();
        request.tenure = Some(361);

        let err = engine().calculate(&request, &time()).unwrap_err();
        match err {
            AmortisationError::Validation(e) => assert_eq!(e.message, "Tenure cannot exceed 360 months"),
            other => panic!("expected validation error, got {other:?}"),
        }

        let mut request = home_loan();
        request.principal = Some(Decimal::ZERO);
        assert_eq!(engine().calculate(&request, &time()).unwrap_err().status_code(), 400);

        let mut request = home_loan();
        request.interest_rate = Some(dec!(-1));
        assert_eq!(engine().calculate(&request, &time()).unwrap_err().status_code(), 400);
    }

    #[test]
    fn test_principal_is_used_exactly() {
        let mut request = home_loan();
        request.principal = Some(dec!(50000.55));
        request.tenure = Some(36);

        let schedule = engine().calculate(&request, &time()).unwrap();
        let principal = Money::from_str_exact("50000.55").unwrap();
        let repaid: Money = schedule.installments.iter().map(|i| i.principal).sum();
        assert_eq!(schedule.installments[0].opening_balance, principal);
        assert_eq!(repaid, principal);
        assert!(schedule.audit_trail.contains("P=50000.55,"));

        request.principal = Some(dec!(50000.005));
        let err = engine().calculate(&request, &time()).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), "validation error: Principal cannot have more than 2 decimal places");

        request.principal = Some(dec!(9999.995));
        assert_eq!(engine().calculate(&request, &time()).unwrap_err().status_code(), 400);
    }

    #[test]
    fn test_unregistered_method_is_rejected() {
        let mut request = home_loan();
        request.amortisation_method = Some("STEP_DOWN".to_string());

        let err = engine().calculate(&request, &time()).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("STEP_DOWN"));
    }

    #[test]
    fn test_custom_limits() {
        let mut config = EngineConfig::retail();
        config.limits.max_tenure_months = 120;
        let engine = AmortisationEngine::new(config).unwrap();

        let err = engine.calculate(&home_loan(), &time()).unwrap_err();
        assert!(err.to_string().contains("Tenure cannot exceed 120 months"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::retail();
        config.regulatory_version = String::new();
        assert!(AmortisationEngine::new(config).is_err());
    }

    #[test]
    fn test_batch_keeps_order() {
        let mut second = home_loan();
        second.loan_id = "PL-2024-0002".to_string();
        second.principal = Some(dec!(300000));
        second.tenure = Some(36);
        let mut bad = home_loan();
        bad.loan_id = String::new();

        let time = time();
        let results = engine().calculate_batch(&[home_loan(), second, bad], &time);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().loan_id, "HL-2024-0001");
        assert_eq!(results[1].as_ref().unwrap().installment_count(), 36);
        assert!(results[2].is_err());
        assert_eq!(results[0].as_ref().unwrap().calculated_at, time.now());
    }

    #[test]
    fn test_strategy_lookup() {
        let engine = engine();
        assert_eq!(engine.strategy_for("bullet_payment").unwrap().name(), "BULLET_PAYMENT");
        assert!(engine.strategy_for("STEP_UP").is_none());
        assert_eq!(engine.supported_methods().len(), 4);
    }

    #[test]
    fn test_schedules_are_deterministic() {
        let engine = engine();
        let a = engine.calculate(&home_loan(), &time()).unwrap();
        let b = engine.calculate_now(&home_loan()).unwrap();

        assert_eq!(a.emi, b.emi);
        assert_eq!(a.installments, b.installments);
        assert_eq!(a.total_interest, b.total_interest);
        assert_eq!(a.audit_trail, b.audit_trail);
    }
}
