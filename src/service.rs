use hourglass_rs::SafeTimeProvider;
use tracing::{info, info_span, warn};
use uuid::Uuid;

use crate::cache::{InMemoryScheduleCache, ScheduleCache};
use crate::config::EngineConfig;
use crate::engine::AmortisationEngine;
use crate::errors::{AmortisationError, Result};
use crate::request::CalculationRequest;
use crate::schedule::EmiSchedule;

/// Calculation and retrieval facade used by a transport layer: computes through
/// the engine and keeps the latest schedule per loan in a cache.
pub struct AmortisationService<C: ScheduleCache = InMemoryScheduleCache> {
    engine: AmortisationEngine,
    cache: C,
}

impl AmortisationService<InMemoryScheduleCache> {
    /// service backed by an in-memory cache
    pub fn in_memory(config: EngineConfig) -> Result<Self> {
        Ok(Self::new(AmortisationEngine::new(config)?, InMemoryScheduleCache::new()))
    }
}

impl<C: ScheduleCache> AmortisationService<C> {
    pub fn new(engine: AmortisationEngine, cache: C) -> Self {
        Self { engine, cache }
    }

    pub fn engine(&self) -> &AmortisationEngine {
        &self.engine
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// compute a fresh schedule and remember it for later retrieval
    pub fn calculate(
        &self,
        request: &CalculationRequest,
        time_provider: &SafeTimeProvider,
    ) -> Result<EmiSchedule> {
        let request_id = Uuid::new_v4();
        let _span = info_span!("calculate", %request_id, loan_id = %request.loan_id).entered();

        let schedule = self.engine.calculate(request, time_provider)?;
        self.cache.put(&schedule);
        Ok(schedule)
    }

    /// previously computed schedule for a loan
    pub fn get_schedule(&self, loan_id: &str) -> Result<EmiSchedule> {
        let request_id = Uuid::new_v4();
        let _span = info_span!("get_schedule", %request_id, loan_id).entered();

        match self.cache.get(loan_id) {
            Some(schedule) => {
                info!(loan_id, cached = schedule.cached, "Schedule retrieved");
                Ok(schedule)
            }
            None => {
                warn!(loan_id, "Schedule not found");
                Err(AmortisationError::ScheduleNotFound {
                    loan_id: loan_id.to_string(),
                })
            }
        }
    }

    /// drop a stored schedule, e.g. after the loan was restructured
    pub fn invalidate(&self, loan_id: &str) -> bool {
        self.cache.evict(loan_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AmortisationMethod, ProductType};
    use chrono::{NaiveDate, TimeZone, Utc};
    use hourglass_rs::TimeSource;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn request(loan_id: &str) -> CalculationRequest {
        CalculationRequest::builder()
            .loan_id(loan_id)
            .principal(dec!(800000))
            .interest_rate(dec!(9.75))
            .tenure(120)
            .product_type(ProductType::LoanAgainstProperty)
            .method(AmortisationMethod::ReducingBalance)
            .start_date(NaiveDate::from_ymd_opt(2024, 5, 31).unwrap())
            .build()
    }

    fn time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 5, 31, 12, 0, 0).unwrap(),
        ))
    }

    #[test]
    fn test_calculate_then_retrieve() {
        let service = AmortisationService::in_memory(EngineConfig::default()).unwrap();
        let fresh = service.calculate(&request("LAP-1"), &time()).unwrap();
        assert!(!fresh.cached);

        let stored = service.get_schedule("LAP-1").unwrap();
        assert!(stored.cached);
        assert_eq!(stored.installments, fresh.installments);
        assert_eq!(stored.installments[0].due_date, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
    }

    #[test]
    fn test_missing_schedule_is_not_found() {
        let service = AmortisationService::in_memory(EngineConfig::default()).unwrap();
        let err = service.get_schedule("LAP-404").unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_rejected_request_is_not_cached() {
        let service = AmortisationService::in_memory(EngineConfig::default()).unwrap();
        let mut bad = request("LAP-2");
        bad.start_date = None;

        assert!(service.calculate(&bad, &time()).is_err());
        assert!(service.cache().is_empty());
    }

    #[test]
    fn test_invalidate() {
        let service = AmortisationService::in_memory(EngineConfig::default()).unwrap();
        service.calculate(&request("LAP-3"), &time()).unwrap();

        assert!(service.invalidate("LAP-3"));
        assert!(service.get_schedule("LAP-3").is_err());
    }
}
