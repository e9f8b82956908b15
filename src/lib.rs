pub mod audit;
pub mod cache;
pub mod config;
pub mod decimal;
pub mod engine;
pub mod errors;
pub mod request;
pub mod schedule;
pub mod service;
pub mod strategy;
pub mod types;
pub mod validation;

// re-export key types
pub use audit::AuditTrail;
pub use cache::{InMemoryScheduleCache, ScheduleCache};
pub use config::{EngineConfig, NumericPolicy, RequestLimits};
pub use decimal::{Money, Rate};
pub use engine::AmortisationEngine;
pub use errors::{AmortisationError, CalculationCause, CalculationError, Result, ValidationError};
pub use request::{CalculationRequest, CalculationRequestBuilder};
pub use schedule::{EmiSchedule, Installment, ScheduleTotals};
pub use service::AmortisationService;
pub use strategy::{
    AmortisationStrategy, BulletPaymentStrategy, CalculationContext, DailyReducingStrategy,
    FlatRateStrategy, ReducingBalanceStrategy, StrategyRegistry,
};
pub use types::{AmortisationMethod, LoanId, PaymentStatus, ProductType};
pub use validation::RequestValidator;

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
