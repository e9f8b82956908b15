use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, MIN_RATE_SCALE};
use crate::errors::{AmortisationError, Result};

/// regulatory version tag written into every audit trail
pub const DEFAULT_REGULATORY_VERSION: &str = "RBI-2024-v1";

/// hard ceiling on tenure regardless of configuration
pub const MAX_TENURE_MONTHS: i32 = 360;

/// engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub numeric: NumericPolicy,
    pub limits: RequestLimits,
    pub regulatory_version: String,
}

/// precision used for intermediate rate arithmetic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericPolicy {
    /// fractional digits kept for periodic rates
    pub rate_scale: u32,
}

/// request-level domain constraints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestLimits {
    pub min_principal: Money,
    pub max_principal: Money,
    /// annual rate ceiling in percent
    pub max_annual_rate: Decimal,
    pub max_tenure_months: i32,
}

impl Default for NumericPolicy {
    fn default() -> Self {
        Self {
            rate_scale: MIN_RATE_SCALE,
        }
    }
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            min_principal: Money::from_major(10_000),
            max_principal: Money::from_major(100_000_000),
            max_annual_rate: dec!(50),
            max_tenure_months: MAX_TENURE_MONTHS,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::retail()
    }
}

impl EngineConfig {
    /// retail lending limits: principal 10,000 to 10 crore, rate up to 50%
    pub fn retail() -> Self {
        Self {
            numeric: NumericPolicy::default(),
            limits: RequestLimits::default(),
            regulatory_version: DEFAULT_REGULATORY_VERSION.to_string(),
        }
    }

    /// retail rate and tenure limits with any positive principal accepted
    pub fn unrestricted_principal() -> Self {
        let mut config = Self::retail();
        config.limits.min_principal = Money::MINOR_UNIT;
        config.limits.max_principal = Money::from_decimal(Decimal::from(i64::MAX));
        config
    }

    /// parse and validate configuration from json
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| AmortisationError::InvalidConfiguration {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// reject limits that could never admit a request or that break numeric guarantees
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(AmortisationError::InvalidConfiguration { message });

        if self.numeric.rate_scale < MIN_RATE_SCALE || self.numeric.rate_scale > 28 {
            return invalid(format!(
                "rate scale must be between {} and 28, got {}",
                MIN_RATE_SCALE, self.numeric.rate_scale
            ));
        }

        let limits = &self.limits;
        if !limits.min_principal.is_positive() {
            return invalid(format!(
                "minimum principal must be positive, got {}",
                limits.min_principal
            ));
        }
        if limits.min_principal > limits.max_principal {
            return invalid(format!(
                "minimum principal {} exceeds maximum {}",
                limits.min_principal, limits.max_principal
            ));
        }
        if limits.max_annual_rate < Decimal::ZERO {
            return invalid(format!(
                "maximum annual rate must be non-negative, got {}",
                limits.max_annual_rate
            ));
        }
        if limits.max_tenure_months < 1 || limits.max_tenure_months > MAX_TENURE_MONTHS {
            return invalid(format!(
                "maximum tenure must be between 1 and {} months, got {}",
                MAX_TENURE_MONTHS, limits.max_tenure_months
            ));
        }
        if self.regulatory_version.trim().is_empty() {
            return invalid("regulatory version is required".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retail_defaults() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.numeric.rate_scale, 15);
        assert_eq!(config.limits.min_principal, Money::from_major(10_000));
        assert_eq!(config.limits.max_principal, Money::from_major(100_000_000));
        assert_eq!(config.limits.max_annual_rate, dec!(50));
        assert_eq!(config.limits.max_tenure_months, 360);
        assert_eq!(config.regulatory_version, "RBI-2024-v1");
    }

    #[test]
    fn test_json_round_trip_keeps_limits() {
        let config = EngineConfig::retail();
        let parsed = EngineConfig::from_json(&config.to_json_pretty()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_rejects_inverted_principal_limits() {
        let mut config = EngineConfig::retail();
        config.limits.min_principal = Money::from_major(500);
        config.limits.max_principal = Money::from_major(100);

        let err = config.validate().unwrap_err();
        assert!(matches!(err, AmortisationError::InvalidConfiguration { .. }));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_rejects_low_rate_scale() {
        let mut config = EngineConfig::retail();
        config.numeric.rate_scale = 8;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_tenure_above_hard_ceiling() {
        let mut config = EngineConfig::retail();
        config.limits.max_tenure_months = 480;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_reports_parse_errors() {
        let err = EngineConfig::from_json("{\"numeric\": 3}").unwrap_err();
        assert!(matches!(err, AmortisationError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_unrestricted_principal_preset() {
        let config = EngineConfig::unrestricted_principal();
        assert!(config.validate().is_ok());
        assert_eq!(config.limits.min_principal, Money::from_minor(1));
    }
}
