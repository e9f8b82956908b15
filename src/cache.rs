use dashmap::DashMap;

use crate::schedule::EmiSchedule;

/// store for previously computed schedules, keyed by loan id.
///
/// Implementations hand out copies flagged with `cached = true`; the schedule
/// they were given is never modified.
pub trait ScheduleCache: Send + Sync {
    fn get(&self, loan_id: &str) -> Option<EmiSchedule>;

    /// store a schedule, replacing any earlier one for the same loan
    fn put(&self, schedule: &EmiSchedule);

    fn evict(&self, loan_id: &str) -> bool;

    fn clear(&self);
}

/// in-memory schedule cache
#[derive(Debug, Default)]
pub struct InMemoryScheduleCache {
    schedules: DashMap<String, EmiSchedule>,
}

impl InMemoryScheduleCache {
    pub fn new() -> Self {
        Self {
            schedules: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.schedules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty()
    }
}

impl ScheduleCache for InMemoryScheduleCache {
    fn get(&self, loan_id: &str) -> Option<EmiSchedule> {
        self.schedules.get(loan_id).map(|entry| entry.value().with_cached())
    }

    fn put(&self, schedule: &EmiSchedule) {
        self.schedules
            .insert(schedule.loan_id.clone(), schedule.clone());
    }

    fn evict(&self, loan_id: &str) -> bool {
        self.schedules.remove(loan_id).is_some()
    }

    fn clear(&self) {
        self.schedules.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Money;
    use chrono::{TimeZone, Utc};

    fn schedule(loan_id: &str, emi: i64) -> EmiSchedule {
        EmiSchedule {
            loan_id: loan_id.to_string(),
            calculated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            emi: Money::from_major(emi),
            total_interest: Money::ZERO,
            total_payment: Money::ZERO,
            installments: Vec::new(),
            audit_trail: String::new(),
            calculation_method: "REDUCING_BALANCE".to_string(),
            cached: false,
        }
    }

    #[test]
    fn test_get_returns_flagged_copy() {
        let cache = InMemoryScheduleCache::new();
        let original = schedule("LN-1", 100);
        cache.put(&original);

        let hit = cache.get("LN-1").unwrap();
        assert!(hit.cached);
        assert!(!original.cached);
        assert_eq!(hit.emi, original.emi);
        assert!(cache.get("LN-2").is_none());
    }

    #[test]
    fn test_put_replaces_and_evict_removes() {
        let cache = InMemoryScheduleCache::new();
        cache.put(&schedule("LN-1", 100));
        cache.put(&schedule("LN-1", 200));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("LN-1").unwrap().emi, Money::from_major(200));

        assert!(cache.evict("LN-1"));
        assert!(!cache.evict("LN-1"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear() {
        let cache = InMemoryScheduleCache::new();
        cache.put(&schedule("LN-1", 100));
        cache.put(&schedule("LN-2", 100));
        cache.clear();
        assert!(cache.is_empty());
    }
}
