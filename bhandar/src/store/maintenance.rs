//! Maintenance cycle accounting shared by both ledgers.

use chrono::{NaiveDate, Utc};
use tracing::debug;

/// How distance turns into cycles, and how often a check is due.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaintenancePolicy {
    /// Grid steps per counted cycle
    pub distance_per_cycle: u32,
    /// Cycles between maintenance checks
    pub cycles_per_check: u32,
}

impl Default for MaintenancePolicy {
    fn default() -> Self {
        Self {
            distance_per_cycle: 10,
            cycles_per_check: 1000,
        }
    }
}

/// Cycles charged for one operation: at least one, plus one per full
/// `distance_per_cycle` steps.
pub fn cycles_for_distance(distance: usize, distance_per_cycle: u32) -> u32 {
    let per_cycle = distance_per_cycle.max(1) as usize;
    let cycles = u32::try_from(distance / per_cycle).unwrap_or(u32::MAX);
    cycles.max(1)
}

/// Counter values as shown on a dashboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaintenanceStatus {
    pub cycles_today: u32,
    pub cycles_total: u64,
    /// Goes negative once a check is overdue
    pub cycles_until_check: i64,
}

impl MaintenanceStatus {
    pub fn check_due(&self) -> bool {
        self.cycles_until_check <= 0
    }
}

/// Persistent counter state with the day its daily counter belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaintenanceState {
    pub cycles_today: u32,
    pub cycles_total: u64,
    pub cycles_until_check: i64,
    pub day: NaiveDate,
}

impl MaintenanceState {
    pub fn fresh(policy: &MaintenancePolicy, day: NaiveDate) -> Self {
        Self {
            cycles_today: 0,
            cycles_total: 0,
            cycles_until_check: i64::from(policy.cycles_per_check),
            day,
        }
    }

    pub fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    /// Charge `cycles` on `day`, starting a new daily count if the day changed.
    pub fn apply(&mut self, cycles: u32, day: NaiveDate) {
        if day != self.day {
            debug!("[Maintenance] day rolled over {} -> {}", self.day, day);
            self.cycles_today = 0;
            self.day = day;
        }
        self.cycles_today = self.cycles_today.saturating_add(cycles);
        self.cycles_total = self.cycles_total.saturating_add(u64::from(cycles));
        self.cycles_until_check -= i64::from(cycles);
    }

    /// Status as seen on `day`; a stale daily counter reads as zero.
    pub fn status(&self, day: NaiveDate) -> MaintenanceStatus {
        MaintenanceStatus {
            cycles_today: if day == self.day { self.cycles_today } else { 0 },
            cycles_total: self.cycles_total,
            cycles_until_check: self.cycles_until_check,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_cycles_for_distance() {
        assert_eq!(cycles_for_distance(0, 10), 1);
        assert_eq!(cycles_for_distance(9, 10), 1);
        assert_eq!(cycles_for_distance(10, 10), 1);
        assert_eq!(cycles_for_distance(25, 10), 2);
        assert_eq!(cycles_for_distance(38, 10), 3);
        assert_eq!(cycles_for_distance(5, 0), 5);
    }

    #[test]
    fn test_apply_accumulates() {
        let policy = MaintenancePolicy::default();
        let mut state = MaintenanceState::fresh(&policy, day(1));
        state.apply(3, day(1));
        state.apply(2, day(1));
        let status = state.status(day(1));
        assert_eq!(status.cycles_today, 5);
        assert_eq!(status.cycles_total, 5);
        assert_eq!(status.cycles_until_check, 995);
    }

    #[test]
    fn test_daily_rollover() {
        let policy = MaintenancePolicy::default();
        let mut state = MaintenanceState::fresh(&policy, day(1));
        state.apply(4, day(1));
        assert_eq!(state.status(day(2)).cycles_today, 0);

        state.apply(1, day(2));
        let status = state.status(day(2));
        assert_eq!(status.cycles_today, 1);
        assert_eq!(status.cycles_total, 5);
    }

    #[test]
    fn test_until_check_goes_negative() {
        let policy = MaintenancePolicy {
            distance_per_cycle: 10,
            cycles_per_check: 2,
        };
        let mut state = MaintenanceState::fresh(&policy, day(1));
        state.apply(3, day(1));
        let status = state.status(day(1));
        assert_eq!(status.cycles_until_check, -1);
        assert!(status.check_due());
    }
}
