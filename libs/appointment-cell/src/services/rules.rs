// libs/appointment-cell/src/services/rules.rs
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc, Weekday};
use tracing::debug;

use shared_config::SchedulingConfig;
use shared_models::TimeWindow;
use shared_utils::clock::combine;

use crate::models::{RejectionReason, ValidationVerdict};

/// Clinic-wide booking policy. Pure: `now` is always passed in.
#[derive(Debug, Clone)]
pub struct BusinessRuleValidator {
    config: SchedulingConfig,
}

impl BusinessRuleValidator {
    pub fn new(config: SchedulingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SchedulingConfig {
        &self.config
    }

    /// Runs every rule and reports the first that fails, in fixed order:
    /// blackout, weekend, business hours, interval, advance notice, horizon.
    pub fn validate(
        &self,
        candidate: &TimeWindow,
        date: NaiveDate,
        now: DateTime<Utc>,
        emergency_override: bool,
    ) -> ValidationVerdict {
        let failure = self
            .check_date(date)
            .or_else(|| self.check_slot(candidate, date, now, emergency_override));

        if let Some(reason) = failure {
            debug!("Business rules rejected {} on {}: {}", candidate, date, reason);
        }
        ValidationVerdict::from_failure(failure)
    }

    /// Rules that depend only on the date.
    pub fn check_date(&self, date: NaiveDate) -> Option<RejectionReason> {
        if self.config.blackout_dates.contains(&date) {
            return Some(RejectionReason::BlackoutDate);
        }
        if !self.config.allow_weekends && matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            return Some(RejectionReason::WeekendNotAllowed);
        }
        None
    }

    /// Rules that depend on the candidate window.
    pub fn check_slot(
        &self,
        candidate: &TimeWindow,
        date: NaiveDate,
        now: DateTime<Utc>,
        emergency_override: bool,
    ) -> Option<RejectionReason> {
        if candidate.start() < self.config.business_start || candidate.end() > self.config.business_end {
            return Some(RejectionReason::OutsideBusinessHours);
        }

        let minute = candidate.start_minute();
        if !self
            .config
            .allowed_intervals_minutes
            .iter()
            .any(|interval| *interval != 0 && minute % interval == 0)
        {
            return Some(RejectionReason::InvalidInterval);
        }

        let starts_at = combine(date, candidate.start());

        if !emergency_override && starts_at < self.earliest_bookable(now) {
            return Some(RejectionReason::TooSoon);
        }

        if starts_at > self.latest_bookable(now) {
            return Some(RejectionReason::TooFarAhead);
        }

        None
    }

    pub fn earliest_bookable(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::hours(i64::from(self.config.min_advance_hours))
    }

    pub fn latest_bookable(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_months(Months::new(self.config.max_advance_months))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}
