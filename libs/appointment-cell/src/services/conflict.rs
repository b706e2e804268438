// libs/appointment-cell/src/services/conflict.rs
use tracing::debug;
use uuid::Uuid;

use shared_models::TimeWindow;

use crate::models::{Appointment, RejectionReason, ValidationVerdict};

/// Checks a candidate window against a doctor's bookings for one date.
#[derive(Debug, Clone, Copy)]
pub struct ConflictDetector {
    min_gap_minutes: u32,
    daily_limit: u32,
}

impl ConflictDetector {
    pub fn new(min_gap_minutes: u32, daily_limit: u32) -> Self {
        Self {
            min_gap_minutes,
            daily_limit,
        }
    }

    /// Overlap, then minimum gap, then the daily cap. `existing` is every
    /// appointment of the doctor on the date; inactive ones and
    /// `exclude_appointment_id` are ignored.
    pub fn find_conflicts(
        &self,
        existing: &[Appointment],
        candidate: &TimeWindow,
        exclude_appointment_id: Option<Uuid>,
    ) -> ValidationVerdict {
        let relevant = relevant_appointments(existing, exclude_appointment_id);

        let failure = self.check_window(&relevant, candidate).or_else(|| {
            self.daily_limit_reached(relevant.len())
                .then_some(RejectionReason::DailyLimitExceeded)
        });

        ValidationVerdict::from_failure(failure)
    }

    /// Overlap and gap checks only. Every overlap is reported before any gap.
    pub fn check_window(&self, relevant: &[&Appointment], candidate: &TimeWindow) -> Option<RejectionReason> {
        if let Some(clash) = relevant.iter().find(|a| a.window.overlaps(candidate)) {
            debug!("Candidate {} overlaps appointment {} ({})", candidate, clash.id, clash.window);
            return Some(RejectionReason::OverlapConflict);
        }

        let min_gap = i64::from(self.min_gap_minutes);
        if let Some(close) = relevant.iter().find(|a| (0..min_gap).contains(&a.window.gap_minutes(candidate))) {
            debug!(
                "Candidate {} is {} minutes from appointment {}",
                candidate,
                close.window.gap_minutes(candidate),
                close.id
            );
            return Some(RejectionReason::MinimumGapViolation);
        }

        None
    }

    pub fn daily_limit_reached(&self, active_count: usize) -> bool {
        active_count >= self.daily_limit as usize
    }
}

/// Appointments that still hold their slot, minus the one being edited.
pub fn relevant_appointments(existing: &[Appointment], exclude_appointment_id: Option<Uuid>) -> Vec<&Appointment> {
    existing
        .iter()
        .filter(|a| a.is_active())
        .filter(|a| Some(a.id) != exclude_appointment_id)
        .collect()
}
