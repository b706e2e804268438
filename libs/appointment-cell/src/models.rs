// libs/appointment-cell/src/models.rs
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::time_window::hhmm;
use shared_models::TimeWindow;
use shared_utils::clock::combine;

// ==============================================================================
// APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub date: NaiveDate,
    /// `[start, end)` on `date`; the duration is always derived from it.
    pub window: TimeWindow,
    pub status: AppointmentStatus,
    /// Set when this appointment replaces a cancelled one.
    pub rescheduled_from: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// A freshly booked appointment. Every appointment starts out `Scheduled`.
    pub fn scheduled(
        doctor_id: Uuid,
        patient_id: Uuid,
        date: NaiveDate,
        window: TimeWindow,
        created_by: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            doctor_id,
            patient_id,
            date,
            window,
            status: AppointmentStatus::Scheduled,
            rescheduled_from: None,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        self.window.duration_minutes()
    }

    pub fn starts_at(&self) -> DateTime<Utc> {
        combine(self.date, self.window.start())
    }

    pub fn ends_at(&self) -> DateTime<Utc> {
        combine(self.date, self.window.end())
    }

    /// Whether this appointment holds its slot (Scheduled or Confirmed).
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
    Rescheduled,
}

impl AppointmentStatus {
    pub const INACTIVE: [AppointmentStatus; 4] = [
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::NoShow,
        AppointmentStatus::Rescheduled,
    ];

    pub fn is_active(&self) -> bool {
        matches!(self, AppointmentStatus::Scheduled | AppointmentStatus::Confirmed)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoShow => write!(f, "no_show"),
            AppointmentStatus::Rescheduled => write!(f, "rescheduled"),
        }
    }
}

// ==============================================================================
// VALIDATION VERDICTS
// ==============================================================================

/// Closed set of reasons a booking or transition is refused.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RejectionReason {
    NotContracted,
    ConflictingContracts,
    OutsideBusinessHours,
    InvalidInterval,
    TooSoon,
    TooFarAhead,
    BlackoutDate,
    WeekendNotAllowed,
    OverlapConflict,
    MinimumGapViolation,
    DailyLimitExceeded,
    InvalidTransition,
}

impl RejectionReason {
    pub fn code(&self) -> &'static str {
        match self {
            RejectionReason::NotContracted => "NotContracted",
            RejectionReason::ConflictingContracts => "ConflictingContracts",
            RejectionReason::OutsideBusinessHours => "OutsideBusinessHours",
            RejectionReason::InvalidInterval => "InvalidInterval",
            RejectionReason::TooSoon => "TooSoon",
            RejectionReason::TooFarAhead => "TooFarAhead",
            RejectionReason::BlackoutDate => "BlackoutDate",
            RejectionReason::WeekendNotAllowed => "WeekendNotAllowed",
            RejectionReason::OverlapConflict => "OverlapConflict",
            RejectionReason::MinimumGapViolation => "MinimumGapViolation",
            RejectionReason::DailyLimitExceeded => "DailyLimitExceeded",
            RejectionReason::InvalidTransition => "InvalidTransition",
        }
    }

    /// User-facing explanation.
    pub fn message(&self) -> &'static str {
        match self {
            RejectionReason::NotContracted => "Doctor has no active contract on this date",
            RejectionReason::ConflictingContracts => "Doctor has more than one active contract on this date",
            RejectionReason::OutsideBusinessHours => "Appointment falls outside business hours",
            RejectionReason::InvalidInterval => "Appointment does not start on an allowed interval",
            RejectionReason::TooSoon => "Appointment is too soon to book",
            RejectionReason::TooFarAhead => "Appointment is too far in the future",
            RejectionReason::BlackoutDate => "Clinic is closed on this date",
            RejectionReason::WeekendNotAllowed => "Weekend appointments are not allowed",
            RejectionReason::OverlapConflict => "Slot overlaps an existing appointment",
            RejectionReason::MinimumGapViolation => "Slot is too close to an existing appointment",
            RejectionReason::DailyLimitExceeded => "Doctor is fully booked on this date",
            RejectionReason::InvalidTransition => "Appointment cannot move to the requested state",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationVerdict {
    pub accepted: bool,
    pub failure_reason: Option<RejectionReason>,
}

impl ValidationVerdict {
    pub fn accept() -> Self {
        Self { accepted: true, failure_reason: None }
    }

    pub fn reject(reason: RejectionReason) -> Self {
        Self { accepted: false, failure_reason: Some(reason) }
    }

    pub fn from_failure(failure: Option<RejectionReason>) -> Self {
        match failure {
            Some(reason) => Self::reject(reason),
            None => Self::accept(),
        }
    }

    pub fn into_result(self) -> Result<(), RejectionReason> {
        match self.failure_reason {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }
}

// ==============================================================================
// EFFECTS
// ==============================================================================

/// Work the caller must carry out after a state change has been persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    AuditCreated {
        appointment_id: Uuid,
        actor_id: Option<Uuid>,
    },
    AuditTransition {
        appointment_id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
        actor_id: Option<Uuid>,
    },
    NotifyScheduled { appointment_id: Uuid },
    NotifyConfirmed { appointment_id: Uuid },
    NotifyCancelled { appointment_id: Uuid },
    NotifyCompleted { appointment_id: Uuid },
    NotifyNoShow { appointment_id: Uuid },
    NotifyRescheduled {
        appointment_id: Uuid,
        replacement_id: Option<Uuid>,
    },
    ScheduleReminder {
        appointment_id: Uuid,
        remind_at: DateTime<Utc>,
    },
    CancelReminder { appointment_id: Uuid },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransitionOutcome {
    pub appointment_id: Uuid,
    pub from: AppointmentStatus,
    pub requested: AppointmentStatus,
    /// State to persist. Differs from `requested` only for reschedules, where
    /// the original stays `Cancelled`.
    pub new_state: AppointmentStatus,
    pub effects: Vec<Effect>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingOutcome {
    pub appointment: Appointment,
    pub effects: Vec<Effect>,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    pub duration_minutes: u32,
}

impl BookAppointmentRequest {
    pub fn window(&self) -> Result<TimeWindow, AppointmentError> {
        requested_window(self.start_time, self.duration_minutes)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateBookingRequest {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub window: TimeWindow,
    pub exclude_appointment_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub target: AppointmentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleRequest {
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    /// Defaults to the original appointment's duration.
    pub duration_minutes: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevalidateRequest {
    pub date: NaiveDate,
    pub window: TimeWindow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotQuery {
    pub date: NaiveDate,
}

pub(crate) fn requested_window(start: NaiveTime, duration_minutes: u32) -> Result<TimeWindow, AppointmentError> {
    if duration_minutes == 0 {
        return Err(AppointmentError::InvalidRequest(
            "duration_minutes must be positive".to_string(),
        ));
    }
    TimeWindow::starting_at(start, i64::from(duration_minutes))
        .map_err(|e| AppointmentError::InvalidRequest(e.to_string()))
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Booking rejected: {0}")]
    Rejected(RejectionReason),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Appointment changed concurrently, expected {expected}")]
    ConcurrentModification { expected: AppointmentStatus },

    #[error("Scheduling is busy for this doctor and date, try again")]
    SchedulingBusy,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl AppointmentError {
    /// The rejection reason carried by business-rule refusals.
    pub fn reason(&self) -> Option<RejectionReason> {
        match self {
            AppointmentError::Rejected(reason) => Some(*reason),
            AppointmentError::InvalidTransition { .. } => Some(RejectionReason::InvalidTransition),
            _ => None,
        }
    }
}
