// libs/appointment-cell/src/services/store.rs
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Appointment, AppointmentError, AppointmentStatus};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<StoreError> for AppointmentError {
    fn from(e: StoreError) -> Self {
        AppointmentError::Store(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted(Appointment),
    /// An active appointment with an overlapping window was committed first.
    Conflict { conflicting_id: Uuid },
    /// The appointment named in `rescheduled_from` already has a replacement.
    AlreadyReplaced { replacement_id: Uuid },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated(Appointment),
    NotFound,
    /// The stored state no longer matched the expected one.
    Stale { current: AppointmentStatus },
}

/// Appointment persistence used by the booking core.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Every appointment for the doctor on the date whose state is not in `exclude_states`.
    async fn list_appointments(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        exclude_states: &[AppointmentStatus],
    ) -> Result<Vec<Appointment>, StoreError>;

    async fn get_appointment(&self, id: Uuid) -> Result<Option<Appointment>, StoreError>;

    /// The appointment booked as a replacement for `original_id`, if any.
    async fn find_replacement(&self, original_id: Uuid) -> Result<Option<Appointment>, StoreError>;

    /// Conditional insert: the overlap test against active appointments for the
    /// same doctor and date is repeated atomically with the write, and at most
    /// one appointment may carry a given `rescheduled_from`.
    async fn insert_appointment(&self, appointment: Appointment) -> Result<InsertOutcome, StoreError>;

    /// Compare-and-set on the appointment state.
    async fn update_appointment_state(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        new_state: AppointmentStatus,
        at: DateTime<Utc>,
    ) -> Result<UpdateOutcome, StoreError>;
}
