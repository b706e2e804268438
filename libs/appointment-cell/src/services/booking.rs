// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use doctor_cell::DoctorScheduleSource;
use shared_config::SchedulingConfig;
use shared_database::KeyedLocks;
use shared_models::TimeWindow;
use shared_utils::{Clock, RequestContext};

use crate::models::{
    requested_window, Appointment, AppointmentError, AppointmentStatus, BookAppointmentRequest, BookingOutcome,
    Effect, RejectionReason, RescheduleRequest, TransitionOutcome, ValidationVerdict,
};
use crate::services::engine::AvailabilityEngine;
use crate::services::lifecycle::AppointmentStateMachine;
use crate::services::store::{AppointmentStore, InsertOutcome, UpdateOutcome};

/// Default wait for the per-doctor-per-date booking lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(30);

/// Entry point for booking, lifecycle changes and availability queries.
///
/// Every booking runs validate-then-insert while holding the lock for its
/// doctor and date, and the store repeats the overlap test inside the insert,
/// so two overlapping active appointments are never committed for one doctor.
pub struct BookingService {
    engine: AvailabilityEngine,
    store: Arc<dyn AppointmentStore>,
    state_machine: AppointmentStateMachine,
    locks: KeyedLocks<(Uuid, NaiveDate)>,
}

impl BookingService {
    pub fn new(
        store: Arc<dyn AppointmentStore>,
        doctors: Arc<dyn DoctorScheduleSource>,
        clock: Arc<dyn Clock>,
        config: SchedulingConfig,
    ) -> Self {
        Self::with_lock_timeout(store, doctors, clock, config, DEFAULT_LOCK_TIMEOUT)
    }

    pub fn with_lock_timeout(
        store: Arc<dyn AppointmentStore>,
        doctors: Arc<dyn DoctorScheduleSource>,
        clock: Arc<dyn Clock>,
        config: SchedulingConfig,
        lock_timeout: Duration,
    ) -> Self {
        Self {
            engine: AvailabilityEngine::new(store.clone(), doctors, clock, config),
            store,
            state_machine: AppointmentStateMachine::new(),
            locks: KeyedLocks::new(lock_timeout),
        }
    }

    pub async fn list_available_slots(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Vec<TimeWindow>, AppointmentError> {
        self.engine.list_available_slots(doctor_id, date).await
    }

    pub async fn validate_booking(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        window: &TimeWindow,
        exclude_appointment_id: Option<Uuid>,
        emergency_override: bool,
    ) -> Result<ValidationVerdict, AppointmentError> {
        self.engine
            .validate_booking(doctor_id, date, window, exclude_appointment_id, emergency_override)
            .await
    }

    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.store
            .get_appointment(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound)
    }

    #[instrument(skip(self, request, ctx), fields(doctor_id = %request.doctor_id, date = %request.date, actor = ?ctx.actor_id))]
    pub async fn book(&self, request: BookAppointmentRequest, ctx: &RequestContext) -> Result<BookingOutcome, AppointmentError> {
        let window = request.window()?;
        self.book_window(request.doctor_id, request.patient_id, request.date, window, None, ctx)
            .await
    }

    /// Moves an existing appointment to `target`. Reschedules go through
    /// [`BookingService::reschedule`] since they need a new slot.
    #[instrument(skip(self, ctx), fields(actor = ?ctx.actor_id))]
    pub async fn transition(
        &self,
        appointment_id: Uuid,
        target: AppointmentStatus,
        ctx: &RequestContext,
    ) -> Result<TransitionOutcome, AppointmentError> {
        if target == AppointmentStatus::Rescheduled {
            return Err(AppointmentError::InvalidRequest(
                "Rescheduling needs a new slot, use the reschedule operation".to_string(),
            ));
        }

        let appointment = self.get_appointment(appointment_id).await?;
        let now = self.engine.clock().now();
        let outcome = self.state_machine.transition(&appointment, target, now, ctx.actor_id)?;

        self.persist_state(&outcome, now).await?;

        info!(
            "Appointment {} moved {} -> {}",
            appointment_id, outcome.from, outcome.new_state
        );
        Ok(outcome)
    }

    /// Books a replacement for a cancelled appointment. The original stays
    /// `Cancelled`; the replacement links back through `rescheduled_from`.
    /// A cancelled appointment can be rescheduled once.
    #[instrument(skip(self, request, ctx), fields(actor = ?ctx.actor_id))]
    pub async fn reschedule(
        &self,
        original_id: Uuid,
        request: RescheduleRequest,
        ctx: &RequestContext,
    ) -> Result<BookingOutcome, AppointmentError> {
        let original = self.get_appointment(original_id).await?;
        let now = self.engine.clock().now();
        let transition = self
            .state_machine
            .transition(&original, AppointmentStatus::Rescheduled, now, ctx.actor_id)?;

        if let Some(replacement) = self.store.find_replacement(original.id).await? {
            info!(
                "Appointment {} already rescheduled as {}",
                original.id, replacement.id
            );
            return Err(already_rescheduled());
        }

        let duration = match request.duration_minutes {
            Some(minutes) => minutes,
            None => u32::try_from(original.duration_minutes())
                .map_err(|_| AppointmentError::Store(format!("Appointment {} has a negative duration", original.id)))?,
        };
        let window = requested_window(request.start_time, duration)?;

        let mut outcome = self
            .book_window(
                original.doctor_id,
                original.patient_id,
                request.date,
                window,
                Some(original.id),
                ctx,
            )
            .await?;

        let replacement_id = outcome.appointment.id;
        let mut effects = transition.effects;
        effects.push(Effect::NotifyRescheduled {
            appointment_id: original.id,
            replacement_id: Some(replacement_id),
        });
        effects.append(&mut outcome.effects);
        outcome.effects = effects;

        info!("Appointment {} rescheduled as {}", original.id, replacement_id);
        Ok(outcome)
    }

    /// Re-checks an edit to an existing appointment, ignoring the appointment itself.
    pub async fn revalidate(
        &self,
        appointment_id: Uuid,
        date: NaiveDate,
        window: &TimeWindow,
        ctx: &RequestContext,
    ) -> Result<ValidationVerdict, AppointmentError> {
        let appointment = self.get_appointment(appointment_id).await?;
        self.engine
            .validate_booking(
                appointment.doctor_id,
                date,
                window,
                Some(appointment.id),
                ctx.emergency_override,
            )
            .await
    }

    async fn book_window(
        &self,
        doctor_id: Uuid,
        patient_id: Uuid,
        date: NaiveDate,
        window: TimeWindow,
        rescheduled_from: Option<Uuid>,
        ctx: &RequestContext,
    ) -> Result<BookingOutcome, AppointmentError> {
        let _guard = self
            .locks
            .acquire((doctor_id, date))
            .await
            .map_err(|_| AppointmentError::SchedulingBusy)?;

        let now = self.engine.clock().now();
        let verdict = self
            .engine
            .validate_booking_at(now, doctor_id, date, &window, None, ctx.emergency_override)
            .await?;

        if let Err(reason) = verdict.into_result() {
            info!("Booking {} on {} for doctor {} rejected: {}", window, date, doctor_id, reason);
            return Err(AppointmentError::Rejected(reason));
        }

        let mut appointment = Appointment::scheduled(doctor_id, patient_id, date, window, ctx.actor_id, now);
        appointment.rescheduled_from = rescheduled_from;

        let appointment = match self.store.insert_appointment(appointment).await? {
            InsertOutcome::Inserted(appointment) => appointment,
            InsertOutcome::Conflict { conflicting_id } => {
                warn!(
                    "Booking {} on {} lost to appointment {} at commit",
                    window, date, conflicting_id
                );
                return Err(AppointmentError::Rejected(RejectionReason::OverlapConflict));
            }
            InsertOutcome::AlreadyReplaced { replacement_id } => {
                warn!(
                    "Reschedule of {:?} lost to replacement {} at commit",
                    rescheduled_from, replacement_id
                );
                return Err(already_rescheduled());
            }
        };

        let effects = self.state_machine.creation_effects(&appointment, now, ctx.actor_id);
        info!("Booked appointment {} ({} on {})", appointment.id, window, date);

        Ok(BookingOutcome { appointment, effects })
    }

    async fn persist_state(&self, outcome: &TransitionOutcome, now: DateTime<Utc>) -> Result<(), AppointmentError> {
        match self
            .store
            .update_appointment_state(outcome.appointment_id, outcome.from, outcome.new_state, now)
            .await?
        {
            UpdateOutcome::Updated(_) => Ok(()),
            UpdateOutcome::NotFound => Err(AppointmentError::NotFound),
            UpdateOutcome::Stale { current } => {
                debug!(
                    "Appointment {} is now {}, expected {}",
                    outcome.appointment_id, current, outcome.from
                );
                Err(AppointmentError::ConcurrentModification { expected: outcome.from })
            }
        }
    }
}

fn already_rescheduled() -> AppointmentError {
    AppointmentError::InvalidTransition {
        from: AppointmentStatus::Cancelled,
        to: AppointmentStatus::Rescheduled,
    }
}
