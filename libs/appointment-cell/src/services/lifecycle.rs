// libs/appointment-cell/src/services/lifecycle.rs
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{Appointment, AppointmentError, AppointmentStatus, Effect, TransitionOutcome};

/// How long before the start a reminder goes out.
pub const REMINDER_LEAD_HOURS: i64 = 24;

/// Legal appointment state changes and the effects each one owes. Performs no I/O.
#[derive(Debug, Default, Clone, Copy)]
pub struct AppointmentStateMachine;

impl AppointmentStateMachine {
    pub fn new() -> Self {
        Self
    }

    /// Every state `current` may move to, ignoring time preconditions.
    pub fn valid_transitions(&self, current: AppointmentStatus) -> &'static [AppointmentStatus] {
        match current {
            AppointmentStatus::Scheduled => &[
                AppointmentStatus::Confirmed,
                AppointmentStatus::Cancelled,
                AppointmentStatus::Completed,
                AppointmentStatus::NoShow,
            ],
            AppointmentStatus::Confirmed => &[
                AppointmentStatus::Cancelled,
                AppointmentStatus::Completed,
                AppointmentStatus::NoShow,
            ],
            // Only escape hatch out of Cancelled; it books a new appointment.
            AppointmentStatus::Cancelled => &[AppointmentStatus::Rescheduled],
            // Terminal states
            AppointmentStatus::Completed => &[],
            AppointmentStatus::NoShow => &[],
            AppointmentStatus::Rescheduled => &[],
        }
    }

    pub fn transition(
        &self,
        appointment: &Appointment,
        target: AppointmentStatus,
        now: DateTime<Utc>,
        actor_id: Option<Uuid>,
    ) -> Result<TransitionOutcome, AppointmentError> {
        let from = appointment.status;
        debug!("Validating status transition from {} to {}", from, target);

        if !self.valid_transitions(from).contains(&target) || !self.precondition_holds(appointment, target, now) {
            warn!(
                "Invalid status transition attempted on {}: {} -> {}",
                appointment.id, from, target
            );
            return Err(AppointmentError::InvalidTransition { from, to: target });
        }

        let id = appointment.id;
        let mut effects = vec![Effect::AuditTransition {
            appointment_id: id,
            from,
            to: target,
            actor_id,
        }];

        let new_state = match target {
            AppointmentStatus::Confirmed => {
                effects.push(Effect::NotifyConfirmed { appointment_id: id });
                target
            }
            AppointmentStatus::Cancelled => {
                effects.push(Effect::CancelReminder { appointment_id: id });
                effects.push(Effect::NotifyCancelled { appointment_id: id });
                target
            }
            AppointmentStatus::Completed => {
                effects.push(Effect::NotifyCompleted { appointment_id: id });
                target
            }
            AppointmentStatus::NoShow => {
                effects.push(Effect::NotifyNoShow { appointment_id: id });
                target
            }
            // The cancelled original is kept for history.
            AppointmentStatus::Rescheduled => AppointmentStatus::Cancelled,
            AppointmentStatus::Scheduled => target,
        };

        info!("Status transition validated for {}: {} -> {}", id, from, target);

        Ok(TransitionOutcome {
            appointment_id: id,
            from,
            requested: target,
            new_state,
            effects,
        })
    }

    /// Effects owed when an appointment is first created.
    pub fn creation_effects(
        &self,
        appointment: &Appointment,
        now: DateTime<Utc>,
        actor_id: Option<Uuid>,
    ) -> Vec<Effect> {
        let mut effects = vec![
            Effect::AuditCreated {
                appointment_id: appointment.id,
                actor_id,
            },
            Effect::NotifyScheduled {
                appointment_id: appointment.id,
            },
        ];

        let remind_at = appointment.starts_at() - Duration::hours(REMINDER_LEAD_HOURS);
        if remind_at > now {
            effects.push(Effect::ScheduleReminder {
                appointment_id: appointment.id,
                remind_at,
            });
        }

        effects
    }

    fn precondition_holds(&self, appointment: &Appointment, target: AppointmentStatus, now: DateTime<Utc>) -> bool {
        match (appointment.status, target) {
            // Future appointments only.
            (AppointmentStatus::Scheduled, AppointmentStatus::Cancelled) => appointment.starts_at() >= now,
            (_, AppointmentStatus::Completed) | (_, AppointmentStatus::NoShow) => appointment.starts_at() <= now,
            _ => true,
        }
    }
}
