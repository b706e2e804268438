// libs/appointment-cell/src/services/memory.rs
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{Appointment, AppointmentStatus};
use crate::services::store::{AppointmentStore, InsertOutcome, StoreError, UpdateOutcome};

/// Process-local appointment store used by the API binary and tests.
#[derive(Default)]
pub struct InMemoryAppointmentStore {
    appointments: RwLock<HashMap<Uuid, Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes an appointment as-is, skipping the overlap re-check.
    pub async fn insert_unchecked(&self, appointment: Appointment) {
        self.appointments.write().await.insert(appointment.id, appointment);
    }

    pub async fn len(&self) -> usize {
        self.appointments.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.appointments.read().await.is_empty()
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn list_appointments(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        exclude_states: &[AppointmentStatus],
    ) -> Result<Vec<Appointment>, StoreError> {
        let appointments = self.appointments.read().await;
        let mut found: Vec<Appointment> = appointments
            .values()
            .filter(|a| a.doctor_id == doctor_id && a.date == date)
            .filter(|a| !exclude_states.contains(&a.status))
            .cloned()
            .collect();
        found.sort_by_key(|a| a.window);
        Ok(found)
    }

    async fn get_appointment(&self, id: Uuid) -> Result<Option<Appointment>, StoreError> {
        Ok(self.appointments.read().await.get(&id).cloned())
    }

    async fn find_replacement(&self, original_id: Uuid) -> Result<Option<Appointment>, StoreError> {
        let appointments = self.appointments.read().await;
        Ok(appointments
            .values()
            .find(|a| a.rescheduled_from == Some(original_id))
            .cloned())
    }

    async fn insert_appointment(&self, appointment: Appointment) -> Result<InsertOutcome, StoreError> {
        let mut appointments = self.appointments.write().await;

        if let Some(original_id) = appointment.rescheduled_from {
            if let Some(existing) = appointments.values().find(|a| a.rescheduled_from == Some(original_id)) {
                warn!(
                    "Appointment {} was already rescheduled as {}",
                    original_id, existing.id
                );
                return Ok(InsertOutcome::AlreadyReplaced {
                    replacement_id: existing.id,
                });
            }
        }

        // Re-check against whatever was committed since validation.
        let clash = appointments.values().find(|existing| {
            existing.doctor_id == appointment.doctor_id
                && existing.date == appointment.date
                && existing.is_active()
                && existing.window.overlaps(&appointment.window)
        });

        if let Some(existing) = clash {
            warn!(
                "Commit-time overlap: {} on {} clashes with appointment {}",
                appointment.window, appointment.date, existing.id
            );
            return Ok(InsertOutcome::Conflict {
                conflicting_id: existing.id,
            });
        }

        debug!("Stored appointment {}", appointment.id);
        appointments.insert(appointment.id, appointment.clone());
        Ok(InsertOutcome::Inserted(appointment))
    }

    async fn update_appointment_state(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        new_state: AppointmentStatus,
        at: DateTime<Utc>,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut appointments = self.appointments.write().await;

        let Some(appointment) = appointments.get_mut(&id) else {
            return Ok(UpdateOutcome::NotFound);
        };

        if appointment.status != expected {
            return Ok(UpdateOutcome::Stale {
                current: appointment.status,
            });
        }

        appointment.status = new_state;
        appointment.updated_at = at;
        Ok(UpdateOutcome::Updated(appointment.clone()))
    }
}
