// libs/appointment-cell/src/services/engine.rs
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, error, info};
use uuid::Uuid;

use doctor_cell::{AvailabilityTemplateService, ContractStatus, ContractValidator, DoctorError, DoctorScheduleSource};
use shared_config::SchedulingConfig;
use shared_models::TimeWindow;
use shared_utils::Clock;

use crate::models::{AppointmentError, AppointmentStatus, RejectionReason, ValidationVerdict};
use crate::services::conflict::{relevant_appointments, ConflictDetector};
use crate::services::rules::BusinessRuleValidator;
use crate::services::store::AppointmentStore;

impl From<DoctorError> for AppointmentError {
    fn from(e: DoctorError) -> Self {
        match e {
            DoctorError::NotFound => AppointmentError::DoctorNotFound,
            DoctorError::Store(msg) => AppointmentError::Store(msg),
            // Anything else coming back from a read is bad stored data.
            other => AppointmentError::Store(other.to_string()),
        }
    }
}

/// Composes the contract, business-rule and conflict checks, and lists the
/// slots that would pass all of them.
pub struct AvailabilityEngine {
    appointments: Arc<dyn AppointmentStore>,
    doctors: Arc<dyn DoctorScheduleSource>,
    clock: Arc<dyn Clock>,
    contracts: ContractValidator,
    templates: AvailabilityTemplateService,
    rules: BusinessRuleValidator,
    conflicts: ConflictDetector,
}

impl AvailabilityEngine {
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        doctors: Arc<dyn DoctorScheduleSource>,
        clock: Arc<dyn Clock>,
        config: SchedulingConfig,
    ) -> Self {
        Self {
            contracts: ContractValidator::new(doctors.clone()),
            templates: AvailabilityTemplateService::new(doctors.clone()),
            conflicts: ConflictDetector::new(config.min_gap_minutes, config.daily_limit),
            rules: BusinessRuleValidator::new(config),
            appointments,
            doctors,
            clock,
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Template slots for the date that a booking made right now would be
    /// accepted for. Empty when the doctor is not bookable on the date at all.
    pub async fn list_available_slots(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Vec<TimeWindow>, AppointmentError> {
        self.ensure_doctor(doctor_id).await?;

        if let Some(reason) = self.contract_failure(doctor_id, date).await? {
            debug!("No slots for doctor {} on {}: {}", doctor_id, date, reason);
            return Ok(Vec::new());
        }

        if let Some(reason) = self.rules.check_date(date) {
            debug!("No slots for doctor {} on {}: {}", doctor_id, date, reason);
            return Ok(Vec::new());
        }

        let now = self.clock.now();
        let candidates = self.templates.candidate_slots(doctor_id, date).await?;
        let existing = self
            .appointments
            .list_appointments(doctor_id, date, &AppointmentStatus::INACTIVE)
            .await?;
        let relevant = relevant_appointments(&existing, None);

        if self.conflicts.daily_limit_reached(relevant.len()) {
            debug!("Doctor {} is fully booked on {}", doctor_id, date);
            return Ok(Vec::new());
        }

        let slots: Vec<TimeWindow> = candidates
            .into_iter()
            .filter(|slot| self.rules.check_slot(slot, date, now, false).is_none())
            .filter(|slot| self.conflicts.check_window(&relevant, slot).is_none())
            .collect();

        info!("Found {} available slots for doctor {} on {}", slots.len(), doctor_id, date);
        Ok(slots)
    }

    /// Contract, then business rules, then conflicts; first failure wins.
    pub async fn validate_booking(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        window: &TimeWindow,
        exclude_appointment_id: Option<Uuid>,
        emergency_override: bool,
    ) -> Result<ValidationVerdict, AppointmentError> {
        let now = self.clock.now();
        self.validate_booking_at(now, doctor_id, date, window, exclude_appointment_id, emergency_override)
            .await
    }

    pub async fn validate_booking_at(
        &self,
        now: DateTime<Utc>,
        doctor_id: Uuid,
        date: NaiveDate,
        window: &TimeWindow,
        exclude_appointment_id: Option<Uuid>,
        emergency_override: bool,
    ) -> Result<ValidationVerdict, AppointmentError> {
        if window.is_empty() {
            return Err(AppointmentError::InvalidRequest(format!(
                "Appointment window {} is empty",
                window
            )));
        }

        self.ensure_doctor(doctor_id).await?;

        if let Some(reason) = self.contract_failure(doctor_id, date).await? {
            return Ok(ValidationVerdict::reject(reason));
        }

        let verdict = self.rules.validate(window, date, now, emergency_override);
        if !verdict.accepted {
            return Ok(verdict);
        }

        let existing = self
            .appointments
            .list_appointments(doctor_id, date, &AppointmentStatus::INACTIVE)
            .await?;

        let verdict = self.conflicts.find_conflicts(&existing, window, exclude_appointment_id);
        if let Some(reason) = verdict.failure_reason {
            debug!("Candidate {} for doctor {} on {} rejected: {}", window, doctor_id, date, reason);
        }
        Ok(verdict)
    }

    async fn ensure_doctor(&self, doctor_id: Uuid) -> Result<(), AppointmentError> {
        if self.doctors.doctor_exists(doctor_id).await? {
            Ok(())
        } else {
            error!("Scheduling requested for unknown doctor {}", doctor_id);
            Err(AppointmentError::DoctorNotFound)
        }
    }

    async fn contract_failure(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Option<RejectionReason>, AppointmentError> {
        let failure = match self.contracts.contract_status(doctor_id, date).await? {
            ContractStatus::Contracted { .. } => None,
            ContractStatus::NotContracted => Some(RejectionReason::NotContracted),
            ContractStatus::Conflicting { .. } => Some(RejectionReason::ConflictingContracts),
        };
        Ok(failure)
    }
}
