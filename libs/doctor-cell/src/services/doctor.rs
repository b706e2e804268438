// libs/doctor-cell/src/services/doctor.rs
use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use shared_utils::{Clock, RequestContext};

use crate::models::{
    AvailabilityTemplateEntry, Contract, CreateContractRequest, CreateTemplateEntryRequest, DoctorError,
    DoctorRecord, RegisterDoctorRequest,
};
use crate::services::availability::validate_template_entry;
use crate::services::contract::validate_new_contract;
use crate::services::source::DoctorScheduleAdmin;

/// Administrative operations on a doctor's schedule data.
pub struct DoctorScheduleService {
    store: Arc<dyn DoctorScheduleAdmin>,
    clock: Arc<dyn Clock>,
}

impl DoctorScheduleService {
    pub fn new(store: Arc<dyn DoctorScheduleAdmin>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    #[instrument(skip(self, request, ctx), fields(actor = ?ctx.actor_id))]
    pub async fn register_doctor(
        &self,
        request: RegisterDoctorRequest,
        ctx: &RequestContext,
    ) -> Result<DoctorRecord, DoctorError> {
        let full_name = request.full_name.trim();
        if full_name.is_empty() {
            return Err(DoctorError::InvalidRequest("Doctor name must not be empty".to_string()));
        }

        let doctor = self
            .store
            .register_doctor(DoctorRecord {
                id: Uuid::new_v4(),
                full_name: full_name.to_string(),
                created_at: self.clock.now(),
            })
            .await?;

        info!("Registered doctor {}", doctor.id);
        Ok(doctor)
    }

    #[instrument(skip(self, request, ctx), fields(actor = ?ctx.actor_id))]
    pub async fn add_contract(
        &self,
        doctor_id: Uuid,
        request: CreateContractRequest,
        ctx: &RequestContext,
    ) -> Result<Contract, DoctorError> {
        self.ensure_doctor(doctor_id).await?;

        let contract = Contract {
            id: Uuid::new_v4(),
            doctor_id,
            start_date: request.start_date,
            end_date: request.end_date,
            active: request.active.unwrap_or(true),
        };

        let existing = self.store.list_active_contracts(doctor_id).await?;
        if let Err(e) = validate_new_contract(&existing, &contract) {
            warn!("Rejected contract for doctor {}: {}", doctor_id, e);
            return Err(e);
        }

        let contract = self.store.insert_contract(contract).await?;
        info!(
            "Contract {} created for doctor {} ({} to {:?})",
            contract.id, doctor_id, contract.start_date, contract.end_date
        );
        Ok(contract)
    }

    #[instrument(skip(self, request, ctx), fields(actor = ?ctx.actor_id))]
    pub async fn add_template_entry(
        &self,
        doctor_id: Uuid,
        request: CreateTemplateEntryRequest,
        ctx: &RequestContext,
    ) -> Result<AvailabilityTemplateEntry, DoctorError> {
        self.ensure_doctor(doctor_id).await?;
        validate_template_entry(&request)?;

        // Overlapping entries on the same day are allowed; the slot engine de-duplicates.
        let entry = self
            .store
            .insert_template_entry(AvailabilityTemplateEntry {
                id: Uuid::new_v4(),
                doctor_id,
                day_of_week: request.day_of_week,
                start_time: request.start_time,
                end_time: request.end_time,
                slot_duration_minutes: request.slot_duration_minutes,
                active: true,
            })
            .await?;

        info!("Availability entry {} created for doctor {}", entry.id, doctor_id);
        Ok(entry)
    }

    pub async fn list_template_entries(&self, doctor_id: Uuid) -> Result<Vec<AvailabilityTemplateEntry>, DoctorError> {
        self.ensure_doctor(doctor_id).await?;
        self.store.list_template_entries(doctor_id).await
    }

    #[instrument(skip(self, ctx), fields(actor = ?ctx.actor_id))]
    pub async fn deactivate_template_entry(
        &self,
        doctor_id: Uuid,
        entry_id: Uuid,
        ctx: &RequestContext,
    ) -> Result<AvailabilityTemplateEntry, DoctorError> {
        let entry = self.store.set_template_entry_active(doctor_id, entry_id, false).await?;
        info!("Availability entry {} deactivated for doctor {}", entry_id, doctor_id);
        Ok(entry)
    }

    async fn ensure_doctor(&self, doctor_id: Uuid) -> Result<(), DoctorError> {
        if self.store.doctor_exists(doctor_id).await? {
            Ok(())
        } else {
            Err(DoctorError::NotFound)
        }
    }
}
