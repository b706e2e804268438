// libs/doctor-cell/src/services/source.rs
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{AvailabilityTemplateEntry, Contract, DoctorError, DoctorRecord};

/// Read side of the doctor persistence collaborator consumed by the scheduling core.
#[async_trait]
pub trait DoctorScheduleSource: Send + Sync {
    async fn doctor_exists(&self, doctor_id: Uuid) -> Result<bool, DoctorError>;

    async fn list_active_contracts(&self, doctor_id: Uuid) -> Result<Vec<Contract>, DoctorError>;

    async fn list_active_template_entries(
        &self,
        doctor_id: Uuid,
        day_of_week: u8,
    ) -> Result<Vec<AvailabilityTemplateEntry>, DoctorError>;
}

/// Administrative writes. Implementations must reject an active contract that
/// overlaps another active contract of the same doctor at insert time.
#[async_trait]
pub trait DoctorScheduleAdmin: DoctorScheduleSource {
    async fn register_doctor(&self, doctor: DoctorRecord) -> Result<DoctorRecord, DoctorError>;

    async fn insert_contract(&self, contract: Contract) -> Result<Contract, DoctorError>;

    async fn insert_template_entry(
        &self,
        entry: AvailabilityTemplateEntry,
    ) -> Result<AvailabilityTemplateEntry, DoctorError>;

    async fn list_template_entries(&self, doctor_id: Uuid) -> Result<Vec<AvailabilityTemplateEntry>, DoctorError>;

    async fn set_template_entry_active(
        &self,
        doctor_id: Uuid,
        entry_id: Uuid,
        active: bool,
    ) -> Result<AvailabilityTemplateEntry, DoctorError>;
}
