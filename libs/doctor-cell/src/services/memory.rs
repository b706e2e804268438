// libs/doctor-cell/src/services/memory.rs
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{AvailabilityTemplateEntry, Contract, DoctorError, DoctorRecord};
use crate::services::contract::validate_new_contract;
use crate::services::source::{DoctorScheduleAdmin, DoctorScheduleSource};

#[derive(Default)]
struct DoctorTables {
    doctors: HashMap<Uuid, DoctorRecord>,
    contracts: HashMap<Uuid, Vec<Contract>>,
    template_entries: HashMap<Uuid, Vec<AvailabilityTemplateEntry>>,
}

/// Process-local doctor store used by the API binary and tests.
#[derive(Default)]
pub struct InMemoryDoctorStore {
    tables: RwLock<DoctorTables>,
}

impl InMemoryDoctorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a contract without the overlap check, for reproducing
    /// pre-existing bad data in tests and migrations.
    pub async fn insert_contract_unchecked(&self, contract: Contract) {
        let mut tables = self.tables.write().await;
        tables.contracts.entry(contract.doctor_id).or_default().push(contract);
    }
}

#[async_trait]
impl DoctorScheduleSource for InMemoryDoctorStore {
    async fn doctor_exists(&self, doctor_id: Uuid) -> Result<bool, DoctorError> {
        Ok(self.tables.read().await.doctors.contains_key(&doctor_id))
    }

    async fn list_active_contracts(&self, doctor_id: Uuid) -> Result<Vec<Contract>, DoctorError> {
        let tables = self.tables.read().await;
        Ok(tables
            .contracts
            .get(&doctor_id)
            .map(|contracts| contracts.iter().filter(|c| c.active).cloned().collect())
            .unwrap_or_default())
    }

    async fn list_active_template_entries(
        &self,
        doctor_id: Uuid,
        day_of_week: u8,
    ) -> Result<Vec<AvailabilityTemplateEntry>, DoctorError> {
        let tables = self.tables.read().await;
        Ok(tables
            .template_entries
            .get(&doctor_id)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| e.active && e.day_of_week == day_of_week)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl DoctorScheduleAdmin for InMemoryDoctorStore {
    async fn register_doctor(&self, doctor: DoctorRecord) -> Result<DoctorRecord, DoctorError> {
        let mut tables = self.tables.write().await;
        tables.doctors.insert(doctor.id, doctor.clone());
        Ok(doctor)
    }

    async fn insert_contract(&self, contract: Contract) -> Result<Contract, DoctorError> {
        let mut tables = self.tables.write().await;
        if !tables.doctors.contains_key(&contract.doctor_id) {
            return Err(DoctorError::NotFound);
        }

        let contracts = tables.contracts.entry(contract.doctor_id).or_default();
        // Re-checked under the write lock so concurrent creations cannot both pass.
        validate_new_contract(contracts, &contract)?;
        contracts.push(contract.clone());

        debug!("Stored contract {} for doctor {}", contract.id, contract.doctor_id);
        Ok(contract)
    }

    async fn insert_template_entry(
        &self,
        entry: AvailabilityTemplateEntry,
    ) -> Result<AvailabilityTemplateEntry, DoctorError> {
        let mut tables = self.tables.write().await;
        if !tables.doctors.contains_key(&entry.doctor_id) {
            return Err(DoctorError::NotFound);
        }
        tables
            .template_entries
            .entry(entry.doctor_id)
            .or_default()
            .push(entry.clone());
        Ok(entry)
    }

    async fn list_template_entries(&self, doctor_id: Uuid) -> Result<Vec<AvailabilityTemplateEntry>, DoctorError> {
        let tables = self.tables.read().await;
        let mut entries = tables.template_entries.get(&doctor_id).cloned().unwrap_or_default();
        entries.sort_by_key(|e| (e.day_of_week, e.start_time));
        Ok(entries)
    }

    async fn set_template_entry_active(
        &self,
        doctor_id: Uuid,
        entry_id: Uuid,
        active: bool,
    ) -> Result<AvailabilityTemplateEntry, DoctorError> {
        let mut tables = self.tables.write().await;
        let entry = tables
            .template_entries
            .get_mut(&doctor_id)
            .and_then(|entries| entries.iter_mut().find(|e| e.id == entry_id))
            .ok_or(DoctorError::TemplateEntryNotFound)?;
        entry.active = active;
        Ok(entry.clone())
    }
}
