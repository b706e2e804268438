// libs/doctor-cell/src/services/contract.rs
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, error};
use uuid::Uuid;

use crate::models::{Contract, ContractStatus, DoctorError};
use crate::services::source::DoctorScheduleSource;

pub struct ContractValidator {
    source: Arc<dyn DoctorScheduleSource>,
}

impl ContractValidator {
    pub fn new(source: Arc<dyn DoctorScheduleSource>) -> Self {
        Self { source }
    }

    /// Resolves whether the doctor is contracted on `date`.
    pub async fn contract_status(&self, doctor_id: Uuid, date: NaiveDate) -> Result<ContractStatus, DoctorError> {
        let contracts = self.source.list_active_contracts(doctor_id).await?;
        let status = resolve_contract_status(&contracts, date);

        match &status {
            ContractStatus::Conflicting { contract_ids } => {
                error!(
                    "Doctor {} has {} overlapping active contracts on {}: {:?}",
                    doctor_id,
                    contract_ids.len(),
                    date,
                    contract_ids
                );
            }
            ContractStatus::NotContracted => {
                debug!("Doctor {} has no active contract covering {}", doctor_id, date);
            }
            ContractStatus::Contracted { .. } => {}
        }

        Ok(status)
    }

    pub async fn is_contracted(&self, doctor_id: Uuid, date: NaiveDate) -> Result<bool, DoctorError> {
        Ok(self.contract_status(doctor_id, date).await?.is_contracted())
    }
}

/// Exactly one active covering contract means contracted; several is reported,
/// never resolved by picking one.
pub fn resolve_contract_status(contracts: &[Contract], date: NaiveDate) -> ContractStatus {
    let matching: Vec<Uuid> = contracts
        .iter()
        .filter(|c| c.active && c.covers(date))
        .map(|c| c.id)
        .collect();

    match matching.len() {
        0 => ContractStatus::NotContracted,
        1 => ContractStatus::Contracted { contract_id: matching[0] },
        _ => ContractStatus::Conflicting { contract_ids: matching },
    }
}

/// Creation-time check for a new contract against the doctor's existing ones.
pub fn validate_new_contract(existing: &[Contract], candidate: &Contract) -> Result<(), DoctorError> {
    if let Some(end) = candidate.end_date {
        if end < candidate.start_date {
            return Err(DoctorError::InvalidContract(format!(
                "End date {} is before start date {}",
                end, candidate.start_date
            )));
        }
    }

    if !candidate.active {
        return Ok(());
    }

    if let Some(clash) = existing
        .iter()
        .filter(|c| c.active && c.doctor_id == candidate.doctor_id && c.id != candidate.id)
        .find(|c| c.overlaps(candidate))
    {
        return Err(DoctorError::OverlappingContract { existing: clash.id });
    }

    Ok(())
}
