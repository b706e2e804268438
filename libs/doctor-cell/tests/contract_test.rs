use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use doctor_cell::models::{
    Contract, ContractStatus, CreateContractRequest, DoctorError, DoctorRecord, RegisterDoctorRequest,
};
use doctor_cell::services::contract::{resolve_contract_status, validate_new_contract};
use doctor_cell::services::{
    ContractValidator, DoctorScheduleAdmin, DoctorScheduleService, DoctorScheduleSource, InMemoryDoctorStore,
};
use shared_utils::clock::combine;
use shared_utils::test_utils::{clock_at, date, time, TestActor};

fn contract(doctor_id: Uuid, start: NaiveDate, end: Option<NaiveDate>) -> Contract {
    Contract {
        id: Uuid::new_v4(),
        doctor_id,
        start_date: start,
        end_date: end,
        active: true,
    }
}

async fn store_with_doctor() -> (Arc<InMemoryDoctorStore>, Uuid) {
    let store = Arc::new(InMemoryDoctorStore::new());
    let doctor = Uuid::new_v4();
    store
        .register_doctor(DoctorRecord { id: doctor, full_name: "Dr. Okafor".to_string(), created_at: Utc::now() })
        .await
        .unwrap();
    (store, doctor)
}

#[test]
fn test_contract_window_is_inclusive() {
    let doctor = Uuid::new_v4();
    let c = contract(doctor, date(2025, 1, 1), Some(date(2025, 6, 30)));
    let contracts = vec![c.clone()];

    assert_eq!(
        resolve_contract_status(&contracts, date(2025, 1, 1)),
        ContractStatus::Contracted { contract_id: c.id }
    );
    assert!(resolve_contract_status(&contracts, date(2025, 6, 30)).is_contracted());
    assert_eq!(resolve_contract_status(&contracts, date(2025, 7, 1)), ContractStatus::NotContracted);
    assert_eq!(resolve_contract_status(&contracts, date(2024, 12, 31)), ContractStatus::NotContracted);
}

#[test]
fn test_open_ended_contract_covers_future() {
    let contracts = vec![contract(Uuid::new_v4(), date(2025, 1, 1), None)];
    assert!(resolve_contract_status(&contracts, date(2030, 1, 1)).is_contracted());
}

#[test]
fn test_inactive_contract_does_not_count() {
    let mut c = contract(Uuid::new_v4(), date(2025, 1, 1), None);
    c.active = false;
    assert_eq!(resolve_contract_status(&[c], date(2025, 3, 1)), ContractStatus::NotContracted);
}

#[test]
fn test_overlapping_active_contracts_are_reported_not_resolved() {
    let doctor = Uuid::new_v4();
    let a = contract(doctor, date(2025, 1, 1), Some(date(2025, 12, 31)));
    let b = contract(doctor, date(2025, 6, 1), None);

    assert_matches!(
        resolve_contract_status(&[a, b], date(2025, 7, 1)),
        ContractStatus::Conflicting { contract_ids } if contract_ids.len() == 2
    );
}

#[test]
fn test_new_contract_overlap_rejected_at_creation() {
    let doctor = Uuid::new_v4();
    let existing = vec![contract(doctor, date(2025, 1, 1), Some(date(2025, 6, 30)))];

    let overlapping = contract(doctor, date(2025, 6, 30), None);
    assert_matches!(
        validate_new_contract(&existing, &overlapping),
        Err(DoctorError::OverlappingContract { existing: id }) if id == existing[0].id
    );

    let following = contract(doctor, date(2025, 7, 1), None);
    assert!(validate_new_contract(&existing, &following).is_ok());

    let mut inactive = contract(doctor, date(2025, 3, 1), None);
    inactive.active = false;
    assert!(validate_new_contract(&existing, &inactive).is_ok());

    let inverted = contract(doctor, date(2025, 9, 1), Some(date(2025, 8, 1)));
    assert_matches!(validate_new_contract(&[], &inverted), Err(DoctorError::InvalidContract(_)));
}

#[tokio::test]
async fn test_service_rejects_overlapping_contract() {
    let (store, doctor) = store_with_doctor().await;
    let service = DoctorScheduleService::new(store.clone(), clock_at(2025, 6, 1, 12, 0));
    let ctx = TestActor::default().context();

    service
        .add_contract(
            doctor,
            CreateContractRequest { start_date: date(2025, 1, 1), end_date: None, active: None },
            &ctx,
        )
        .await
        .unwrap();

    let result = service
        .add_contract(
            doctor,
            CreateContractRequest { start_date: date(2026, 1, 1), end_date: Some(date(2026, 12, 31)), active: None },
            &ctx,
        )
        .await;

    assert_matches!(result, Err(DoctorError::OverlappingContract { .. }));
}

#[tokio::test]
async fn test_service_requires_known_doctor() {
    let store = Arc::new(InMemoryDoctorStore::new());
    let service = DoctorScheduleService::new(store, clock_at(2025, 6, 1, 12, 0));
    let result = service
        .add_contract(
            Uuid::new_v4(),
            CreateContractRequest { start_date: date(2025, 1, 1), end_date: None, active: None },
            &TestActor::default().context(),
        )
        .await;

    assert_matches!(result, Err(DoctorError::NotFound));
}

#[tokio::test]
async fn test_validator_surfaces_conflicting_contracts_from_bad_data() {
    let (store, doctor) = store_with_doctor().await;
    store.insert_contract_unchecked(contract(doctor, date(2025, 1, 1), None)).await;
    store.insert_contract_unchecked(contract(doctor, date(2025, 2, 1), None)).await;

    let validator = ContractValidator::new(store);

    let status = validator.contract_status(doctor, date(2025, 3, 3)).await.unwrap();
    assert_matches!(status, ContractStatus::Conflicting { .. });
    assert!(!validator.is_contracted(doctor, date(2025, 3, 3)).await.unwrap());

    // Before the second contract starts only one applies.
    assert!(validator.is_contracted(doctor, date(2025, 1, 15)).await.unwrap());
}

#[tokio::test]
async fn test_registered_doctor_is_stamped_by_the_clock() {
    let store = Arc::new(InMemoryDoctorStore::new());
    let service = DoctorScheduleService::new(store.clone(), clock_at(2025, 3, 4, 8, 30));

    let doctor = service
        .register_doctor(
            RegisterDoctorRequest { full_name: "  Dr. Mensah ".to_string() },
            &TestActor::default().context(),
        )
        .await
        .unwrap();

    assert_eq!(doctor.full_name, "Dr. Mensah");
    assert_eq!(doctor.created_at, combine(date(2025, 3, 4), time(8, 30)));
    assert!(store.doctor_exists(doctor.id).await.unwrap());
}
