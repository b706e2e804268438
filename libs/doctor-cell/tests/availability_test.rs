use std::sync::Arc;

use assert_matches::assert_matches;
use uuid::Uuid;

use doctor_cell::models::{day_of_week, AvailabilityTemplateEntry, CreateTemplateEntryRequest, DoctorError, DoctorRecord};
use doctor_cell::services::availability::{tile_entries, tile_entry, validate_template_entry};
use doctor_cell::services::{AvailabilityTemplateService, DoctorScheduleAdmin, InMemoryDoctorStore};
use shared_models::TimeWindow;
use shared_utils::test_utils::{date, time};

fn entry(doctor_id: Uuid, day: u8, start: (u32, u32), end: (u32, u32), slot: u32) -> AvailabilityTemplateEntry {
    AvailabilityTemplateEntry {
        id: Uuid::new_v4(),
        doctor_id,
        day_of_week: day,
        start_time: time(start.0, start.1),
        end_time: time(end.0, end.1),
        slot_duration_minutes: slot,
        active: true,
    }
}

fn w(start: &str, end: &str) -> TimeWindow {
    TimeWindow::parse(start, end).unwrap()
}

#[test]
fn test_day_of_week_starts_on_sunday() {
    assert_eq!(day_of_week(date(2025, 6, 1)), 0); // Sunday
    assert_eq!(day_of_week(date(2025, 6, 2)), 1); // Monday
    assert_eq!(day_of_week(date(2025, 6, 7)), 6); // Saturday
}

#[test]
fn test_tiles_morning_block_into_half_hours() {
    let slots = tile_entry(&entry(Uuid::new_v4(), 1, (9, 0), (12, 0), 30)).unwrap();

    assert_eq!(slots.len(), 6);
    assert_eq!(slots[0], w("09:00", "09:30"));
    assert_eq!(slots[5], w("11:30", "12:00"));
}

#[test]
fn test_trailing_partial_slot_is_dropped() {
    let slots = tile_entry(&entry(Uuid::new_v4(), 1, (9, 0), (10, 50), 30)).unwrap();

    assert_eq!(slots, vec![w("09:00", "09:30"), w("09:30", "10:00"), w("10:00", "10:30")]);
}

#[test]
fn test_overlapping_entries_are_merged_and_deduplicated() {
    let doctor = Uuid::new_v4();
    let entries = vec![
        entry(doctor, 1, (10, 0), (12, 0), 30),
        entry(doctor, 1, (9, 0), (11, 0), 30),
    ];

    let slots = tile_entries(&entries, 1).unwrap();

    assert_eq!(
        slots,
        vec![
            w("09:00", "09:30"),
            w("09:30", "10:00"),
            w("10:00", "10:30"),
            w("10:30", "11:00"),
            w("11:00", "11:30"),
            w("11:30", "12:00"),
        ]
    );
}

#[test]
fn test_inactive_and_other_day_entries_are_ignored() {
    let doctor = Uuid::new_v4();
    let mut inactive = entry(doctor, 1, (14, 0), (15, 0), 30);
    inactive.active = false;
    let entries = vec![entry(doctor, 2, (9, 0), (10, 0), 30), inactive];

    assert!(tile_entries(&entries, 1).unwrap().is_empty());
}

#[test]
fn test_malformed_stored_entry_is_a_hard_failure() {
    let broken = entry(Uuid::new_v4(), 1, (9, 0), (12, 0), 0);
    assert_matches!(tile_entry(&broken), Err(DoctorError::InvalidTemplateEntry(_)));
}

#[test]
fn test_template_entry_validation() {
    let ok = CreateTemplateEntryRequest {
        day_of_week: 1,
        start_time: time(9, 0),
        end_time: time(12, 0),
        slot_duration_minutes: 30,
    };
    assert!(validate_template_entry(&ok).is_ok());

    let bad_day = CreateTemplateEntryRequest { day_of_week: 7, ..ok.clone() };
    assert_matches!(validate_template_entry(&bad_day), Err(DoctorError::InvalidTemplateEntry(_)));

    let inverted = CreateTemplateEntryRequest { start_time: time(12, 0), end_time: time(9, 0), ..ok.clone() };
    assert_matches!(validate_template_entry(&inverted), Err(DoctorError::InvalidTemplateEntry(_)));

    let too_long = CreateTemplateEntryRequest { slot_duration_minutes: 240, ..ok.clone() };
    assert_matches!(validate_template_entry(&too_long), Err(DoctorError::InvalidTemplateEntry(_)));
}

#[tokio::test]
async fn test_doctor_without_entries_has_empty_candidates() {
    let store = Arc::new(InMemoryDoctorStore::new());
    let doctor = Uuid::new_v4();
    store
        .register_doctor(DoctorRecord { id: doctor, full_name: "Dr. Rivera".to_string(), created_at: chrono::Utc::now() })
        .await
        .unwrap();

    let service = AvailabilityTemplateService::new(store);
    let slots = service.candidate_slots(doctor, date(2025, 6, 2)).await.unwrap();
    assert!(slots.is_empty());
}

#[tokio::test]
async fn test_candidate_slots_follow_the_weekday() {
    let store = Arc::new(InMemoryDoctorStore::new());
    let doctor = Uuid::new_v4();
    store
        .register_doctor(DoctorRecord { id: doctor, full_name: "Dr. Rivera".to_string(), created_at: chrono::Utc::now() })
        .await
        .unwrap();
    store.insert_template_entry(entry(doctor, 1, (9, 0), (12, 0), 30)).await.unwrap();

    let service = AvailabilityTemplateService::new(store);

    let monday = service.candidate_slots(doctor, date(2025, 6, 2)).await.unwrap();
    assert_eq!(monday.len(), 6);

    let tuesday = service.candidate_slots(doctor, date(2025, 6, 3)).await.unwrap();
    assert!(tuesday.is_empty());
}
