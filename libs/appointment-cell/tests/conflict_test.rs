mod common;

use assert_matches::assert_matches;
use chrono::Utc;
use uuid::Uuid;

use appointment_cell::models::{Appointment, AppointmentStatus, RejectionReason};
use appointment_cell::services::ConflictDetector;
use shared_models::TimeWindow;

use common::{monday, window};

fn booked(window: TimeWindow) -> Appointment {
    Appointment::scheduled(Uuid::new_v4(), Uuid::new_v4(), monday(), window, None, Utc::now())
}

fn detector() -> ConflictDetector {
    ConflictDetector::new(5, 20)
}

#[test]
fn test_direct_overlap_takes_precedence_over_gap() {
    let existing = vec![booked(window(10, 0, 30))];

    let verdict = detector().find_conflicts(&existing, &window(10, 25, 30), None);

    assert!(!verdict.accepted);
    assert_eq!(verdict.failure_reason, Some(RejectionReason::OverlapConflict));
}

#[test]
fn test_gap_shorter_than_minimum_is_rejected() {
    let existing = vec![booked(window(10, 0, 30))];

    let verdict = detector().find_conflicts(&existing, &window(10, 33, 30), None);

    assert_eq!(verdict.failure_reason, Some(RejectionReason::MinimumGapViolation));
}

#[test]
fn test_gap_applies_before_an_existing_appointment_too() {
    let existing = vec![booked(window(11, 0, 30))];

    assert_eq!(
        detector().find_conflicts(&existing, &window(10, 27, 30), None).failure_reason,
        Some(RejectionReason::MinimumGapViolation)
    );
    assert!(detector().find_conflicts(&existing, &window(10, 25, 30), None).accepted);
}

#[test]
fn test_zero_length_appointment_inside_candidate_is_not_a_gap_violation() {
    // Never overlaps, and its gap to the candidate is negative.
    let existing = vec![booked(window(10, 15, 0))];

    let verdict = detector().find_conflicts(&existing, &window(10, 0, 30), None);

    assert!(verdict.accepted);
    assert_eq!(verdict.failure_reason, None);
}

#[test]
fn test_overlap_anywhere_beats_gap_elsewhere() {
    // The first appointment only violates the gap, the second overlaps outright.
    let existing = vec![booked(window(9, 0, 30)), booked(window(9, 45, 30))];

    let verdict = detector().find_conflicts(&existing, &window(9, 32, 30), None);

    assert_eq!(verdict.failure_reason, Some(RejectionReason::OverlapConflict));
}

#[test]
fn test_back_to_back_allowed_without_gap() {
    let existing = vec![booked(window(10, 0, 30))];

    let verdict = ConflictDetector::new(0, 20).find_conflicts(&existing, &window(10, 30, 30), None);

    assert!(verdict.accepted);
}

#[test]
fn test_inactive_appointments_do_not_block() {
    let mut cancelled = booked(window(10, 0, 30));
    cancelled.status = AppointmentStatus::Cancelled;
    let mut completed = booked(window(10, 30, 30));
    completed.status = AppointmentStatus::Completed;

    let verdict = detector().find_conflicts(&[cancelled, completed], &window(10, 0, 60), None);

    assert!(verdict.accepted);
}

#[test]
fn test_confirmed_appointments_block() {
    let mut confirmed = booked(window(10, 0, 30));
    confirmed.status = AppointmentStatus::Confirmed;

    let verdict = detector().find_conflicts(&[confirmed], &window(10, 15, 15), None);

    assert_eq!(verdict.failure_reason, Some(RejectionReason::OverlapConflict));
}

#[test]
fn test_excluded_appointment_never_conflicts_with_itself() {
    let windows = [window(8, 0, 15), window(10, 0, 30), window(13, 30, 60), window(17, 0, 60)];

    for w in windows {
        let own = booked(w);
        let neighbour = booked(window(15, 0, 30));
        let existing = vec![own.clone(), neighbour];

        let verdict = detector().find_conflicts(&existing, &own.window, Some(own.id));
        assert_matches!(
            verdict.failure_reason,
            None | Some(RejectionReason::MinimumGapViolation),
            "window {} conflicted with itself",
            w
        );
        assert_ne!(verdict.failure_reason, Some(RejectionReason::OverlapConflict));
    }
}

#[test]
fn test_daily_limit_counts_active_appointments_only() {
    // Twenty 15 minute appointments, 5 minutes apart, from 08:00.
    let mut existing: Vec<Appointment> = (0..20)
        .map(|i| booked(window(8 + (i * 20) / 60, (i * 20) % 60, 15)))
        .collect();

    let candidate = window(16, 0, 30);
    assert_eq!(
        detector().find_conflicts(&existing, &candidate, None).failure_reason,
        Some(RejectionReason::DailyLimitExceeded)
    );

    existing[0].status = AppointmentStatus::Cancelled;
    assert!(detector().find_conflicts(&existing, &candidate, None).accepted);
}

#[test]
fn test_daily_limit_ignores_the_excluded_appointment() {
    let existing: Vec<Appointment> = (0..3).map(|i| booked(window(9 + i, 0, 30))).collect();
    let limited = ConflictDetector::new(5, 3);

    assert_eq!(
        limited.find_conflicts(&existing, &window(14, 0, 30), None).failure_reason,
        Some(RejectionReason::DailyLimitExceeded)
    );

    // Moving one of the three appointments elsewhere keeps the count at three.
    let verdict = limited.find_conflicts(&existing, &window(14, 0, 30), Some(existing[0].id));
    assert!(verdict.accepted);
}
