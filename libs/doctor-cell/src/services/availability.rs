// libs/doctor-cell/src/services/availability.rs
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, error};
use uuid::Uuid;

use shared_models::time_window::{minute_of_day, time_from_minutes};
use shared_models::TimeWindow;

use crate::models::{day_of_week, AvailabilityTemplateEntry, CreateTemplateEntryRequest, DoctorError};
use crate::services::source::DoctorScheduleSource;

pub struct AvailabilityTemplateService {
    source: Arc<dyn DoctorScheduleSource>,
}

impl AvailabilityTemplateService {
    pub fn new(source: Arc<dyn DoctorScheduleSource>) -> Self {
        Self { source }
    }

    /// Candidate slots for a doctor on a date, straight from the weekly template.
    /// A doctor with no active entries that weekday has no candidates; that is not an error.
    pub async fn candidate_slots(&self, doctor_id: Uuid, date: NaiveDate) -> Result<Vec<TimeWindow>, DoctorError> {
        let weekday = day_of_week(date);
        let entries = self.source.list_active_template_entries(doctor_id, weekday).await?;

        debug!(
            "Doctor {} has {} active template entries for day {} ({})",
            doctor_id,
            entries.len(),
            weekday,
            date
        );

        tile_entries(&entries, weekday)
    }
}

/// Tiles every active entry for `weekday` into consecutive slots, drops
/// trailing partial slots, and returns them ordered by start with identical
/// windows collapsed.
pub fn tile_entries(entries: &[AvailabilityTemplateEntry], weekday: u8) -> Result<Vec<TimeWindow>, DoctorError> {
    let mut slots = Vec::new();

    for entry in entries.iter().filter(|e| e.active && e.day_of_week == weekday) {
        slots.extend(tile_entry(entry)?);
    }

    slots.sort();
    slots.dedup();
    Ok(slots)
}

pub fn tile_entry(entry: &AvailabilityTemplateEntry) -> Result<Vec<TimeWindow>, DoctorError> {
    if let Err(e) = check_entry_shape(entry.day_of_week, entry) {
        error!("Stored availability entry {} is malformed: {}", entry.id, e);
        return Err(e);
    }

    let step = entry.slot_duration_minutes;
    let end = minute_of_day(entry.end_time);
    let mut cursor = minute_of_day(entry.start_time);
    let mut slots = Vec::new();

    while cursor + step <= end {
        let (Some(slot_start), Some(slot_end)) = (time_from_minutes(cursor), time_from_minutes(cursor + step)) else {
            break;
        };
        let slot = TimeWindow::new(slot_start, slot_end)
            .map_err(|e| DoctorError::InvalidTemplateEntry(e.to_string()))?;
        slots.push(slot);
        cursor += step;
    }

    Ok(slots)
}

/// Creation-time validation of a template entry.
pub fn validate_template_entry(request: &CreateTemplateEntryRequest) -> Result<(), DoctorError> {
    if request.day_of_week > 6 {
        return Err(DoctorError::InvalidTemplateEntry(
            "Day of week must be between 0 (Sunday) and 6 (Saturday)".to_string(),
        ));
    }

    let window = TimeWindow::new(request.start_time, request.end_time)
        .map_err(|e| DoctorError::InvalidTemplateEntry(e.to_string()))?;

    if window.is_empty() {
        return Err(DoctorError::InvalidTemplateEntry(
            "Start time must be before end time".to_string(),
        ));
    }

    if request.slot_duration_minutes == 0 {
        return Err(DoctorError::InvalidTemplateEntry(
            "Slot duration must be positive".to_string(),
        ));
    }

    if i64::from(request.slot_duration_minutes) > window.duration_minutes() {
        return Err(DoctorError::InvalidTemplateEntry(format!(
            "Slot duration of {} minutes does not fit in {}",
            request.slot_duration_minutes, window
        )));
    }

    Ok(())
}

fn check_entry_shape(day: u8, entry: &AvailabilityTemplateEntry) -> Result<(), DoctorError> {
    validate_template_entry(&CreateTemplateEntryRequest {
        day_of_week: day,
        start_time: entry.start_time,
        end_time: entry.end_time,
        slot_duration_minutes: entry.slot_duration_minutes,
    })
}
