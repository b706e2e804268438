// libs/doctor-cell/src/models.rs
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::time_window::hhmm;
use shared_models::{TimeWindow, TimeWindowError};

// ==============================================================================
// DOCTOR RECORDS
// ==============================================================================

/// The slice of a doctor record the scheduling core needs. Profile data lives
/// with the persistence collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoctorRecord {
    pub id: Uuid,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterDoctorRequest {
    pub full_name: String,
}

// ==============================================================================
// WEEKLY AVAILABILITY TEMPLATE
// ==============================================================================

/// Recurring weekly window ("Mondays 09:00-12:00") tiled into fixed slots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailabilityTemplateEntry {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub day_of_week: u8, // 0 = Sunday, 1 = Monday, etc.
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub slot_duration_minutes: u32,
    pub active: bool,
}

impl AvailabilityTemplateEntry {
    pub fn window(&self) -> Result<TimeWindow, TimeWindowError> {
        TimeWindow::new(self.start_time, self.end_time)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTemplateEntryRequest {
    pub day_of_week: u8,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub slot_duration_minutes: u32,
}

// ==============================================================================
// EMPLOYMENT CONTRACTS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contract {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>, // None = open-ended
    pub active: bool,
}

impl Contract {
    /// Whether `date` falls inside the validity window, ignoring the active flag.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && self.end_date.map_or(true, |end| date <= end)
    }

    pub fn overlaps(&self, other: &Contract) -> bool {
        let self_before_other_ends = other.end_date.map_or(true, |end| self.start_date <= end);
        let other_before_self_ends = self.end_date.map_or(true, |end| other.start_date <= end);
        self_before_other_ends && other_before_self_ends
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateContractRequest {
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub active: Option<bool>,
}

/// Outcome of resolving which contract governs a date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractStatus {
    Contracted { contract_id: Uuid },
    NotContracted,
    /// More than one active contract covers the date: a data-integrity failure.
    Conflicting { contract_ids: Vec<Uuid> },
}

impl ContractStatus {
    pub fn is_contracted(&self) -> bool {
        matches!(self, ContractStatus::Contracted { .. })
    }
}

// ==============================================================================
// HELPERS
// ==============================================================================

/// Day-of-week index used by template entries (0 = Sunday ... 6 = Saturday).
pub fn day_of_week(date: NaiveDate) -> u8 {
    match date.weekday() {
        Weekday::Sun => 0,
        Weekday::Mon => 1,
        Weekday::Tue => 2,
        Weekday::Wed => 3,
        Weekday::Thu => 4,
        Weekday::Fri => 5,
        Weekday::Sat => 6,
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Availability entry not found")]
    TemplateEntryNotFound,

    #[error("Invalid availability entry: {0}")]
    InvalidTemplateEntry(String),

    #[error("Invalid contract: {0}")]
    InvalidContract(String),

    #[error("Contract overlaps active contract {existing}")]
    OverlappingContract { existing: Uuid },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Store error: {0}")]
    Store(String),
}
