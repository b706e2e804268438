pub mod booking;
pub mod conflict;
pub mod effects;
pub mod engine;
pub mod lifecycle;
pub mod memory;
pub mod rules;
pub mod store;

pub use booking::BookingService;
pub use conflict::ConflictDetector;
pub use effects::{EffectDispatcher, TracingEffectDispatcher};
pub use engine::AvailabilityEngine;
pub use lifecycle::AppointmentStateMachine;
pub use memory::InMemoryAppointmentStore;
pub use rules::BusinessRuleValidator;
pub use store::{AppointmentStore, InsertOutcome, StoreError, UpdateOutcome};
