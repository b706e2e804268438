pub mod availability;
pub mod contract;
pub mod doctor;
pub mod memory;
pub mod source;

pub use availability::AvailabilityTemplateService;
pub use contract::ContractValidator;
pub use doctor::DoctorScheduleService;
pub use memory::InMemoryDoctorStore;
pub use source::{DoctorScheduleAdmin, DoctorScheduleSource};
