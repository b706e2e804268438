#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use appointment_cell::models::{Appointment, AppointmentStatus, BookAppointmentRequest};
use appointment_cell::services::{BookingService, InMemoryAppointmentStore};
use doctor_cell::models::{AvailabilityTemplateEntry, Contract, DoctorRecord};
use doctor_cell::services::{DoctorScheduleAdmin, InMemoryDoctorStore};
use shared_config::SchedulingConfig;
use shared_models::TimeWindow;
use shared_utils::test_utils::{clock_at, date, time, TestActor};
use shared_utils::FixedClock;

/// Monday inside the test contract.
pub fn monday() -> NaiveDate {
    date(2025, 6, 2)
}

pub fn window(h: u32, m: u32, minutes: i64) -> TimeWindow {
    TimeWindow::starting_at(time(h, m), minutes).unwrap()
}

pub struct Fixture {
    pub doctors: Arc<InMemoryDoctorStore>,
    pub appointments: Arc<InMemoryAppointmentStore>,
    pub clock: Arc<FixedClock>,
    pub service: Arc<BookingService>,
    pub doctor_id: Uuid,
    pub contract_id: Uuid,
    pub actor: TestActor,
}

impl Fixture {
    /// A doctor contracted for 2025 with Monday 09:00-12:00 in 30 minute slots.
    /// The clock stands at Sunday 2025-06-01 12:00.
    pub async fn new() -> Self {
        Self::with_config(SchedulingConfig::default()).await
    }

    pub async fn with_config(config: SchedulingConfig) -> Self {
        let doctors = Arc::new(InMemoryDoctorStore::new());
        let appointments = Arc::new(InMemoryAppointmentStore::new());
        let clock = clock_at(2025, 6, 1, 12, 0);

        let doctor = doctors
            .register_doctor(DoctorRecord {
                id: Uuid::new_v4(),
                full_name: "Dr. Okafor".to_string(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let contract = doctors
            .insert_contract(Contract {
                id: Uuid::new_v4(),
                doctor_id: doctor.id,
                start_date: date(2025, 1, 1),
                end_date: Some(date(2025, 12, 31)),
                active: true,
            })
            .await
            .unwrap();

        let service = Arc::new(BookingService::new(
            appointments.clone(),
            doctors.clone(),
            clock.clone(),
            config,
        ));

        let fixture = Self {
            doctors,
            appointments,
            clock,
            service,
            doctor_id: doctor.id,
            contract_id: contract.id,
            actor: TestActor::default(),
        };
        fixture.add_template(1, (9, 0), (12, 0), 30).await;
        fixture
    }

    pub async fn add_template(&self, day_of_week: u8, start: (u32, u32), end: (u32, u32), slot: u32) {
        self.doctors
            .insert_template_entry(AvailabilityTemplateEntry {
                id: Uuid::new_v4(),
                doctor_id: self.doctor_id,
                day_of_week,
                start_time: time(start.0, start.1),
                end_time: time(end.0, end.1),
                slot_duration_minutes: slot,
                active: true,
            })
            .await
            .unwrap();
    }

    /// Writes an appointment straight into the store, bypassing validation.
    pub async fn seed(&self, date: NaiveDate, window: TimeWindow, status: AppointmentStatus) -> Appointment {
        let mut appointment = Appointment::scheduled(self.doctor_id, Uuid::new_v4(), date, window, None, Utc::now());
        appointment.status = status;
        self.appointments.insert_unchecked(appointment.clone()).await;
        appointment
    }

    pub fn request(&self, date: NaiveDate, h: u32, m: u32, minutes: u32) -> BookAppointmentRequest {
        BookAppointmentRequest {
            doctor_id: self.doctor_id,
            patient_id: Uuid::new_v4(),
            date,
            start_time: time(h, m),
            duration_minutes: minutes,
        }
    }
}
