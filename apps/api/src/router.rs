use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use appointment_cell::router::appointment_routes;
use appointment_cell::services::{BookingService, InMemoryAppointmentStore, TracingEffectDispatcher};
use doctor_cell::router::doctor_routes;
use doctor_cell::services::InMemoryDoctorStore;
use shared_config::AppConfig;
use shared_utils::Clock;

pub fn create_router(config: &AppConfig, clock: Arc<dyn Clock>) -> Router {
    let doctors = Arc::new(InMemoryDoctorStore::new());
    let appointments = Arc::new(InMemoryAppointmentStore::new());

    let booking = Arc::new(BookingService::new(
        appointments,
        doctors.clone(),
        clock.clone(),
        config.scheduling.clone(),
    ));

    Router::new()
        .route("/", get(|| async { "Clinic scheduling API is running!" }))
        .route("/health", get(health))
        .nest("/doctors", doctor_routes(doctors, clock))
        .nest("/appointments", appointment_routes(booking, Arc::new(TracingEffectDispatcher)))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
