// libs/doctor-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};

use shared_utils::Clock;

use crate::handlers;
use crate::services::{DoctorScheduleAdmin, DoctorScheduleService};

pub fn doctor_routes(store: Arc<dyn DoctorScheduleAdmin>, clock: Arc<dyn Clock>) -> Router {
    let state = Arc::new(DoctorScheduleService::new(store, clock));

    Router::new()
        .route("/", post(handlers::register_doctor))
        .route("/{doctor_id}/contracts", post(handlers::create_contract))
        .route("/{doctor_id}/availability", post(handlers::create_availability))
        .route("/{doctor_id}/availability", get(handlers::list_availability))
        .route("/{doctor_id}/availability/{entry_id}", delete(handlers::deactivate_availability))
        .with_state(state)
}
