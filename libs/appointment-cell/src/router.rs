// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{self, AppointmentState};
use crate::services::{BookingService, EffectDispatcher};

pub fn appointment_routes(service: Arc<BookingService>, effects: Arc<dyn EffectDispatcher>) -> Router {
    let state = AppointmentState { service, effects };

    Router::new()
        .route("/", post(handlers::book_appointment))
        .route("/validate", post(handlers::validate_booking))
        .route("/doctors/{doctor_id}/slots", get(handlers::list_available_slots))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/transition", post(handlers::transition_appointment))
        .route("/{appointment_id}/reschedule", post(handlers::reschedule_appointment))
        .route("/{appointment_id}/revalidate", post(handlers::revalidate_appointment))
        .with_state(state)
}
