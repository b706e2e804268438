// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::error;
use uuid::Uuid;

use shared_models::error::AppError;
use shared_utils::RequestContext;

use crate::models::{
    AppointmentError, BookAppointmentRequest, RescheduleRequest, RevalidateRequest, SlotQuery, TransitionRequest,
    ValidateBookingRequest,
};
use crate::services::{BookingService, EffectDispatcher};

#[derive(Clone)]
pub struct AppointmentState {
    pub service: Arc<BookingService>,
    pub effects: Arc<dyn EffectDispatcher>,
}

impl From<AppointmentError> for AppError {
    fn from(e: AppointmentError) -> Self {
        if let Some(reason) = e.reason() {
            return AppError::Rejected {
                reason: reason.code().to_string(),
                message: reason.message().to_string(),
            };
        }

        match e {
            AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
            AppointmentError::DoctorNotFound => AppError::NotFound("Doctor not found".to_string()),
            AppointmentError::InvalidRequest(msg) => AppError::ValidationError(msg),
            AppointmentError::ConcurrentModification { expected } => AppError::Rejected {
                reason: "ConcurrentModification".to_string(),
                message: format!("Appointment is no longer {}", expected),
            },
            AppointmentError::SchedulingBusy => {
                AppError::Unavailable("Scheduling is busy for this doctor and date, try again".to_string())
            }
            AppointmentError::Store(msg) => {
                error!("Appointment store failure: {}", msg);
                AppError::Database(msg)
            }
            AppointmentError::Rejected(reason) => AppError::Internal(format!("Unmapped rejection {}", reason)),
            AppointmentError::InvalidTransition { from, to } => {
                AppError::Internal(format!("Unmapped transition {} -> {}", from, to))
            }
        }
    }
}

pub async fn list_available_slots(
    State(state): State<AppointmentState>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<Value>, AppError> {
    let slots = state.service.list_available_slots(doctor_id, query.date).await?;

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "date": query.date,
        "slots": slots,
    })))
}

pub async fn validate_booking(
    State(state): State<AppointmentState>,
    ctx: RequestContext,
    Json(request): Json<ValidateBookingRequest>,
) -> Result<Json<Value>, AppError> {
    let verdict = state
        .service
        .validate_booking(
            request.doctor_id,
            request.date,
            &request.window,
            request.exclude_appointment_id,
            ctx.emergency_override,
        )
        .await?;

    Ok(Json(json!({ "verdict": verdict })))
}

pub async fn book_appointment(
    State(state): State<AppointmentState>,
    ctx: RequestContext,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let outcome = state.service.book(request, &ctx).await?;
    state.effects.dispatch(&outcome.effects).await;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "appointment": outcome.appointment,
            "effects": outcome.effects,
        })),
    ))
}

pub async fn get_appointment(
    State(state): State<AppointmentState>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.service.get_appointment(appointment_id).await?;
    Ok(Json(json!({ "appointment": appointment })))
}

pub async fn transition_appointment(
    State(state): State<AppointmentState>,
    Path(appointment_id): Path<Uuid>,
    ctx: RequestContext,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<Value>, AppError> {
    let outcome = state.service.transition(appointment_id, request.target, &ctx).await?;
    state.effects.dispatch(&outcome.effects).await;

    Ok(Json(json!({ "outcome": outcome })))
}

pub async fn reschedule_appointment(
    State(state): State<AppointmentState>,
    Path(appointment_id): Path<Uuid>,
    ctx: RequestContext,
    Json(request): Json<RescheduleRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let outcome = state.service.reschedule(appointment_id, request, &ctx).await?;
    state.effects.dispatch(&outcome.effects).await;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "appointment": outcome.appointment,
            "effects": outcome.effects,
        })),
    ))
}

pub async fn revalidate_appointment(
    State(state): State<AppointmentState>,
    Path(appointment_id): Path<Uuid>,
    ctx: RequestContext,
    Json(request): Json<RevalidateRequest>,
) -> Result<Json<Value>, AppError> {
    let verdict = state
        .service
        .revalidate(appointment_id, request.date, &request.window, &ctx)
        .await?;

    Ok(Json(json!({ "verdict": verdict })))
}
