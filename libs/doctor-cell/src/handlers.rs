// libs/doctor-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_utils::RequestContext;

use crate::models::{CreateContractRequest, CreateTemplateEntryRequest, DoctorError, RegisterDoctorRequest};
use crate::services::DoctorScheduleService;

pub type DoctorState = Arc<DoctorScheduleService>;

impl From<DoctorError> for AppError {
    fn from(e: DoctorError) -> Self {
        match e {
            DoctorError::NotFound => AppError::NotFound("Doctor not found".to_string()),
            DoctorError::TemplateEntryNotFound => AppError::NotFound("Availability entry not found".to_string()),
            DoctorError::InvalidTemplateEntry(msg)
            | DoctorError::InvalidContract(msg)
            | DoctorError::InvalidRequest(msg) => AppError::ValidationError(msg),
            DoctorError::OverlappingContract { existing } => AppError::Rejected {
                reason: "ConflictingContracts".to_string(),
                message: format!("Contract overlaps active contract {}", existing),
            },
            DoctorError::Store(msg) => AppError::Database(msg),
        }
    }
}

pub async fn register_doctor(
    State(service): State<DoctorState>,
    ctx: RequestContext,
    Json(request): Json<RegisterDoctorRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let doctor = service.register_doctor(request, &ctx).await?;
    Ok((StatusCode::CREATED, Json(json!({ "doctor": doctor }))))
}

pub async fn create_contract(
    State(service): State<DoctorState>,
    Path(doctor_id): Path<Uuid>,
    ctx: RequestContext,
    Json(request): Json<CreateContractRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let contract = service.add_contract(doctor_id, request, &ctx).await?;
    Ok((StatusCode::CREATED, Json(json!({ "contract": contract }))))
}

pub async fn create_availability(
    State(service): State<DoctorState>,
    Path(doctor_id): Path<Uuid>,
    ctx: RequestContext,
    Json(request): Json<CreateTemplateEntryRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let entry = service.add_template_entry(doctor_id, request, &ctx).await?;
    Ok((StatusCode::CREATED, Json(json!({ "availability": entry }))))
}

pub async fn list_availability(
    State(service): State<DoctorState>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let entries = service.list_template_entries(doctor_id).await?;
    Ok(Json(json!({ "availability": entries })))
}

pub async fn deactivate_availability(
    State(service): State<DoctorState>,
    Path((doctor_id, entry_id)): Path<(Uuid, Uuid)>,
    ctx: RequestContext,
) -> Result<Json<Value>, AppError> {
    let entry = service.deactivate_template_entry(doctor_id, entry_id, &ctx).await?;
    Ok(Json(json!({ "availability": entry })))
}
