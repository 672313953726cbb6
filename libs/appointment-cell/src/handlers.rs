// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{
    AppointmentError, AppointmentSearchQuery, CreateAppointmentRequest, CreateCategoryRequest,
    RescheduleAppointmentRequest, TransitionStatusRequest, UpdateAmountRequest,
    UpdateAppointmentRequest,
};
use crate::services::booking::AppointmentBookingService;

// ==============================================================================
// QUERY PARAMETER STRUCTS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct ConflictCheckQuery {
    pub doctor_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub exclude_appointment_id: Option<Uuid>,
}

fn map_appointment_error(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        AppointmentError::SlotConflict | AppointmentError::StaleStatus { .. } => {
            AppError::Conflict(e.to_string())
        }
        AppointmentError::ValidationError(msg) => AppError::ValidationError(msg),
        AppointmentError::PastSlot
        | AppointmentError::ForbiddenTransition { .. }
        | AppointmentError::FieldLocked { .. }
        | AppointmentError::InvalidAmount(_)
        | AppointmentError::MissingCancellationReason => AppError::BadRequest(e.to_string()),
    }
}

// ==============================================================================
// APPOINTMENT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_appointment(
    State(service): State<Arc<AppointmentBookingService>>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = service
        .create_appointment(request)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(service): State<Arc<AppointmentBookingService>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = service
        .get_appointment(appointment_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn search_appointments(
    State(service): State<Arc<AppointmentBookingService>>,
    Query(query): Query<AppointmentSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let appointments = service.search_appointments(&query).await;

    Ok(Json(json!({
        "success": true,
        "appointments": appointments,
        "count": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(service): State<Arc<AppointmentBookingService>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = service
        .update_appointment(appointment_id, request)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(service): State<Arc<AppointmentBookingService>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = service
        .reschedule_appointment(appointment_id, request)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment rescheduled"
    })))
}

#[axum::debug_handler]
pub async fn transition_status(
    State(service): State<Arc<AppointmentBookingService>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<TransitionStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = service
        .transition_status(appointment_id, request.target_status, &request.payload)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn update_amount(
    State(service): State<Arc<AppointmentBookingService>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateAmountRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = service
        .update_amount(appointment_id, &request.amount)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn get_valid_transitions(
    State(service): State<Arc<AppointmentBookingService>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = service
        .get_appointment(appointment_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "current_status": appointment.status,
        "valid_transitions": service.valid_transitions(appointment.status)
    })))
}

#[axum::debug_handler]
pub async fn check_appointment_conflicts(
    State(service): State<Arc<AppointmentBookingService>>,
    Query(query): Query<ConflictCheckQuery>,
) -> Result<Json<Value>, AppError> {
    let conflict = service
        .check_conflict(
            query.doctor_id,
            query.start_time,
            query.duration_minutes,
            query.exclude_appointment_id,
        )
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "has_conflict": conflict.is_some(),
        "conflicting_appointment_id": conflict
    })))
}

// ==============================================================================
// TREATMENT CATEGORY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_categories(
    State(service): State<Arc<AppointmentBookingService>>,
) -> Result<Json<Value>, AppError> {
    let categories = service.list_categories().await;

    Ok(Json(json!({
        "success": true,
        "categories": categories
    })))
}

#[axum::debug_handler]
pub async fn create_category(
    State(service): State<Arc<AppointmentBookingService>>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<Json<Value>, AppError> {
    let category = service
        .create_category(request)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "category": category
    })))
}
