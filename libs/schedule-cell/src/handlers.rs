// libs/schedule-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{ScheduleError, UpdateScheduleRequest};
use crate::services::availability::AvailabilityService;

#[derive(Debug, Deserialize)]
pub struct AvailabilityQueryParams {
    pub date: NaiveDate,
    pub duration_minutes: Option<i64>,
}

fn map_schedule_error(e: ScheduleError) -> AppError {
    match e {
        ScheduleError::InvalidSchedule(msg) => AppError::BadRequest(msg),
        ScheduleError::ValidationError(msg) => AppError::ValidationError(msg),
    }
}

#[axum::debug_handler]
pub async fn get_schedule(
    State(service): State<Arc<AvailabilityService>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let schedule = service.get_schedule(doctor_id).await;

    Ok(Json(json!({
        "success": true,
        "schedule": schedule
    })))
}

#[axum::debug_handler]
pub async fn update_schedule(
    State(service): State<Arc<AvailabilityService>>,
    Path(doctor_id): Path<Uuid>,
    Json(request): Json<UpdateScheduleRequest>,
) -> Result<Json<Value>, AppError> {
    let schedule = service
        .update_schedule(doctor_id, request)
        .await
        .map_err(map_schedule_error)?;

    Ok(Json(json!({
        "success": true,
        "schedule": schedule
    })))
}

#[axum::debug_handler]
pub async fn get_availability(
    State(service): State<Arc<AvailabilityService>>,
    Path(doctor_id): Path<Uuid>,
    Query(params): Query<AvailabilityQueryParams>,
) -> Result<Json<Value>, AppError> {
    let slots = service
        .get_availability(doctor_id, params.date, params.duration_minutes)
        .await
        .map_err(map_schedule_error)?;

    Ok(Json(json!({
        "success": true,
        "doctor_id": doctor_id,
        "date": params.date,
        "slots": slots
    })))
}
