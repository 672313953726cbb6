// libs/schedule-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use crate::handlers;
use crate::services::availability::AvailabilityService;

pub fn schedule_routes(service: Arc<AvailabilityService>) -> Router {
    Router::new()
        .route("/{doctor_id}/schedule", get(handlers::get_schedule))
        .route("/{doctor_id}/schedule", put(handlers::update_schedule))
        .route("/{doctor_id}/availability", get(handlers::get_availability))
        .with_state(service)
}
