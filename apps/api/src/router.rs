use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use appointment_cell::services::booking::AppointmentBookingService;
use schedule_cell::router::schedule_routes;
use schedule_cell::services::availability::AvailabilityService;

pub fn create_router(
    booking_service: Arc<AppointmentBookingService>,
    availability_service: Arc<AvailabilityService>,
) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic scheduling API is running!" }))
        .nest("/appointments", appointment_routes(booking_service))
        .nest("/doctors", schedule_routes(availability_service))
}
