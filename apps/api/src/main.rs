use std::net::SocketAddr;
use std::sync::Arc;

use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use appointment_cell::services::booking::AppointmentBookingService;
use appointment_cell::store::{InMemoryAppointmentStore, InMemoryTreatmentCategoryStore};
use schedule_cell::services::availability::AvailabilityService;
use schedule_cell::store::InMemoryScheduleStore;
use shared_config::AppConfig;
use shared_utils::SystemClock;

#[tokio::main]
async fn main() {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting clinic scheduling API server");

    // Load configuration
    let config = AppConfig::from_env();

    // Wire the engine: in-memory stores behind the store seams, one shared
    // clock so nothing reads system time inline.
    let clock = Arc::new(SystemClock);
    let appointment_store = Arc::new(InMemoryAppointmentStore::new());
    let category_store = Arc::new(InMemoryTreatmentCategoryStore::with_defaults());
    let schedule_store = Arc::new(InMemoryScheduleStore::new());

    let booking_service = Arc::new(AppointmentBookingService::new(
        &config,
        appointment_store.clone(),
        category_store,
        clock.clone(),
    ));
    let availability_service = Arc::new(AvailabilityService::new(
        &config,
        schedule_store,
        appointment_store,
        clock,
    ));

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(booking_service, availability_service)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .expect("invalid bind address");
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
