pub mod amount;
pub mod booking;
pub mod conflict;
pub mod lifecycle;

pub use amount::parse_amount;
pub use booking::AppointmentBookingService;
pub use conflict::ConflictDetector;
pub use lifecycle::AppointmentLifecycleService;
