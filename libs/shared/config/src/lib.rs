use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    pub port: u16,
    pub default_slot_interval_minutes: i64,
    pub default_appointment_duration_minutes: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            bind_address: env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(|| {
                    warn!("PORT not set or invalid, defaulting to 3000");
                    3000
                }),
            default_slot_interval_minutes: env::var("DEFAULT_SLOT_INTERVAL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or_else(|| {
                    warn!("DEFAULT_SLOT_INTERVAL_MINUTES not set, defaulting to 30");
                    30
                }),
            default_appointment_duration_minutes: env::var("DEFAULT_APPOINTMENT_DURATION_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or_else(|| {
                    warn!("DEFAULT_APPOINTMENT_DURATION_MINUTES not set, defaulting to 30");
                    30
                }),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
            default_slot_interval_minutes: 30,
            default_appointment_duration_minutes: 30,
        }
    }
}
