// libs/appointment-cell/src/services/amount.rs
use crate::models::AppointmentError;

/// Parse a payment amount from raw caller input.
///
/// Accepts `.` or `,` as the decimal separator and tolerates whitespace
/// grouping ("1 500,50"). The result must be a finite, non-negative decimal;
/// anything else is an `InvalidAmount`.
pub fn parse_amount(raw: &str) -> Result<f64, AppointmentError> {
    let normalized: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if normalized.is_empty() {
        return Err(AppointmentError::InvalidAmount(raw.to_string()));
    }

    let value: f64 = normalized
        .parse()
        .map_err(|_| AppointmentError::InvalidAmount(raw.to_string()))?;

    if !value.is_finite() || value < 0.0 {
        return Err(AppointmentError::InvalidAmount(raw.to_string()));
    }

    Ok(value)
}
