// libs/schedule-cell/src/models.rs
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One weekday entry of a doctor's recurring schedule. Either a closed day
/// or an open interval `[start_time, end_time)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySchedule {
    pub day_of_week: i32, // 0 = Sunday, 1 = Monday, etc.
    pub is_working: bool,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

impl DaySchedule {
    pub fn working(day_of_week: i32, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            day_of_week,
            is_working: true,
            start_time: Some(start_time),
            end_time: Some(end_time),
        }
    }

    pub fn off(day_of_week: i32) -> Self {
        Self {
            day_of_week,
            is_working: false,
            start_time: None,
            end_time: None,
        }
    }
}

/// A doctor's full recurring week: exactly 7 entries indexed Sunday=0
/// through Saturday=6. Replaced wholesale on update, never patched per day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklySchedule {
    pub doctor_id: Uuid,
    pub days: Vec<DaySchedule>,
    pub updated_at: DateTime<Utc>,
}

impl WeeklySchedule {
    /// Fallback for doctors without a saved schedule: weekdays 09:00-18:00,
    /// weekend off.
    pub fn default_for(doctor_id: Uuid) -> Self {
        let start = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let end = NaiveTime::from_hms_opt(18, 0, 0).unwrap();

        let days = (0..7)
            .map(|day| {
                if (1..=5).contains(&day) {
                    DaySchedule::working(day, start, end)
                } else {
                    DaySchedule::off(day)
                }
            })
            .collect();

        Self {
            doctor_id,
            days,
            updated_at: DateTime::<Utc>::MIN_UTC,
        }
    }

    pub fn day(&self, day_of_week: i32) -> Option<&DaySchedule> {
        self.days.iter().find(|d| d.day_of_week == day_of_week)
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.days.len() != 7 {
            return Err(ScheduleError::InvalidSchedule(format!(
                "Schedule must contain exactly 7 day entries, got {}",
                self.days.len()
            )));
        }

        for (index, day) in self.days.iter().enumerate() {
            if day.day_of_week != index as i32 {
                return Err(ScheduleError::InvalidSchedule(format!(
                    "Day entry {} has day_of_week {}",
                    index, day.day_of_week
                )));
            }

            if day.is_working {
                match (day.start_time, day.end_time) {
                    (Some(start), Some(end)) if start < end => {}
                    (Some(start), Some(end)) => {
                        return Err(ScheduleError::InvalidSchedule(format!(
                            "Working day {} has start {} not before end {}",
                            day.day_of_week, start, end
                        )));
                    }
                    _ => {
                        return Err(ScheduleError::InvalidSchedule(format!(
                            "Working day {} is missing start or end time",
                            day.day_of_week
                        )));
                    }
                }
            } else if day.start_time.is_some() || day.end_time.is_some() {
                return Err(ScheduleError::InvalidSchedule(format!(
                    "Non-working day {} must not carry times",
                    day.day_of_week
                )));
            }
        }

        Ok(())
    }
}

/// Time range occupied by an existing non-cancelled appointment. Derived on
/// demand, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub appointment_id: Uuid,
}

/// Classification of one candidate slot. `busy` and `past` are deliberately
/// independent flags; a slot on today's grid can be both, and callers choose
/// their own display precedence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotClassification {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub busy: bool,
    pub past: bool,
    pub available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateScheduleRequest {
    pub days: Vec<DaySchedule>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScheduleError {
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
