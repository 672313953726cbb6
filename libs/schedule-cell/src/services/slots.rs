// libs/schedule-cell/src/services/slots.rs
use chrono::{NaiveTime, Timelike};

use crate::models::DaySchedule;

/// Candidate start times for one day of a doctor's schedule: every
/// `start + k * interval` whose full interval still fits before the end of
/// the working window. A trailing partial slot is never offered.
///
/// Pure and restartable; a non-working day yields nothing.
pub fn generate_slots(day: &DaySchedule, interval_minutes: i64) -> Vec<NaiveTime> {
    if !day.is_working || interval_minutes <= 0 {
        return Vec::new();
    }

    let (Some(start), Some(end)) = (day.start_time, day.end_time) else {
        return Vec::new();
    };

    // Seconds from midnight in i64, so an oversized interval cannot wrap
    // the arithmetic; it simply never fits the remaining window.
    let interval_secs = interval_minutes.saturating_mul(60);
    let end_secs = i64::from(end.num_seconds_from_midnight());

    let mut slots = Vec::new();
    let mut current = i64::from(start.num_seconds_from_midnight());

    while interval_secs <= end_secs - current {
        // In range by construction.
        if let Some(time) = NaiveTime::from_num_seconds_from_midnight_opt(current as u32, 0) {
            slots.push(time);
        }
        current += interval_secs;
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(hour: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, min, 0).unwrap()
    }

    #[test]
    fn full_working_day_yields_eighteen_half_hour_slots() {
        let day = DaySchedule::working(1, hm(9, 0), hm(18, 0));
        let slots = generate_slots(&day, 30);

        assert_eq!(slots.len(), 18);
        assert_eq!(slots[0], hm(9, 0));
        assert_eq!(slots[17], hm(17, 30));
    }

    #[test]
    fn non_working_day_yields_nothing() {
        let day = DaySchedule::off(0);
        assert!(generate_slots(&day, 30).is_empty());

        // Stray times on a closed day change nothing.
        let day = DaySchedule {
            day_of_week: 0,
            is_working: false,
            start_time: Some(hm(9, 0)),
            end_time: Some(hm(18, 0)),
        };
        assert!(generate_slots(&day, 30).is_empty());
    }

    #[test]
    fn trailing_partial_slot_is_dropped() {
        let day = DaySchedule::working(2, hm(9, 0), hm(10, 15));
        let slots = generate_slots(&day, 30);

        assert_eq!(slots, vec![hm(9, 0), hm(9, 30)]);
    }

    #[test]
    fn exact_fit_keeps_the_final_slot() {
        let day = DaySchedule::working(3, hm(9, 0), hm(10, 0));
        let slots = generate_slots(&day, 30);

        assert_eq!(slots, vec![hm(9, 0), hm(9, 30)]);
    }

    #[test]
    fn oversized_interval_yields_nothing() {
        let day = DaySchedule::working(1, hm(9, 0), hm(18, 0));

        // Larger than any day; u32 seconds would wrap here.
        assert!(generate_slots(&day, 71_582_788).is_empty());
        assert!(generate_slots(&day, i64::MAX).is_empty());
        assert!(generate_slots(&day, 24 * 60 + 1).is_empty());
    }

    #[test]
    fn window_shorter_than_interval_yields_nothing() {
        let day = DaySchedule::working(4, hm(9, 0), hm(9, 20));
        assert!(generate_slots(&day, 30).is_empty());
    }

    #[test]
    fn generation_is_deterministic() {
        let day = DaySchedule::working(5, hm(8, 30), hm(12, 0));
        assert_eq!(generate_slots(&day, 45), generate_slots(&day, 45));
    }
}
