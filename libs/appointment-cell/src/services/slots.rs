// libs/appointment-cell/src/services/slots.rs

/// First bookable hour of the fixed daily schedule.
pub const OPENING_HOUR: u32 = 9;
/// Hour the schedule closes; the last slot starts 30 minutes before.
pub const CLOSING_HOUR: u32 = 17;

/// The full ordered slot calendar for any facility-day: 09:00 through 16:30
/// at 30-minute granularity. The schedule is fixed policy, not per-facility
/// configuration, and is regenerated per request rather than stored.
pub fn daily_slots() -> Vec<String> {
    let mut slots = Vec::with_capacity(((CLOSING_HOUR - OPENING_HOUR) * 2) as usize);
    for hour in OPENING_HOUR..CLOSING_HOUR {
        slots.push(format!("{:02}:00", hour));
        slots.push(format!("{:02}:30", hour));
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_has_sixteen_slots() {
        assert_eq!(daily_slots().len(), 16);
    }

    #[test]
    fn calendar_spans_opening_hours_in_order() {
        let slots = daily_slots();
        assert_eq!(slots.first().map(String::as_str), Some("09:00"));
        assert_eq!(slots.last().map(String::as_str), Some("16:30"));

        let mut sorted = slots.clone();
        sorted.sort();
        assert_eq!(slots, sorted);
    }

    #[test]
    fn calendar_is_deterministic() {
        assert_eq!(daily_slots(), daily_slots());
    }
}
