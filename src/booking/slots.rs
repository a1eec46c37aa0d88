/// Bookable half-hour slots, 09:00 through 21:00 inclusive. The closing
/// hour gets no half-past slot.
pub const OPENING_HOUR: u8 = 9;
pub const CLOSING_HOUR: u8 = 21;

pub fn time_slots() -> Vec<String> {
    let mut slots = Vec::new();
    for hour in OPENING_HOUR..=CLOSING_HOUR {
        slots.push(format!("{hour:02}:00"));
        if hour < CLOSING_HOUR {
            slots.push(format!("{hour:02}:30"));
        }
    }
    slots
}

pub fn is_valid_slot(time: &str) -> bool {
    time_slots().iter().any(|slot| slot == time)
}
