use super::model::WeekPrices;
use super::random::PriceRng;
use crate::shared::{DAYS_PER_CYCLE, NOON};

/// Rest-day roll before halving.
const REST_DAY_ROLL: (u32, u32) = (90, 110);

/// Zero-based position of `day_of_month` inside its 7-day cycle.
pub fn weekday_index(day_of_month: u8) -> u8 {
    (day_of_month.max(1) - 1) % DAYS_PER_CYCLE
}

/// The first day of every cycle: 1, 8, 15, 22.
pub fn is_cycle_start(day_of_month: u8) -> bool {
    weekday_index(day_of_month) == 0
}

/// The seventh day of every cycle, which has no stored price.
pub fn is_rest_day(day_of_month: u8) -> bool {
    weekday_index(day_of_month) == DAYS_PER_CYCLE - 1
}

/// Stored slot for a day and time, or `None` on the rest day.
pub fn slot_for(day_of_month: u8, time_of_day: u16) -> Option<usize> {
    if is_rest_day(day_of_month) {
        return None;
    }
    let weekday = weekday_index(day_of_month) as usize;
    if time_of_day < NOON {
        Some(2 * weekday)
    } else {
        Some(2 * weekday + 1)
    }
}

/// A fresh rest-day price, re-rolled on every call.
pub fn roll_rest_day_price(rng: &mut dyn PriceRng) -> u32 {
    rng.next_in_range(REST_DAY_ROLL.0, REST_DAY_ROLL.1) / 2
}

/// The price in effect at `day_of_month` / `time_of_day`.
pub fn scheduled_price(
    week_prices: &WeekPrices,
    day_of_month: u8,
    time_of_day: u16,
    rng: &mut dyn PriceRng,
) -> u32 {
    match slot_for(day_of_month, time_of_day) {
        Some(slot) => week_prices[slot],
        None => roll_rest_day_price(rng),
    }
}
