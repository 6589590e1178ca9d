//! Weekly price generation.
//!
//! Each pattern fills all twelve half-day slots. Percentages are taken with
//! integer division first (`value / 100 * pct`), so a band never includes the
//! sub-1% remainder of its base value.

use super::model::{GeneratedWeek, Pattern, WeekPrices};
use super::random::PriceRng;
use crate::shared::SLOTS_PER_WEEK;

/// Percentage bands shared by the two spike patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpikeBands {
    pub highest: u32,
    pub high: u32,
    pub low: u32,
    pub lowest: u32,
}

pub const LARGE_SPIKE: SpikeBands = SpikeBands {
    highest: 40,
    high: 20,
    low: 10,
    lowest: 5,
};

pub const SMALL_SPIKE: SpikeBands = SpikeBands {
    highest: 20,
    high: 10,
    low: 5,
    lowest: 2,
};

/// Spike peak and its value range.
const PEAK_INDEX: (u32, u32) = (2, 9);
const PEAK_PRICE: (u32, u32) = (110, 600);

/// `value / 100 * pct`, truncating before multiplying.
pub fn percent_of(value: u32, pct: u32) -> u32 {
    value / 100 * pct
}

/// Draw from `[low, high)`; a collapsed range pins to `low`.
fn draw_below(rng: &mut dyn PriceRng, low: u32, high: u32) -> u32 {
    if high <= low {
        return low;
    }
    rng.next_in_range(low, high)
}

/// Draw from the inclusive band between `a` and `b`, in whichever order they come.
pub fn draw_between(rng: &mut dyn PriceRng, a: u32, b: u32) -> u32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    rng.next_in_range(lo, hi + 1)
}

/// Uniform pick among the four week patterns.
pub fn choose_pattern(rng: &mut dyn PriceRng) -> Pattern {
    let roll = rng.next_in_range(0, Pattern::ALL.len() as u32) as usize;
    Pattern::ALL[roll.min(Pattern::ALL.len() - 1)]
}

/// Fill a full week for `pattern`. `Unset` yields an all-zero week.
pub fn generate_week(rng: &mut dyn PriceRng, pattern: Pattern) -> GeneratedWeek {
    let mut prices = [0; SLOTS_PER_WEEK];
    let high_index = match pattern {
        Pattern::Unset => None,
        Pattern::Random => {
            fill_random(rng, &mut prices);
            None
        }
        Pattern::Declining => {
            fill_declining(rng, &mut prices);
            None
        }
        Pattern::LargeSpike => Some(fill_spike(rng, &mut prices, LARGE_SPIKE)),
        Pattern::SmallSpike => Some(fill_spike(rng, &mut prices, SMALL_SPIKE)),
    };

    GeneratedWeek {
        pattern,
        prices,
        high_index,
    }
}

/// Three falling opening prices, one jump, two small drops, then noise.
fn fill_random(rng: &mut dyn PriceRng, prices: &mut WeekPrices) {
    prices[0] = draw_below(rng, 50, 80);

    for i in 1..=2 {
        prices[i] = draw_below(rng, 50, prices[i - 1]);
    }

    prices[3] = draw_below(rng, 110, 600);

    for i in 4..=5 {
        let drop = draw_below(rng, 4, 20);
        prices[i] = prices[i - 1].saturating_sub(drop).max(1);
    }

    for price in prices.iter_mut().skip(6) {
        *price = draw_below(rng, 40, 600);
    }
}

/// Drops by 3 or 4 every half day.
fn fill_declining(rng: &mut dyn PriceRng, prices: &mut WeekPrices) {
    prices[0] = draw_below(rng, 90, 110);

    for i in 1..SLOTS_PER_WEEK {
        let drop = draw_below(rng, 3, 5);
        prices[i] = prices[i - 1].saturating_sub(drop).max(1);
    }
}

/// Climb to a single peak, then fall away. Returns the peak slot.
///
/// Every band is ordered before drawing, then held inside the strictly
/// monotone window: a rising slot stays above its predecessor and leaves one
/// unit per remaining step below the peak; a falling slot stays below its
/// predecessor and above zero.
fn fill_spike(rng: &mut dyn PriceRng, prices: &mut WeekPrices, bands: SpikeBands) -> usize {
    let high = draw_below(rng, PEAK_INDEX.0, PEAK_INDEX.1) as usize;
    let peak = draw_below(rng, PEAK_PRICE.0, PEAK_PRICE.1);
    prices[high] = peak;

    prices[0] = draw_between(
        rng,
        peak - percent_of(peak, bands.highest),
        peak - percent_of(peak, bands.high),
    );

    for i in 1..high {
        let prev = prices[i - 1];
        let (floor, ceiling) = if i + 2 >= high {
            (
                prev + percent_of(prev, bands.high),
                peak - percent_of(peak, bands.low),
            )
        } else {
            (
                prev + percent_of(prev, bands.low),
                peak - percent_of(peak, bands.lowest),
            )
        };
        let drawn = draw_between(rng, floor, ceiling);
        let steps_left = (high - i) as u32;
        prices[i] = drawn.clamp(prev + 1, peak - steps_left);
    }

    for i in (high + 1)..SLOTS_PER_WEEK {
        let prev = prices[i - 1];
        let drawn = if i == high + 1 {
            draw_between(
                rng,
                peak - percent_of(peak, bands.high),
                peak - percent_of(peak, bands.low),
            )
        } else {
            draw_between(
                rng,
                prev - percent_of(prev, bands.low),
                prev - percent_of(prev, bands.lowest),
            )
        };
        prices[i] = drawn.clamp(1, prev.saturating_sub(1).max(1));
    }

    high
}
