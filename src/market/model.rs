use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shared::SLOTS_PER_WEEK;

/// Shape of a week's price curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Pattern {
    #[default]
    #[serde(rename = "none")]
    Unset,
    #[serde(rename = "rnd")]
    Random,
    #[serde(rename = "dec")]
    Declining,
    #[serde(rename = "lrg")]
    LargeSpike,
    #[serde(rename = "sml")]
    SmallSpike,
}

impl Pattern {
    /// The four patterns a new week can be drawn from, in draw order.
    pub const ALL: [Pattern; 4] = [
        Pattern::Random,
        Pattern::Declining,
        Pattern::LargeSpike,
        Pattern::SmallSpike,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Pattern::Unset => "none",
            Pattern::Random => "rnd",
            Pattern::Declining => "dec",
            Pattern::LargeSpike => "lrg",
            Pattern::SmallSpike => "sml",
        }
    }

    pub fn is_set(self) -> bool {
        self != Pattern::Unset
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Twelve half-day prices, Monday AM through Saturday PM.
pub type WeekPrices = [u32; SLOTS_PER_WEEK];

/// The persisted weekly market state for one save.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceModel {
    pub pattern: Pattern,
    pub week_prices: WeekPrices,
    /// Peak slot of a spike week.
    #[serde(default)]
    pub high_index: Option<usize>,
    /// Absolute day (`Calendar::total_days_elapsed`) the week was generated on.
    #[serde(default)]
    pub generated_on: Option<u32>,
}

impl PriceModel {
    pub fn has_pattern(&self) -> bool {
        self.pattern.is_set()
    }

    /// Replaces the whole week at once.
    pub fn install_week(&mut self, week: GeneratedWeek, generated_on: u32) {
        self.pattern = week.pattern;
        self.week_prices = week.prices;
        self.high_index = week.high_index;
        self.generated_on = Some(generated_on);
    }
}

/// Output of one pattern generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedWeek {
    pub pattern: Pattern,
    pub prices: WeekPrices,
    pub high_index: Option<usize>,
}
