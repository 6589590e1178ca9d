//! Shared resources, events, and states for the stalk market.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain directly.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE — top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
    Paused,
}

// ═══════════════════════════════════════════════════════════════════════
// CALENDAR
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub fn next(self) -> Self {
        match self {
            Season::Spring => Season::Summer,
            Season::Summer => Season::Fall,
            Season::Fall => Season::Winter,
            Season::Winter => Season::Spring,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Season::Spring => 0,
            Season::Summer => 1,
            Season::Fall => 2,
            Season::Winter => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    /// Weekday of a 1-based day of the month. Every season starts on a Monday.
    pub fn from_day_of_month(day: u8) -> Self {
        match (day.max(1) - 1) % DAYS_PER_CYCLE {
            0 => DayOfWeek::Monday,
            1 => DayOfWeek::Tuesday,
            2 => DayOfWeek::Wednesday,
            3 => DayOfWeek::Thursday,
            4 => DayOfWeek::Friday,
            5 => DayOfWeek::Saturday,
            _ => DayOfWeek::Sunday,
        }
    }
}

#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct Calendar {
    pub year: u32,
    pub season: Season,
    pub day: u8,           // 1-28
    pub hour: u8,          // 6-25 (25 = 1:00 AM next day)
    pub minute: u8,        // 0-59
    pub time_scale: f32,   // game-minutes per real-second (default ~10)
    pub time_paused: bool,
    pub elapsed_real_seconds: f32, // accumulator for sub-minute ticks
}

impl Default for Calendar {
    fn default() -> Self {
        Self {
            year: 1,
            season: Season::Spring,
            day: 1,
            hour: 6,
            minute: 0,
            time_scale: 10.0,
            time_paused: false,
            elapsed_real_seconds: 0.0,
        }
    }
}

impl Calendar {
    pub fn day_of_week(&self) -> DayOfWeek {
        DayOfWeek::from_day_of_month(self.day)
    }

    pub fn total_days_elapsed(&self) -> u32 {
        absolute_day(self.year, self.season, self.day)
    }

    /// Clock time as `hour * 100 + minute` (600 = 6:00 AM, 2600 = 2:00 AM).
    pub fn time_of_day(&self) -> u16 {
        self.hour as u16 * 100 + self.minute as u16
    }
}

/// Days since Spring 1 of year 1.
pub fn absolute_day(year: u32, season: Season, day: u8) -> u32 {
    (year.max(1) - 1) * 112 + season.index() as u32 * 28 + (day.max(1) as u32 - 1)
}

// ═══════════════════════════════════════════════════════════════════════
// WORLD
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapId {
    Farm,
    Town,
    Beach,
}

/// The stall where the commodity is bought. The host decides how an open
/// stall is drawn; the market only flips the flag.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct MarketStall {
    pub map: MapId,
    pub x: i32,
    pub y: i32,
    pub open: bool,
}

impl Default for MarketStall {
    fn default() -> Self {
        Self {
            map: MapId::Farm,
            x: 64,
            y: 15,
            open: false,
        }
    }
}

impl MarketStall {
    /// Returns true when the flag actually changed.
    pub fn set_open(&mut self, open: bool) -> bool {
        if self.open == open {
            return false;
        }
        self.open = open;
        true
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ITEMS
// ═══════════════════════════════════════════════════════════════════════

pub type ItemId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemCategory {
    Seed,
    Crop,
    Commodity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub category: ItemCategory,
    pub sell_price: u32,
    pub buy_price: Option<u32>, // None = not buyable
    pub stack_size: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceWriteError {
    UnknownItem(ItemId),
}

impl fmt::Display for PriceWriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceWriteError::UnknownItem(id) => write!(f, "no item registered as '{}'", id),
        }
    }
}

impl std::error::Error for PriceWriteError {}

#[derive(Resource, Debug, Clone, Default)]
pub struct ItemRegistry {
    pub items: HashMap<ItemId, ItemDef>,
}

impl ItemRegistry {
    pub fn get(&self, id: &str) -> Option<&ItemDef> {
        self.items.get(id)
    }

    /// Overwrites the sell price of a registered item in place.
    pub fn set_sell_price(&mut self, id: &str, price: u32) -> Result<(), PriceWriteError> {
        let def = self
            .items
            .get_mut(id)
            .ok_or_else(|| PriceWriteError::UnknownItem(id.to_string()))?;
        def.sell_price = price;
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS — lifecycle signals delivered by the host
// ═══════════════════════════════════════════════════════════════════════

#[derive(Event, Debug, Clone)]
pub struct DayStartEvent {
    pub day: u8,
    pub season: Season,
    pub year: u32,
}

#[derive(Event, Debug, Clone)]
pub struct DayEndEvent {
    pub day: u8,
    pub season: Season,
    pub year: u32,
}

#[derive(Event, Debug, Clone)]
pub struct TimeChangedEvent {
    pub time_of_day: u16,
}

#[derive(Event, Debug, Clone)]
pub struct SessionEndEvent;

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const DAYS_PER_SEASON: u8 = 28;
pub const DAYS_PER_CYCLE: u8 = 7;
pub const SLOTS_PER_WEEK: usize = 12;

pub const DAY_START_HOUR: u8 = 6;
pub const DAY_END_HOUR: u8 = 26;
pub const NOON: u16 = 1200;
/// In-game minutes between two TimeChangedEvents.
pub const TIME_STEP_MINUTES: u8 = 10;
