//! Runtime configuration, read from a RON file next to the working directory.
//!
//! ```ron
//! (
//!     item_id: "turnip",
//!     stall: (map: Farm, x: 64, y: 15),
//!     seed: Some(1234),
//!     save_dir: "saves",
//!     save_slot: 0,
//!     time_scale: 600.0,
//!     run_days: 28,
//! )
//! ```

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::market::random::MarketRng;
use crate::shared::{MapId, MarketStall};

pub const DEFAULT_CONFIG_FILE: &str = "stalk_market.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StallLocation {
    pub map: MapId,
    pub x: i32,
    pub y: i32,
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Item whose sell price follows the market.
    pub item_id: String,
    pub stall: StallLocation,
    /// Fixed seed for the price stream; entropy when absent.
    pub seed: Option<u64>,
    pub save_dir: String,
    pub save_slot: u8,
    /// Game-minutes per real second.
    pub time_scale: f32,
    /// Days the headless host simulates before ending the session.
    pub run_days: u32,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            item_id: "turnip".to_string(),
            stall: StallLocation {
                map: MapId::Farm,
                x: 64,
                y: 15,
            },
            seed: None,
            save_dir: "saves".to_string(),
            save_slot: 0,
            time_scale: 10.0,
            run_days: 7,
        }
    }
}

impl MarketConfig {
    pub fn from_ron_str(text: &str) -> Result<Self, String> {
        ron::from_str(text).map_err(|e| format!("Config parse failed: {}", e))
    }

    /// Reads `path`. A missing file is not an error and yields defaults.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Read failed for {}: {}", path.display(), e))?;
        Self::from_ron_str(&text)
    }

    /// Like `load`, but falls back to defaults with a warning.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("[Config] {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    pub fn market_rng(&self) -> MarketRng {
        match self.seed {
            Some(seed) => MarketRng::seeded(seed),
            None => MarketRng::from_entropy(),
        }
    }

    pub fn market_stall(&self) -> MarketStall {
        MarketStall {
            map: self.stall.map,
            x: self.stall.x,
            y: self.stall.y,
            open: false,
        }
    }
}
