//! Market domain — the weekly commodity price cycle.
//!
//! Responsible for:
//! - Rolling a new price pattern and twelve half-day prices each week
//! - Publishing the price in effect at day start and at noon
//! - Opening the stall on the rest day
//!
//! All cross-domain communication goes through `crate::shared::*` events and resources.

use bevy::prelude::*;

use crate::config::MarketConfig;
use crate::shared::*;

pub mod cycle;
pub mod model;
pub mod pattern;
pub mod random;
pub mod schedule;

use cycle::{on_day_started, on_time_changed, CurrentPrice, PriceUpdatedEvent};
use model::PriceModel;
use random::MarketRng;

pub struct StalkMarketPlugin;

impl Plugin for StalkMarketPlugin {
    fn build(&self, app: &mut App) {
        // ── Resources ──────────────────────────────────────────────────────
        // Existing values (loaded config, seeded stream) are kept.
        app.init_resource::<MarketConfig>()
            .init_resource::<MarketRng>()
            .init_resource::<PriceModel>()
            .init_resource::<CurrentPrice>()
            .init_resource::<MarketStall>()
            .init_resource::<ItemRegistry>();

        // ── Internal Events ────────────────────────────────────────────────
        app.add_event::<PriceUpdatedEvent>();

        // ── Systems: Playing state ─────────────────────────────────────────
        app.add_systems(
            Update,
            // A new week must be in place before any noon lookup of the same frame.
            (on_day_started, on_time_changed)
                .chain()
                .run_if(in_state(GameState::Playing)),
        );

        info!("[Market] StalkMarketPlugin registered.");
    }
}
