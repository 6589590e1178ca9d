//! Data layer — populates the item registry at game startup.
//!
//! This plugin runs in OnEnter(GameState::Loading), registers the market
//! commodity and its seed, then transitions the game into GameState::Playing.

use bevy::prelude::*;

use crate::config::MarketConfig;
use crate::shared::*;

/// Price the commodity sells for before the market publishes one.
pub const BASE_SELL_PRICE: u32 = 100;

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Loading), load_all_data);
    }
}

fn load_all_data(
    config: Res<MarketConfig>,
    mut item_registry: ResMut<ItemRegistry>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    info!("[Data] Populating registries…");

    populate_items(&mut item_registry, &config.item_id);
    info!("[Data]   Items loaded: {}", item_registry.items.len());

    info!("[Data] All registries populated. Transitioning to Playing.");
    next_state.set(GameState::Playing);
}

/// Registers the commodity under `commodity_id` plus the seed it grows from.
pub fn populate_items(registry: &mut ItemRegistry, commodity_id: &str) {
    let name = display_name(commodity_id);

    registry.items.insert(
        commodity_id.to_string(),
        ItemDef {
            id: commodity_id.to_string(),
            name: name.clone(),
            description: "Its price changes twice a day. Buy low, sell high.".to_string(),
            category: ItemCategory::Commodity,
            sell_price: BASE_SELL_PRICE,
            buy_price: None,
            stack_size: 99,
        },
    );

    let seed_id = format!("{}_seeds", commodity_id);
    registry.items.insert(
        seed_id.clone(),
        ItemDef {
            id: seed_id,
            name: format!("{} Seeds", name),
            description: format!("Plant these to grow {}.", name.to_lowercase()),
            category: ItemCategory::Seed,
            sell_price: 10,
            buy_price: Some(20),
            stack_size: 99,
        },
    );
}

/// "turnip" -> "Turnip", "giant_stalk" -> "Giant Stalk".
fn display_name(id: &str) -> String {
    id.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
