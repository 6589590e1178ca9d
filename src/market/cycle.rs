use bevy::prelude::*;

use crate::config::MarketConfig;
use crate::shared::*;

use super::model::PriceModel;
use super::pattern::{choose_pattern, generate_week};
use super::random::{MarketRng, PriceRng};
use super::schedule::{is_cycle_start, is_rest_day, scheduled_price, slot_for};

// ─────────────────────────────────────────────────────────────────────────────
// Resources & events
// ─────────────────────────────────────────────────────────────────────────────

/// The price currently on offer.
#[derive(Resource, Debug, Clone, Default)]
pub struct CurrentPrice {
    pub price: u32,
    /// Slot the price was read from; `None` on the rest day.
    pub slot: Option<usize>,
}

impl CurrentPrice {
    pub fn get(&self) -> u32 {
        self.price
    }

    pub fn is_rest_day_price(&self) -> bool {
        self.slot.is_none()
    }
}

/// Fired every time the published price is refreshed.
#[derive(Event, Debug, Clone)]
pub struct PriceUpdatedEvent {
    pub price: u32,
    pub slot: Option<usize>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Cycle rules
// ─────────────────────────────────────────────────────────────────────────────

/// A new week is due on the first day of a cycle, or when nothing was ever
/// generated. A week is never generated twice on the same absolute day.
pub fn needs_new_week(model: &PriceModel, day_of_month: u8, absolute_day: u32) -> bool {
    if model.generated_on == Some(absolute_day) {
        return false;
    }
    !model.has_pattern() || is_cycle_start(day_of_month)
}

/// Picks a pattern and rewrites the whole week.
pub fn start_new_week(model: &mut PriceModel, rng: &mut dyn PriceRng, absolute_day: u32) {
    let pattern = choose_pattern(rng);
    let week = generate_week(rng, pattern);
    model.install_week(week, absolute_day);

    info!("[Market] Pattern set to {}", model.pattern);
    for (slot, price) in model.week_prices.iter().enumerate() {
        debug!("[Market]   slot {:>2}: {}", slot, price);
    }
}

/// Looks up the scheduled price and publishes it to the current-price
/// resource, the commodity item, and any listeners.
fn publish_price(
    model: &PriceModel,
    day_of_month: u8,
    time_of_day: u16,
    rng: &mut dyn PriceRng,
    item_id: &str,
    current: &mut CurrentPrice,
    items: &mut ItemRegistry,
    writer: &mut EventWriter<PriceUpdatedEvent>,
) {
    let price = scheduled_price(&model.week_prices, day_of_month, time_of_day, rng);
    let slot = slot_for(day_of_month, time_of_day);

    current.price = price;
    current.slot = slot;

    match slot {
        Some(slot) => info!(
            "[Market] Day {} {:04}: price {} (slot {})",
            day_of_month, time_of_day, price, slot
        ),
        None => info!(
            "[Market] Day {} {:04}: rest-day price {}",
            day_of_month, time_of_day, price
        ),
    }

    if let Err(e) = items.set_sell_price(item_id, price) {
        warn!("[Market] Skipping sell-price update: {}", e);
    }

    writer.send(PriceUpdatedEvent { price, slot });
}

// ─────────────────────────────────────────────────────────────────────────────
// Systems
// ─────────────────────────────────────────────────────────────────────────────

/// Day start: regenerate the week when due, refresh the price, and open the
/// stall only on the rest day.
pub fn on_day_started(
    mut day_events: EventReader<DayStartEvent>,
    calendar: Res<Calendar>,
    config: Res<MarketConfig>,
    mut model: ResMut<PriceModel>,
    rng: ResMut<MarketRng>,
    mut current: ResMut<CurrentPrice>,
    mut stall: ResMut<MarketStall>,
    mut items: ResMut<ItemRegistry>,
    mut price_writer: EventWriter<PriceUpdatedEvent>,
) {
    let rng: &mut MarketRng = rng.into_inner();
    for ev in day_events.read() {
        let today = absolute_day(ev.year, ev.season, ev.day);

        if needs_new_week(&model, ev.day, today) {
            info!(
                "[Market] New week on Day {} {:?} Year {}",
                ev.day, ev.season, ev.year
            );
            start_new_week(&mut model, &mut *rng, today);
        }

        publish_price(
            &model,
            ev.day,
            calendar.time_of_day(),
            &mut *rng,
            &config.item_id,
            &mut current,
            &mut items,
            &mut price_writer,
        );

        let open = is_rest_day(ev.day);
        if stall.set_open(open) {
            info!(
                "[Market] Stall at {:?} ({}, {}) {}",
                stall.map,
                stall.x,
                stall.y,
                if open { "opened" } else { "closed" }
            );
        }
    }
}

/// Noon: switch to the afternoon price.
pub fn on_time_changed(
    mut time_events: EventReader<TimeChangedEvent>,
    calendar: Res<Calendar>,
    config: Res<MarketConfig>,
    model: Res<PriceModel>,
    rng: ResMut<MarketRng>,
    mut current: ResMut<CurrentPrice>,
    mut items: ResMut<ItemRegistry>,
    mut price_writer: EventWriter<PriceUpdatedEvent>,
) {
    let rng: &mut MarketRng = rng.into_inner();
    for ev in time_events.read() {
        if ev.time_of_day != NOON {
            continue;
        }
        if !model.has_pattern() {
            debug!("[Market] Noon with no pattern yet; nothing to publish.");
            continue;
        }
        publish_price(
            &model,
            calendar.day,
            ev.time_of_day,
            &mut *rng,
            &config.item_id,
            &mut current,
            &mut items,
            &mut price_writer,
        );
    }
}
