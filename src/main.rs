use std::path::Path;
use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use stalk_market::calendar::CalendarPlugin;
use stalk_market::config::{MarketConfig, DEFAULT_CONFIG_FILE};
use stalk_market::data::DataPlugin;
use stalk_market::market::cycle::PriceUpdatedEvent;
use stalk_market::market::StalkMarketPlugin;
use stalk_market::save::{SaveCompleteEvent, SavePlugin};
use stalk_market::shared::*;

fn main() {
    let config = MarketConfig::load_or_default(Path::new(DEFAULT_CONFIG_FILE));

    App::new()
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / 60.0,
            ))),
        )
        .add_plugins(LogPlugin::default())
        .add_plugins(StatesPlugin)
        // Game state
        .init_state::<GameState>()
        // Shared resources
        .insert_resource(config.market_rng())
        .insert_resource(config.market_stall())
        .insert_resource(config.clone())
        .init_resource::<Calendar>()
        .init_resource::<ItemRegistry>()
        .init_resource::<SessionClock>()
        // Events
        .add_event::<DayStartEvent>()
        .add_event::<DayEndEvent>()
        .add_event::<TimeChangedEvent>()
        .add_event::<SessionEndEvent>()
        // Domain plugins
        .add_plugins(CalendarPlugin)
        .add_plugins(StalkMarketPlugin)
        .add_plugins(SavePlugin)
        // Data loading
        .add_plugins(DataPlugin)
        .add_systems(OnEnter(GameState::Playing), apply_time_scale)
        .add_systems(
            Update,
            (report_prices, end_session_after_run_days).run_if(in_state(GameState::Playing)),
        )
        .add_systems(Update, exit_when_saved)
        .run();
}

/// Day count of the current session, for the configured run length.
#[derive(Resource, Debug, Default)]
struct SessionClock {
    first_day: Option<u32>,
    ended: bool,
}

fn apply_time_scale(config: Res<MarketConfig>, mut calendar: ResMut<Calendar>) {
    calendar.time_scale = config.time_scale;
}

fn report_prices(mut price_events: EventReader<PriceUpdatedEvent>, calendar: Res<Calendar>) {
    for ev in price_events.read() {
        match ev.slot {
            Some(slot) => info!(
                "[Host] {:?} {:?} Day {}: sell price {} (slot {})",
                calendar.season, calendar.day_of_week(), calendar.day, ev.price, slot
            ),
            None => info!(
                "[Host] {:?} {:?} Day {}: stall buys at {}",
                calendar.season, calendar.day_of_week(), calendar.day, ev.price
            ),
        }
    }
}

fn end_session_after_run_days(
    mut day_events: EventReader<DayStartEvent>,
    mut session: ResMut<SessionClock>,
    config: Res<MarketConfig>,
    mut session_writer: EventWriter<SessionEndEvent>,
) {
    for ev in day_events.read() {
        let today = absolute_day(ev.year, ev.season, ev.day);
        let first_day = *session.first_day.get_or_insert(today);
        if !session.ended && today - first_day >= config.run_days {
            session.ended = true;
            info!("[Host] Ran {} days. Ending session.", config.run_days);
            session_writer.send(SessionEndEvent);
        }
    }
}

fn exit_when_saved(
    mut save_events: EventReader<SaveCompleteEvent>,
    mut exit_writer: EventWriter<AppExit>,
) {
    for ev in save_events.read() {
        if ev.success {
            exit_writer.send(AppExit::Success);
        } else {
            error!(
                "[Host] Final save failed: {}",
                ev.error_message.as_deref().unwrap_or("unknown error")
            );
            exit_writer.send(AppExit::error());
        }
    }
}
