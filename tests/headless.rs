//! Headless integration tests for the stalk market.
//!
//! These tests exercise the ECS logic without a window or GPU.
//! They use Bevy's `MinimalPlugins` to tick the app, register only the
//! pure-logic plugins, and verify the weekly cycle end to end.
//!
//! Run with: `cargo test --test headless`

use std::path::PathBuf;
use std::time::Duration;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use stalk_market::calendar::CalendarPlugin;
use stalk_market::config::MarketConfig;
use stalk_market::data::{populate_items, DataPlugin};
use stalk_market::market::cycle::{CurrentPrice, PriceUpdatedEvent};
use stalk_market::market::model::{Pattern, PriceModel};
use stalk_market::market::random::MarketRng;
use stalk_market::market::StalkMarketPlugin;
use stalk_market::save::{read_save, write_save, LoadCompleteEvent, SaveCompleteEvent, SavePlugin};
use stalk_market::shared::*;

// ─────────────────────────────────────────────────────────────────────────────
// Test App Builder
// ─────────────────────────────────────────────────────────────────────────────

fn temp_save_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "stalk_market_headless_{}_{}",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

/// Builds a minimal Bevy app with all shared resources and events registered
/// but NO rendering or windowing. Plugins must be added per-test depending
/// on what's being exercised.
fn build_test_app(save_dir: &PathBuf) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);

    // ── Game State ───────────────────────────────────────────────────────
    app.init_state::<GameState>();

    // ── Shared Resources (mirrors main.rs) ───────────────────────────────
    let config = MarketConfig {
        seed: Some(20_240),
        save_dir: save_dir.to_string_lossy().into_owned(),
        ..Default::default()
    };
    app.insert_resource(config.market_rng())
        .insert_resource(config.market_stall())
        .insert_resource(config)
        .init_resource::<Calendar>()
        .init_resource::<ItemRegistry>();

    // ── Shared Events (mirrors main.rs) ──────────────────────────────────
    app.add_event::<DayStartEvent>()
        .add_event::<DayEndEvent>()
        .add_event::<TimeChangedEvent>()
        .add_event::<SessionEndEvent>();

    app
}

/// Market app with the commodity registered, already in Playing state.
fn build_market_app(name: &str) -> App {
    let dir = temp_save_dir(name);
    let mut app = build_test_app(&dir);
    app.add_plugins(StalkMarketPlugin);
    populate_items(&mut app.world_mut().resource_mut::<ItemRegistry>(), "turnip");
    enter_playing_state(&mut app);
    app
}

/// Transitions the test app to Playing state and ticks once to process it.
fn enter_playing_state(app: &mut App) {
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Playing);
    app.update(); // process state transition
}

fn set_clock(app: &mut App, day: u8, hour: u8, minute: u8) {
    let mut calendar = app.world_mut().resource_mut::<Calendar>();
    calendar.day = day;
    calendar.hour = hour;
    calendar.minute = minute;
}

/// Sends a DayStartEvent for `day` of Spring, year 1, and processes it.
fn start_day(app: &mut App, day: u8) {
    app.world_mut().send_event(DayStartEvent {
        day,
        season: Season::Spring,
        year: 1,
    });
    app.update();
}

fn declining_week() -> PriceModel {
    PriceModel {
        pattern: Pattern::Declining,
        week_prices: [100, 96, 92, 88, 84, 80, 76, 72, 68, 64, 60, 56],
        high_index: None,
        generated_on: Some(0),
    }
}

fn current_price(app: &App) -> u32 {
    app.world().resource::<CurrentPrice>().get()
}

// ─────────────────────────────────────────────────────────────────────────────
// Boot
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_headless_boot_reaches_playing_with_fresh_market() {
    let dir = temp_save_dir("boot");
    let mut app = build_test_app(&dir);
    app.add_plugins(DataPlugin);
    app.add_plugins(SavePlugin);
    app.add_plugins(StalkMarketPlugin);

    // First update enters Loading (data + save load); second applies NextState.
    app.update();
    app.update();

    let state = app.world().resource::<State<GameState>>();
    assert_eq!(state.get(), &GameState::Playing);

    let turnip = app.world().resource::<ItemRegistry>().get("turnip").cloned();
    assert!(turnip.is_some(), "Commodity should be registered during boot");

    let loads: Vec<LoadCompleteEvent> = app
        .world_mut()
        .resource_mut::<Events<LoadCompleteEvent>>()
        .drain()
        .collect();
    assert_eq!(loads.len(), 1);
    assert!(loads[0].success);
    assert!(!loads[0].found, "Empty save dir should start a fresh market");
    assert!(!app.world().resource::<PriceModel>().has_pattern());
}

// ─────────────────────────────────────────────────────────────────────────────
// Day start
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_first_day_generates_week_and_serves_monday_morning() {
    let mut app = build_market_app("first_day");
    set_clock(&mut app, 1, 6, 0);

    start_day(&mut app, 1);

    let model = app.world().resource::<PriceModel>().clone();
    assert!(model.has_pattern(), "Day 1 must generate a pattern");
    assert_eq!(model.generated_on, Some(0));
    assert!(model.week_prices.iter().all(|p| *p > 0));
    assert_eq!(current_price(&app), model.week_prices[0]);

    let turnip = app.world().resource::<ItemRegistry>().get("turnip").unwrap().sell_price;
    assert_eq!(turnip, model.week_prices[0], "Sell price follows the market");
    assert!(!app.world().resource::<MarketStall>().open);
}

#[test]
fn test_midweek_day_reads_stored_slot_without_regenerating() {
    let mut app = build_market_app("midweek");
    app.insert_resource(declining_week());
    set_clock(&mut app, 3, 13, 0);

    start_day(&mut app, 3);

    assert_eq!(*app.world().resource::<PriceModel>(), declining_week());
    assert_eq!(current_price(&app), 80, "Wednesday afternoon is slot 5");
}

#[test]
fn test_no_pattern_midweek_generates_immediately() {
    let mut app = build_market_app("late_start");
    set_clock(&mut app, 4, 6, 0);

    start_day(&mut app, 4);

    let model = app.world().resource::<PriceModel>();
    assert!(model.has_pattern());
    assert_eq!(model.generated_on, Some(3));
    assert_eq!(current_price(&app), model.week_prices[6]);
}

#[test]
fn test_rest_day_rolls_price_and_opens_stall() {
    let mut app = build_market_app("rest_day");
    app.insert_resource(declining_week());
    set_clock(&mut app, 7, 6, 0);

    start_day(&mut app, 7);

    let price = current_price(&app);
    assert!((45..55).contains(&price), "rest-day price {}", price);
    assert!(app.world().resource::<CurrentPrice>().is_rest_day_price());
    assert!(app.world().resource::<MarketStall>().open, "Stall opens on the rest day");
    assert_eq!(*app.world().resource::<PriceModel>(), declining_week());

    set_clock(&mut app, 8, 6, 0);
    start_day(&mut app, 8);
    assert!(!app.world().resource::<MarketStall>().open, "Stall closes when the week turns");
}

#[test]
fn test_cycle_start_rewrites_whole_week() {
    let mut app = build_market_app("new_week");
    let mut stale = declining_week();
    stale.week_prices = [1; SLOTS_PER_WEEK];
    app.insert_resource(stale);
    set_clock(&mut app, 8, 6, 0);

    start_day(&mut app, 8);

    let model = app.world().resource::<PriceModel>();
    assert_eq!(model.generated_on, Some(7));
    assert!(model.week_prices.iter().all(|p| *p > 1), "All 12 slots rewritten: {:?}", model.week_prices);
    assert_eq!(current_price(&app), model.week_prices[0]);
}

#[test]
fn test_repeated_day_start_same_day_keeps_week() {
    let mut app = build_market_app("same_day");
    set_clock(&mut app, 1, 6, 0);
    start_day(&mut app, 1);
    let first = app.world().resource::<PriceModel>().clone();

    start_day(&mut app, 1);

    assert_eq!(*app.world().resource::<PriceModel>(), first);
}

// ─────────────────────────────────────────────────────────────────────────────
// Time changes
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_noon_switches_to_afternoon_slot() {
    let mut app = build_market_app("noon");
    app.insert_resource(declining_week());
    set_clock(&mut app, 2, 6, 0);
    start_day(&mut app, 2);
    assert_eq!(current_price(&app), 92, "Tuesday morning is slot 2");

    set_clock(&mut app, 2, 11, 50);
    app.world_mut().send_event(TimeChangedEvent { time_of_day: 1150 });
    app.update();
    assert_eq!(current_price(&app), 92, "Only noon refreshes the price");

    set_clock(&mut app, 2, 12, 0);
    app.world_mut().send_event(TimeChangedEvent { time_of_day: NOON });
    app.update();
    assert_eq!(current_price(&app), 88, "Tuesday afternoon is slot 3");
}

#[test]
fn test_noon_before_any_pattern_publishes_nothing() {
    let mut app = build_market_app("noon_unset");
    set_clock(&mut app, 2, 12, 0);

    app.world_mut().send_event(TimeChangedEvent { time_of_day: NOON });
    app.update();

    let events = app.world().resource::<Events<PriceUpdatedEvent>>();
    assert!(events.is_empty());
    assert_eq!(current_price(&app), 0);
}

#[test]
fn test_unknown_item_keeps_simulation_running() {
    let dir = temp_save_dir("unknown_item");
    let mut app = build_test_app(&dir);
    app.add_plugins(StalkMarketPlugin);
    app.insert_resource(declining_week());
    enter_playing_state(&mut app);
    set_clock(&mut app, 2, 6, 0);

    // The registry has no commodity; the write-back is skipped.
    start_day(&mut app, 2);

    assert_eq!(current_price(&app), 92);
    assert!(app.world().resource::<ItemRegistry>().get("turnip").is_none());
}

// ─────────────────────────────────────────────────────────────────────────────
// Persistence
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_session_end_saves_active_slot() {
    let dir = temp_save_dir("session_end");
    let mut app = build_test_app(&dir);
    app.add_plugins(SavePlugin);
    app.add_plugins(StalkMarketPlugin);
    app.update(); // boot load (fresh)

    app.insert_resource(declining_week());
    app.world_mut().send_event(SessionEndEvent);
    app.update();

    let saves: Vec<SaveCompleteEvent> = app
        .world_mut()
        .resource_mut::<Events<SaveCompleteEvent>>()
        .drain()
        .collect();
    assert_eq!(saves.len(), 1);
    assert!(saves[0].success, "{:?}", saves[0].error_message);

    let file = read_save(&dir, 0).unwrap().expect("slot 0 written");
    assert_eq!(file.price_model, declining_week());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_reload_restores_week_and_resumes_midweek() {
    let dir = temp_save_dir("reload");
    let mut calendar = Calendar::default();
    calendar.day = 3;
    calendar.hour = 6;
    write_save(&dir, 0, &calendar, &declining_week()).unwrap();

    let mut app = build_test_app(&dir);
    app.add_plugins(SavePlugin);
    app.add_plugins(StalkMarketPlugin);
    app.add_plugins(CalendarPlugin);
    populate_items(&mut app.world_mut().resource_mut::<ItemRegistry>(), "turnip");
    app.update(); // boot load

    assert_eq!(*app.world().resource::<PriceModel>(), declining_week());
    assert_eq!(app.world().resource::<Calendar>().day, 3);

    // Entering Playing announces the loaded day.
    enter_playing_state(&mut app);
    app.update();

    assert_eq!(*app.world().resource::<PriceModel>(), declining_week());
    assert_eq!(current_price(&app), 84, "Wednesday morning is slot 4");

    let _ = std::fs::remove_dir_all(&dir);
}

// ─────────────────────────────────────────────────────────────────────────────
// Full week on the clock
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_clock_drives_a_full_week() {
    let dir = temp_save_dir("full_week");
    let mut app = build_test_app(&dir);
    app.add_plugins(CalendarPlugin);
    app.add_plugins(StalkMarketPlugin);
    populate_items(&mut app.world_mut().resource_mut::<ItemRegistry>(), "turnip");

    // 0.25 s per frame at 240 game-minutes per second = one game-hour per frame.
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(250)));
    app.world_mut().resource_mut::<Calendar>().time_scale = 240.0;
    app.insert_resource(MarketRng::seeded(77));

    enter_playing_state(&mut app);

    let mut stall_seen_open = false;
    let mut week_one = None;
    for _ in 0..400 {
        app.update();

        let calendar = app.world().resource::<Calendar>().clone();
        let model = app.world().resource::<PriceModel>().clone();
        if calendar.day == 1 && calendar.hour >= 8 && week_one.is_none() {
            assert!(model.has_pattern());
            week_one = Some(model.clone());
        }
        if calendar.day == 7 && calendar.hour >= 8 {
            stall_seen_open |= app.world().resource::<MarketStall>().open;
            assert_eq!(Some(&model), week_one.as_ref(), "Week is fixed until the cycle ends");
        }
        if calendar.day == 8 && calendar.hour >= 8 {
            break;
        }
    }

    let calendar = app.world().resource::<Calendar>();
    assert_eq!(calendar.day, 8);
    assert!(stall_seen_open, "Stall should open on day 7");

    let model = app.world().resource::<PriceModel>();
    assert_eq!(model.generated_on, Some(7), "Day 8 starts a new week");
    assert!(!app.world().resource::<MarketStall>().open);

    let turnip = app.world().resource::<ItemRegistry>().get("turnip").unwrap().sell_price;
    assert_eq!(turnip, current_price(&app), "Sell price tracks the published price");
}
