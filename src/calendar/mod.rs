//! Calendar domain — the host clock that drives the market.
//!
//! Responsible for:
//! - Advancing game time (minutes, hours, days, seasons, years)
//! - Sending TimeChangedEvent every ten in-game minutes
//! - Sending DayEndEvent at 2 AM, then DayStartEvent for the new day
//! - Sending one DayStartEvent for the loaded day when a session starts
//! - Pausing / unpausing time based on GameState

use bevy::prelude::*;

use crate::shared::*;

pub struct CalendarPlugin;

impl Plugin for CalendarPlugin {
    fn build(&self, app: &mut App) {
        app
            // Announce the loaded day once the session starts playing
            .add_systems(OnEnter(GameState::Playing), (resume_time, announce_session_day))
            // Pause time whenever we leave Playing state
            .add_systems(OnExit(GameState::Playing), pause_time)
            // Core time tick — only runs while Playing and NOT paused
            .add_systems(
                Update,
                tick_time
                    .run_if(in_state(GameState::Playing))
                    .run_if(time_not_paused),
            );
    }
}

// ─── Run Conditions ───────────────────────────────────────────────────────────

fn time_not_paused(calendar: Res<Calendar>) -> bool {
    !calendar.time_paused
}

// ─── State transition hooks ───────────────────────────────────────────────────

fn resume_time(mut calendar: ResMut<Calendar>) {
    calendar.time_paused = false;
    info!("[Calendar] Time resumed — {}:{:02} Day {} {:?} Year {}",
        calendar.hour, calendar.minute, calendar.day, calendar.season, calendar.year);
}

fn pause_time(mut calendar: ResMut<Calendar>) {
    calendar.time_paused = true;
    info!("[Calendar] Time paused");
}

/// The host signals "day started" when a save is first entered, not only at
/// rollover. Returning from Paused is not a new session.
fn announce_session_day(
    calendar: Res<Calendar>,
    mut announced: Local<bool>,
    mut day_start_writer: EventWriter<DayStartEvent>,
) {
    if *announced {
        return;
    }
    *announced = true;

    info!(
        "[Calendar] Session started on Day {} {:?} Year {}",
        calendar.day, calendar.season, calendar.year
    );
    day_start_writer.send(DayStartEvent {
        day: calendar.day,
        season: calendar.season,
        year: calendar.year,
    });
}

// ─── Main time-tick system ────────────────────────────────────────────────────

/// Accumulates real delta-seconds and converts them to in-game minutes.
///
/// Default time_scale = 10.0, meaning 1 real second = 10 game-minutes.
/// Day spans 6:00 AM → 26:00 (2:00 AM next day) = 20 game-hours = 1200 min.
fn tick_time(
    time: Res<Time>,
    mut calendar: ResMut<Calendar>,
    mut clock: ClockWriters,
) {
    let delta = time.delta_secs();
    calendar.elapsed_real_seconds += delta;

    // Guard against zero / negative time_scale
    let secs_per_game_minute = if calendar.time_scale > 0.0 {
        1.0 / calendar.time_scale
    } else {
        1.0 / 10.0
    };

    while calendar.elapsed_real_seconds >= secs_per_game_minute {
        calendar.elapsed_real_seconds -= secs_per_game_minute;
        advance_one_minute(&mut calendar, &mut clock);
    }
}

/// Writers for every signal the clock emits.
#[derive(bevy::ecs::system::SystemParam)]
pub struct ClockWriters<'w> {
    pub time_changed: EventWriter<'w, TimeChangedEvent>,
    pub day_end: EventWriter<'w, DayEndEvent>,
    pub day_start: EventWriter<'w, DayStartEvent>,
}

/// Advances the calendar by exactly one game-minute.
/// Handles minute -> hour -> day rollovers.
fn advance_one_minute(calendar: &mut Calendar, clock: &mut ClockWriters) {
    calendar.minute += 1;

    if calendar.minute >= 60 {
        calendar.minute = 0;
        calendar.hour += 1;

        // 2:00 AM = hour 26 -> force end of day
        if calendar.hour >= DAY_END_HOUR {
            end_day(calendar, clock);
            return;
        }
    }

    if calendar.minute % TIME_STEP_MINUTES == 0 {
        clock.time_changed.send(TimeChangedEvent {
            time_of_day: calendar.time_of_day(),
        });
    }
}

/// Emits DayEndEvent for the ended day, advances day/season/year, resets the
/// clock to 6:00 AM and emits DayStartEvent for the new day.
fn end_day(calendar: &mut Calendar, clock: &mut ClockWriters) {
    clock.day_end.send(DayEndEvent {
        day: calendar.day,
        season: calendar.season,
        year: calendar.year,
    });

    info!(
        "[Calendar] Day ended — Day {} {:?} Year {}",
        calendar.day, calendar.season, calendar.year
    );

    advance_day(calendar);

    clock.day_start.send(DayStartEvent {
        day: calendar.day,
        season: calendar.season,
        year: calendar.year,
    });

    info!(
        "[Calendar] New day: Day {} {:?} Year {} ({:?})",
        calendar.day, calendar.season, calendar.year, calendar.day_of_week()
    );
}

/// Moves the calendar to 6:00 AM of the next day.
pub fn advance_day(calendar: &mut Calendar) {
    calendar.day += 1;
    calendar.hour = DAY_START_HOUR;
    calendar.minute = 0;
    calendar.elapsed_real_seconds = 0.0;

    // Season rollover
    if calendar.day > DAYS_PER_SEASON {
        calendar.day = 1;
        let old_season = calendar.season;
        calendar.season = calendar.season.next();

        info!(
            "[Calendar] Season changed: {:?} -> {:?} (Year {})",
            old_season, calendar.season, calendar.year
        );

        // Year rollover happens when Spring begins again
        if calendar.season == Season::Spring {
            calendar.year += 1;
            info!("[Calendar] New Year! Year {}", calendar.year);
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
