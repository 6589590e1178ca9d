use bevy::prelude::*;
use serde::{Deserialize, Serialize};
#[cfg(not(target_arch = "wasm32"))]
use std::fs;
use std::path::{Path, PathBuf};
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::MarketConfig;
use crate::market::model::PriceModel;
use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// PUBLIC TYPES
// ═══════════════════════════════════════════════════════════════════════

pub const SAVE_VERSION: u32 = 1;

/// The one record the market persists per save slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSaveFile {
    pub version: u32,
    pub slot: u8,
    pub save_timestamp: u64,
    pub calendar: Calendar,
    pub price_model: PriceModel,
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════

/// Request a save of the active state to `slot`.
#[derive(Event, Debug, Clone)]
pub struct SaveRequestEvent {
    pub slot: u8,
}

/// Sent by SavePlugin after a save completes (success or failure).
#[derive(Event, Debug, Clone)]
pub struct SaveCompleteEvent {
    pub slot: u8,
    pub success: bool,
    pub error_message: Option<String>,
}

/// Sent by SavePlugin after the boot-time load.
#[derive(Event, Debug, Clone)]
pub struct LoadCompleteEvent {
    pub slot: u8,
    /// False when the slot had no saved market yet.
    pub found: bool,
    pub success: bool,
    pub error_message: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════
// RESOURCES
// ═══════════════════════════════════════════════════════════════════════

/// Tracks which save slot is currently active.
#[derive(Resource, Debug, Clone, Default)]
pub struct ActiveSaveSlot {
    pub slot: u8,
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app
            // Resources
            .init_resource::<ActiveSaveSlot>()
            .init_resource::<MarketConfig>()
            .init_resource::<PriceModel>()
            // Events emitted/received by this plugin
            .add_event::<SaveRequestEvent>()
            .add_event::<SaveCompleteEvent>()
            .add_event::<LoadCompleteEvent>()
            // Restore the slot before the session's first day starts
            .add_systems(OnEnter(GameState::Loading), load_active_slot)
            // Session end and manual saves, in any state
            .add_systems(Update, (save_on_session_end, handle_save_request).chain());
    }
}

// ═══════════════════════════════════════════════════════════════════════
// FILESYSTEM HELPERS
// ═══════════════════════════════════════════════════════════════════════

pub fn slot_path(dir: &Path, slot: u8) -> PathBuf {
    dir.join(format!("market_slot_{}.json", slot))
}

#[cfg(not(target_arch = "wasm32"))]
fn ensure_saves_dir(dir: &Path) -> Result<(), std::io::Error> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(target_arch = "wasm32")]
fn current_timestamp() -> u64 {
    0
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Result<web_sys::Storage, String> {
    web_sys::window()
        .ok_or_else(|| "No browser window".to_string())?
        .local_storage()
        .map_err(|_| "localStorage is not accessible".to_string())?
        .ok_or_else(|| "localStorage is unavailable".to_string())
}

#[cfg(target_arch = "wasm32")]
fn storage_key(slot: u8) -> String {
    format!("stalk_market_slot_{}", slot)
}

// ═══════════════════════════════════════════════════════════════════════
// SAVE / LOAD LOGIC
// ═══════════════════════════════════════════════════════════════════════

fn encode(slot: u8, calendar: &Calendar, model: &PriceModel) -> Result<String, String> {
    let file = MarketSaveFile {
        version: SAVE_VERSION,
        slot,
        save_timestamp: current_timestamp(),
        calendar: calendar.clone(),
        price_model: model.clone(),
    };
    serde_json::to_string_pretty(&file).map_err(|e| format!("Serialization failed: {}", e))
}

fn decode(slot: u8, json: &str) -> Result<MarketSaveFile, String> {
    let file: MarketSaveFile =
        serde_json::from_str(json).map_err(|e| format!("Deserialization failed: {}", e))?;

    // Version check — future versions can add migration here
    if file.version != SAVE_VERSION {
        warn!(
            "[Save] Slot {} has version {} but current version is {}. Attempting to load anyway.",
            slot, file.version, SAVE_VERSION
        );
    }
    Ok(file)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn write_save(
    dir: &Path,
    slot: u8,
    calendar: &Calendar,
    model: &PriceModel,
) -> Result<(), String> {
    ensure_saves_dir(dir).map_err(|e| format!("Could not create saves directory: {}", e))?;

    let json = encode(slot, calendar, model)?;

    let path = slot_path(dir, slot);
    // Write to a temp file first, then rename for atomicity
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, &json)
        .map_err(|e| format!("Write failed for {}: {}", tmp_path.display(), e))?;
    fs::rename(&tmp_path, &path).map_err(|e| format!("Rename failed: {}", e))?;

    Ok(())
}

#[cfg(target_arch = "wasm32")]
pub fn write_save(
    _dir: &Path,
    slot: u8,
    calendar: &Calendar,
    model: &PriceModel,
) -> Result<(), String> {
    let json = encode(slot, calendar, model)?;
    local_storage()?
        .set_item(&storage_key(slot), &json)
        .map_err(|_| format!("localStorage write failed for slot {}", slot))
}

/// `Ok(None)` when the slot has never been saved.
#[cfg(not(target_arch = "wasm32"))]
pub fn read_save(dir: &Path, slot: u8) -> Result<Option<MarketSaveFile>, String> {
    let path = slot_path(dir, slot);
    if !path.exists() {
        return Ok(None);
    }
    let json = fs::read_to_string(&path)
        .map_err(|e| format!("Read failed for {}: {}", path.display(), e))?;
    decode(slot, &json).map(Some)
}

#[cfg(target_arch = "wasm32")]
pub fn read_save(_dir: &Path, slot: u8) -> Result<Option<MarketSaveFile>, String> {
    let json = local_storage()?
        .get_item(&storage_key(slot))
        .map_err(|_| format!("localStorage read failed for slot {}", slot))?;
    json.map(|json| decode(slot, &json)).transpose()
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

/// Restores the configured slot. A slot with no file leaves a fresh, unset
/// model in place; a broken file is reported and also starts fresh.
fn load_active_slot(
    config: Res<MarketConfig>,
    mut active_slot: ResMut<ActiveSaveSlot>,
    mut calendar: ResMut<Calendar>,
    mut model: ResMut<PriceModel>,
    mut complete_events: EventWriter<LoadCompleteEvent>,
) {
    let slot = config.save_slot;
    active_slot.slot = slot;
    info!("[Save] Loading market from slot {}...", slot);

    match read_save(Path::new(&config.save_dir), slot) {
        Ok(Some(file)) => {
            *calendar = file.calendar;
            *model = file.price_model;
            info!(
                "[Save] Load from slot {} succeeded. Pattern {} on Day {} {:?} Year {}.",
                slot, model.pattern, calendar.day, calendar.season, calendar.year
            );
            complete_events.send(LoadCompleteEvent {
                slot,
                found: true,
                success: true,
                error_message: None,
            });
        }
        Ok(None) => {
            *model = PriceModel::default();
            info!("[Save] Slot {} has no market yet. Starting fresh.", slot);
            complete_events.send(LoadCompleteEvent {
                slot,
                found: false,
                success: true,
                error_message: None,
            });
        }
        Err(e) => {
            *model = PriceModel::default();
            warn!("[Save] Load from slot {} FAILED: {}. Starting fresh.", slot, e);
            complete_events.send(LoadCompleteEvent {
                slot,
                found: false,
                success: false,
                error_message: Some(e),
            });
        }
    }
}

/// The session's end is the market's only save checkpoint.
fn save_on_session_end(
    mut session_events: EventReader<SessionEndEvent>,
    mut save_writer: EventWriter<SaveRequestEvent>,
    active_slot: Res<ActiveSaveSlot>,
) {
    for _ev in session_events.read() {
        info!("[Save] Session ended. Saving slot {}.", active_slot.slot);
        save_writer.send(SaveRequestEvent {
            slot: active_slot.slot,
        });
    }
}

fn handle_save_request(
    mut save_events: EventReader<SaveRequestEvent>,
    mut complete_events: EventWriter<SaveCompleteEvent>,
    mut active_slot: ResMut<ActiveSaveSlot>,
    config: Res<MarketConfig>,
    calendar: Res<Calendar>,
    model: Res<PriceModel>,
) {
    for ev in save_events.read() {
        let slot = ev.slot;
        active_slot.slot = slot;

        info!("[Save] Saving to slot {}...", slot);

        match write_save(Path::new(&config.save_dir), slot, &calendar, &model) {
            Ok(()) => {
                info!("[Save] Save to slot {} succeeded.", slot);
                complete_events.send(SaveCompleteEvent {
                    slot,
                    success: true,
                    error_message: None,
                });
            }
            Err(e) => {
                warn!("[Save] Save to slot {} FAILED: {}", slot, e);
                complete_events.send(SaveCompleteEvent {
                    slot,
                    success: false,
                    error_message: Some(e),
                });
            }
        }
    }
}
