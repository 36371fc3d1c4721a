//! Browser surface
//!
//! The JS engine owns the scene, camera and menus. Each rendered frame it
//! calls `frame`, pushes the player position, and reads `snapshot_json` to
//! place tiles and meteors. Menu buttons map to `play`, `forfeit` and
//! `to_menu`.

use glam::Vec3;
use wasm_bindgen::prelude::*;

use crate::config::GameConfig;
use crate::sim::{GameFlow, GamePhase};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console, js_name = warn)]
    fn console_warn(message: &str);
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    match console_log::init_with_level(log::Level::Info) {
        Ok(()) => log::info!("Meteor Fall (wasm) loaded"),
        // Another logger was installed first
        Err(e) => console_warn(&format!("Meteor Fall: logger not installed: {e}")),
    }
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Game handle exported to JS
#[wasm_bindgen]
pub struct MeteorGame {
    flow: GameFlow,
}

#[wasm_bindgen]
impl MeteorGame {
    /// Create with default tuning, or with a (partial) JSON config
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<MeteorGame, JsValue> {
        let config = match config_json {
            Some(json) => GameConfig::from_json(&json).map_err(to_js)?,
            None => GameConfig::default(),
        };
        Ok(Self {
            flow: GameFlow::new(config),
        })
    }

    /// PLAY button
    pub fn play(&mut self) -> Result<(), JsValue> {
        let seed = js_sys::Date::now() as u64;
        self.flow.play(seed).map_err(to_js)?;
        log::info!("Game started with seed: {}", seed);
        Ok(())
    }

    /// In-game LOSE button
    pub fn forfeit(&mut self) -> Result<(), JsValue> {
        self.flow.forfeit().map_err(to_js)
    }

    /// MAIN MENU button
    #[wasm_bindgen(js_name = toMenu)]
    pub fn to_menu(&mut self) -> Result<(), JsValue> {
        self.flow.to_menu().map_err(to_js)
    }

    /// Per-frame tick. Returns the frame's events as JSON.
    pub fn frame(&mut self, dt_ms: f64) -> String {
        let events = self.flow.frame(dt_ms);
        serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string())
    }

    #[wasm_bindgen(js_name = setPlayerPosition)]
    pub fn set_player_position(&mut self, x: f32, y: f32, z: f32) {
        self.flow.set_player_position(Vec3::new(x, y, z));
    }

    /// External fall detection
    #[wasm_bindgen(js_name = playerFell)]
    pub fn player_fell(&mut self) {
        self.flow.report_player_fell();
    }

    /// "start", "game" or "lose"
    pub fn phase(&self) -> String {
        match self.flow.phase() {
            GamePhase::Start => "start",
            GamePhase::Game => "game",
            GamePhase::Lose => "lose",
        }
        .to_string()
    }

    #[wasm_bindgen(js_name = snapshotJson)]
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.flow.snapshot()).map_err(to_js)
    }
}
