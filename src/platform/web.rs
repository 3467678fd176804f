//! wasm-bindgen surface for the browser shell
//!
//! The shell owns the animation frame loop and the DOM. It forwards key
//! events and frame deltas here and reads back a JSON snapshot to draw.

use wasm_bindgen::prelude::*;

use super::input::{direction_for_key, intent_for_key};
use crate::engine::{Arcade, TickToken};
use crate::host::{LocalHost, TokenWallet};
use crate::settings::ArcadeSettings;
use crate::sim::GameKind;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Arcade engine loaded");
}

/// One game cabinet driven by the page
#[wasm_bindgen]
pub struct WebArcade {
    arcade: Arcade<LocalHost>,
    token: Option<TickToken>,
}

#[wasm_bindgen]
impl WebArcade {
    /// `game` is "snake", "maze" or "platformer"
    #[wasm_bindgen(constructor)]
    pub fn new(game: &str, avatar: Option<String>, tokens: u32) -> Result<WebArcade, JsValue> {
        let kind = GameKind::from_str(game)
            .ok_or_else(|| JsValue::from_str(&format!("unknown game '{}'", game)))?;
        let host = LocalHost::new(avatar.map(Into::into), TokenWallet::new(tokens));
        let seed = js_sys::Date::now() as u64;
        Ok(Self {
            arcade: Arcade::new(kind, ArcadeSettings::load(), host, seed),
            token: None,
        })
    }

    /// Pay and start; rejects with a message when tokens are short
    pub fn start(&mut self) -> Result<(), JsValue> {
        let token = self
            .arcade
            .start()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.token = Some(token);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.token = None;
        self.arcade.reset();
    }

    /// Returns true when the key was consumed (caller should preventDefault)
    pub fn key_down(&mut self, key: &str) -> bool {
        match intent_for_key(key) {
            Some(intent) => {
                self.arcade.submit_input(intent);
                true
            }
            None => false,
        }
    }

    pub fn key_up(&mut self, key: &str) {
        if let Some(dir) = direction_for_key(key) {
            self.arcade.release_input(dir);
        }
    }

    /// Same as `key_down`, taking the DOM event directly
    pub fn key_event(&mut self, event: web_sys::KeyboardEvent) {
        if self.key_down(&event.key()) {
            event.prevent_default();
        }
    }

    /// Advance by the frame's elapsed seconds
    pub fn frame(&mut self, dt: f32) {
        if let Some(token) = self.token {
            self.arcade.advance(token, dt);
        }
    }

    pub fn snapshot_json(&self) -> String {
        serde_json::to_string(&self.arcade.snapshot()).unwrap_or_else(|e| {
            log::error!("Snapshot serialization failed: {}", e);
            "null".to_string()
        })
    }

    pub fn phase(&self) -> String {
        format!("{:?}", self.arcade.phase())
    }

    pub fn tokens(&self) -> u32 {
        self.arcade.host().wallet.balance
    }

    pub fn set_free_play(&mut self, enabled: bool) {
        self.arcade.host_mut().wallet.free_play = enabled;
    }

    pub fn high_scores_json(&self) -> String {
        serde_json::to_string(&self.arcade.host().high_scores).unwrap_or_else(|_| "null".into())
    }
}
