//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (key names to intents)
//! - The wasm-bindgen surface the browser shell drives

pub mod input;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use input::{direction_for_key, intent_for_key};
