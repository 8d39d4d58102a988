//! RPC method handler for the Calm Browsing Buddy native host protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be unit-tested independently.
//! `handle_method` decodes the params for each method, forwards them to the
//! coordinator and encodes its reply and effects.

use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::app::App;
use crate::services::settings_store::SettingsStore;
use crate::types::events::{BrowserEvent, Effect, Message};

fn decode<T: DeserializeOwned>(params: &Value) -> Result<T, String> {
    serde_json::from_value(params.clone()).map_err(|e| format!("invalid params: {}", e))
}

fn effects_json(effects: &[Effect]) -> Result<Value, String> {
    serde_json::to_value(effects).map_err(|e| e.to_string())
}

/// Dispatch an RPC method call to the coordinator.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub fn handle_method<S: SettingsStore>(
    app: &Mutex<App<S>>,
    method: &str,
    params: &Value,
) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({ "pong": true, "version": env!("CARGO_PKG_VERSION") })),

        // ─── Action messages ───
        "message" => {
            let message: Message = decode(params)?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let outcome = a.handle_message(message).map_err(|e| e.to_string())?;
            Ok(json!({
                "response": outcome.response,
                "effects": effects_json(&outcome.effects)?,
            }))
        }

        // ─── Browser events ───
        "request" | "navigation" | "tabCreated" => {
            let event = match method {
                "request" => BrowserEvent::Request(decode(params)?),
                "navigation" => BrowserEvent::Navigation(decode(params)?),
                _ => BrowserEvent::TabCreated(decode(params)?),
            };
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let effects = a.dispatch(event);
            Ok(json!({ "effects": effects_json(&effects)? }))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
