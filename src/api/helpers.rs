//! Shared helpers for the WASM API
//!
//! Console logging, settings deserialization and error conversion.

use crate::errors::TranslationError;
use crate::settings::TranslationSettings;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ============================================================================
// Console Logging Functions
// ============================================================================

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn info(s: &str);

    #[wasm_bindgen(js_namespace = console)]
    fn error(s: &str);
}

// ============================================================================
// Logging Macros
// ============================================================================

/// Log an info message with [WASM] prefix
#[macro_export]
macro_rules! wasm_info {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_info(&format!($($arg)*))
    };
}

/// Log an error message with [WASM] ❌ prefix
#[macro_export]
macro_rules! wasm_error {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_error(&format!($($arg)*))
    };
}

pub fn log_info(msg: &str) {
    info(&format!("[WASM] {}", msg));
}

pub fn log_error(msg: &str) {
    error(&format!("[WASM] ❌ {}", msg));
}

// ============================================================================
// Conversions
// ============================================================================

/// Settings from a JS object; `undefined` or `null` give the defaults
pub fn settings_from_js(value: JsValue) -> Result<TranslationSettings, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(TranslationSettings::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|e| {
        let msg = format!("Settings deserialization error: {}", e);
        log_error(&msg);
        JsValue::from_str(&msg)
    })
}

/// Serialize a value to a JSON string with automatic error handling
pub fn to_json<T: Serialize>(value: &T, error_context: &str) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| {
        let msg = format!("{}: {}", error_context, e);
        log_error(&msg);
        JsValue::from_str(&msg)
    })
}

/// JS error object carrying the message and the exit code of the cause
pub fn translation_error(e: TranslationError) -> JsValue {
    let msg = format!("{} (exit code {})", e, e.exit_code() as u8);
    log_error(&msg);
    JsValue::from_str(&msg)
}
