//! Translation entry points exposed to JavaScript
//!
//! Each function takes MusicXML text and an optional settings object, and
//! returns a JSON string `{ "output": ..., "diagnostics": { "marks": [...] } }`.

use crate::api::helpers::{settings_from_js, to_json, translation_error};
use crate::passes::{msr_to_json, translate_musicxml_to_braille, translate_musicxml_to_lilypond};
use crate::{wasm_error, wasm_info};
use wasm_bindgen::prelude::*;

/// Convert MusicXML to LilyPond source
#[wasm_bindgen(js_name = convertMusicXmlToLilypond)]
pub fn convert_musicxml_to_lilypond(musicxml: String, settings: JsValue) -> Result<String, JsValue> {
    wasm_info!("convertMusicXmlToLilypond called ({} bytes)", musicxml.len());
    let settings = settings_from_js(settings)?;

    let result = translate_musicxml_to_lilypond(&musicxml, &settings).map_err(translation_error)?;
    wasm_info!(
        "  LilyPond generated: {} bytes, {} diagnostics",
        result.output.len(),
        result.diagnostics.marks.len()
    );
    to_json(&result, "Result serialization error")
}

/// Convert MusicXML to braille text
#[wasm_bindgen(js_name = convertMusicXmlToBraille)]
pub fn convert_musicxml_to_braille(musicxml: String, settings: JsValue) -> Result<String, JsValue> {
    wasm_info!("convertMusicXmlToBraille called ({} bytes)", musicxml.len());
    let settings = settings_from_js(settings)?;

    let result = translate_musicxml_to_braille(&musicxml, &settings).map_err(translation_error)?;
    wasm_info!(
        "  braille generated: {} chars, {} diagnostics",
        result.output.chars().count(),
        result.diagnostics.marks.len()
    );
    to_json(&result, "Result serialization error")
}

/// MSR of a MusicXML document as JSON
#[wasm_bindgen(js_name = generateMsrJson)]
pub fn generate_msr_json(musicxml: String, settings: JsValue) -> Result<String, JsValue> {
    wasm_info!("generateMsrJson called");
    let settings = settings_from_js(settings)?;

    msr_to_json(&musicxml, &settings).map_err(|e| {
        wasm_error!("MSR generation failed");
        translation_error(e)
    })
}
