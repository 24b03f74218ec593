//! WASM API
//!
//! - `helpers`: console logging, settings and error conversion
//! - `translate`: the MusicXML translation entry points

pub mod helpers;
pub mod translate;

pub use translate::{convert_musicxml_to_braille, convert_musicxml_to_lilypond, generate_msr_json};
