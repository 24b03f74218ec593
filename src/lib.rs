//! MusicXML translator WASM module
//!
//! Translates MusicXML into LilyPond source or braille music through a
//! chain of score representations: MXSR (element tree), MSR (format-neutral
//! score), then LPSR (LilyPond) or BSR (braille).

pub mod api;
pub mod browser;
pub mod bsr;
pub mod diagnostics;
pub mod errors;
pub mod lpsr;
pub mod msr;
pub mod mxsr;
pub mod passes;
pub mod rational;
pub mod settings;

// Re-export commonly used types
pub use diagnostics::Diagnostics;
pub use errors::{ExitCode, TranslationError};
pub use passes::{
    build_msr, msr_to_json, translate_musicxml_to_braille, translate_musicxml_to_lilypond,
    TranslationResult,
};
pub use rational::Rational;
pub use settings::TranslationSettings;

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    // a second initialization only fails to replace the logger
    #[cfg(feature = "console_log")]
    let _ = console_log::init_with_level(log::Level::Info);

    log::info!("MusicXML translator WASM module initialized");
}
