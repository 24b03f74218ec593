//! Translation passes
//!
//! ```text
//! MusicXML text ─ pass 1 ─→ MXSR ─ pass 2a ─→ MSR skeleton ─ pass 2b ─→ MSR
//! MSR ─ pass 3 ─→ LPSR ─ pass 4 ─→ LilyPond text
//! MSR ─ pass 3 ─→ BSR  ─ pass 4 ─→ braille text
//! ```
//!
//! Each pass is a visitor holding the destination tree it builds. The
//! functions here chain them; every pass can also be run on its own.

pub mod bsr_to_text;
pub mod lpsr_to_lilypond;
pub mod msr_to_bsr;
pub mod msr_to_lpsr;
pub mod musicxml_values;
pub mod mxsr_to_msr;
pub mod mxsr_to_msr_skeleton;

use crate::diagnostics::Diagnostics;
use crate::errors::{SourceLocation, TranslationError};
use crate::msr::Score;
use crate::mxsr::parse_mxsr;
use crate::settings::TranslationSettings;
use serde::Serialize;

pub use bsr_to_text::BrailleTextEmitter;
pub use lpsr_to_lilypond::LilyPondEmitter;
pub use msr_to_bsr::BsrBuilder;
pub use msr_to_lpsr::LpsrBuilder;
pub use mxsr_to_msr::MsrPopulator;
pub use mxsr_to_msr_skeleton::MsrSkeletonBuilder;

/// Output text of a run with the diagnostics collected on the way
#[derive(Debug, Clone, Serialize)]
pub struct TranslationResult {
    pub output: String,
    pub diagnostics: Diagnostics,
}

/// Passes 1 to 2b, then the part filters
pub fn build_msr(
    musicxml: &str,
    settings: &TranslationSettings,
) -> Result<(Score, Diagnostics), TranslationError> {
    log::info!("pass 1: parsing {}", settings.input_source_name);
    let root = parse_mxsr(musicxml)?;

    let (skeleton, diagnostics) = MsrSkeletonBuilder::new(settings).build(&root)?;
    let (mut score, mut diagnostics) = MsrPopulator::new(settings, skeleton, diagnostics).populate(&root)?;

    let removed: Vec<(String, usize)> = score
        .parts()
        .into_iter()
        .filter(|part| !settings.keeps_part(part.id()))
        .map(|part| (part.id().to_string(), part.input_line()))
        .collect();
    for (part_id, input_line) in removed {
        let location = SourceLocation::new(settings.input_source_name.as_str(), input_line);
        score.remove_part(&part_id, location.clone())?;
        diagnostics.info(location, "part_removed", format!("part '{}' removed by settings", part_id));
    }

    Ok((score, diagnostics))
}

pub fn translate_musicxml_to_lilypond(
    musicxml: &str,
    settings: &TranslationSettings,
) -> Result<TranslationResult, TranslationError> {
    let (score, diagnostics) = build_msr(musicxml, settings)?;
    let lpsr = LpsrBuilder::new(settings).build(&score)?;
    let output = LilyPondEmitter::new(settings).emit(&lpsr)?;
    Ok(TranslationResult { output, diagnostics })
}

pub fn translate_musicxml_to_braille(
    musicxml: &str,
    settings: &TranslationSettings,
) -> Result<TranslationResult, TranslationError> {
    let (score, diagnostics) = build_msr(musicxml, settings)?;
    let bsr = BsrBuilder::new(settings).build(&score)?;
    let output = BrailleTextEmitter::new(settings).emit(&bsr)?;
    Ok(TranslationResult { output, diagnostics })
}

/// MSR of a MusicXML document as pretty-printed JSON, for inspection
pub fn msr_to_json(musicxml: &str, settings: &TranslationSettings) -> Result<String, TranslationError> {
    let (score, _) = build_msr(musicxml, settings)?;
    serde_json::to_string_pretty(&score).map_err(|e| {
        crate::errors::InternalError::Generic {
            location: SourceLocation::new(settings.input_source_name.as_str(), score.input_line()),
            message: format!("MSR serialization failed: {}", e),
        }
        .into()
    })
}
