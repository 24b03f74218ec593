//! LilyPond Score Representation (LPSR)
//!
//! Built from MSR in pass 3, printed as LilyPond source in pass 4.

pub mod durations;
pub mod elements;
pub mod pitches;
pub mod templates;
pub mod visitor;

pub use durations::{whole_notes_as_notated_duration, NotatedDuration};
pub use elements::{
    LpsrBlock, LpsrChord, LpsrChordPitch, LpsrFiguredBass, LpsrGroupKind, LpsrHeader, LpsrMeasure,
    LpsrMusicItem, LpsrNote, LpsrNoteKind, LpsrScore, LpsrVoiceDefinition, LpsrVoiceMode,
    LpsrVoiceUse,
};
pub use pitches::{note_name, OctaveMarker};
pub use visitor::LpsrVisitor;
