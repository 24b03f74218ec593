//! Music Score Representation (MSR)
//!
//! The format-neutral score tree built from MusicXML in pass 2 and lowered
//! to LilyPond or braille in pass 3.

pub mod attributes;
pub mod figured_bass;
pub mod measure_elements;
pub mod notes;
pub mod part_groups;
pub mod parts;
pub mod score;
pub mod tremolos;
pub mod visitor;
pub mod voices;

pub use attributes::{
    Barline, BarlineLocation, BarlineStyle, Clef, ClefKind, Key, KeyMode, RepeatDirection, Time,
    TimeSymbol,
};
pub use figured_bass::{
    Figure, FigurePrefixKind, FigureSuffixKind, FiguredBass, FiguredBassParenthesesKind,
};
pub use measure_elements::{MeasureElement, MeasureElementCore};
pub use notes::{
    Alteration, Chord, DiatonicStep, Note, NoteContent, NoteOrChord, NotePlacement, Pitch, TieKind,
    Tuplet,
};
pub use part_groups::{
    PartGroup, PartGroupBarlineKind, PartGroupElement, PartGroupId, PartGroupImplicitKind,
    PartGroupSymbolKind,
};
pub use parts::{Part, Staff, StaffKind, FIGURED_BASS_STAFF_NUMBER, FIGURED_BASS_VOICE_NUMBER};
pub use score::{Creator, Identification, MaxNameLengths, Score, IMPLICIT_PART_GROUP_ID};
pub use tremolos::{DoubleTremolo, DoubleTremoloKind, Placement, TremoloTypeKind};
pub use visitor::MsrVisitor;
pub use voices::{Measure, MeasureKind, Voice, VoiceKind};
