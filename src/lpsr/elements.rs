//! LPSR nodes
//!
//! The LilyPond-oriented tree: one voice definition per MSR voice (music
//! or figure mode), and a score block of nested contexts that instantiate
//! those definitions. Everything a LilyPond writer needs is decided here,
//! the emitter only prints.

use crate::lpsr::durations::NotatedDuration;
use crate::msr::TimeSymbol;
use crate::settings::{AccidentalStyle, OctaveEntry, PitchLanguage};
use serde::Serialize;

// ============================================================================
// SCORE AND HEADER
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LpsrHeader {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub composer: Option<String>,
    pub arranger: Option<String>,
    pub lyricist: Option<String>,
    pub poet: Option<String>,
    pub copyright: Option<String>,
    pub tagline: Option<String>,
}

impl LpsrHeader {
    /// Present fields as (LilyPond field name, value), in header order
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("title", &self.title),
            ("subtitle", &self.subtitle),
            ("composer", &self.composer),
            ("arranger", &self.arranger),
            ("poet", &self.poet),
            ("lyricist", &self.lyricist),
            ("copyright", &self.copyright),
            ("tagline", &self.tagline),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
        .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LpsrScore {
    pub input_line: usize,
    pub header: LpsrHeader,
    pub version: String,
    pub language: PitchLanguage,
    pub accidental_style: AccidentalStyle,
    pub voice_definitions: Vec<LpsrVoiceDefinition>,
    pub score_block: LpsrBlock,
}

impl LpsrScore {
    pub fn new(
        input_line: usize,
        version: impl Into<String>,
        language: PitchLanguage,
        accidental_style: AccidentalStyle,
    ) -> Self {
        Self {
            input_line,
            header: LpsrHeader::default(),
            version: version.into(),
            language,
            accidental_style,
            voice_definitions: Vec::new(),
            score_block: LpsrBlock::Simultaneous(Vec::new()),
        }
    }

    pub fn voice_definition(&self, name: &str) -> Option<&LpsrVoiceDefinition> {
        self.voice_definitions.iter().find(|d| d.name == name)
    }
}

// ============================================================================
// VOICE DEFINITIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LpsrVoiceMode {
    Music,
    Figures,
}

/// `Name = \absolute { ... }` or `Name = \figuremode { ... }`
#[derive(Debug, Clone, Serialize)]
pub struct LpsrVoiceDefinition {
    pub name: String,
    pub input_line: usize,
    pub mode: LpsrVoiceMode,
    pub octave_entry: OctaveEntry,
    pub measures: Vec<LpsrMeasure>,
}

impl LpsrVoiceDefinition {
    pub fn new(name: impl Into<String>, input_line: usize, mode: LpsrVoiceMode, octave_entry: OctaveEntry) -> Self {
        Self {
            name: name.into(),
            input_line,
            mode,
            octave_entry,
            measures: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LpsrMeasure {
    pub number: String,
    pub input_line: usize,
    pub items: Vec<LpsrMusicItem>,
    /// End the measure with `|`
    pub bar_check: bool,
}

impl LpsrMeasure {
    pub fn new(number: impl Into<String>, input_line: usize) -> Self {
        Self {
            number: number.into(),
            input_line,
            items: Vec::new(),
            bar_check: false,
        }
    }
}

// ============================================================================
// MUSIC ITEMS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LpsrNoteKind {
    Pitched { name: String, octave_marks: String },
    Rest,
    /// Full-measure rest, `R`
    MeasureRest,
    Skip,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LpsrNote {
    pub kind: LpsrNoteKind,
    pub duration: NotatedDuration,
    pub tie: bool,
    /// Single tremolo subdivision, e.g. 32 for `c4:32`
    pub tremolo_subdivision: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LpsrChordPitch {
    pub name: String,
    pub octave_marks: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LpsrChord {
    pub pitches: Vec<LpsrChordPitch>,
    pub duration: NotatedDuration,
    pub tie: bool,
    pub tremolo_subdivision: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LpsrFiguredBass {
    /// Figure texts as written in figure mode: `6`, `4+`, `_!`, `5/`
    pub figures: Vec<String>,
    pub duration: NotatedDuration,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum LpsrMusicItem {
    MeasureComment { number: String },
    Partial { duration: NotatedDuration },
    Clef { name: String },
    Key { tonic: String, mode: String },
    Time { beats: u32, beat_type: u32, symbol: TimeSymbol },
    Bar { glyph: String },
    StaffChange { staff_name: String },
    Note(LpsrNote),
    Chord(LpsrChord),
    TupletStart { actual_notes: u32, normal_notes: u32 },
    TupletEnd,
    TremoloStart { repeats: i64 },
    TremoloEnd,
    FiguredBass(LpsrFiguredBass),
}

// ============================================================================
// SCORE BLOCK
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LpsrGroupKind {
    PianoStaff,
    StaffGroup,
    ChoirStaff,
}

impl LpsrGroupKind {
    pub fn context_name(&self) -> &'static str {
        match self {
            LpsrGroupKind::PianoStaff => "PianoStaff",
            LpsrGroupKind::StaffGroup => "StaffGroup",
            LpsrGroupKind::ChoirStaff => "ChoirStaff",
        }
    }
}

/// A voice definition instantiated in a staff
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LpsrVoiceUse {
    pub context_name: String,
    pub definition_name: String,
    /// `\voiceOne` .. `\voiceFour` when the staff holds several voices
    pub style: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LpsrBlock {
    /// `<< ... >>`, the score's top level
    Simultaneous(Vec<LpsrBlock>),
    Group {
        kind: LpsrGroupKind,
        instrument_name: String,
        short_instrument_name: String,
        /// `systemStartDelimiter` override, e.g. `SystemStartSquare`
        start_delimiter: Option<String>,
        children: Vec<LpsrBlock>,
    },
    Staff {
        name: String,
        instrument_name: String,
        short_instrument_name: String,
        voices: Vec<LpsrVoiceUse>,
    },
    FiguredBass {
        definition_name: String,
    },
}

impl LpsrBlock {
    pub fn children(&self) -> &[LpsrBlock] {
        match self {
            LpsrBlock::Simultaneous(children) | LpsrBlock::Group { children, .. } => children,
            LpsrBlock::Staff { .. } | LpsrBlock::FiguredBass { .. } => &[],
        }
    }

    pub fn push_child(&mut self, child: LpsrBlock) {
        if let LpsrBlock::Simultaneous(children) | LpsrBlock::Group { children, .. } = self {
            children.push(child);
        }
    }
}
