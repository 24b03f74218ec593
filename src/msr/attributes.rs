//! Clefs, keys, time signatures and barlines

use crate::msr::measure_elements::MeasureElementCore;
use crate::rational::Rational;
use serde::Serialize;

// ============================================================================
// CLEF
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClefKind {
    Treble,
    TrebleOttavaBassa,
    TrebleOttavaAlta,
    Bass,
    BassOttavaBassa,
    Alto,
    Tenor,
    Soprano,
    MezzoSoprano,
    Baritone,
    Percussion,
    Tab,
}

impl ClefKind {
    /// From MusicXML sign, line and octave change
    pub fn from_musicxml(sign: &str, line: Option<u32>, octave_change: i32) -> Option<Self> {
        match (sign, line, octave_change) {
            ("G", None | Some(2), 0) => Some(ClefKind::Treble),
            ("G", None | Some(2), -1) => Some(ClefKind::TrebleOttavaBassa),
            ("G", None | Some(2), 1) => Some(ClefKind::TrebleOttavaAlta),
            ("F", None | Some(4), 0) => Some(ClefKind::Bass),
            ("F", None | Some(4), -1) => Some(ClefKind::BassOttavaBassa),
            ("F", Some(3), _) => Some(ClefKind::Baritone),
            ("C", Some(1), _) => Some(ClefKind::Soprano),
            ("C", Some(2), _) => Some(ClefKind::MezzoSoprano),
            ("C", None | Some(3), _) => Some(ClefKind::Alto),
            ("C", Some(4), _) => Some(ClefKind::Tenor),
            ("percussion", _, _) => Some(ClefKind::Percussion),
            ("TAB", _, _) => Some(ClefKind::Tab),
            _ => None,
        }
    }

    pub fn is_bass_family(&self) -> bool {
        matches!(
            self,
            ClefKind::Bass | ClefKind::BassOttavaBassa | ClefKind::Baritone
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Clef {
    pub core: MeasureElementCore,
    pub kind: ClefKind,
    pub staff_number: u32,
}

impl Clef {
    pub fn new(input_line: usize, kind: ClefKind, staff_number: u32) -> Self {
        Self {
            core: MeasureElementCore::new(input_line, Rational::zero()),
            kind,
            staff_number,
        }
    }
}

// ============================================================================
// KEY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KeyMode {
    Major,
    Minor,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Aeolian,
    Ionian,
    Locrian,
}

impl KeyMode {
    pub fn from_musicxml(value: &str) -> Self {
        match value {
            "minor" => KeyMode::Minor,
            "dorian" => KeyMode::Dorian,
            "phrygian" => KeyMode::Phrygian,
            "lydian" => KeyMode::Lydian,
            "mixolydian" => KeyMode::Mixolydian,
            "aeolian" => KeyMode::Aeolian,
            "ionian" => KeyMode::Ionian,
            "locrian" => KeyMode::Locrian,
            _ => KeyMode::Major,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Key {
    pub core: MeasureElementCore,
    /// Position on the circle of fifths, flats negative
    pub fifths: i32,
    pub mode: KeyMode,
}

impl Key {
    pub fn new(input_line: usize, fifths: i32, mode: KeyMode) -> Self {
        Self {
            core: MeasureElementCore::new(input_line, Rational::zero()),
            fifths,
            mode,
        }
    }
}

// ============================================================================
// TIME
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimeSymbol {
    None,
    Common,
    Cut,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Time {
    pub core: MeasureElementCore,
    pub beats: u32,
    pub beat_type: u32,
    pub symbol: TimeSymbol,
}

impl Time {
    pub fn new(input_line: usize, beats: u32, beat_type: u32, symbol: TimeSymbol) -> Self {
        Self {
            core: MeasureElementCore::new(input_line, Rational::zero()),
            beats,
            beat_type,
            symbol,
        }
    }

    /// Length of a full measure in whole notes
    pub fn whole_notes_per_measure(&self) -> Rational {
        Rational::new(self.beats as i64, self.beat_type.max(1) as i64).rationalised()
    }
}

// ============================================================================
// BARLINE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BarlineLocation {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BarlineStyle {
    Regular,
    Dotted,
    Dashed,
    Heavy,
    LightLight,
    LightHeavy,
    HeavyLight,
    HeavyHeavy,
    Tick,
    Short,
    None,
}

impl BarlineStyle {
    pub fn from_musicxml(value: &str) -> Self {
        match value {
            "dotted" => BarlineStyle::Dotted,
            "dashed" => BarlineStyle::Dashed,
            "heavy" => BarlineStyle::Heavy,
            "light-light" => BarlineStyle::LightLight,
            "light-heavy" => BarlineStyle::LightHeavy,
            "heavy-light" => BarlineStyle::HeavyLight,
            "heavy-heavy" => BarlineStyle::HeavyHeavy,
            "tick" => BarlineStyle::Tick,
            "short" => BarlineStyle::Short,
            "none" => BarlineStyle::None,
            _ => BarlineStyle::Regular,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RepeatDirection {
    Forward,
    Backward,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Barline {
    pub core: MeasureElementCore,
    pub location: BarlineLocation,
    pub style: BarlineStyle,
    pub repeat: Option<RepeatDirection>,
}

impl Barline {
    pub fn new(
        input_line: usize,
        location: BarlineLocation,
        style: BarlineStyle,
        repeat: Option<RepeatDirection>,
    ) -> Self {
        Self {
            core: MeasureElementCore::new(input_line, Rational::zero()),
            location,
            style,
            repeat,
        }
    }
}
