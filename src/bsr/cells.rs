//! Six-dot braille cells and the music braille sign tables
//!
//! A cell is a 6-bit dot pattern, bit 0 for dot 1 up to bit 5 for dot 6.
//! Cells print either as Unicode braille patterns (U+2800 block) or as
//! North American Braille ASCII.

use crate::msr::{Alteration, DiatonicStep};
use crate::rational::Rational;
use serde::Serialize;

/// Braille ASCII character of each dot pattern, indexed by the cell bits
const BRAILLE_ASCII: &[u8; 64] =
    b" A1B'K2L@CIF/MSP\"E3H9O6R^DJG>NTQ,*5<-U8V.%[$+X!&;:4\\0Z7(_?W]#Y)=";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct BrailleCell(u8);

/// Cell from its dot numbers, e.g. `dots("145")`
pub const fn dots(numbers: &str) -> BrailleCell {
    let bytes = numbers.as_bytes();
    let mut bits = 0u8;
    let mut i = 0;
    while i < bytes.len() {
        let dot = bytes[i];
        if dot >= b'1' && dot <= b'6' {
            bits |= 1 << (dot - b'1');
        }
        i += 1;
    }
    BrailleCell(bits)
}

impl BrailleCell {
    pub const EMPTY: BrailleCell = BrailleCell(0);

    pub const fn from_bits(bits: u8) -> Self {
        BrailleCell(bits & 0x3f)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn has_dot(self, dot: u8) -> bool {
        (1..=6).contains(&dot) && self.0 & (1 << (dot - 1)) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn to_unicode(self) -> char {
        char::from_u32(0x2800 + u32::from(self.0)).unwrap_or(' ')
    }

    pub fn to_ascii(self) -> char {
        char::from(BRAILLE_ASCII[usize::from(self.0)])
    }
}

// ============================================================================
// SIGNS
// ============================================================================

pub const NUMBER_SIGN: BrailleCell = dots("3456");
pub const CAPITAL_SIGN: BrailleCell = dots("6");
pub const DOT: BrailleCell = dots("3");
pub const MUSIC_HYPHEN: BrailleCell = dots("5");

pub const SHARP: BrailleCell = dots("146");
pub const FLAT: BrailleCell = dots("126");
pub const NATURAL: BrailleCell = dots("16");

pub const NOTE_TIE: [BrailleCell; 2] = [dots("4"), dots("14")];
pub const CHORD_TIE: [BrailleCell; 2] = [dots("46"), dots("14")];

pub const TRIPLET: BrailleCell = dots("23");
pub const TUPLET_PREFIX: BrailleCell = dots("456");

pub const DOUBLE_TREMOLO_PREFIX: BrailleCell = dots("46");
pub const SINGLE_TREMOLO_PREFIX: BrailleCell = dots("45");

pub const G_CLEF: [BrailleCell; 3] = [dots("345"), dots("34"), dots("123")];
pub const F_CLEF: [BrailleCell; 3] = [dots("345"), dots("3456"), dots("123")];
pub const C_CLEF: [BrailleCell; 3] = [dots("345"), dots("346"), dots("123")];

pub const COMMON_TIME: [BrailleCell; 2] = [dots("46"), dots("14")];
pub const CUT_TIME: [BrailleCell; 2] = [dots("456"), dots("14")];

pub const FINAL_BAR: [BrailleCell; 2] = [dots("126"), dots("13")];
pub const DOUBLE_BAR: [BrailleCell; 3] = [dots("126"), dots("13"), dots("3")];
pub const FORWARD_REPEAT: [BrailleCell; 2] = [dots("126"), dots("2356")];
pub const BACKWARD_REPEAT: [BrailleCell; 2] = [dots("126"), dots("23")];

// ============================================================================
// NOTES AND RESTS
// ============================================================================

/// The four braille note values; each covers two print values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValueClass {
    /// whole or 16th
    Whole,
    /// half or 32nd
    Half,
    /// quarter or 64th
    Quarter,
    /// eighth or 128th
    Eighth,
}

impl ValueClass {
    /// Class of an undotted duration; longer than a whole note writes as a whole
    pub fn from_undotted(whole_notes: Rational) -> Self {
        let reduced = whole_notes.rationalised();
        if reduced >= Rational::one() {
            return ValueClass::Whole;
        }
        match reduced.denominator().trailing_zeros() % 4 {
            0 => ValueClass::Whole,
            1 => ValueClass::Half,
            2 => ValueClass::Quarter,
            _ => ValueClass::Eighth,
        }
    }

    /// Class of a display duration with its augmentation dots
    pub fn from_display(display_whole_notes: Rational, dots: u32) -> Self {
        let dots = dots.min(7);
        // undotted = display * 2^dots / (2^(dots+1) - 1)
        let undotted = display_whole_notes * (1i64 << dots) / ((1i64 << (dots + 1)) - 1);
        Self::from_undotted(undotted)
    }

    fn added_dots(self) -> u8 {
        match self {
            ValueClass::Whole => dots("36").0,
            ValueClass::Half => dots("3").0,
            ValueClass::Quarter => dots("6").0,
            ValueClass::Eighth => 0,
        }
    }
}

pub fn note_cell(step: DiatonicStep, value: ValueClass) -> BrailleCell {
    let eighth = match step {
        DiatonicStep::C => dots("145"),
        DiatonicStep::D => dots("15"),
        DiatonicStep::E => dots("124"),
        DiatonicStep::F => dots("1245"),
        DiatonicStep::G => dots("125"),
        DiatonicStep::A => dots("24"),
        DiatonicStep::B => dots("245"),
    };
    BrailleCell(eighth.0 | value.added_dots())
}

pub fn rest_cell(value: ValueClass) -> BrailleCell {
    match value {
        ValueClass::Whole => dots("134"),
        ValueClass::Half => dots("136"),
        ValueClass::Quarter => dots("1236"),
        ValueClass::Eighth => dots("1346"),
    }
}

/// Octave mark for a MusicXML octave (4 holds middle C)
pub fn octave_mark(octave: i32) -> Vec<BrailleCell> {
    match octave {
        i32::MIN..=0 => vec![dots("4"), dots("4")],
        1 => vec![dots("4")],
        2 => vec![dots("45")],
        3 => vec![dots("456")],
        4 => vec![dots("5")],
        5 => vec![dots("46")],
        6 => vec![dots("56")],
        7 => vec![dots("6")],
        _ => vec![dots("6"), dots("6")],
    }
}

pub fn accidental_cells(alteration: Alteration) -> Vec<BrailleCell> {
    match alteration {
        Alteration::DoubleFlat => vec![FLAT, FLAT],
        Alteration::ThreeQuarterFlat => vec![dots("456"), FLAT],
        Alteration::Flat => vec![FLAT],
        Alteration::QuarterFlat => vec![dots("4"), FLAT],
        Alteration::Natural => vec![NATURAL],
        Alteration::QuarterSharp => vec![dots("4"), SHARP],
        Alteration::Sharp => vec![SHARP],
        Alteration::ThreeQuarterSharp => vec![dots("456"), SHARP],
        Alteration::DoubleSharp => vec![SHARP, SHARP],
    }
}

/// Interval sign for a 2nd up to an octave; larger intervals reduce modulo the octave
pub fn interval_cell(interval: u32) -> BrailleCell {
    match interval {
        0 | 1 => dots("36"),
        n => match (n - 1) % 7 {
            1 => dots("34"),
            2 => dots("346"),
            3 => dots("3456"),
            4 => dots("35"),
            5 => dots("356"),
            6 => dots("25"),
            _ => dots("36"),
        },
    }
}

// ============================================================================
// NUMBERS AND TEXT
// ============================================================================

const UPPER_DIGITS: [BrailleCell; 10] = [
    dots("245"),
    dots("1"),
    dots("12"),
    dots("14"),
    dots("145"),
    dots("15"),
    dots("124"),
    dots("1245"),
    dots("125"),
    dots("24"),
];

const LOWER_DIGITS: [BrailleCell; 10] = [
    dots("356"),
    dots("2"),
    dots("23"),
    dots("25"),
    dots("256"),
    dots("26"),
    dots("235"),
    dots("2356"),
    dots("236"),
    dots("35"),
];

fn digit_cells(number: u32, table: &[BrailleCell; 10]) -> Vec<BrailleCell> {
    number
        .to_string()
        .bytes()
        .map(|b| table[usize::from(b - b'0')])
        .collect()
}

/// Number sign followed by upper-cell digits
pub fn upper_number(number: u32) -> Vec<BrailleCell> {
    let mut cells = vec![NUMBER_SIGN];
    cells.extend(digit_cells(number, &UPPER_DIGITS));
    cells
}

/// Lower-cell digits, without number sign
pub fn lower_number(number: u32) -> Vec<BrailleCell> {
    digit_cells(number, &LOWER_DIGITS)
}

fn letter_cell(letter: char) -> Option<BrailleCell> {
    let upper = letter.to_ascii_uppercase() as u8;
    BRAILLE_ASCII
        .iter()
        .position(|&c| c == upper)
        .map(|bits| BrailleCell(bits as u8))
}

/// Uncontracted literary braille for headings
pub fn grade1_text(text: &str) -> Vec<BrailleCell> {
    let mut cells = Vec::new();
    let mut in_number = false;
    for c in text.chars() {
        match c {
            'a'..='z' => {
                in_number = false;
                cells.extend(letter_cell(c));
            }
            'A'..='Z' => {
                in_number = false;
                cells.push(CAPITAL_SIGN);
                cells.extend(letter_cell(c));
            }
            '0'..='9' => {
                if !in_number {
                    cells.push(NUMBER_SIGN);
                    in_number = true;
                }
                cells.push(UPPER_DIGITS[(c as u8 - b'0') as usize]);
            }
            _ => {
                in_number = false;
                let cell = match c {
                    ' ' => Some(BrailleCell::EMPTY),
                    ',' => Some(dots("2")),
                    '.' => Some(dots("256")),
                    '-' => Some(dots("36")),
                    '\'' => Some(dots("3")),
                    ':' => Some(dots("25")),
                    ';' => Some(dots("23")),
                    '?' => Some(dots("236")),
                    '!' => Some(dots("235")),
                    _ => None,
                };
                cells.extend(cell);
            }
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dots_and_encodings() {
        let c = dots("145");
        assert!(c.has_dot(1) && c.has_dot(4) && c.has_dot(5));
        assert!(!c.has_dot(2));
        assert_eq!(c.to_unicode(), '\u{2819}');
        assert_eq!(c.to_ascii(), 'D');
        assert_eq!(BrailleCell::EMPTY.to_ascii(), ' ');
        assert_eq!(NUMBER_SIGN.to_ascii(), '#');
        assert_eq!(dots("123456").to_ascii(), '=');
    }

    #[test]
    fn test_note_values() {
        assert_eq!(note_cell(DiatonicStep::C, ValueClass::Eighth), dots("145"));
        assert_eq!(note_cell(DiatonicStep::C, ValueClass::Quarter), dots("1456"));
        assert_eq!(note_cell(DiatonicStep::D, ValueClass::Half), dots("135"));
        assert_eq!(note_cell(DiatonicStep::E, ValueClass::Whole), dots("12346"));
    }

    #[test]
    fn test_value_classes() {
        assert_eq!(ValueClass::from_undotted(Rational::new(1, 4)), ValueClass::Quarter);
        assert_eq!(ValueClass::from_undotted(Rational::new(1, 16)), ValueClass::Whole);
        assert_eq!(ValueClass::from_undotted(Rational::new(1, 32)), ValueClass::Half);
        assert_eq!(ValueClass::from_undotted(Rational::new(2, 1)), ValueClass::Whole);
        // dotted quarter
        assert_eq!(ValueClass::from_display(Rational::new(3, 8), 1), ValueClass::Quarter);
        // double-dotted half
        assert_eq!(ValueClass::from_display(Rational::new(7, 8), 2), ValueClass::Half);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(upper_number(34), vec![NUMBER_SIGN, dots("14"), dots("145")]);
        assert_eq!(lower_number(4), vec![dots("256")]);
        assert_eq!(interval_cell(3), dots("346"));
        assert_eq!(interval_cell(8), dots("36"));
        assert_eq!(interval_cell(10), dots("346"));
    }

    #[test]
    fn test_grade1_text() {
        let cells = grade1_text("Vn 2");
        assert_eq!(
            cells,
            vec![CAPITAL_SIGN, dots("1236"), dots("1345"), BrailleCell::EMPTY, NUMBER_SIGN, dots("12")]
        );
    }

    #[test]
    fn test_octave_marks() {
        assert_eq!(octave_mark(4), vec![dots("5")]);
        assert_eq!(octave_mark(0), vec![dots("4"), dots("4")]);
        assert_eq!(octave_mark(9), vec![dots("6"), dots("6")]);
    }
}
