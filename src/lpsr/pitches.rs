//! LilyPond pitch names and octave marks

use crate::msr::{Alteration, DiatonicStep, Pitch};
use crate::settings::{OctaveEntry, PitchLanguage};

/// Note name in the given input language, without octave marks
pub fn note_name(pitch: &Pitch, language: PitchLanguage) -> String {
    match language {
        PitchLanguage::Nederlands => note_name_nederlands(pitch),
        PitchLanguage::English => note_name_english(pitch),
        PitchLanguage::Deutsch => note_name_deutsch(pitch),
        PitchLanguage::Italiano => note_name_romance(pitch, "d", "b"),
        PitchLanguage::Espanol => note_name_romance(pitch, "s", "b"),
    }
}

fn latin_step(step: DiatonicStep) -> &'static str {
    ["c", "d", "e", "f", "g", "a", "b"][step.index() as usize]
}

fn note_name_nederlands(pitch: &Pitch) -> String {
    let base = latin_step(pitch.step);
    let suffix = match pitch.alteration {
        Alteration::DoubleFlat => "eses",
        Alteration::ThreeQuarterFlat => "eseh",
        Alteration::Flat => "es",
        Alteration::QuarterFlat => "eh",
        Alteration::Natural => "",
        Alteration::QuarterSharp => "ih",
        Alteration::Sharp => "is",
        Alteration::ThreeQuarterSharp => "isih",
        Alteration::DoubleSharp => "isis",
    };
    format!("{}{}", base, suffix)
}

fn note_name_english(pitch: &Pitch) -> String {
    let base = latin_step(pitch.step);
    let suffix = match pitch.alteration {
        Alteration::DoubleFlat => "ff",
        Alteration::ThreeQuarterFlat => "tqf",
        Alteration::Flat => "f",
        Alteration::QuarterFlat => "qf",
        Alteration::Natural => "",
        Alteration::QuarterSharp => "qs",
        Alteration::Sharp => "s",
        Alteration::ThreeQuarterSharp => "tqs",
        Alteration::DoubleSharp => "ss",
    };
    format!("{}{}", base, suffix)
}

fn note_name_deutsch(pitch: &Pitch) -> String {
    // B flat is "b", B natural is "h"
    if pitch.step == DiatonicStep::B && pitch.alteration == Alteration::Flat {
        return "b".to_string();
    }
    let base = match pitch.step {
        DiatonicStep::B => "h",
        step => latin_step(step),
    };
    let mut name = note_name_nederlands(pitch);
    name.replace_range(..1, base);
    name
}

fn note_name_romance(pitch: &Pitch, sharp: &str, flat: &str) -> String {
    let base = ["do", "re", "mi", "fa", "sol", "la", "si"][pitch.step.index() as usize];
    let suffix = match pitch.alteration {
        Alteration::DoubleFlat => format!("{}{}", flat, flat),
        Alteration::ThreeQuarterFlat => format!("{}s{}", flat, flat),
        Alteration::Flat => flat.to_string(),
        Alteration::QuarterFlat => format!("s{}", flat),
        Alteration::Natural => String::new(),
        Alteration::QuarterSharp => format!("s{}", sharp),
        Alteration::Sharp => sharp.to_string(),
        Alteration::ThreeQuarterSharp => format!("{}s{}", sharp, sharp),
        Alteration::DoubleSharp => format!("{}{}", sharp, sharp),
    };
    format!("{}{}", base, suffix)
}

/// `'` per octave up, `,` per octave down
pub fn octave_marks(octaves: i32) -> String {
    if octaves >= 0 {
        "'".repeat(octaves as usize)
    } else {
        ",".repeat((-octaves) as usize)
    }
}

/// Diatonic index of c', the reference of `\relative c'`
const RELATIVE_START: i32 = 4 * 7;

/// Computes octave marks in the chosen entry mode.
///
/// In relative mode each pitch is written relative to the previous one:
/// the closest placement (at most a fourth away) needs no marks. Within a
/// chord the reference is the previous chord note; after the chord it is
/// the chord's first note.
#[derive(Debug, Clone)]
pub struct OctaveMarker {
    entry: OctaveEntry,
    reference: i32,
}

impl OctaveMarker {
    pub fn new(entry: OctaveEntry) -> Self {
        Self {
            entry,
            reference: RELATIVE_START,
        }
    }

    pub fn entry(&self) -> OctaveEntry {
        self.entry
    }

    pub fn marks_for(&mut self, pitch: &Pitch) -> String {
        match self.entry {
            OctaveEntry::Absolute => octave_marks(pitch.octave - 3),
            OctaveEntry::Fixed => octave_marks(pitch.octave - 4),
            OctaveEntry::Relative => {
                let index = pitch.diatonic_index();
                let marks = relative_octaves(self.reference, index);
                self.reference = index;
                octave_marks(marks)
            }
        }
    }

    pub fn chord_marks(&mut self, pitches: &[Pitch]) -> Vec<String> {
        let marks = pitches.iter().map(|p| self.marks_for(p)).collect();
        if let Some(first) = pitches.first() {
            self.reference = first.diatonic_index();
        }
        marks
    }
}

fn relative_octaves(reference: i32, index: i32) -> i32 {
    let difference = index - reference;
    let closest = (difference + 3).rem_euclid(7) - 3;
    (difference - closest) / 7
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pitch(step: DiatonicStep, alteration: Alteration, octave: i32) -> Pitch {
        Pitch::new(step, alteration, octave)
    }

    #[test]
    fn test_names_per_language() {
        let b_flat = pitch(DiatonicStep::B, Alteration::Flat, 3);
        assert_eq!(note_name(&b_flat, PitchLanguage::Nederlands), "bes");
        assert_eq!(note_name(&b_flat, PitchLanguage::English), "bf");
        assert_eq!(note_name(&b_flat, PitchLanguage::Deutsch), "b");
        assert_eq!(note_name(&b_flat, PitchLanguage::Italiano), "sib");

        let b = pitch(DiatonicStep::B, Alteration::Natural, 3);
        assert_eq!(note_name(&b, PitchLanguage::Deutsch), "h");

        let f_sharp = pitch(DiatonicStep::F, Alteration::Sharp, 4);
        assert_eq!(note_name(&f_sharp, PitchLanguage::Nederlands), "fis");
        assert_eq!(note_name(&f_sharp, PitchLanguage::Italiano), "fad");
        assert_eq!(note_name(&f_sharp, PitchLanguage::Espanol), "fas");

        let e_quarter_flat = pitch(DiatonicStep::E, Alteration::QuarterFlat, 4);
        assert_eq!(note_name(&e_quarter_flat, PitchLanguage::Nederlands), "eeh");
        assert_eq!(note_name(&e_quarter_flat, PitchLanguage::English), "eqf");
    }

    #[test]
    fn test_absolute_and_fixed_marks() {
        let middle_c = pitch(DiatonicStep::C, Alteration::Natural, 4);
        let low_g = pitch(DiatonicStep::G, Alteration::Natural, 2);

        let mut absolute = OctaveMarker::new(OctaveEntry::Absolute);
        assert_eq!(absolute.marks_for(&middle_c), "'");
        assert_eq!(absolute.marks_for(&low_g), ",");

        let mut fixed = OctaveMarker::new(OctaveEntry::Fixed);
        assert_eq!(fixed.marks_for(&middle_c), "");
        assert_eq!(fixed.marks_for(&low_g), ",,");
    }

    #[test]
    fn test_relative_marks() {
        let mut relative = OctaveMarker::new(OctaveEntry::Relative);
        // c' f' c'' g' g
        let melody = [
            pitch(DiatonicStep::C, Alteration::Natural, 4),
            pitch(DiatonicStep::F, Alteration::Natural, 4),
            pitch(DiatonicStep::C, Alteration::Natural, 5),
            pitch(DiatonicStep::G, Alteration::Natural, 4),
            pitch(DiatonicStep::G, Alteration::Natural, 3),
        ];
        let marks: Vec<String> = melody.iter().map(|p| relative.marks_for(p)).collect();
        assert_eq!(marks, vec!["", "", "'", "", ","]);
    }

    #[test]
    fn test_relative_chord_reference_is_first_note() {
        let mut relative = OctaveMarker::new(OctaveEntry::Relative);
        let chord = [
            pitch(DiatonicStep::C, Alteration::Natural, 4),
            pitch(DiatonicStep::E, Alteration::Natural, 4),
            pitch(DiatonicStep::G, Alteration::Natural, 4),
            pitch(DiatonicStep::C, Alteration::Natural, 5),
        ];
        assert_eq!(relative.chord_marks(&chord), vec!["", "", "", ""]);
        // next note relative to c', not c''
        let d = pitch(DiatonicStep::D, Alteration::Natural, 4);
        assert_eq!(relative.marks_for(&d), "");
    }
}
