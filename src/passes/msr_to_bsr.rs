//! Pass 3 (Braille): MSR → BSR
//!
//! Every regular voice with music becomes one section, headed by its part
//! name. Notes are written with the interval rule for octave marks:
//!
//! | distance from the previous note | octave mark |
//! |---|---|
//! | unison or 2nd | never |
//! | 3rd or 4th | when the octave changes |
//! | 5th or more | always |
//!
//! The first note of a section and of every braille line is always marked,
//! the latter being decided by the layout. Accidentals follow the key
//! signature and the alterations already written in the measure. Chords
//! are written as one note and interval signs, downwards from the top
//! note in treble clefs and upwards from the bottom note in bass clefs.
//! Figured basses have no braille rendition here and are skipped.

use crate::browser::Browser;
use crate::bsr::cells::{
    self, accidental_cells, interval_cell, lower_number, note_cell, octave_mark, rest_cell,
    upper_number, BrailleCell, ValueClass,
};
use crate::bsr::{BsrItem, BsrLayout, BsrMeasure, BsrScore, BsrSection};
use crate::errors::TranslationError;
use crate::msr::{
    Alteration, Barline, BarlineStyle, Chord, Clef, ClefKind, DiatonicStep, DoubleTremolo, Key,
    Measure, MsrVisitor, Note, NoteContent, NotePlacement, Part, Pitch, RepeatDirection, Score,
    TieKind, Time, TimeSymbol, Tuplet, Voice, VoiceKind,
};
use crate::settings::TranslationSettings;
use std::collections::HashMap;

const SHARP_ORDER: [DiatonicStep; 7] = [
    DiatonicStep::F,
    DiatonicStep::C,
    DiatonicStep::G,
    DiatonicStep::D,
    DiatonicStep::A,
    DiatonicStep::E,
    DiatonicStep::B,
];

/// Alteration the key signature gives to `step`
pub fn key_alteration(fifths: i32, step: DiatonicStep) -> Alteration {
    let count = fifths.unsigned_abs().min(7) as usize;
    if fifths > 0 && SHARP_ORDER[..count].contains(&step) {
        Alteration::Sharp
    } else if fifths < 0 && SHARP_ORDER[7 - count..].contains(&step) {
        Alteration::Flat
    } else {
        Alteration::Natural
    }
}

/// Whether a note needs its octave mark after `previous`
pub fn needs_octave_mark(previous: Option<&Pitch>, pitch: &Pitch) -> bool {
    let Some(previous) = previous else {
        return true;
    };
    match (pitch.diatonic_index() - previous.diatonic_index()).abs() {
        0 | 1 => false,
        2 | 3 => previous.octave != pitch.octave,
        _ => true,
    }
}

pub fn key_signature_cells(fifths: i32) -> Vec<BrailleCell> {
    let count = fifths.unsigned_abs();
    let sign = if fifths > 0 { cells::SHARP } else { cells::FLAT };
    match count {
        0 => Vec::new(),
        1..=3 => vec![sign; count as usize],
        _ => {
            let mut signs = upper_number(count);
            signs.push(sign);
            signs
        }
    }
}

pub fn time_signature_cells(time: &Time) -> Vec<BrailleCell> {
    match time.symbol {
        TimeSymbol::Common => cells::COMMON_TIME.to_vec(),
        TimeSymbol::Cut => cells::CUT_TIME.to_vec(),
        TimeSymbol::None => {
            let mut signs = upper_number(time.beats);
            signs.extend(lower_number(time.beat_type));
            signs
        }
    }
}

fn clef_cells(kind: ClefKind) -> Option<&'static [BrailleCell]> {
    match kind {
        ClefKind::Treble | ClefKind::TrebleOttavaBassa | ClefKind::TrebleOttavaAlta => {
            Some(&cells::G_CLEF)
        }
        ClefKind::Bass | ClefKind::BassOttavaBassa | ClefKind::Baritone => Some(&cells::F_CLEF),
        ClefKind::Alto | ClefKind::Tenor | ClefKind::Soprano | ClefKind::MezzoSoprano => {
            Some(&cells::C_CLEF)
        }
        ClefKind::Percussion | ClefKind::Tab => None,
    }
}

fn barline_cells(barline: &Barline) -> Option<&'static [BrailleCell]> {
    match (barline.repeat, barline.style) {
        (Some(RepeatDirection::Forward), _) => Some(&cells::FORWARD_REPEAT),
        (Some(RepeatDirection::Backward), _) => Some(&cells::BACKWARD_REPEAT),
        (None, BarlineStyle::LightHeavy) | (None, BarlineStyle::HeavyHeavy) => Some(&cells::FINAL_BAR),
        (None, BarlineStyle::LightLight) => Some(&cells::DOUBLE_BAR),
        _ => None,
    }
}

fn tuplet_cells(actual_notes: u32) -> Vec<BrailleCell> {
    if actual_notes == 3 {
        vec![cells::TRIPLET]
    } else {
        let mut signs = vec![cells::TUPLET_PREFIX];
        signs.extend(lower_number(actual_notes));
        signs.push(cells::DOT);
        signs
    }
}

// ============================================================================
// BUILDER
// ============================================================================

struct PartContext {
    name: String,
    music_voices: usize,
}

/// Lowers an MSR score to BSR and lays it out
pub struct BsrBuilder<'s> {
    settings: &'s TranslationSettings,
    sections: Vec<BsrSection>,
    part: Option<PartContext>,
    section: Option<BsrSection>,
    measure: Option<BsrMeasure>,
    previous_pitch: Option<Pitch>,
    bass_clef: bool,
    key_fifths: i32,
    /// Alterations written so far in the current measure
    measure_alterations: HashMap<(DiatonicStep, i32), Alteration>,
    /// Marks of the double tremolo whose first member is still to come
    pending_tremolo_marks: Option<u32>,
}

impl<'s> BsrBuilder<'s> {
    pub fn new(settings: &'s TranslationSettings) -> Self {
        Self {
            settings,
            sections: Vec::new(),
            part: None,
            section: None,
            measure: None,
            previous_pitch: None,
            bass_clef: false,
            key_fifths: 0,
            measure_alterations: HashMap::new(),
            pending_tremolo_marks: None,
        }
    }

    pub fn build(mut self, score: &Score) -> Result<BsrScore, TranslationError> {
        log::info!("pass 3: MSR to BSR");
        Browser::new(&mut self).browse(score)?;
        let layout = BsrLayout::new(self.settings.cells_per_line, self.settings.lines_per_page);
        Ok(layout.lay_out(&self.sections))
    }

    fn push_item(&mut self, item: BsrItem) {
        if self.settings.trace_passes {
            log::debug!("bsr item {:?}", item);
        }
        if let Some(measure) = self.measure.as_mut() {
            measure.items.push(item);
        }
    }

    fn push_sign(&mut self, signs: &[BrailleCell]) {
        if !signs.is_empty() {
            self.push_item(BsrItem::Sign(signs.to_vec()));
        }
    }

    /// Accidental cells for `pitch`, empty when the key or the measure already implies it
    fn accidental_for(&mut self, pitch: &Pitch) -> Vec<BrailleCell> {
        let key = (pitch.step, pitch.octave);
        let expected = self
            .measure_alterations
            .get(&key)
            .copied()
            .unwrap_or_else(|| key_alteration(self.key_fifths, pitch.step));
        if pitch.alteration == expected {
            return Vec::new();
        }
        self.measure_alterations.insert(key, pitch.alteration);
        accidental_cells(pitch.alteration)
    }

    /// Dots, then the double tremolo sign after a first member
    fn finish_body(&mut self, body: &mut Vec<BrailleCell>, dots: u32) {
        body.extend(std::iter::repeat(cells::DOT).take(dots as usize));
        if let Some(marks) = self.pending_tremolo_marks.take() {
            body.push(cells::DOUBLE_TREMOLO_PREFIX);
            body.extend(lower_number(marks));
        }
    }

    fn push_note(&mut self, pitch: &Pitch, body: Vec<BrailleCell>) {
        let accidental = self.accidental_for(pitch);
        let octave_marked = needs_octave_mark(self.previous_pitch.as_ref(), pitch);
        self.previous_pitch = Some(*pitch);
        self.push_item(BsrItem::Note {
            accidental,
            octave_mark: octave_mark(pitch.octave),
            octave_marked,
            body,
        });
    }
}

impl MsrVisitor for BsrBuilder<'_> {
    fn visit_part_start(&mut self, part: &Part) -> Result<(), TranslationError> {
        let name = if part.name().is_empty() {
            part.id()
        } else {
            part.name()
        };
        self.part = Some(PartContext {
            name: name.to_string(),
            music_voices: part
                .voices()
                .filter(|v| v.kind() == VoiceKind::Regular && v.has_music())
                .count(),
        });
        Ok(())
    }

    fn visit_part_end(&mut self, _part: &Part) -> Result<(), TranslationError> {
        self.part = None;
        Ok(())
    }

    fn visit_voice_start(&mut self, voice: &Voice) -> Result<(), TranslationError> {
        if voice.kind() != VoiceKind::Regular || !voice.has_music() {
            return Ok(());
        }
        let heading = match &self.part {
            Some(part) if self.settings.generate_part_headings => {
                let text = if part.music_voices > 1 {
                    format!(
                        "{}, staff {}, voice {}",
                        part.name,
                        voice.staff_number(),
                        voice.number()
                    )
                } else {
                    part.name.clone()
                };
                Some(cells::grade1_text(&text))
            }
            _ => None,
        };
        if self.settings.trace_passes {
            log::debug!("braille section for voice {}", voice.number());
        }

        self.section = Some(BsrSection {
            heading,
            measures: Vec::new(),
        });
        self.previous_pitch = None;
        self.bass_clef = false;
        self.key_fifths = 0;
        Ok(())
    }

    fn visit_voice_end(&mut self, _voice: &Voice) -> Result<(), TranslationError> {
        if let Some(section) = self.section.take() {
            self.sections.push(section);
        }
        Ok(())
    }

    fn visit_measure_start(&mut self, measure: &Measure) -> Result<(), TranslationError> {
        if self.section.is_some() {
            self.measure = Some(BsrMeasure::new(measure.number()));
            self.measure_alterations.clear();
        }
        Ok(())
    }

    fn visit_measure_end(&mut self, _measure: &Measure) -> Result<(), TranslationError> {
        if let (Some(measure), Some(section)) = (self.measure.take(), self.section.as_mut()) {
            section.measures.push(measure);
        }
        Ok(())
    }

    fn visit_clef(&mut self, clef: &Clef) -> Result<(), TranslationError> {
        self.bass_clef = clef.kind.is_bass_family();
        if let Some(signs) = clef_cells(clef.kind) {
            self.push_sign(signs);
        }
        Ok(())
    }

    fn visit_key(&mut self, key: &Key) -> Result<(), TranslationError> {
        self.key_fifths = key.fifths;
        self.push_sign(&key_signature_cells(key.fifths));
        Ok(())
    }

    fn visit_time(&mut self, time: &Time) -> Result<(), TranslationError> {
        self.push_sign(&time_signature_cells(time));
        Ok(())
    }

    fn visit_barline(&mut self, barline: &Barline) -> Result<(), TranslationError> {
        if let Some(signs) = barline_cells(barline) {
            self.push_sign(signs);
        }
        Ok(())
    }

    fn visit_note_start(&mut self, note: &Note) -> Result<(), TranslationError> {
        if note.placement() == NotePlacement::InChord || self.measure.is_none() {
            return Ok(());
        }
        let value = ValueClass::from_display(note.display_whole_notes(), note.dots());

        match note.content() {
            NoteContent::Skip => {}
            NoteContent::Rest { measure_rest } => {
                let mut body = vec![rest_cell(if *measure_rest { ValueClass::Whole } else { value })];
                let dots = if *measure_rest { 0 } else { note.dots() };
                self.finish_body(&mut body, dots);
                self.push_item(BsrItem::Sign(body));
            }
            NoteContent::Pitched(pitch) | NoteContent::Unpitched(pitch) => {
                let mut body = vec![note_cell(pitch.step, value)];
                self.finish_body(&mut body, note.dots());
                if note.single_tremolo_marks() > 0 {
                    body.push(cells::SINGLE_TREMOLO_PREFIX);
                    body.extend(lower_number(note.single_tremolo_marks()));
                }
                if matches!(note.tie(), Some(TieKind::Start) | Some(TieKind::Continue)) {
                    body.extend_from_slice(&cells::NOTE_TIE);
                }
                self.push_note(pitch, body);
            }
        }
        Ok(())
    }

    fn visit_chord_start(&mut self, chord: &Chord) -> Result<(), TranslationError> {
        if self.measure.is_none() {
            return Ok(());
        }
        let mut pitches: Vec<Pitch> = chord.notes().iter().filter_map(|n| n.pitch().copied()).collect();
        pitches.sort_by_key(Pitch::diatonic_index);
        if !self.bass_clef {
            pitches.reverse();
        }
        let Some((written, others)) = pitches.split_first() else {
            return Ok(());
        };

        let value = ValueClass::from_display(chord.display_whole_notes(), chord.dots());
        let mut body = vec![note_cell(written.step, value)];
        self.finish_body(&mut body, chord.dots());
        for other in others {
            body.extend(self.accidental_for(other));
            let distance = (other.diatonic_index() - written.diatonic_index()).unsigned_abs();
            if distance > 7 {
                body.extend(octave_mark(other.octave));
            }
            body.push(interval_cell(distance + 1));
        }
        let tremolo_marks = chord.notes().first().map_or(0, Note::single_tremolo_marks);
        if tremolo_marks > 0 {
            body.push(cells::SINGLE_TREMOLO_PREFIX);
            body.extend(lower_number(tremolo_marks));
        }
        if chord.is_tied() {
            body.extend_from_slice(&cells::CHORD_TIE);
        }

        let written = *written;
        self.push_note(&written, body);
        Ok(())
    }

    fn visit_tuplet_start(&mut self, tuplet: &Tuplet) -> Result<(), TranslationError> {
        self.push_sign(&tuplet_cells(tuplet.actual_notes()));
        Ok(())
    }

    fn visit_double_tremolo_start(&mut self, tremolo: &DoubleTremolo) -> Result<(), TranslationError> {
        self.pending_tremolo_marks = Some(tremolo.marks_number());
        Ok(())
    }

    fn visit_double_tremolo_end(&mut self, _tremolo: &DoubleTremolo) -> Result<(), TranslationError> {
        self.pending_tremolo_marks = None;
        Ok(())
    }
}
