//! Voices and measures
//!
//! A measure tracks the position reached by the elements appended so far.
//! Appending an element stamps it with the measure number and that
//! position, then advances the position by the element's sounding whole
//! notes. Positions therefore never decrease within a measure.

use crate::msr::measure_elements::MeasureElement;
use crate::msr::notes::Note;
use crate::rational::Rational;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MeasureKind {
    Unknown,
    Regular,
    /// Pickup measure at the start of a part
    Anacrusis,
    Incomplete,
    Overfull,
    Empty,
}

#[derive(Debug, Clone, Serialize)]
pub struct Measure {
    number: String,
    input_line: usize,
    full_measure_whole_notes: Rational,
    current_position: Rational,
    kind: MeasureKind,
    elements: Vec<MeasureElement>,
}

impl Measure {
    pub fn new(number: impl Into<String>, input_line: usize, full_measure_whole_notes: Rational) -> Self {
        Self {
            number: number.into(),
            input_line,
            full_measure_whole_notes,
            current_position: Rational::zero(),
            kind: MeasureKind::Unknown,
            elements: Vec::new(),
        }
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn input_line(&self) -> usize {
        self.input_line
    }

    pub fn full_measure_whole_notes(&self) -> Rational {
        self.full_measure_whole_notes
    }

    pub fn set_full_measure_whole_notes(&mut self, whole_notes: Rational) {
        self.full_measure_whole_notes = whole_notes;
    }

    /// Position where the next element will be appended
    pub fn current_position(&self) -> Rational {
        self.current_position
    }

    pub fn kind(&self) -> MeasureKind {
        self.kind
    }

    pub fn elements(&self) -> &[MeasureElement] {
        &self.elements
    }

    pub fn append_element(&mut self, mut element: MeasureElement) {
        element.assign_position(&self.number, self.current_position);

        let sounding = element.sounding_whole_notes();
        if sounding.is_set() && sounding.is_positive() {
            self.current_position += sounding;
            self.current_position.rationalise();
        }
        self.elements.push(element);
    }

    /// Fill the gap up to `position` with a skip note
    pub fn pad_up_to_position(
        &mut self,
        position: Rational,
        voice_number: u32,
        staff_number: u32,
        input_line: usize,
    ) {
        if position > self.current_position {
            let gap = (position - self.current_position).rationalised();
            let skip = Note::new_skip(input_line, gap, voice_number, staff_number);
            self.append_element(MeasureElement::Note(skip));
        }
    }

    /// Compute the measure kind once all elements are in
    pub fn finalize(&mut self, is_first_measure_in_voice: bool) {
        let has_notes = self.elements.iter().any(|e| {
            !matches!(
                e,
                MeasureElement::Clef(_)
                    | MeasureElement::Key(_)
                    | MeasureElement::Time(_)
                    | MeasureElement::Barline(_)
            )
        });

        self.kind = if !has_notes || self.current_position.is_zero() {
            MeasureKind::Empty
        } else if self.current_position == self.full_measure_whole_notes {
            MeasureKind::Regular
        } else if self.current_position < self.full_measure_whole_notes {
            if is_first_measure_in_voice {
                MeasureKind::Anacrusis
            } else {
                MeasureKind::Incomplete
            }
        } else {
            MeasureKind::Overfull
        };
    }
}

// ============================================================================
// VOICE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VoiceKind {
    Regular,
    FiguredBass,
}

#[derive(Debug, Clone, Serialize)]
pub struct Voice {
    number: u32,
    kind: VoiceKind,
    /// Staff the voice was first seen on
    staff_number: u32,
    input_line: usize,
    measures: Vec<Measure>,
}

impl Voice {
    pub fn new(number: u32, kind: VoiceKind, staff_number: u32, input_line: usize) -> Self {
        Self {
            number,
            kind,
            staff_number,
            input_line,
            measures: Vec::new(),
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn kind(&self) -> VoiceKind {
        self.kind
    }

    pub fn staff_number(&self) -> u32 {
        self.staff_number
    }

    pub fn input_line(&self) -> usize {
        self.input_line
    }

    pub fn measures(&self) -> &[Measure] {
        &self.measures
    }

    pub fn create_measure(
        &mut self,
        number: impl Into<String>,
        input_line: usize,
        full_measure_whole_notes: Rational,
    ) -> &mut Measure {
        self.measures
            .push(Measure::new(number, input_line, full_measure_whole_notes));
        let last = self.measures.len() - 1;
        &mut self.measures[last]
    }

    pub fn last_measure(&self) -> Option<&Measure> {
        self.measures.last()
    }

    pub fn last_measure_mut(&mut self) -> Option<&mut Measure> {
        self.measures.last_mut()
    }

    /// Position reached in the current measure, zero before the first one
    pub fn current_position(&self) -> Rational {
        self.measures
            .last()
            .map(Measure::current_position)
            .unwrap_or_else(Rational::zero)
    }

    /// Finalize the current measure against the time signature
    pub fn finalize_last_measure(&mut self) {
        let is_first = self.measures.len() == 1;
        if let Some(measure) = self.measures.last_mut() {
            measure.finalize(is_first);
        }
    }

    /// True when the voice holds something besides skips
    pub fn has_music(&self) -> bool {
        self.measures.iter().flat_map(|m| m.elements()).any(|e| match e {
            MeasureElement::Note(note) => !note.is_skip(),
            MeasureElement::Chord(_)
            | MeasureElement::Tuplet(_)
            | MeasureElement::DoubleTremolo(_)
            | MeasureElement::FiguredBass(_) => true,
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msr::attributes::{Clef, ClefKind};
    use crate::msr::notes::{Alteration, DiatonicStep, NoteContent, Pitch};

    fn quarter() -> MeasureElement {
        MeasureElement::Note(Note::new(
            7,
            NoteContent::Pitched(Pitch::new(DiatonicStep::G, Alteration::Natural, 4)),
            Rational::new(1, 4),
            Rational::new(1, 4),
            0,
        ))
    }

    #[test]
    fn test_positions_advance_with_sounding_duration() {
        let mut measure = Measure::new("1", 5, Rational::one());
        measure.append_element(MeasureElement::Clef(Clef::new(6, ClefKind::Treble, 1)));
        measure.append_element(quarter());
        measure.append_element(quarter());

        let positions: Vec<Rational> = measure
            .elements()
            .iter()
            .map(MeasureElement::position_in_measure)
            .collect();
        assert_eq!(
            positions,
            vec![Rational::zero(), Rational::zero(), Rational::new(1, 4)]
        );
        assert_eq!(measure.current_position(), Rational::new(1, 2));
        assert!(measure.elements().iter().all(|e| e.core().measure_number == "1"));
    }

    #[test]
    fn test_padding_appends_a_skip() {
        let mut measure = Measure::new("2", 5, Rational::one());
        measure.append_element(quarter());
        measure.pad_up_to_position(Rational::new(3, 4), 1, 1, 9);
        measure.pad_up_to_position(Rational::new(1, 2), 1, 1, 9);

        assert_eq!(measure.elements().len(), 2);
        assert_eq!(measure.current_position(), Rational::new(3, 4));
        match &measure.elements()[1] {
            MeasureElement::Note(note) => {
                assert!(note.is_skip());
                assert_eq!(note.sounding_whole_notes(), Rational::new(1, 2));
            }
            other => panic!("expected a skip, got {:?}", other),
        }
    }

    #[test]
    fn test_measure_kinds() {
        let mut voice = Voice::new(1, VoiceKind::Regular, 1, 3);

        voice.create_measure("0", 4, Rational::new(3, 4)).append_element(quarter());
        voice.finalize_last_measure();
        assert_eq!(voice.last_measure().unwrap().kind(), MeasureKind::Anacrusis);

        let measure = voice.create_measure("1", 8, Rational::new(3, 4));
        for _ in 0..3 {
            measure.append_element(quarter());
        }
        voice.finalize_last_measure();
        assert_eq!(voice.last_measure().unwrap().kind(), MeasureKind::Regular);

        voice.create_measure("2", 12, Rational::new(3, 4)).append_element(quarter());
        voice.finalize_last_measure();
        assert_eq!(voice.last_measure().unwrap().kind(), MeasureKind::Incomplete);

        let measure = voice.create_measure("3", 16, Rational::new(1, 2));
        for _ in 0..3 {
            measure.append_element(quarter());
        }
        voice.finalize_last_measure();
        assert_eq!(voice.last_measure().unwrap().kind(), MeasureKind::Overfull);

        voice.create_measure("4", 20, Rational::one());
        voice.finalize_last_measure();
        assert_eq!(voice.last_measure().unwrap().kind(), MeasureKind::Empty);
    }
}
