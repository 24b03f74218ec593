//! Elements that live in a measure
//!
//! Every measure element carries a [`MeasureElementCore`]: input line,
//! measure number, position in the measure and sounding whole notes. The
//! position is assigned by the owning [`crate::msr::Measure`] when the
//! element is appended and is never changed after the pass completes.

use crate::msr::attributes::{Barline, Clef, Key, Time};
use crate::msr::figured_bass::FiguredBass;
use crate::msr::notes::{Chord, Note, Tuplet};
use crate::msr::tremolos::DoubleTremolo;
use crate::rational::Rational;
use serde::Serialize;

/// Data shared by all measure elements
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasureElementCore {
    pub input_line: usize,
    pub measure_number: String,
    pub position_in_measure: Rational,
    pub sounding_whole_notes: Rational,
}

impl MeasureElementCore {
    pub fn new(input_line: usize, sounding_whole_notes: Rational) -> Self {
        Self {
            input_line,
            measure_number: String::new(),
            position_in_measure: Rational::NOT_SET,
            sounding_whole_notes,
        }
    }
}

/// Anything a measure can hold
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum MeasureElement {
    Clef(Clef),
    Key(Key),
    Time(Time),
    Barline(Barline),
    Note(Note),
    Chord(Chord),
    Tuplet(Tuplet),
    DoubleTremolo(DoubleTremolo),
    FiguredBass(FiguredBass),
}

impl MeasureElement {
    pub fn core(&self) -> &MeasureElementCore {
        match self {
            MeasureElement::Clef(e) => &e.core,
            MeasureElement::Key(e) => &e.core,
            MeasureElement::Time(e) => &e.core,
            MeasureElement::Barline(e) => &e.core,
            MeasureElement::Note(e) => &e.core,
            MeasureElement::Chord(e) => &e.core,
            MeasureElement::Tuplet(e) => &e.core,
            MeasureElement::DoubleTremolo(e) => &e.core,
            MeasureElement::FiguredBass(e) => &e.core,
        }
    }

    pub fn input_line(&self) -> usize {
        self.core().input_line
    }

    pub fn sounding_whole_notes(&self) -> Rational {
        self.core().sounding_whole_notes
    }

    pub fn position_in_measure(&self) -> Rational {
        self.core().position_in_measure
    }

    /// Set measure number and position, propagating to nested members
    pub fn assign_position(&mut self, measure_number: &str, position: Rational) {
        match self {
            MeasureElement::Clef(e) => set_core_position(&mut e.core, measure_number, position),
            MeasureElement::Key(e) => set_core_position(&mut e.core, measure_number, position),
            MeasureElement::Time(e) => set_core_position(&mut e.core, measure_number, position),
            MeasureElement::Barline(e) => set_core_position(&mut e.core, measure_number, position),
            MeasureElement::Note(e) => e.assign_position(measure_number, position),
            MeasureElement::Chord(e) => e.assign_position(measure_number, position),
            MeasureElement::Tuplet(e) => e.assign_position(measure_number, position),
            MeasureElement::DoubleTremolo(e) => e.assign_position(measure_number, position),
            MeasureElement::FiguredBass(e) => {
                set_core_position(&mut e.core, measure_number, position)
            }
        }
    }
}

pub(crate) fn set_core_position(
    core: &mut MeasureElementCore,
    measure_number: &str,
    position: Rational,
) {
    core.measure_number = measure_number.to_string();
    core.position_in_measure = position;
}
