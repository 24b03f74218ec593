//! Double tremolos
//!
//! A double tremolo alternates rapidly between two notes or two chords. The
//! duration of each written alternation is a property of the marks count
//! alone: `1 / 2^(marks + 2)` whole notes (one mark → eighths, two → 16ths,
//! ...). The number of repeats is derived from the members' display
//! durations and must come out as an integer.

use crate::errors::{InternalError, SourceLocation, TranslationError};
use crate::msr::measure_elements::{set_core_position, MeasureElementCore};
use crate::msr::notes::{NoteOrChord, NotePlacement};
use crate::rational::Rational;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DoubleTremoloKind {
    Notes,
    Chords,
}

impl DoubleTremoloKind {
    fn name(&self) -> &'static str {
        match self {
            DoubleTremoloKind::Notes => "notes",
            DoubleTremoloKind::Chords => "chords",
        }
    }

    fn accepts(&self, member: &NoteOrChord) -> bool {
        matches!(
            (self, member),
            (DoubleTremoloKind::Notes, NoteOrChord::Note(_))
                | (DoubleTremoloKind::Chords, NoteOrChord::Chord(_))
        )
    }
}

/// MusicXML `<tremolo type="...">`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TremoloTypeKind {
    Start,
    Stop,
    Single,
}

impl TremoloTypeKind {
    pub fn from_musicxml(value: &str) -> Option<Self> {
        match value {
            "start" => Some(TremoloTypeKind::Start),
            "stop" => Some(TremoloTypeKind::Stop),
            "single" => Some(TremoloTypeKind::Single),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Placement {
    None,
    Above,
    Below,
}

impl Placement {
    pub fn from_musicxml(value: Option<&str>) -> Self {
        match value {
            Some("above") => Placement::Above,
            Some("below") => Placement::Below,
            _ => Placement::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoubleTremolo {
    pub core: MeasureElementCore,
    kind: DoubleTremoloKind,
    type_kind: TremoloTypeKind,
    marks_number: u32,
    placement: Placement,
    elements_duration: Rational,
    number_of_repeats: i64,
    first_element: Option<NoteOrChord>,
    second_element: Option<NoteOrChord>,
}

impl DoubleTremolo {
    pub fn new(
        input_line: usize,
        kind: DoubleTremoloKind,
        type_kind: TremoloTypeKind,
        marks_number: u32,
        placement: Placement,
    ) -> Self {
        Self {
            core: MeasureElementCore::new(input_line, Rational::NOT_SET),
            kind,
            type_kind,
            marks_number,
            placement,
            elements_duration: Rational::power_of_two_fraction(marks_number + 2),
            number_of_repeats: 0,
            first_element: None,
            second_element: None,
        }
    }

    pub fn kind(&self) -> DoubleTremoloKind {
        self.kind
    }

    pub fn type_kind(&self) -> TremoloTypeKind {
        self.type_kind
    }

    pub fn marks_number(&self) -> u32 {
        self.marks_number
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Duration of each written member: `1 / 2^(marks + 2)`
    pub fn elements_duration(&self) -> Rational {
        self.elements_duration
    }

    pub fn number_of_repeats(&self) -> i64 {
        self.number_of_repeats
    }

    pub fn sounding_whole_notes(&self) -> Rational {
        self.core.sounding_whole_notes
    }

    pub fn first_element(&self) -> Option<&NoteOrChord> {
        self.first_element.as_ref()
    }

    pub fn second_element(&self) -> Option<&NoteOrChord> {
        self.second_element.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.first_element.is_some() && self.second_element.is_some()
    }

    /// Register the first member and derive the number of repeats.
    ///
    /// The tremolo lasts as long as both members' display durations together;
    /// `total / elements_duration / 2` must be an integer.
    pub fn set_double_tremolo_first_element(
        &mut self,
        mut member: NoteOrChord,
        location: SourceLocation,
    ) -> Result<(), TranslationError> {
        self.check_member_kind(&member, &location)?;

        let mut member_display = member.display_whole_notes();
        member_display.rationalise();

        let mut sounding = member_display * 2;
        sounding.rationalise();

        let mut repeats = sounding / self.elements_duration / 2;
        repeats.rationalise();

        if repeats.denominator() != 1 {
            return Err(InternalError::TremoloRepeatsNotInteger {
                location,
                repeats: repeats.to_string(),
                sounding: sounding.to_string(),
                elements_duration: self.elements_duration.to_string(),
            }
            .into());
        }

        self.core.sounding_whole_notes = sounding;
        self.number_of_repeats = repeats.numerator();

        Self::mark_member(&mut member, self.elements_duration);
        self.first_element = Some(member);
        Ok(())
    }

    /// Register the second member, which must last as long as the first
    pub fn set_double_tremolo_second_element(
        &mut self,
        mut member: NoteOrChord,
        location: SourceLocation,
    ) -> Result<(), TranslationError> {
        self.check_member_kind(&member, &location)?;

        if self.first_element.is_none() {
            return Err(InternalError::Generic {
                location,
                message: "double tremolo second element set before the first one".to_string(),
            }
            .into());
        }

        let mut expected = member.display_whole_notes() * 2;
        expected.rationalise();

        if expected != self.core.sounding_whole_notes {
            return Err(InternalError::TremoloMembersDisagree {
                location,
                first: (self.core.sounding_whole_notes / 2).rationalised().to_string(),
                second: member.display_whole_notes().rationalised().to_string(),
            }
            .into());
        }

        Self::mark_member(&mut member, self.elements_duration);
        self.second_element = Some(member);
        Ok(())
    }

    fn check_member_kind(
        &self,
        member: &NoteOrChord,
        location: &SourceLocation,
    ) -> Result<(), TranslationError> {
        if self.kind.accepts(member) {
            Ok(())
        } else {
            Err(InternalError::TremoloMemberKindMismatch {
                location: location.clone(),
                member: member.kind_name().to_string(),
                tremolo: self.kind.name().to_string(),
            }
            .into())
        }
    }

    fn mark_member(member: &mut NoteOrChord, elements_duration: Rational) {
        member.set_sounding_whole_notes(elements_duration);
        if let NoteOrChord::Note(note) = member {
            note.set_placement(NotePlacement::InDoubleTremolo);
        }
    }

    pub fn assign_position(&mut self, measure_number: &str, position: Rational) {
        set_core_position(&mut self.core, measure_number, position);
        let half = (self.core.sounding_whole_notes / 2).rationalised();
        if let Some(first) = &mut self.first_element {
            first.assign_position(measure_number, position);
        }
        if let Some(second) = &mut self.second_element {
            second.assign_position(measure_number, position + half);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msr::notes::{Alteration, Chord, DiatonicStep, Note, NoteContent, Pitch};

    fn note(step: DiatonicStep, whole_notes: Rational) -> NoteOrChord {
        NoteOrChord::Note(Note::new(
            5,
            NoteContent::Pitched(Pitch::new(step, Alteration::Natural, 4)),
            whole_notes,
            whole_notes,
            0,
        ))
    }

    fn here() -> SourceLocation {
        SourceLocation::new("tremolo.xml", 5)
    }

    #[test]
    fn test_elements_duration_depends_on_marks_only() {
        for (marks, denominator) in [(1, 8), (2, 16), (3, 32)] {
            let tremolo = DoubleTremolo::new(
                1,
                DoubleTremoloKind::Notes,
                TremoloTypeKind::Start,
                marks,
                Placement::None,
            );
            assert_eq!(tremolo.elements_duration(), Rational::new(1, denominator));
        }
    }

    #[test]
    fn test_members_take_elements_duration() {
        let mut tremolo = DoubleTremolo::new(
            1,
            DoubleTremoloKind::Notes,
            TremoloTypeKind::Start,
            2,
            Placement::None,
        );
        tremolo
            .set_double_tremolo_first_element(note(DiatonicStep::C, Rational::new(1, 4)), here())
            .unwrap();
        tremolo
            .set_double_tremolo_second_element(note(DiatonicStep::E, Rational::new(1, 4)), here())
            .unwrap();

        assert!(tremolo.is_complete());
        assert_eq!(tremolo.number_of_repeats(), 4);
        assert_eq!(
            tremolo.first_element().unwrap().sounding_whole_notes(),
            Rational::new(1, 16)
        );
        assert_eq!(
            tremolo.second_element().unwrap().sounding_whole_notes(),
            Rational::new(1, 16)
        );
    }

    #[test]
    fn test_non_integer_repeats_is_internal_error() {
        let mut tremolo = DoubleTremolo::new(
            1,
            DoubleTremoloKind::Notes,
            TremoloTypeKind::Start,
            3,
            Placement::None,
        );
        // 2 × 1/128 / (1/32) / 2 = 1/4
        let result =
            tremolo.set_double_tremolo_first_element(note(DiatonicStep::C, Rational::new(1, 128)), here());
        assert!(matches!(
            result,
            Err(TranslationError::Internal(InternalError::TremoloRepeatsNotInteger { .. }))
        ));
    }

    #[test]
    fn test_second_member_duration_mismatch_is_internal_error() {
        let mut tremolo = DoubleTremolo::new(
            1,
            DoubleTremoloKind::Notes,
            TremoloTypeKind::Start,
            2,
            Placement::None,
        );
        tremolo
            .set_double_tremolo_first_element(note(DiatonicStep::C, Rational::new(1, 2)), here())
            .unwrap();

        let result =
            tremolo.set_double_tremolo_second_element(note(DiatonicStep::E, Rational::new(1, 4)), here());
        match result {
            Err(TranslationError::Internal(InternalError::TremoloMembersDisagree { first, second, .. })) => {
                assert_eq!(first, "1/2");
                assert_eq!(second, "1/4");
            }
            other => panic!("expected a member disagreement, got {:?}", other),
        }
        assert!(!tremolo.is_complete());
    }

    #[test]
    fn test_chord_in_notes_tremolo_is_rejected() {
        let mut tremolo = DoubleTremolo::new(
            1,
            DoubleTremoloKind::Notes,
            TremoloTypeKind::Start,
            1,
            Placement::None,
        );
        let chord = match note(DiatonicStep::C, Rational::new(1, 2)) {
            NoteOrChord::Note(n) => NoteOrChord::Chord(Chord::from_first_note(n)),
            other => other,
        };
        let result = tremolo.set_double_tremolo_first_element(chord, here());
        assert!(matches!(
            result,
            Err(TranslationError::Internal(InternalError::TremoloMemberKindMismatch { .. }))
        ));
    }

    #[test]
    fn test_second_element_before_first_is_rejected() {
        let mut tremolo = DoubleTremolo::new(
            1,
            DoubleTremoloKind::Notes,
            TremoloTypeKind::Start,
            1,
            Placement::None,
        );
        let result = tremolo
            .set_double_tremolo_second_element(note(DiatonicStep::C, Rational::new(1, 2)), here());
        assert!(matches!(
            result,
            Err(TranslationError::Internal(InternalError::Generic { .. }))
        ));
    }
}
