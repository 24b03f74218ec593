//! Notes, chords and tuplets

use crate::msr::measure_elements::{set_core_position, MeasureElementCore};
use crate::rational::Rational;
use serde::Serialize;

// ============================================================================
// PITCH
// ============================================================================

/// Diatonic step, C = 0 .. B = 6
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiatonicStep {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl DiatonicStep {
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "C" => Some(DiatonicStep::C),
            "D" => Some(DiatonicStep::D),
            "E" => Some(DiatonicStep::E),
            "F" => Some(DiatonicStep::F),
            "G" => Some(DiatonicStep::G),
            "A" => Some(DiatonicStep::A),
            "B" => Some(DiatonicStep::B),
            _ => None,
        }
    }

    pub fn index(&self) -> i32 {
        match self {
            DiatonicStep::C => 0,
            DiatonicStep::D => 1,
            DiatonicStep::E => 2,
            DiatonicStep::F => 3,
            DiatonicStep::G => 4,
            DiatonicStep::A => 5,
            DiatonicStep::B => 6,
        }
    }
}

/// Chromatic alteration, quarter tones included
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Alteration {
    DoubleFlat,
    ThreeQuarterFlat,
    Flat,
    QuarterFlat,
    Natural,
    QuarterSharp,
    Sharp,
    ThreeQuarterSharp,
    DoubleSharp,
}

impl Alteration {
    /// From a MusicXML `<alter>` value in semitones; `None` beyond ±2
    pub fn from_semitones(alter: f32) -> Option<Self> {
        match (alter * 2.0).round() as i32 {
            -4 => Some(Alteration::DoubleFlat),
            -3 => Some(Alteration::ThreeQuarterFlat),
            -2 => Some(Alteration::Flat),
            -1 => Some(Alteration::QuarterFlat),
            0 => Some(Alteration::Natural),
            1 => Some(Alteration::QuarterSharp),
            2 => Some(Alteration::Sharp),
            3 => Some(Alteration::ThreeQuarterSharp),
            4 => Some(Alteration::DoubleSharp),
            _ => None,
        }
    }
}

/// A spelled pitch; octave 4 holds middle C
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Pitch {
    pub step: DiatonicStep,
    pub alteration: Alteration,
    pub octave: i32,
}

impl Pitch {
    pub fn new(step: DiatonicStep, alteration: Alteration, octave: i32) -> Self {
        Self {
            step,
            alteration,
            octave,
        }
    }

    /// Position on the diatonic scale across octaves
    pub fn diatonic_index(&self) -> i32 {
        self.octave * 7 + self.step.index()
    }
}

// ============================================================================
// NOTE
// ============================================================================

/// What a note sounds like
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum NoteContent {
    Pitched(Pitch),
    /// Percussion note, displayed at the given pitch
    Unpitched(Pitch),
    Rest { measure_rest: bool },
    /// Invisible filler created by forward elements and padding
    Skip,
}

/// Where a note sits in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NotePlacement {
    Standalone,
    InChord,
    InTuplet,
    InDoubleTremolo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TieKind {
    Start,
    Stop,
    Continue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note {
    pub core: MeasureElementCore,
    content: NoteContent,
    placement: NotePlacement,
    display_whole_notes: Rational,
    dots: u32,
    tie: Option<TieKind>,
    single_tremolo_marks: u32,
    voice_number: u32,
    staff_number: u32,
}

impl Note {
    pub fn new(
        input_line: usize,
        content: NoteContent,
        sounding_whole_notes: Rational,
        display_whole_notes: Rational,
        dots: u32,
    ) -> Self {
        Self {
            core: MeasureElementCore::new(input_line, sounding_whole_notes),
            content,
            placement: NotePlacement::Standalone,
            display_whole_notes,
            dots,
            tie: None,
            single_tremolo_marks: 0,
            voice_number: 1,
            staff_number: 1,
        }
    }

    /// A skip lasting `whole_notes`, displayed as such
    pub fn new_skip(input_line: usize, whole_notes: Rational, voice_number: u32, staff_number: u32) -> Self {
        let mut note = Self::new(input_line, NoteContent::Skip, whole_notes, whole_notes, 0);
        note.voice_number = voice_number;
        note.staff_number = staff_number;
        note
    }

    pub fn content(&self) -> &NoteContent {
        &self.content
    }

    pub fn pitch(&self) -> Option<&Pitch> {
        match &self.content {
            NoteContent::Pitched(p) | NoteContent::Unpitched(p) => Some(p),
            NoteContent::Rest { .. } | NoteContent::Skip => None,
        }
    }

    pub fn is_rest(&self) -> bool {
        matches!(self.content, NoteContent::Rest { .. })
    }

    pub fn is_skip(&self) -> bool {
        matches!(self.content, NoteContent::Skip)
    }

    pub fn placement(&self) -> NotePlacement {
        self.placement
    }

    pub fn set_placement(&mut self, placement: NotePlacement) {
        self.placement = placement;
    }

    pub fn input_line(&self) -> usize {
        self.core.input_line
    }

    pub fn sounding_whole_notes(&self) -> Rational {
        self.core.sounding_whole_notes
    }

    pub fn set_sounding_whole_notes(&mut self, whole_notes: Rational) {
        self.core.sounding_whole_notes = whole_notes;
    }

    pub fn display_whole_notes(&self) -> Rational {
        self.display_whole_notes
    }

    pub fn dots(&self) -> u32 {
        self.dots
    }

    pub fn tie(&self) -> Option<TieKind> {
        self.tie
    }

    pub fn set_tie(&mut self, tie: Option<TieKind>) {
        self.tie = tie;
    }

    pub fn single_tremolo_marks(&self) -> u32 {
        self.single_tremolo_marks
    }

    pub fn set_single_tremolo_marks(&mut self, marks: u32) {
        self.single_tremolo_marks = marks;
    }

    pub fn voice_number(&self) -> u32 {
        self.voice_number
    }

    pub fn staff_number(&self) -> u32 {
        self.staff_number
    }

    pub fn set_voice_and_staff(&mut self, voice_number: u32, staff_number: u32) {
        self.voice_number = voice_number;
        self.staff_number = staff_number;
    }

    pub fn assign_position(&mut self, measure_number: &str, position: Rational) {
        set_core_position(&mut self.core, measure_number, position);
    }
}

// ============================================================================
// CHORD
// ============================================================================

/// Simultaneous notes sharing one duration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chord {
    pub core: MeasureElementCore,
    display_whole_notes: Rational,
    dots: u32,
    notes: Vec<Note>,
}

impl Chord {
    /// Start a chord from its first note, taking over its durations
    pub fn from_first_note(mut note: Note) -> Self {
        note.set_placement(NotePlacement::InChord);
        Self {
            core: MeasureElementCore::new(note.input_line(), note.sounding_whole_notes()),
            display_whole_notes: note.display_whole_notes(),
            dots: note.dots(),
            notes: vec![note],
        }
    }

    pub fn add_note(&mut self, mut note: Note) {
        note.set_placement(NotePlacement::InChord);
        note.assign_position(&self.core.measure_number, self.core.position_in_measure);
        self.notes.push(note);
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn display_whole_notes(&self) -> Rational {
        self.display_whole_notes
    }

    pub fn dots(&self) -> u32 {
        self.dots
    }

    pub fn sounding_whole_notes(&self) -> Rational {
        self.core.sounding_whole_notes
    }

    /// Sets the chord's and all its notes' sounding whole notes
    pub fn set_sounding_whole_notes(&mut self, whole_notes: Rational) {
        self.core.sounding_whole_notes = whole_notes;
        for note in &mut self.notes {
            note.set_sounding_whole_notes(whole_notes);
        }
    }

    pub fn is_tied(&self) -> bool {
        self.notes
            .iter()
            .any(|n| matches!(n.tie(), Some(TieKind::Start) | Some(TieKind::Continue)))
    }

    pub fn staff_number(&self) -> u32 {
        self.notes.first().map(Note::staff_number).unwrap_or(1)
    }

    pub fn assign_position(&mut self, measure_number: &str, position: Rational) {
        set_core_position(&mut self.core, measure_number, position);
        for note in &mut self.notes {
            note.assign_position(measure_number, position);
        }
    }
}

// ============================================================================
// NOTE OR CHORD
// ============================================================================

/// Member of a tuplet or a double tremolo
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum NoteOrChord {
    Note(Note),
    Chord(Chord),
}

impl NoteOrChord {
    pub fn input_line(&self) -> usize {
        match self {
            NoteOrChord::Note(n) => n.input_line(),
            NoteOrChord::Chord(c) => c.core.input_line,
        }
    }

    pub fn sounding_whole_notes(&self) -> Rational {
        match self {
            NoteOrChord::Note(n) => n.sounding_whole_notes(),
            NoteOrChord::Chord(c) => c.sounding_whole_notes(),
        }
    }

    pub fn set_sounding_whole_notes(&mut self, whole_notes: Rational) {
        match self {
            NoteOrChord::Note(n) => n.set_sounding_whole_notes(whole_notes),
            NoteOrChord::Chord(c) => c.set_sounding_whole_notes(whole_notes),
        }
    }

    pub fn display_whole_notes(&self) -> Rational {
        match self {
            NoteOrChord::Note(n) => n.display_whole_notes(),
            NoteOrChord::Chord(c) => c.display_whole_notes(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            NoteOrChord::Note(_) => "note",
            NoteOrChord::Chord(_) => "chord",
        }
    }

    pub fn assign_position(&mut self, measure_number: &str, position: Rational) {
        match self {
            NoteOrChord::Note(n) => n.assign_position(measure_number, position),
            NoteOrChord::Chord(c) => c.assign_position(measure_number, position),
        }
    }
}

// ============================================================================
// TUPLET
// ============================================================================

/// `actual_notes` members in the time of `normal_notes`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tuplet {
    pub core: MeasureElementCore,
    number: u32,
    actual_notes: u32,
    normal_notes: u32,
    members: Vec<NoteOrChord>,
}

impl Tuplet {
    pub fn new(input_line: usize, number: u32, actual_notes: u32, normal_notes: u32) -> Self {
        Self {
            core: MeasureElementCore::new(input_line, Rational::zero()),
            number,
            actual_notes,
            normal_notes,
            members: Vec::new(),
        }
    }

    pub fn add_member(&mut self, mut member: NoteOrChord) {
        if let NoteOrChord::Note(note) = &mut member {
            note.set_placement(NotePlacement::InTuplet);
        }
        self.core.sounding_whole_notes += member.sounding_whole_notes();
        self.core.sounding_whole_notes.rationalise();
        self.members.push(member);
    }

    pub fn members(&self) -> &[NoteOrChord] {
        &self.members
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn actual_notes(&self) -> u32 {
        self.actual_notes
    }

    pub fn normal_notes(&self) -> u32 {
        self.normal_notes
    }

    /// normal / actual, e.g. 2/3 for a triplet
    pub fn factor(&self) -> Rational {
        Rational::new(self.normal_notes as i64, self.actual_notes as i64)
    }

    pub fn assign_position(&mut self, measure_number: &str, position: Rational) {
        set_core_position(&mut self.core, measure_number, position);
        let mut member_position = position;
        for member in &mut self.members {
            member.assign_position(measure_number, member_position);
            member_position += member.sounding_whole_notes();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quarter(step: DiatonicStep) -> Note {
        Note::new(
            1,
            NoteContent::Pitched(Pitch::new(step, Alteration::Natural, 4)),
            Rational::new(1, 4),
            Rational::new(1, 4),
            0,
        )
    }

    #[test]
    fn test_alteration_from_semitones() {
        assert_eq!(Alteration::from_semitones(-0.5), Some(Alteration::QuarterFlat));
        assert_eq!(Alteration::from_semitones(1.0), Some(Alteration::Sharp));
        assert_eq!(Alteration::from_semitones(3.0), None);
    }

    #[test]
    fn test_chord_members_share_position() {
        let mut chord = Chord::from_first_note(quarter(DiatonicStep::C));
        chord.assign_position("3", Rational::new(1, 2));
        chord.add_note(quarter(DiatonicStep::E));

        assert_eq!(chord.notes().len(), 2);
        for note in chord.notes() {
            assert_eq!(note.placement(), NotePlacement::InChord);
            assert_eq!(note.core.position_in_measure, Rational::new(1, 2));
            assert_eq!(note.core.measure_number, "3");
        }
    }

    #[test]
    fn test_tuplet_members_get_successive_positions() {
        let eighth_triplet = |step| {
            Note::new(
                1,
                NoteContent::Pitched(Pitch::new(step, Alteration::Natural, 4)),
                Rational::new(1, 12),
                Rational::new(1, 8),
                0,
            )
        };
        let mut tuplet = Tuplet::new(1, 1, 3, 2);
        for step in [DiatonicStep::C, DiatonicStep::D, DiatonicStep::E] {
            tuplet.add_member(NoteOrChord::Note(eighth_triplet(step)));
        }
        tuplet.assign_position("1", Rational::zero());

        assert_eq!(tuplet.core.sounding_whole_notes, Rational::new(1, 4));
        let positions: Vec<Rational> = tuplet
            .members()
            .iter()
            .map(|m| match m {
                NoteOrChord::Note(n) => n.core.position_in_measure,
                NoteOrChord::Chord(c) => c.core.position_in_measure,
            })
            .collect();
        assert_eq!(
            positions,
            vec![Rational::zero(), Rational::new(1, 12), Rational::new(1, 6)]
        );
        assert_eq!(tuplet.factor(), Rational::new(2, 3));
    }
}
