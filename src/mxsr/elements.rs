//! The MusicXML element tree (MXSR)
//!
//! An owned copy of the XML elements the translator understands, each with
//! its input line number. Elements the passes do not handle are kept as
//! [`MxsrElementKind::Other`] so that traversal still reaches their children.

use crate::browser::{browse_all, Visitable};
use crate::errors::TranslationError;
use serde::Serialize;

/// Kinds of MusicXML elements the passes dispatch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MxsrElementKind {
    ScorePartwise,
    Work,
    WorkTitle,
    MovementTitle,
    Identification,
    Creator,
    Rights,
    Software,
    PartList,
    PartGroup,
    GroupName,
    GroupNameDisplay,
    GroupAbbreviation,
    GroupAbbreviationDisplay,
    GroupSymbol,
    GroupBarline,
    DisplayText,
    AccidentalText,
    ScorePart,
    PartName,
    PartNameDisplay,
    PartAbbreviation,
    ScoreInstrument,
    InstrumentName,
    Part,
    Measure,
    Attributes,
    Divisions,
    Key,
    Fifths,
    Mode,
    Time,
    Beats,
    BeatType,
    Staves,
    Clef,
    Sign,
    Line,
    ClefOctaveChange,
    Note,
    Chord,
    Grace,
    Pitch,
    Step,
    Alter,
    Octave,
    Unpitched,
    DisplayStep,
    DisplayOctave,
    Rest,
    Duration,
    Voice,
    Type,
    Dot,
    TimeModification,
    ActualNotes,
    NormalNotes,
    Staff,
    Tie,
    Notations,
    Tuplet,
    Ornaments,
    Tremolo,
    Backup,
    Forward,
    Barline,
    BarStyle,
    Repeat,
    FiguredBass,
    Figure,
    Prefix,
    FigureNumber,
    Suffix,
    Other,
}

impl MxsrElementKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "score-partwise" => Self::ScorePartwise,
            "work" => Self::Work,
            "work-title" => Self::WorkTitle,
            "movement-title" => Self::MovementTitle,
            "identification" => Self::Identification,
            "creator" => Self::Creator,
            "rights" => Self::Rights,
            "software" => Self::Software,
            "part-list" => Self::PartList,
            "part-group" => Self::PartGroup,
            "group-name" => Self::GroupName,
            "group-name-display" => Self::GroupNameDisplay,
            "group-abbreviation" => Self::GroupAbbreviation,
            "group-abbreviation-display" => Self::GroupAbbreviationDisplay,
            "group-symbol" => Self::GroupSymbol,
            "group-barline" => Self::GroupBarline,
            "display-text" => Self::DisplayText,
            "accidental-text" => Self::AccidentalText,
            "score-part" => Self::ScorePart,
            "part-name" => Self::PartName,
            "part-name-display" => Self::PartNameDisplay,
            "part-abbreviation" => Self::PartAbbreviation,
            "score-instrument" => Self::ScoreInstrument,
            "instrument-name" => Self::InstrumentName,
            "part" => Self::Part,
            "measure" => Self::Measure,
            "attributes" => Self::Attributes,
            "divisions" => Self::Divisions,
            "key" => Self::Key,
            "fifths" => Self::Fifths,
            "mode" => Self::Mode,
            "time" => Self::Time,
            "beats" => Self::Beats,
            "beat-type" => Self::BeatType,
            "staves" => Self::Staves,
            "clef" => Self::Clef,
            "sign" => Self::Sign,
            "line" => Self::Line,
            "clef-octave-change" => Self::ClefOctaveChange,
            "note" => Self::Note,
            "chord" => Self::Chord,
            "grace" => Self::Grace,
            "pitch" => Self::Pitch,
            "step" => Self::Step,
            "alter" => Self::Alter,
            "octave" => Self::Octave,
            "unpitched" => Self::Unpitched,
            "display-step" => Self::DisplayStep,
            "display-octave" => Self::DisplayOctave,
            "rest" => Self::Rest,
            "duration" => Self::Duration,
            "voice" => Self::Voice,
            "type" => Self::Type,
            "dot" => Self::Dot,
            "time-modification" => Self::TimeModification,
            "actual-notes" => Self::ActualNotes,
            "normal-notes" => Self::NormalNotes,
            "staff" => Self::Staff,
            "tie" => Self::Tie,
            "notations" => Self::Notations,
            "tuplet" => Self::Tuplet,
            "ornaments" => Self::Ornaments,
            "tremolo" => Self::Tremolo,
            "backup" => Self::Backup,
            "forward" => Self::Forward,
            "barline" => Self::Barline,
            "bar-style" => Self::BarStyle,
            "repeat" => Self::Repeat,
            "figured-bass" => Self::FiguredBass,
            "figure" => Self::Figure,
            "prefix" => Self::Prefix,
            "figure-number" => Self::FigureNumber,
            "suffix" => Self::Suffix,
            _ => Self::Other,
        }
    }
}

/// One MusicXML element with its children
#[derive(Debug, Clone, Serialize)]
pub struct MxsrElement {
    kind: MxsrElementKind,
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    input_line: usize,
    children: Vec<MxsrElement>,
}

impl MxsrElement {
    pub fn new(name: impl Into<String>, input_line: usize) -> Self {
        let name = name.into();
        Self {
            kind: MxsrElementKind::from_name(&name),
            name,
            attributes: Vec::new(),
            text: None,
            input_line,
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: MxsrElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn push_child(&mut self, child: MxsrElement) {
        self.children.push(child);
    }

    pub fn kind(&self) -> MxsrElementKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_line(&self) -> usize {
        self.input_line
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Trimmed text content, `None` when empty
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn children(&self) -> &[MxsrElement] {
        &self.children
    }

    /// First child element of the given kind
    pub fn child(&self, kind: MxsrElementKind) -> Option<&MxsrElement> {
        self.children.iter().find(|c| c.kind == kind)
    }

    pub fn child_text(&self, kind: MxsrElementKind) -> Option<&str> {
        self.child(kind).and_then(|c| c.text())
    }

    pub fn has_child(&self, kind: MxsrElementKind) -> bool {
        self.child(kind).is_some()
    }
}

/// Visitor over the MXSR tree.
///
/// MusicXML has hundreds of element kinds, so the dispatch is a single pair
/// of callbacks receiving the element; passes `match` on
/// [`MxsrElement::kind`] and ignore the kinds they do not handle.
pub trait MxsrVisitor {
    fn visit_element_start(&mut self, _element: &MxsrElement) -> Result<(), TranslationError> {
        Ok(())
    }

    fn visit_element_end(&mut self, _element: &MxsrElement) -> Result<(), TranslationError> {
        Ok(())
    }
}

impl<V: MxsrVisitor + ?Sized> Visitable<V> for MxsrElement {
    fn accept_in(&self, visitor: &mut V) -> Result<(), TranslationError> {
        visitor.visit_element_start(self)
    }

    fn accept_out(&self, visitor: &mut V) -> Result<(), TranslationError> {
        visitor.visit_element_end(self)
    }

    fn browse_data(&self, visitor: &mut V) -> Result<(), TranslationError> {
        browse_all(visitor, &self.children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_name() {
        assert_eq!(MxsrElementKind::from_name("part-group"), MxsrElementKind::PartGroup);
        assert_eq!(MxsrElementKind::from_name("figured-bass"), MxsrElementKind::FiguredBass);
        assert_eq!(MxsrElementKind::from_name("harmony"), MxsrElementKind::Other);
    }

    #[test]
    fn test_child_lookup() {
        let note = MxsrElement::new("note", 10)
            .with_child(MxsrElement::new("duration", 11).with_text("4"))
            .with_child(MxsrElement::new("chord", 12));

        assert_eq!(note.child_text(MxsrElementKind::Duration), Some("4"));
        assert!(note.has_child(MxsrElementKind::Chord));
        assert!(!note.has_child(MxsrElementKind::Rest));
    }
}
