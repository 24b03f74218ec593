//! Visitor over the MSR tree
//!
//! One start/end callback pair per node category, each a no-op by default.
//! Browsing order:
//!
//! ```text
//! Score → implicit PartGroup → (Part | PartGroup)* → Staff* → Voice* → Measure*
//!   Measure → (Clef | Key | Time | Barline | Note | Chord | Tuplet | DoubleTremolo | FiguredBass)*
//!   Chord → Note*        Tuplet → (Note | Chord)*
//!   DoubleTremolo → first member, second member
//!   FiguredBass → Figure*
//! ```

use crate::browser::{browse_all, Browser, Visitable};
use crate::errors::TranslationError;
use crate::msr::attributes::{Barline, Clef, Key, Time};
use crate::msr::figured_bass::{Figure, FiguredBass};
use crate::msr::measure_elements::MeasureElement;
use crate::msr::notes::{Chord, Note, NoteOrChord, Tuplet};
use crate::msr::part_groups::{PartGroup, PartGroupElement};
use crate::msr::parts::{Part, Staff};
use crate::msr::score::Score;
use crate::msr::tremolos::DoubleTremolo;
use crate::msr::voices::{Measure, Voice};

type VisitResult = Result<(), TranslationError>;

#[allow(unused_variables)]
pub trait MsrVisitor {
    fn visit_score_start(&mut self, score: &Score) -> VisitResult {
        Ok(())
    }
    fn visit_score_end(&mut self, score: &Score) -> VisitResult {
        Ok(())
    }

    fn visit_part_group_start(&mut self, part_group: &PartGroup) -> VisitResult {
        Ok(())
    }
    fn visit_part_group_end(&mut self, part_group: &PartGroup) -> VisitResult {
        Ok(())
    }

    fn visit_part_start(&mut self, part: &Part) -> VisitResult {
        Ok(())
    }
    fn visit_part_end(&mut self, part: &Part) -> VisitResult {
        Ok(())
    }

    fn visit_staff_start(&mut self, staff: &Staff) -> VisitResult {
        Ok(())
    }
    fn visit_staff_end(&mut self, staff: &Staff) -> VisitResult {
        Ok(())
    }

    fn visit_voice_start(&mut self, voice: &Voice) -> VisitResult {
        Ok(())
    }
    fn visit_voice_end(&mut self, voice: &Voice) -> VisitResult {
        Ok(())
    }

    fn visit_measure_start(&mut self, measure: &Measure) -> VisitResult {
        Ok(())
    }
    fn visit_measure_end(&mut self, measure: &Measure) -> VisitResult {
        Ok(())
    }

    fn visit_clef(&mut self, clef: &Clef) -> VisitResult {
        Ok(())
    }
    fn visit_key(&mut self, key: &Key) -> VisitResult {
        Ok(())
    }
    fn visit_time(&mut self, time: &Time) -> VisitResult {
        Ok(())
    }
    fn visit_barline(&mut self, barline: &Barline) -> VisitResult {
        Ok(())
    }

    /// Called for standalone notes and for chord, tuplet and tremolo members
    fn visit_note_start(&mut self, note: &Note) -> VisitResult {
        Ok(())
    }
    fn visit_note_end(&mut self, note: &Note) -> VisitResult {
        Ok(())
    }

    fn visit_chord_start(&mut self, chord: &Chord) -> VisitResult {
        Ok(())
    }
    fn visit_chord_end(&mut self, chord: &Chord) -> VisitResult {
        Ok(())
    }

    fn visit_tuplet_start(&mut self, tuplet: &Tuplet) -> VisitResult {
        Ok(())
    }
    fn visit_tuplet_end(&mut self, tuplet: &Tuplet) -> VisitResult {
        Ok(())
    }

    fn visit_double_tremolo_start(&mut self, tremolo: &DoubleTremolo) -> VisitResult {
        Ok(())
    }
    fn visit_double_tremolo_end(&mut self, tremolo: &DoubleTremolo) -> VisitResult {
        Ok(())
    }

    fn visit_figured_bass_start(&mut self, figured_bass: &FiguredBass) -> VisitResult {
        Ok(())
    }
    fn visit_figured_bass_end(&mut self, figured_bass: &FiguredBass) -> VisitResult {
        Ok(())
    }

    fn visit_figure(&mut self, figure: &Figure) -> VisitResult {
        Ok(())
    }
}

/// Implements [`Visitable`] for a node with start/end callbacks
macro_rules! visitable {
    ($node:ty, $start:ident, $end:ident, |$self_:ident, $visitor:ident| $browse:expr) => {
        impl<V: MsrVisitor + ?Sized> Visitable<V> for $node {
            fn accept_in(&self, visitor: &mut V) -> VisitResult {
                visitor.$start(self)
            }

            fn accept_out(&self, visitor: &mut V) -> VisitResult {
                visitor.$end(self)
            }

            fn browse_data(&$self_, $visitor: &mut V) -> VisitResult {
                $browse
            }
        }
    };
}

/// Implements [`Visitable`] for a leaf with a single callback
macro_rules! visitable_leaf {
    ($node:ty, $visit:ident) => {
        impl<V: MsrVisitor + ?Sized> Visitable<V> for $node {
            fn accept_in(&self, visitor: &mut V) -> VisitResult {
                visitor.$visit(self)
            }

            fn accept_out(&self, _visitor: &mut V) -> VisitResult {
                Ok(())
            }

            fn browse_data(&self, _visitor: &mut V) -> VisitResult {
                Ok(())
            }
        }
    };
}

visitable!(Score, visit_score_start, visit_score_end, |self, visitor| {
    Browser::new(visitor).browse(self.implicit_part_group())
});

visitable!(PartGroup, visit_part_group_start, visit_part_group_end, |self, visitor| {
    browse_all(visitor, self.elements())
});

visitable!(Part, visit_part_start, visit_part_end, |self, visitor| {
    browse_all(visitor, self.staves())
});

visitable!(Staff, visit_staff_start, visit_staff_end, |self, visitor| {
    browse_all(visitor, self.voices())
});

visitable!(Voice, visit_voice_start, visit_voice_end, |self, visitor| {
    browse_all(visitor, self.measures())
});

visitable!(Measure, visit_measure_start, visit_measure_end, |self, visitor| {
    browse_all(visitor, self.elements())
});

visitable!(Note, visit_note_start, visit_note_end, |self, _visitor| Ok(()));

visitable!(Chord, visit_chord_start, visit_chord_end, |self, visitor| {
    browse_all(visitor, self.notes())
});

visitable!(Tuplet, visit_tuplet_start, visit_tuplet_end, |self, visitor| {
    browse_all(visitor, self.members())
});

visitable!(
    DoubleTremolo,
    visit_double_tremolo_start,
    visit_double_tremolo_end,
    |self, visitor| {
        Browser::new(&mut *visitor).browse_optional(self.first_element())?;
        Browser::new(visitor).browse_optional(self.second_element())
    }
);

visitable!(FiguredBass, visit_figured_bass_start, visit_figured_bass_end, |self, visitor| {
    browse_all(visitor, self.figures())
});

visitable_leaf!(Figure, visit_figure);
visitable_leaf!(Clef, visit_clef);
visitable_leaf!(Key, visit_key);
visitable_leaf!(Time, visit_time);
visitable_leaf!(Barline, visit_barline);

// ============================================================================
// SUM TYPES: dispatch to the wrapped node
// ============================================================================

impl<V: MsrVisitor + ?Sized> Visitable<V> for PartGroupElement {
    fn accept_in(&self, visitor: &mut V) -> VisitResult {
        match self {
            PartGroupElement::Part(part) => part.accept_in(visitor),
            PartGroupElement::PartGroup(group) => group.accept_in(visitor),
        }
    }

    fn accept_out(&self, visitor: &mut V) -> VisitResult {
        match self {
            PartGroupElement::Part(part) => part.accept_out(visitor),
            PartGroupElement::PartGroup(group) => group.accept_out(visitor),
        }
    }

    fn browse_data(&self, visitor: &mut V) -> VisitResult {
        match self {
            PartGroupElement::Part(part) => part.browse_data(visitor),
            PartGroupElement::PartGroup(group) => group.browse_data(visitor),
        }
    }
}

impl<V: MsrVisitor + ?Sized> Visitable<V> for NoteOrChord {
    fn accept_in(&self, visitor: &mut V) -> VisitResult {
        match self {
            NoteOrChord::Note(note) => note.accept_in(visitor),
            NoteOrChord::Chord(chord) => chord.accept_in(visitor),
        }
    }

    fn accept_out(&self, visitor: &mut V) -> VisitResult {
        match self {
            NoteOrChord::Note(note) => note.accept_out(visitor),
            NoteOrChord::Chord(chord) => chord.accept_out(visitor),
        }
    }

    fn browse_data(&self, visitor: &mut V) -> VisitResult {
        match self {
            NoteOrChord::Note(note) => note.browse_data(visitor),
            NoteOrChord::Chord(chord) => chord.browse_data(visitor),
        }
    }
}

impl<V: MsrVisitor + ?Sized> Visitable<V> for MeasureElement {
    fn accept_in(&self, visitor: &mut V) -> VisitResult {
        match self {
            MeasureElement::Clef(e) => e.accept_in(visitor),
            MeasureElement::Key(e) => e.accept_in(visitor),
            MeasureElement::Time(e) => e.accept_in(visitor),
            MeasureElement::Barline(e) => e.accept_in(visitor),
            MeasureElement::Note(e) => e.accept_in(visitor),
            MeasureElement::Chord(e) => e.accept_in(visitor),
            MeasureElement::Tuplet(e) => e.accept_in(visitor),
            MeasureElement::DoubleTremolo(e) => e.accept_in(visitor),
            MeasureElement::FiguredBass(e) => e.accept_in(visitor),
        }
    }

    fn accept_out(&self, visitor: &mut V) -> VisitResult {
        match self {
            MeasureElement::Clef(e) => e.accept_out(visitor),
            MeasureElement::Key(e) => e.accept_out(visitor),
            MeasureElement::Time(e) => e.accept_out(visitor),
            MeasureElement::Barline(e) => e.accept_out(visitor),
            MeasureElement::Note(e) => e.accept_out(visitor),
            MeasureElement::Chord(e) => e.accept_out(visitor),
            MeasureElement::Tuplet(e) => e.accept_out(visitor),
            MeasureElement::DoubleTremolo(e) => e.accept_out(visitor),
            MeasureElement::FiguredBass(e) => e.accept_out(visitor),
        }
    }

    fn browse_data(&self, visitor: &mut V) -> VisitResult {
        match self {
            MeasureElement::Clef(e) => e.browse_data(visitor),
            MeasureElement::Key(e) => e.browse_data(visitor),
            MeasureElement::Time(e) => e.browse_data(visitor),
            MeasureElement::Barline(e) => e.browse_data(visitor),
            MeasureElement::Note(e) => e.browse_data(visitor),
            MeasureElement::Chord(e) => e.browse_data(visitor),
            MeasureElement::Tuplet(e) => e.browse_data(visitor),
            MeasureElement::DoubleTremolo(e) => e.browse_data(visitor),
            MeasureElement::FiguredBass(e) => e.browse_data(visitor),
        }
    }
}
