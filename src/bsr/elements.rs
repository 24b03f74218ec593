//! BSR nodes
//!
//! Pass 3 produces sections of measures, each measure a run of signs and
//! notes. The layout then breaks the sections into lines and pages, which
//! is the tree the text emitter walks.

use crate::bsr::cells::BrailleCell;
use serde::Serialize;

// ============================================================================
// MUSIC BEFORE LAYOUT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BsrItem {
    /// Cells written as they are: clefs, keys, times, rests, barlines...
    Sign(Vec<BrailleCell>),
    /// A note or the written note of a chord
    Note {
        accidental: Vec<BrailleCell>,
        octave_mark: Vec<BrailleCell>,
        /// The octave mark is needed where the note is, regardless of line breaks
        octave_marked: bool,
        /// Note cell, dots, intervals, ties, tremolos
        body: Vec<BrailleCell>,
    },
}

impl BsrItem {
    /// Cells of this item; `opens_line` forces a note's octave mark
    pub fn cells(&self, opens_line: bool) -> Vec<BrailleCell> {
        match self {
            BsrItem::Sign(cells) => cells.clone(),
            BsrItem::Note {
                accidental,
                octave_mark,
                octave_marked,
                body,
            } => {
                let mut cells = accidental.clone();
                if *octave_marked || opens_line {
                    cells.extend_from_slice(octave_mark);
                }
                cells.extend_from_slice(body);
                cells
            }
        }
    }

    pub fn is_note(&self) -> bool {
        matches!(self, BsrItem::Note { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BsrMeasure {
    pub number: String,
    pub items: Vec<BsrItem>,
}

impl BsrMeasure {
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            items: Vec::new(),
        }
    }

    /// Cells when written on one line, `opens_line` if it starts that line
    pub fn cells(&self, opens_line: bool) -> Vec<BrailleCell> {
        let mut first_note = opens_line;
        let mut cells = Vec::new();
        for item in &self.items {
            cells.extend(item.cells(first_note && item.is_note()));
            if item.is_note() {
                first_note = false;
            }
        }
        cells
    }
}

/// One voice of one part, optionally under a heading
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BsrSection {
    pub heading: Option<Vec<BrailleCell>>,
    pub measures: Vec<BsrMeasure>,
}

// ============================================================================
// LAID OUT SCORE
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BsrLine {
    pub number: usize,
    pub cells: Vec<BrailleCell>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BsrPage {
    pub number: usize,
    pub lines: Vec<BsrLine>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BsrScore {
    pub pages: Vec<BsrPage>,
}

impl BsrScore {
    pub fn line_count(&self) -> usize {
        self.pages.iter().map(|p| p.lines.len()).sum()
    }
}
