//! Line and page breaking
//!
//! Measures are atomic: a measure that does not fit on the current line
//! moves to the next one, separated from its neighbours by a blank cell.
//! Only a measure longer than a whole line is split, between items, with
//! a music hyphen ending the broken line. The first note of every line
//! carries its octave mark.

use crate::bsr::cells::{BrailleCell, MUSIC_HYPHEN};
use crate::bsr::elements::{BsrLine, BsrMeasure, BsrPage, BsrScore, BsrSection};

/// Narrower lines leave no room for a note between hyphens
const MIN_CELLS_PER_LINE: usize = 8;

pub struct BsrLayout {
    cells_per_line: usize,
    lines_per_page: usize,
    pages: Vec<BsrPage>,
    current: Vec<BrailleCell>,
}

impl BsrLayout {
    pub fn new(cells_per_line: usize, lines_per_page: usize) -> Self {
        Self {
            cells_per_line: cells_per_line.max(MIN_CELLS_PER_LINE),
            lines_per_page: lines_per_page.max(1),
            pages: vec![BsrPage {
                number: 1,
                lines: Vec::new(),
            }],
            current: Vec::new(),
        }
    }

    pub fn lay_out(mut self, sections: &[BsrSection]) -> BsrScore {
        for section in sections {
            self.finish_line();
            if let Some(heading) = &section.heading {
                self.push_heading(heading);
            }
            for measure in &section.measures {
                self.push_measure(measure);
            }
        }
        self.finish_line();

        if self.pages.last().map_or(false, |p| p.lines.is_empty()) && self.pages.len() > 1 {
            self.pages.pop();
        }
        BsrScore { pages: self.pages }
    }

    fn finish_line(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let cells = std::mem::take(&mut self.current);
        self.push_line(cells);
    }

    fn push_line(&mut self, cells: Vec<BrailleCell>) {
        let page_full = self
            .pages
            .last()
            .map_or(true, |p| p.lines.len() >= self.lines_per_page);
        if page_full {
            let number = self.pages.len() + 1;
            self.pages.push(BsrPage {
                number,
                lines: Vec::new(),
            });
        }
        if let Some(page) = self.pages.last_mut() {
            let number = page.lines.len() + 1;
            page.lines.push(BsrLine { number, cells });
        }
    }

    /// Centered on lines of its own
    fn push_heading(&mut self, heading: &[BrailleCell]) {
        for chunk in heading.chunks(self.cells_per_line) {
            let padding = (self.cells_per_line - chunk.len()) / 2;
            let mut cells = vec![BrailleCell::EMPTY; padding];
            cells.extend_from_slice(chunk);
            self.push_line(cells);
        }
    }

    fn push_measure(&mut self, measure: &BsrMeasure) {
        let opens_line = self.current.is_empty();
        let cells = measure.cells(opens_line);
        if cells.is_empty() {
            return;
        }

        if opens_line {
            if cells.len() <= self.cells_per_line {
                self.current = cells;
                return;
            }
        } else {
            if self.current.len() + 1 + cells.len() <= self.cells_per_line {
                self.current.push(BrailleCell::EMPTY);
                self.current.extend(cells);
                return;
            }
            self.finish_line();
            let fresh = measure.cells(true);
            if fresh.len() <= self.cells_per_line {
                self.current = fresh;
                return;
            }
        }
        self.split_measure(measure);
    }

    /// Write an over-long measure item by item on an empty line
    fn split_measure(&mut self, measure: &BsrMeasure) {
        let mut note_pending = true;
        let last = measure.items.len().saturating_sub(1);

        for (index, item) in measure.items.iter().enumerate() {
            let reserve = usize::from(index != last);
            let mut cells = item.cells(note_pending && item.is_note());

            if !self.current.is_empty() && self.current.len() + cells.len() + reserve > self.cells_per_line {
                self.current.push(MUSIC_HYPHEN);
                self.finish_line();
                note_pending = true;
                cells = item.cells(item.is_note());
            }
            if item.is_note() {
                note_pending = false;
            }

            // an item wider than a line is cut wherever the line ends
            while self.current.len() + cells.len() > self.cells_per_line {
                let room = self.cells_per_line - 1 - self.current.len().min(self.cells_per_line - 1);
                let rest = cells.split_off(room.min(cells.len()));
                self.current.extend(cells);
                self.current.push(MUSIC_HYPHEN);
                self.finish_line();
                cells = rest;
            }
            self.current.extend(cells);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsr::cells::dots;
    use crate::bsr::elements::BsrItem;

    fn note(octave_marked: bool) -> BsrItem {
        BsrItem::Note {
            accidental: Vec::new(),
            octave_mark: vec![dots("5")],
            octave_marked,
            body: vec![dots("1456")],
        }
    }

    fn measure(number: &str, notes: usize) -> BsrMeasure {
        let mut measure = BsrMeasure::new(number);
        for _ in 0..notes {
            measure.items.push(note(false));
        }
        measure
    }

    fn section(measures: Vec<BsrMeasure>) -> BsrSection {
        BsrSection {
            heading: None,
            measures,
        }
    }

    #[test]
    fn test_measures_stay_whole() {
        // 4 notes, the first marked: 5 cells per measure
        let sections = vec![section(vec![measure("1", 4), measure("2", 4), measure("3", 4)])];
        let score = BsrLayout::new(12, 27).lay_out(&sections);

        let lines = &score.pages[0].lines;
        assert_eq!(lines.len(), 2);
        // "m1 m2" = 5 + 1 + 4
        assert_eq!(lines[0].cells.len(), 10);
        // measure 3 opens a line and gets its octave mark back
        assert_eq!(lines[1].cells.len(), 5);
        assert_eq!(lines[1].cells[0], dots("5"));
    }

    #[test]
    fn test_long_measure_split_with_hyphen() {
        let sections = vec![section(vec![measure("1", 12)])];
        let score = BsrLayout::new(8, 27).lay_out(&sections);

        let lines = &score.pages[0].lines;
        assert!(lines.len() >= 2);
        assert_eq!(*lines[0].cells.last().unwrap(), MUSIC_HYPHEN);
        assert_eq!(lines[1].cells[0], dots("5"));
        assert!(lines.iter().all(|l| l.cells.len() <= 8));
    }

    #[test]
    fn test_pages_break() {
        let measures = (1..=6).map(|n| measure(&n.to_string(), 7)).collect();
        let score = BsrLayout::new(10, 2).lay_out(&[section(measures)]);

        assert_eq!(score.pages.len(), 3);
        assert!(score.pages.iter().all(|p| p.lines.len() == 2));
        assert_eq!(score.pages[2].number, 3);
        assert_eq!(score.line_count(), 6);
    }

    #[test]
    fn test_heading_centered() {
        let sections = vec![BsrSection {
            heading: Some(vec![dots("1"), dots("12")]),
            measures: vec![measure("1", 1)],
        }];
        let score = BsrLayout::new(10, 27).lay_out(&sections);
        let heading = &score.pages[0].lines[0].cells;
        assert_eq!(heading.len(), 6);
        assert!(heading[..4].iter().all(|c| c.is_empty()));
    }
}
