//! Pass 4 (Braille): BSR → text
//!
//! Lines end with a newline, pages with a form feed.

use crate::browser::Browser;
use crate::bsr::{BrailleCell, BsrLine, BsrPage, BsrScore, BsrVisitor};
use crate::errors::TranslationError;
use crate::settings::{BrailleOutputKind, TranslationSettings};

const FORM_FEED: char = '\u{000C}';

pub struct BrailleTextEmitter {
    kind: BrailleOutputKind,
    text: String,
    pages_written: usize,
}

impl BrailleTextEmitter {
    pub fn new(settings: &TranslationSettings) -> Self {
        Self {
            kind: settings.braille_output_kind,
            text: String::new(),
            pages_written: 0,
        }
    }

    pub fn emit(mut self, score: &BsrScore) -> Result<String, TranslationError> {
        log::info!("pass 4: BSR to braille text");
        Browser::new(&mut self).browse(score)?;
        Ok(self.text)
    }

    fn cell_char(&self, cell: BrailleCell) -> char {
        match self.kind {
            BrailleOutputKind::Unicode => cell.to_unicode(),
            BrailleOutputKind::Ascii => cell.to_ascii(),
        }
    }
}

impl BsrVisitor for BrailleTextEmitter {
    fn visit_page_start(&mut self, _page: &BsrPage) -> Result<(), TranslationError> {
        if self.pages_written > 0 {
            self.text.push(FORM_FEED);
        }
        self.pages_written += 1;
        Ok(())
    }

    fn visit_line(&mut self, line: &BsrLine) -> Result<(), TranslationError> {
        let text: String = line.cells.iter().map(|&c| self.cell_char(c)).collect();
        self.text.push_str(text.trim_end_matches(|c| c == ' ' || c == '\u{2800}'));
        self.text.push('\n');
        Ok(())
    }
}
