//! Visitor over the laid out BSR tree
//!
//! ```text
//! BsrScore → BsrPage* → BsrLine*
//! ```

use crate::browser::{browse_all, Visitable};
use crate::bsr::elements::{BsrLine, BsrPage, BsrScore};
use crate::errors::TranslationError;

type VisitResult = Result<(), TranslationError>;

#[allow(unused_variables)]
pub trait BsrVisitor {
    fn visit_bsr_score_start(&mut self, score: &BsrScore) -> VisitResult {
        Ok(())
    }

    fn visit_bsr_score_end(&mut self, score: &BsrScore) -> VisitResult {
        Ok(())
    }

    fn visit_page_start(&mut self, page: &BsrPage) -> VisitResult {
        Ok(())
    }

    fn visit_page_end(&mut self, page: &BsrPage) -> VisitResult {
        Ok(())
    }

    fn visit_line(&mut self, line: &BsrLine) -> VisitResult {
        Ok(())
    }
}

impl<V: BsrVisitor + ?Sized> Visitable<V> for BsrScore {
    fn accept_in(&self, visitor: &mut V) -> VisitResult {
        visitor.visit_bsr_score_start(self)
    }

    fn accept_out(&self, visitor: &mut V) -> VisitResult {
        visitor.visit_bsr_score_end(self)
    }

    fn browse_data(&self, visitor: &mut V) -> VisitResult {
        browse_all(visitor, &self.pages)
    }
}

impl<V: BsrVisitor + ?Sized> Visitable<V> for BsrPage {
    fn accept_in(&self, visitor: &mut V) -> VisitResult {
        visitor.visit_page_start(self)
    }

    fn accept_out(&self, visitor: &mut V) -> VisitResult {
        visitor.visit_page_end(self)
    }

    fn browse_data(&self, visitor: &mut V) -> VisitResult {
        browse_all(visitor, &self.lines)
    }
}

impl<V: BsrVisitor + ?Sized> Visitable<V> for BsrLine {
    fn accept_in(&self, visitor: &mut V) -> VisitResult {
        visitor.visit_line(self)
    }

    fn accept_out(&self, _visitor: &mut V) -> VisitResult {
        Ok(())
    }

    fn browse_data(&self, _visitor: &mut V) -> VisitResult {
        Ok(())
    }
}
