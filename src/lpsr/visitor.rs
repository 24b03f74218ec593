//! Visitor over the LPSR tree
//!
//! ```text
//! LpsrScore → LpsrVoiceDefinition* → LpsrMeasure* → LpsrMusicItem*
//!           → score block (LpsrBlock, children in order)
//! ```

use crate::browser::{browse_all, Browser, Visitable};
use crate::errors::TranslationError;
use crate::lpsr::elements::{LpsrBlock, LpsrMeasure, LpsrMusicItem, LpsrScore, LpsrVoiceDefinition};

type VisitResult = Result<(), TranslationError>;

#[allow(unused_variables)]
pub trait LpsrVisitor {
    fn visit_lpsr_score_start(&mut self, score: &LpsrScore) -> VisitResult {
        Ok(())
    }

    fn visit_lpsr_score_end(&mut self, score: &LpsrScore) -> VisitResult {
        Ok(())
    }

    fn visit_voice_definition_start(&mut self, definition: &LpsrVoiceDefinition) -> VisitResult {
        Ok(())
    }

    fn visit_voice_definition_end(&mut self, definition: &LpsrVoiceDefinition) -> VisitResult {
        Ok(())
    }

    fn visit_lpsr_measure_start(&mut self, measure: &LpsrMeasure) -> VisitResult {
        Ok(())
    }

    fn visit_lpsr_measure_end(&mut self, measure: &LpsrMeasure) -> VisitResult {
        Ok(())
    }

    fn visit_music_item(&mut self, item: &LpsrMusicItem) -> VisitResult {
        Ok(())
    }

    fn visit_block_start(&mut self, block: &LpsrBlock) -> VisitResult {
        Ok(())
    }

    fn visit_block_end(&mut self, block: &LpsrBlock) -> VisitResult {
        Ok(())
    }
}

impl<V: LpsrVisitor + ?Sized> Visitable<V> for LpsrScore {
    fn accept_in(&self, visitor: &mut V) -> VisitResult {
        visitor.visit_lpsr_score_start(self)
    }

    fn accept_out(&self, visitor: &mut V) -> VisitResult {
        visitor.visit_lpsr_score_end(self)
    }

    fn browse_data(&self, visitor: &mut V) -> VisitResult {
        browse_all(&mut *visitor, &self.voice_definitions)?;
        Browser::new(visitor).browse(&self.score_block)
    }
}

impl<V: LpsrVisitor + ?Sized> Visitable<V> for LpsrVoiceDefinition {
    fn accept_in(&self, visitor: &mut V) -> VisitResult {
        visitor.visit_voice_definition_start(self)
    }

    fn accept_out(&self, visitor: &mut V) -> VisitResult {
        visitor.visit_voice_definition_end(self)
    }

    fn browse_data(&self, visitor: &mut V) -> VisitResult {
        browse_all(visitor, &self.measures)
    }
}

impl<V: LpsrVisitor + ?Sized> Visitable<V> for LpsrMeasure {
    fn accept_in(&self, visitor: &mut V) -> VisitResult {
        visitor.visit_lpsr_measure_start(self)
    }

    fn accept_out(&self, visitor: &mut V) -> VisitResult {
        visitor.visit_lpsr_measure_end(self)
    }

    fn browse_data(&self, visitor: &mut V) -> VisitResult {
        browse_all(visitor, &self.items)
    }
}

impl<V: LpsrVisitor + ?Sized> Visitable<V> for LpsrMusicItem {
    fn accept_in(&self, visitor: &mut V) -> VisitResult {
        visitor.visit_music_item(self)
    }

    fn accept_out(&self, _visitor: &mut V) -> VisitResult {
        Ok(())
    }

    fn browse_data(&self, _visitor: &mut V) -> VisitResult {
        Ok(())
    }
}

impl<V: LpsrVisitor + ?Sized> Visitable<V> for LpsrBlock {
    fn accept_in(&self, visitor: &mut V) -> VisitResult {
        visitor.visit_block_start(self)
    }

    fn accept_out(&self, visitor: &mut V) -> VisitResult {
        visitor.visit_block_end(self)
    }

    fn browse_data(&self, visitor: &mut V) -> VisitResult {
        browse_all(visitor, self.children())
    }
}
