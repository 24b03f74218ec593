//! Pass 4 (LilyPond): LPSR → LilyPond text
//!
//! Prints the voice definitions (one measure per line) and the score block,
//! then wraps both in the document template.

use crate::browser::Browser;
use crate::errors::{InternalError, SourceLocation, TranslationError};
use crate::lpsr::templates::{escape_lilypond_string, render_lilypond, LilyPondTemplate, TemplateContext};
use crate::lpsr::{
    LpsrBlock, LpsrChord, LpsrMeasure, LpsrMusicItem, LpsrNote, LpsrNoteKind, LpsrScore,
    LpsrVisitor, LpsrVoiceDefinition, LpsrVoiceMode, NotatedDuration,
};
use crate::msr::TimeSymbol;
use crate::settings::{OctaveEntry, TranslationSettings};
use std::fmt::Write as _;

const INDENT: &str = "  ";

/// Writes an LPSR score as a LilyPond document
pub struct LilyPondEmitter<'s> {
    settings: &'s TranslationSettings,
    definitions: String,
    score_block: String,
    depth: usize,
    measure_comment: Option<String>,
    measure_tokens: Vec<String>,
}

impl<'s> LilyPondEmitter<'s> {
    pub fn new(settings: &'s TranslationSettings) -> Self {
        Self {
            settings,
            definitions: String::new(),
            score_block: String::new(),
            // the score block sits inside `\score {`
            depth: 1,
            measure_comment: None,
            measure_tokens: Vec::new(),
        }
    }

    pub fn emit(mut self, score: &LpsrScore) -> Result<String, TranslationError> {
        log::info!("pass 4: LPSR to LilyPond");
        Browser::new(&mut self).browse(score)?;

        let mut builder = TemplateContext::builder(score.version.as_str(), score.language.lilypond_name())
            .accidental_style(score.accidental_style.lilypond_name())
            .definitions(self.definitions)
            .score_block(self.score_block.trim_end_matches('\n'));
        let fields = score.header.fields();
        for (name, value) in &fields {
            builder = builder.header_field(name, value);
        }
        let template = if fields.is_empty() {
            LilyPondTemplate::Bare
        } else {
            LilyPondTemplate::Score
        };

        render_lilypond(template, &builder.build()).map_err(|e| {
            InternalError::Generic {
                location: SourceLocation::new(self.settings.input_source_name.as_str(), score.input_line),
                message: format!("LilyPond template rendering failed: {}", e),
            }
            .into()
        })
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.score_block.push_str(INDENT);
        }
        self.score_block.push_str(text);
        self.score_block.push('\n');
    }
}

// ============================================================================
// MUSIC ITEMS
// ============================================================================

fn tremolo_suffix(subdivision: Option<u32>) -> String {
    subdivision.map(|s| format!(":{}", s)).unwrap_or_default()
}

fn tie_suffix(tie: bool) -> &'static str {
    if tie {
        "~"
    } else {
        ""
    }
}

fn note_text(note: &LpsrNote) -> String {
    let duration = &note.duration;
    let head = match &note.kind {
        LpsrNoteKind::Pitched { name, octave_marks } => format!("{}{}", name, octave_marks),
        LpsrNoteKind::Rest => "r".to_string(),
        LpsrNoteKind::MeasureRest => "R".to_string(),
        LpsrNoteKind::Skip => "s".to_string(),
    };
    format!(
        "{}{}{}{}",
        head,
        duration,
        tremolo_suffix(note.tremolo_subdivision),
        tie_suffix(note.tie)
    )
}

fn chord_text(chord: &LpsrChord) -> String {
    let pitches: Vec<String> = chord
        .pitches
        .iter()
        .map(|p| format!("{}{}", p.name, p.octave_marks))
        .collect();
    format!(
        "<{}>{}{}{}",
        pitches.join(" "),
        chord.duration,
        tremolo_suffix(chord.tremolo_subdivision),
        tie_suffix(chord.tie)
    )
}

fn time_text(beats: u32, beat_type: u32, symbol: TimeSymbol) -> String {
    let has_symbol_form = matches!((beats, beat_type), (4, 4) | (2, 2));
    match symbol {
        TimeSymbol::Common | TimeSymbol::Cut => {
            format!("\\defaultTimeSignature \\time {}/{}", beats, beat_type)
        }
        TimeSymbol::None if has_symbol_form => {
            format!("\\numericTimeSignature \\time {}/{}", beats, beat_type)
        }
        TimeSymbol::None => format!("\\time {}/{}", beats, beat_type),
    }
}

fn partial_text(duration: &NotatedDuration) -> String {
    format!("\\partial {}", duration)
}

/// LilyPond text of a music item, `None` for items printed out of line
pub fn music_item_text(item: &LpsrMusicItem) -> Option<String> {
    let text = match item {
        LpsrMusicItem::MeasureComment { .. } => return None,
        LpsrMusicItem::Partial { duration } => partial_text(duration),
        LpsrMusicItem::Clef { name } => format!("\\clef {}", name),
        LpsrMusicItem::Key { tonic, mode } => format!("\\key {} \\{}", tonic, mode),
        LpsrMusicItem::Time {
            beats,
            beat_type,
            symbol,
        } => time_text(*beats, *beat_type, *symbol),
        LpsrMusicItem::Bar { glyph } => format!("\\bar \"{}\"", glyph),
        LpsrMusicItem::StaffChange { staff_name } => format!("\\change Staff = \"{}\"", staff_name),
        LpsrMusicItem::Note(note) => note_text(note),
        LpsrMusicItem::Chord(chord) => chord_text(chord),
        LpsrMusicItem::TupletStart {
            actual_notes,
            normal_notes,
        } => format!("\\tuplet {}/{} {{", actual_notes, normal_notes),
        LpsrMusicItem::TupletEnd | LpsrMusicItem::TremoloEnd => "}".to_string(),
        LpsrMusicItem::TremoloStart { repeats } => format!("\\repeat tremolo {} {{", repeats),
        LpsrMusicItem::FiguredBass(figured_bass) => {
            let figures = if figured_bass.figures.is_empty() {
                "_".to_string()
            } else {
                figured_bass.figures.join(" ")
            };
            format!("<{}>{}", figures, figured_bass.duration)
        }
    };
    Some(text)
}

// ============================================================================
// SCORE BLOCK
// ============================================================================

fn with_block(settings: &[(&str, String)]) -> String {
    if settings.is_empty() {
        return String::new();
    }
    let body: Vec<String> = settings
        .iter()
        .map(|(name, value)| format!("{} = {}", name, value))
        .collect();
    format!(" \\with {{ {} }}", body.join(" "))
}

fn instrument_settings(instrument_name: &str, short_instrument_name: &str) -> Vec<(&'static str, String)> {
    let mut settings = Vec::new();
    if !instrument_name.is_empty() {
        settings.push((
            "instrumentName",
            format!("\"{}\"", escape_lilypond_string(instrument_name)),
        ));
    }
    if !short_instrument_name.is_empty() {
        settings.push((
            "shortInstrumentName",
            format!("\"{}\"", escape_lilypond_string(short_instrument_name)),
        ));
    }
    settings
}

impl LpsrVisitor for LilyPondEmitter<'_> {
    fn visit_voice_definition_start(&mut self, definition: &LpsrVoiceDefinition) -> Result<(), TranslationError> {
        let opening = match (definition.mode, definition.octave_entry) {
            (LpsrVoiceMode::Figures, _) => "\\figuremode",
            (LpsrVoiceMode::Music, OctaveEntry::Absolute) => "\\absolute",
            (LpsrVoiceMode::Music, OctaveEntry::Relative) => "\\relative c'",
            (LpsrVoiceMode::Music, OctaveEntry::Fixed) => "\\fixed c'",
        };
        let _ = writeln!(self.definitions, "{} = {} {{", definition.name, opening);
        Ok(())
    }

    fn visit_voice_definition_end(&mut self, _definition: &LpsrVoiceDefinition) -> Result<(), TranslationError> {
        self.definitions.push_str("}\n\n");
        Ok(())
    }

    fn visit_lpsr_measure_start(&mut self, _measure: &LpsrMeasure) -> Result<(), TranslationError> {
        self.measure_comment = None;
        self.measure_tokens.clear();
        Ok(())
    }

    fn visit_music_item(&mut self, item: &LpsrMusicItem) -> Result<(), TranslationError> {
        match item {
            LpsrMusicItem::MeasureComment { number } => {
                self.measure_comment = Some(format!("% measure {}", number));
            }
            other => self.measure_tokens.extend(music_item_text(other)),
        }
        Ok(())
    }

    fn visit_lpsr_measure_end(&mut self, measure: &LpsrMeasure) -> Result<(), TranslationError> {
        if let Some(comment) = self.measure_comment.take() {
            let _ = writeln!(self.definitions, "{}{}", INDENT, comment);
        }
        let mut text = self.measure_tokens.join(" ");
        if measure.bar_check {
            text.push_str(" |");
        }
        let _ = writeln!(self.definitions, "{}{}", INDENT, text.trim_start());
        Ok(())
    }

    fn visit_block_start(&mut self, block: &LpsrBlock) -> Result<(), TranslationError> {
        match block {
            LpsrBlock::Simultaneous(_) => {
                self.line("<<");
                self.depth += 1;
            }
            LpsrBlock::Group {
                kind,
                instrument_name,
                short_instrument_name,
                start_delimiter,
                ..
            } => {
                let mut settings = instrument_settings(instrument_name, short_instrument_name);
                if let Some(delimiter) = start_delimiter {
                    settings.push(("systemStartDelimiter", format!("#'{}", delimiter)));
                }
                let text = format!("\\new {}{} <<", kind.context_name(), with_block(&settings));
                self.line(&text);
                self.depth += 1;
            }
            LpsrBlock::Staff {
                name,
                instrument_name,
                short_instrument_name,
                voices,
            } => {
                let settings = instrument_settings(instrument_name, short_instrument_name);
                let text = format!("\\new Staff = \"{}\"{} <<", name, with_block(&settings));
                self.line(&text);
                self.depth += 1;
                for voice in voices {
                    let style = voice
                        .style
                        .as_ref()
                        .map(|s| format!("\\{} ", s))
                        .unwrap_or_default();
                    let text = format!(
                        "\\context Voice = \"{}\" {{ {}\\{} }}",
                        voice.context_name, style, voice.definition_name
                    );
                    self.line(&text);
                }
            }
            LpsrBlock::FiguredBass { definition_name } => {
                let text = format!("\\new FiguredBass {{ \\{} }}", definition_name);
                self.line(&text);
            }
        }
        Ok(())
    }

    fn visit_block_end(&mut self, block: &LpsrBlock) -> Result<(), TranslationError> {
        if !matches!(block, LpsrBlock::FiguredBass { .. }) {
            self.depth = self.depth.saturating_sub(1);
            self.line(">>");
        }
        Ok(())
    }
}
