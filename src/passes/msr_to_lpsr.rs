//! Pass 3 (LilyPond): MSR → LPSR
//!
//! Every MSR voice becomes a voice definition named after its part, staff
//! and voice numbers (`Part_POne_Staff_One_Voice_One`), and the part-group
//! hierarchy becomes nested LilyPond contexts:
//!
//! | MSR part group | LilyPond context |
//! |---|---|
//! | brace | `PianoStaff` |
//! | bracket, shared barlines | `StaffGroup` |
//! | bracket, separate barlines | `ChoirStaff` |
//! | line, square | `StaffGroup` with `systemStartDelimiter` |
//!
//! The implicit root group contributes its children only; groups left
//! empty by part filtering are dropped.

use crate::browser::Browser;
use crate::errors::{SourceLocation, TranslationError};
use crate::lpsr::{
    note_name, whole_notes_as_notated_duration, LpsrBlock, LpsrChord, LpsrChordPitch,
    LpsrFiguredBass, LpsrGroupKind, LpsrMeasure, LpsrMusicItem, LpsrNote, LpsrNoteKind, LpsrScore,
    LpsrVoiceDefinition, LpsrVoiceMode, LpsrVoiceUse, NotatedDuration, OctaveMarker,
};
use crate::msr::{
    Alteration, Barline, BarlineStyle, Chord, Clef, ClefKind, DiatonicStep, DoubleTremolo, Figure,
    FigurePrefixKind, FigureSuffixKind, FiguredBass, FiguredBassParenthesesKind, Key, KeyMode,
    Measure, MeasureKind, MsrVisitor, Note, NoteContent, NotePlacement, Part, PartGroup,
    PartGroupBarlineKind, PartGroupSymbolKind, Pitch, RepeatDirection, Score, Staff, StaffKind,
    TieKind, Time, Tuplet, Voice, VoiceKind,
};
use crate::rational::Rational;
use crate::settings::TranslationSettings;

// ============================================================================
// NAMES
// ============================================================================

const DIGIT_NAMES: [&str; 10] = [
    "Zero", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine",
];

/// Letters kept, digits spelled out, everything else dropped: "P1" → "POne"
pub fn spelled_identifier(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c.to_digit(10) {
            Some(d) => Some(DIGIT_NAMES[d as usize].to_string()),
            None if c.is_ascii_alphabetic() => Some(c.to_string()),
            None => None,
        })
        .collect()
}

pub fn part_context_name(part_id: &str) -> String {
    format!("Part_{}", spelled_identifier(part_id))
}

pub fn staff_context_name(part_id: &str, staff_number: u32) -> String {
    format!(
        "{}_Staff_{}",
        part_context_name(part_id),
        spelled_identifier(&staff_number.to_string())
    )
}

pub fn voice_definition_name(part_id: &str, staff_number: u32, voice_number: u32) -> String {
    format!(
        "{}_Voice_{}",
        staff_context_name(part_id, staff_number),
        spelled_identifier(&voice_number.to_string())
    )
}

pub fn figured_bass_definition_name(part_id: &str) -> String {
    format!("{}_FiguredBass", part_context_name(part_id))
}

const VOICE_STYLES: [&str; 4] = ["voiceOne", "voiceTwo", "voiceThree", "voiceFour"];

// ============================================================================
// VALUE MAPPINGS
// ============================================================================

fn clef_name(kind: ClefKind) -> &'static str {
    match kind {
        ClefKind::Treble => "treble",
        ClefKind::TrebleOttavaBassa => "\"treble_8\"",
        ClefKind::TrebleOttavaAlta => "\"treble^8\"",
        ClefKind::Bass => "bass",
        ClefKind::BassOttavaBassa => "\"bass_8\"",
        ClefKind::Alto => "alto",
        ClefKind::Tenor => "tenor",
        ClefKind::Soprano => "soprano",
        ClefKind::MezzoSoprano => "mezzosoprano",
        ClefKind::Baritone => "baritone",
        ClefKind::Percussion => "percussion",
        ClefKind::Tab => "tab",
    }
}

fn mode_name(mode: KeyMode) -> &'static str {
    match mode {
        KeyMode::Major => "major",
        KeyMode::Minor => "minor",
        KeyMode::Dorian => "dorian",
        KeyMode::Phrygian => "phrygian",
        KeyMode::Lydian => "lydian",
        KeyMode::Mixolydian => "mixolydian",
        KeyMode::Aeolian => "aeolian",
        KeyMode::Ionian => "ionian",
        KeyMode::Locrian => "locrian",
    }
}

/// Tonic of the key with `fifths` sharps (negative: flats) in `mode`
pub fn key_tonic(fifths: i32, mode: KeyMode) -> Pitch {
    // position of the tonic on the circle of fifths, C major = 0
    let position = fifths
        + match mode {
            KeyMode::Major | KeyMode::Ionian => 0,
            KeyMode::Minor | KeyMode::Aeolian => 3,
            KeyMode::Dorian => 2,
            KeyMode::Phrygian => 4,
            KeyMode::Lydian => -1,
            KeyMode::Mixolydian => 1,
            KeyMode::Locrian => 5,
        };
    let steps = [
        DiatonicStep::C,
        DiatonicStep::D,
        DiatonicStep::E,
        DiatonicStep::F,
        DiatonicStep::G,
        DiatonicStep::A,
        DiatonicStep::B,
    ];
    let step = steps[(position * 4).rem_euclid(7) as usize];
    // F C G D A E B are natural at positions -1..=5
    let alteration = match (position + 1).div_euclid(7) {
        i32::MIN..=-2 => Alteration::DoubleFlat,
        -1 => Alteration::Flat,
        0 => Alteration::Natural,
        1 => Alteration::Sharp,
        _ => Alteration::DoubleSharp,
    };
    Pitch::new(step, alteration, 4)
}

fn bar_glyph(barline: &Barline) -> Option<&'static str> {
    match barline.repeat {
        Some(RepeatDirection::Forward) => return Some(".|:"),
        Some(RepeatDirection::Backward) => return Some(":|."),
        None => {}
    }
    match barline.style {
        BarlineStyle::Regular => None,
        BarlineStyle::Dotted => Some(";"),
        BarlineStyle::Dashed => Some("!"),
        BarlineStyle::Heavy => Some("."),
        BarlineStyle::LightLight => Some("||"),
        BarlineStyle::LightHeavy => Some("|."),
        BarlineStyle::HeavyLight => Some(".|"),
        BarlineStyle::HeavyHeavy => Some(".."),
        BarlineStyle::Tick => Some("'"),
        BarlineStyle::Short => Some(","),
        BarlineStyle::None => Some(""),
    }
}

fn accidental_marks(kind: FigurePrefixKind) -> &'static str {
    match kind {
        FigurePrefixKind::None => "",
        FigurePrefixKind::Flat => "-",
        FigurePrefixKind::DoubleFlat | FigurePrefixKind::FlatFlat => "--",
        FigurePrefixKind::Natural => "!",
        FigurePrefixKind::Sharp => "+",
        FigurePrefixKind::DoubleSharp | FigurePrefixKind::SharpSharp => "++",
    }
}

/// `6`, `4+`, `_!`, `5/`, bracketed when the figured bass has parentheses
pub fn figure_text(figure: &Figure, parentheses: FiguredBassParenthesesKind) -> String {
    let mut text = match figure.number {
        Some(number) => number.to_string(),
        None => "_".to_string(),
    };
    text.push_str(accidental_marks(figure.prefix));
    match figure.suffix {
        FigureSuffixKind::Slash => text.push('/'),
        FigureSuffixKind::None => {}
        FigureSuffixKind::Flat => text.push('-'),
        FigureSuffixKind::DoubleFlat | FigureSuffixKind::FlatFlat => text.push_str("--"),
        FigureSuffixKind::Natural => text.push('!'),
        FigureSuffixKind::Sharp => text.push('+'),
        FigureSuffixKind::DoubleSharp | FigureSuffixKind::SharpSharp => text.push_str("++"),
    }
    match parentheses {
        FiguredBassParenthesesKind::Yes => format!("[{}]", text),
        FiguredBassParenthesesKind::No => text,
    }
}

fn group_layout(group: &PartGroup) -> (LpsrGroupKind, Option<String>) {
    match (group.symbol_kind(), group.barline_kind()) {
        (PartGroupSymbolKind::Brace, _) => (LpsrGroupKind::PianoStaff, None),
        (PartGroupSymbolKind::Line, _) => (LpsrGroupKind::StaffGroup, Some("SystemStartBar".to_string())),
        (PartGroupSymbolKind::Square, _) => {
            (LpsrGroupKind::StaffGroup, Some("SystemStartSquare".to_string()))
        }
        (_, PartGroupBarlineKind::Yes) => (LpsrGroupKind::StaffGroup, None),
        (_, PartGroupBarlineKind::No) => (LpsrGroupKind::ChoirStaff, None),
    }
}

// ============================================================================
// BUILDER
// ============================================================================

struct PartContext {
    id: String,
    name: String,
    abbreviation: String,
    staves: Vec<LpsrBlock>,
    figured_bass: Option<LpsrBlock>,
}

struct StaffContext {
    voice_count: usize,
    voices: Vec<LpsrVoiceUse>,
}

struct VoiceContext {
    definition: LpsrVoiceDefinition,
    marker: OctaveMarker,
    kind: VoiceKind,
    current_staff: u32,
    has_music: bool,
}

/// Lowers an MSR score to LPSR
pub struct LpsrBuilder<'s> {
    settings: &'s TranslationSettings,
    lpsr: LpsrScore,
    blocks: Vec<LpsrBlock>,
    part: Option<PartContext>,
    staff: Option<StaffContext>,
    voice: Option<VoiceContext>,
    measure: Option<LpsrMeasure>,
    in_double_tremolo: bool,
}

impl<'s> LpsrBuilder<'s> {
    pub fn new(settings: &'s TranslationSettings) -> Self {
        Self {
            settings,
            lpsr: LpsrScore::new(
                0,
                settings.target_lilypond_version.clone(),
                settings.pitch_language,
                settings.accidental_style,
            ),
            blocks: Vec::new(),
            part: None,
            staff: None,
            voice: None,
            measure: None,
            in_double_tremolo: false,
        }
    }

    pub fn build(mut self, score: &Score) -> Result<LpsrScore, TranslationError> {
        log::info!("pass 3: MSR to LPSR");
        Browser::new(&mut self).browse(score)?;
        Ok(self.lpsr)
    }

    fn here(&self, input_line: usize) -> SourceLocation {
        SourceLocation::new(self.settings.input_source_name.as_str(), input_line)
    }

    fn push_item(&mut self, item: LpsrMusicItem) {
        if self.settings.trace_passes {
            log::debug!("lpsr item {:?}", item);
        }
        if let Some(measure) = self.measure.as_mut() {
            measure.items.push(item);
        }
    }

    fn notated(&self, input_line: usize, whole_notes: Rational) -> Result<NotatedDuration, TranslationError> {
        whole_notes_as_notated_duration(&self.here(input_line), whole_notes)
    }

    /// `\change Staff` when a note sits on another staff than the previous one
    fn follow_staff(&mut self, staff_number: u32) {
        let Some(part_id) = self.part.as_ref().map(|p| p.id.clone()) else {
            return;
        };
        let change = match self.voice.as_mut() {
            Some(voice) if voice.kind == VoiceKind::Regular && voice.current_staff != staff_number => {
                voice.current_staff = staff_number;
                true
            }
            _ => false,
        };
        if change {
            self.push_item(LpsrMusicItem::StaffChange {
                staff_name: staff_context_name(&part_id, staff_number),
            });
        }
    }

    fn mark_music(&mut self) {
        if let Some(voice) = self.voice.as_mut() {
            voice.has_music = true;
        }
    }

    fn octave_marks(&mut self, pitch: &Pitch) -> String {
        match self.voice.as_mut() {
            Some(voice) => voice.marker.marks_for(pitch),
            None => String::new(),
        }
    }

    fn tremolo_subdivision(marks: u32) -> Option<u32> {
        (marks > 0).then(|| 1 << (marks + 2))
    }
}

impl MsrVisitor for LpsrBuilder<'_> {
    fn visit_score_start(&mut self, score: &Score) -> Result<(), TranslationError> {
        self.lpsr.input_line = score.input_line();
        let identification = &score.identification;
        let header = &mut self.lpsr.header;

        match (&identification.work_title, &identification.movement_title) {
            (Some(work), Some(movement)) => {
                header.title = Some(work.clone());
                header.subtitle = Some(movement.clone());
            }
            (Some(title), None) | (None, Some(title)) => header.title = Some(title.clone()),
            (None, None) => {}
        }
        header.composer = identification.creator("composer").map(str::to_string);
        header.arranger = identification.creator("arranger").map(str::to_string);
        header.lyricist = identification.creator("lyricist").map(str::to_string);
        header.poet = identification.creator("poet").map(str::to_string);
        if !identification.rights.is_empty() {
            header.copyright = Some(identification.rights.join(", "));
        }
        if !identification.software.is_empty() {
            header.tagline = Some(format!(
                "Engraved from MusicXML encoded with {}",
                identification.software.join(", ")
            ));
        }
        Ok(())
    }

    fn visit_part_group_start(&mut self, group: &PartGroup) -> Result<(), TranslationError> {
        if group.is_implicit_root() {
            self.blocks.push(LpsrBlock::Simultaneous(Vec::new()));
            return Ok(());
        }
        let (kind, start_delimiter) = group_layout(group);
        self.blocks.push(LpsrBlock::Group {
            kind,
            instrument_name: group.name().to_string(),
            short_instrument_name: group.abbreviation().to_string(),
            start_delimiter,
            children: Vec::new(),
        });
        Ok(())
    }

    fn visit_part_group_end(&mut self, group: &PartGroup) -> Result<(), TranslationError> {
        let Some(block) = self.blocks.pop() else {
            return Ok(());
        };
        if group.is_implicit_root() {
            self.lpsr.score_block = block;
        } else if !block.children().is_empty() {
            if let Some(parent) = self.blocks.last_mut() {
                parent.push_child(block);
            }
        }
        Ok(())
    }

    fn visit_part_start(&mut self, part: &Part) -> Result<(), TranslationError> {
        self.part = Some(PartContext {
            id: part.id().to_string(),
            name: part.name().to_string(),
            abbreviation: part.abbreviation().to_string(),
            staves: Vec::new(),
            figured_bass: None,
        });
        Ok(())
    }

    fn visit_part_end(&mut self, _part: &Part) -> Result<(), TranslationError> {
        let Some(context) = self.part.take() else {
            return Ok(());
        };

        let mut blocks = Vec::new();
        if context.staves.len() > 1 {
            blocks.push(LpsrBlock::Group {
                kind: LpsrGroupKind::PianoStaff,
                instrument_name: context.name,
                short_instrument_name: context.abbreviation,
                start_delimiter: None,
                children: context.staves,
            });
        } else {
            for mut staff in context.staves {
                if let LpsrBlock::Staff {
                    instrument_name,
                    short_instrument_name,
                    ..
                } = &mut staff
                {
                    *instrument_name = context.name.clone();
                    *short_instrument_name = context.abbreviation.clone();
                }
                blocks.push(staff);
            }
        }
        blocks.extend(context.figured_bass);

        if let Some(parent) = self.blocks.last_mut() {
            for block in blocks {
                parent.push_child(block);
            }
        }
        Ok(())
    }

    fn visit_staff_start(&mut self, staff: &Staff) -> Result<(), TranslationError> {
        if staff.kind() == StaffKind::Regular {
            self.staff = Some(StaffContext {
                voice_count: staff.voices().len(),
                voices: Vec::new(),
            });
        }
        Ok(())
    }

    fn visit_staff_end(&mut self, staff: &Staff) -> Result<(), TranslationError> {
        if staff.kind() != StaffKind::Regular {
            return Ok(());
        }
        let (Some(context), Some(part)) = (self.staff.take(), self.part.as_mut()) else {
            return Ok(());
        };
        part.staves.push(LpsrBlock::Staff {
            name: staff_context_name(&part.id, staff.number()),
            instrument_name: String::new(),
            short_instrument_name: String::new(),
            voices: context.voices,
        });
        Ok(())
    }

    fn visit_voice_start(&mut self, voice: &Voice) -> Result<(), TranslationError> {
        let part_id = self.part.as_ref().map(|p| p.id.clone()).unwrap_or_default();
        let (name, mode) = match voice.kind() {
            VoiceKind::Regular => (
                voice_definition_name(&part_id, voice.staff_number(), voice.number()),
                LpsrVoiceMode::Music,
            ),
            VoiceKind::FiguredBass => (figured_bass_definition_name(&part_id), LpsrVoiceMode::Figures),
        };
        if self.settings.trace_passes {
            log::debug!("voice definition {}", name);
        }

        self.voice = Some(VoiceContext {
            definition: LpsrVoiceDefinition::new(
                name,
                voice.input_line(),
                mode,
                self.settings.octave_entry,
            ),
            marker: OctaveMarker::new(self.settings.octave_entry),
            kind: voice.kind(),
            current_staff: voice.staff_number(),
            has_music: false,
        });
        Ok(())
    }

    fn visit_voice_end(&mut self, voice: &Voice) -> Result<(), TranslationError> {
        let Some(context) = self.voice.take() else {
            return Ok(());
        };
        let part_id = self.part.as_ref().map(|p| p.id.clone()).unwrap_or_default();

        match context.kind {
            VoiceKind::Regular => {
                if let Some(staff) = self.staff.as_mut() {
                    let index = staff.voices.len();
                    let style = (staff.voice_count > 1)
                        .then(|| VOICE_STYLES.get(index).map(|s| s.to_string()))
                        .flatten();
                    staff.voices.push(LpsrVoiceUse {
                        context_name: format!(
                            "{}_Voice_{}",
                            part_context_name(&part_id),
                            spelled_identifier(&voice.number().to_string())
                        ),
                        definition_name: context.definition.name.clone(),
                        style,
                    });
                }
                self.lpsr.voice_definitions.push(context.definition);
            }
            VoiceKind::FiguredBass => {
                if context.has_music {
                    if let Some(part) = self.part.as_mut() {
                        part.figured_bass = Some(LpsrBlock::FiguredBass {
                            definition_name: context.definition.name.clone(),
                        });
                    }
                    self.lpsr.voice_definitions.push(context.definition);
                }
            }
        }
        Ok(())
    }

    fn visit_measure_start(&mut self, measure: &Measure) -> Result<(), TranslationError> {
        let mut lpsr_measure = LpsrMeasure::new(measure.number(), measure.input_line());
        if self.settings.generate_measure_comments {
            lpsr_measure.items.push(LpsrMusicItem::MeasureComment {
                number: measure.number().to_string(),
            });
        }
        if measure.kind() == MeasureKind::Anacrusis {
            lpsr_measure.items.push(LpsrMusicItem::Partial {
                duration: self.notated(measure.input_line(), measure.current_position())?,
            });
        }
        lpsr_measure.bar_check = self.settings.generate_bar_checks
            && matches!(measure.kind(), MeasureKind::Regular | MeasureKind::Anacrusis);
        self.measure = Some(lpsr_measure);
        Ok(())
    }

    fn visit_measure_end(&mut self, _measure: &Measure) -> Result<(), TranslationError> {
        if let (Some(measure), Some(voice)) = (self.measure.take(), self.voice.as_mut()) {
            voice.definition.measures.push(measure);
        }
        Ok(())
    }

    fn visit_clef(&mut self, clef: &Clef) -> Result<(), TranslationError> {
        self.push_item(LpsrMusicItem::Clef {
            name: clef_name(clef.kind).to_string(),
        });
        Ok(())
    }

    fn visit_key(&mut self, key: &Key) -> Result<(), TranslationError> {
        let tonic = note_name(&key_tonic(key.fifths, key.mode), self.settings.pitch_language);
        self.push_item(LpsrMusicItem::Key {
            tonic,
            mode: mode_name(key.mode).to_string(),
        });
        Ok(())
    }

    fn visit_time(&mut self, time: &Time) -> Result<(), TranslationError> {
        self.push_item(LpsrMusicItem::Time {
            beats: time.beats,
            beat_type: time.beat_type,
            symbol: time.symbol,
        });
        Ok(())
    }

    fn visit_barline(&mut self, barline: &Barline) -> Result<(), TranslationError> {
        if let Some(glyph) = bar_glyph(barline) {
            self.push_item(LpsrMusicItem::Bar {
                glyph: glyph.to_string(),
            });
        }
        Ok(())
    }

    fn visit_note_start(&mut self, note: &Note) -> Result<(), TranslationError> {
        if note.placement() == NotePlacement::InChord {
            return Ok(());
        }

        let whole_notes = match note.content() {
            _ if self.in_double_tremolo => note.sounding_whole_notes(),
            NoteContent::Skip | NoteContent::Rest { measure_rest: true } => note.sounding_whole_notes(),
            _ => note.display_whole_notes(),
        };
        let duration = self.notated(note.input_line(), whole_notes)?;

        let kind = match note.content() {
            NoteContent::Pitched(pitch) | NoteContent::Unpitched(pitch) => {
                self.follow_staff(note.staff_number());
                LpsrNoteKind::Pitched {
                    name: note_name(pitch, self.settings.pitch_language),
                    octave_marks: self.octave_marks(pitch),
                }
            }
            NoteContent::Rest { measure_rest: true } => LpsrNoteKind::MeasureRest,
            NoteContent::Rest { measure_rest: false } => LpsrNoteKind::Rest,
            NoteContent::Skip => LpsrNoteKind::Skip,
        };
        if !note.is_skip() {
            self.mark_music();
        }

        self.push_item(LpsrMusicItem::Note(LpsrNote {
            kind,
            duration,
            tie: matches!(note.tie(), Some(TieKind::Start) | Some(TieKind::Continue)),
            tremolo_subdivision: Self::tremolo_subdivision(note.single_tremolo_marks()),
        }));
        Ok(())
    }

    fn visit_chord_start(&mut self, chord: &Chord) -> Result<(), TranslationError> {
        let whole_notes = if self.in_double_tremolo {
            chord.sounding_whole_notes()
        } else {
            chord.display_whole_notes()
        };
        let duration = self.notated(chord.core.input_line, whole_notes)?;
        self.follow_staff(chord.staff_number());

        let pitches: Vec<Pitch> = chord.notes().iter().filter_map(|n| n.pitch().copied()).collect();
        let marks = match self.voice.as_mut() {
            Some(voice) => voice.marker.chord_marks(&pitches),
            None => vec![String::new(); pitches.len()],
        };
        let language = self.settings.pitch_language;
        let lpsr_pitches = pitches
            .iter()
            .zip(marks)
            .map(|(pitch, octave_marks)| LpsrChordPitch {
                name: note_name(pitch, language),
                octave_marks,
            })
            .collect();
        let tremolo_marks = chord.notes().first().map_or(0, Note::single_tremolo_marks);

        self.mark_music();
        self.push_item(LpsrMusicItem::Chord(LpsrChord {
            pitches: lpsr_pitches,
            duration,
            tie: chord.is_tied(),
            tremolo_subdivision: Self::tremolo_subdivision(tremolo_marks),
        }));
        Ok(())
    }

    fn visit_tuplet_start(&mut self, tuplet: &Tuplet) -> Result<(), TranslationError> {
        self.push_item(LpsrMusicItem::TupletStart {
            actual_notes: tuplet.actual_notes(),
            normal_notes: tuplet.normal_notes(),
        });
        Ok(())
    }

    fn visit_tuplet_end(&mut self, _tuplet: &Tuplet) -> Result<(), TranslationError> {
        self.push_item(LpsrMusicItem::TupletEnd);
        Ok(())
    }

    fn visit_double_tremolo_start(&mut self, tremolo: &DoubleTremolo) -> Result<(), TranslationError> {
        self.in_double_tremolo = true;
        self.push_item(LpsrMusicItem::TremoloStart {
            repeats: tremolo.number_of_repeats(),
        });
        Ok(())
    }

    fn visit_double_tremolo_end(&mut self, _tremolo: &DoubleTremolo) -> Result<(), TranslationError> {
        self.in_double_tremolo = false;
        self.push_item(LpsrMusicItem::TremoloEnd);
        Ok(())
    }

    fn visit_figured_bass_start(&mut self, figured_bass: &FiguredBass) -> Result<(), TranslationError> {
        let mut duration = self.notated(figured_bass.core.input_line, figured_bass.display_whole_notes())?;
        if figured_bass.tuplet_factor() != Rational::one() {
            duration = duration.scaled(figured_bass.tuplet_factor());
        }
        let figures = figured_bass
            .figures()
            .iter()
            .map(|f| figure_text(f, figured_bass.parentheses()))
            .collect();

        self.mark_music();
        self.push_item(LpsrMusicItem::FiguredBass(LpsrFiguredBass { figures, duration }));
        Ok(())
    }
}
