//! Pass 2b: MXSR + MSR skeleton → MSR
//!
//! Browses the MXSR tree a second time and fills the skeleton's voices
//! with measures and their elements.
//!
//! Notes are not appended as soon as they are read: the last note of each
//! voice is kept pending until the next non-chord note of that voice (or a
//! backup, forward, attributes, barline or measure end) shows that no more
//! `<chord/>` notes will join it. Tuplets and double tremolos are collected
//! per voice the same way and appended once complete.
//!
//! Positions are tracked at the part level (`part_position`, moved by
//! notes, `<backup>` and `<forward>`) and voices are padded with skip notes
//! up to the position where their next element starts. At the end of each
//! measure every voice is padded up to the part's high tide.

use crate::browser::Browser;
use crate::diagnostics::Diagnostics;
use crate::errors::{
    InternalError, MusicXmlError, ParseError, SourceLocation, TranslationError,
};
use crate::msr::{
    Alteration, Barline, BarlineLocation, BarlineStyle, Chord, Clef, ClefKind, DiatonicStep,
    DoubleTremolo, DoubleTremoloKind, Figure, FigurePrefixKind, FigureSuffixKind, FiguredBass,
    FiguredBassParenthesesKind, Key, KeyMode, MeasureElement, Note, NoteContent, NoteOrChord,
    Pitch, Placement, RepeatDirection, Score, TieKind, Time, TimeSymbol, TremoloTypeKind, Tuplet,
    Voice, VoiceKind,
};
use crate::mxsr::{MxsrElement, MxsrElementKind, MxsrVisitor};
use crate::passes::musicxml_values::{
    attribute_number, child_number, dotted_whole_notes, location, note_type_whole_notes,
    parse_beats, parse_number,
};
use crate::rational::Rational;
use crate::settings::TranslationSettings;
use std::collections::BTreeMap;

/// MusicXML `tremolo-marks` range
const MAX_TREMOLO_MARKS: u32 = 8;

// ============================================================================
// PER-VOICE STATE
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct TupletStart {
    number: u32,
    actual_notes: u32,
    normal_notes: u32,
}

/// Tuplet and tremolo markings read from a note's notations
#[derive(Debug, Clone, Copy, Default)]
struct NoteMarks {
    tuplet_start: Option<TupletStart>,
    tuplet_stop: bool,
    /// (actual, normal)
    time_modification: Option<(u32, u32)>,
    double_tremolo: Option<(TremoloTypeKind, u32, Placement)>,
}

impl NoteMarks {
    /// Chord notes may carry the markings of the whole chord
    fn merge(&mut self, other: NoteMarks) {
        self.tuplet_start = self.tuplet_start.or(other.tuplet_start);
        self.tuplet_stop |= other.tuplet_stop;
        self.time_modification = self.time_modification.or(other.time_modification);
        self.double_tremolo = self.double_tremolo.or(other.double_tremolo);
    }
}

/// A note or chord waiting for possible `<chord/>` companions
struct PendingEvent {
    element: NoteOrChord,
    start_position: Rational,
    input_line: usize,
    marks: NoteMarks,
}

struct OpenTuplet {
    tuplet: Tuplet,
    start_position: Rational,
    /// Opened by a time modification without a `<tuplet type="start">`
    implicit: bool,
}

struct OpenTremolo {
    tremolo: DoubleTremolo,
    start_position: Rational,
}

#[derive(Default)]
struct VoiceState {
    pending: Option<PendingEvent>,
    tuplet: Option<OpenTuplet>,
    tremolo: Option<OpenTremolo>,
}

struct ParsedNote {
    note: Note,
    is_chord: bool,
    marks: NoteMarks,
}

struct PendingFiguredBass {
    figured_bass: FiguredBass,
    sounding_whole_notes: Option<Rational>,
}

// ============================================================================
// POPULATOR
// ============================================================================

/// Fills an MSR skeleton with the music of the MXSR tree
pub struct MsrPopulator<'s> {
    settings: &'s TranslationSettings,
    diagnostics: Diagnostics,
    score: Score,

    // part state
    current_part_id: String,
    divisions: i64,
    whole_notes_per_measure: Rational,
    voice_states: BTreeMap<u32, VoiceState>,

    // measure state
    measure_number: String,
    measure_input_line: usize,
    part_position: Rational,
    high_tide: Rational,
    pending_right_barlines: Vec<Barline>,
    pending_figured_bass: Option<PendingFiguredBass>,
}

impl<'s> MsrPopulator<'s> {
    pub fn new(settings: &'s TranslationSettings, skeleton: Score, diagnostics: Diagnostics) -> Self {
        Self {
            settings,
            diagnostics,
            score: skeleton,
            current_part_id: String::new(),
            divisions: 1,
            whole_notes_per_measure: Rational::one(),
            voice_states: BTreeMap::new(),
            measure_number: String::new(),
            measure_input_line: 0,
            part_position: Rational::zero(),
            high_tide: Rational::zero(),
            pending_right_barlines: Vec::new(),
            pending_figured_bass: None,
        }
    }

    pub fn populate(
        mut self,
        root: &MxsrElement,
    ) -> Result<(Score, Diagnostics), TranslationError> {
        log::info!("pass 2b: populating the MSR");
        Browser::new(&mut self).browse(root)?;
        Ok((self.score, self.diagnostics))
    }

    fn here(&self, input_line: usize) -> SourceLocation {
        SourceLocation::new(self.settings.input_source_name.as_str(), input_line)
    }

    fn voice_mut(&mut self, voice_number: u32, input_line: usize) -> Result<&mut Voice, TranslationError> {
        let location = self.here(input_line);
        let part_id = self.current_part_id.clone();
        self.score
            .fetch_part_mut(&self.current_part_id)
            .and_then(|part| part.voice_mut(voice_number))
            .ok_or_else(|| {
                InternalError::VoiceNotInSkeleton {
                    location,
                    part_id,
                    voice: voice_number,
                }
                .into()
            })
    }

    /// Pad the voice up to `start_position`, then append
    fn append_to_voice(
        &mut self,
        voice_number: u32,
        element: MeasureElement,
        start_position: Rational,
        input_line: usize,
    ) -> Result<(), TranslationError> {
        let location = self.here(input_line);
        let voice = self.voice_mut(voice_number, input_line)?;
        let staff_number = voice.staff_number();
        let measure = voice.last_measure_mut().ok_or_else(|| {
            TranslationError::from(InternalError::Generic {
                location,
                message: format!("voice {} has no measure to append to", voice_number),
            })
        })?;
        measure.pad_up_to_position(start_position, voice_number, staff_number, input_line);
        measure.append_element(element);
        Ok(())
    }

    /// Append at each regular voice's own current position
    fn append_to_regular_voices<F>(&mut self, mut keep: F, element: &MeasureElement)
    where
        F: FnMut(&Voice) -> bool,
    {
        if let Some(part) = self.score.fetch_part_mut(&self.current_part_id) {
            for voice in part.voices_mut() {
                if voice.kind() != VoiceKind::Regular || !keep(voice) {
                    continue;
                }
                if let Some(measure) = voice.last_measure_mut() {
                    measure.append_element(element.clone());
                }
            }
        }
    }

    fn advance_part_position(&mut self, whole_notes: Rational) {
        self.part_position = (self.part_position + whole_notes).rationalised();
        if self.part_position > self.high_tide {
            self.high_tide = self.part_position;
        }
    }

    fn whole_notes_from_divisions(&self, duration: i64) -> Rational {
        Rational::new(duration, self.divisions * 4).rationalised()
    }

    // ========================================================================
    // PARTS AND MEASURES
    // ========================================================================

    fn handle_part_start(&mut self, element: &MxsrElement) {
        self.current_part_id = element.attribute("id").unwrap_or_default().to_string();
        self.divisions = 1;
        self.whole_notes_per_measure = Rational::one();
        self.voice_states.clear();
        self.pending_figured_bass = None;
        if self.settings.trace_passes {
            log::debug!("populating part '{}'", self.current_part_id);
        }
    }

    fn handle_measure_start(&mut self, element: &MxsrElement) {
        self.measure_number = element.attribute("number").unwrap_or_default().to_string();
        self.measure_input_line = element.input_line();
        self.part_position = Rational::zero();
        self.high_tide = Rational::zero();
        self.pending_right_barlines.clear();

        let number = self.measure_number.clone();
        let full = self.whole_notes_per_measure;
        if let Some(part) = self.score.fetch_part_mut(&self.current_part_id) {
            for voice in part.voices_mut() {
                voice.create_measure(number.as_str(), element.input_line(), full);
            }
        }
    }

    fn handle_measure_end(&mut self, element: &MxsrElement) -> Result<(), TranslationError> {
        self.flush_all_voices()?;

        let voice_numbers: Vec<u32> = self.voice_states.keys().copied().collect();
        for voice_number in voice_numbers {
            let (tremolo_open, tuplet) = {
                let state = self.voice_states.entry(voice_number).or_default();
                (state.tremolo.is_some(), state.tuplet.take())
            };
            if tremolo_open {
                return Err(MusicXmlError::DoubleTremoloWithoutStop {
                    location: self.here(element.input_line()),
                    voice: voice_number,
                }
                .into());
            }
            if let Some(open) = tuplet {
                if !open.implicit {
                    self.diagnostics.warn(
                        self.here(element.input_line()),
                        "unclosed_tuplet",
                        format!(
                            "tuplet in voice {} is not stopped in measure {}",
                            voice_number, self.measure_number
                        ),
                    );
                }
                self.append_to_voice(
                    voice_number,
                    MeasureElement::Tuplet(open.tuplet),
                    open.start_position,
                    element.input_line(),
                )?;
            }
        }

        if let Some(pending) = self.pending_figured_bass.take() {
            self.diagnostics.warn(
                self.here(pending.figured_bass.core.input_line),
                "orphan_figured_bass",
                "figured bass without a following note is dropped",
            );
        }

        // pad every voice to the high tide, empty measures to their full length
        let Some(part) = self.score.fetch_part_mut(&self.current_part_id) else {
            return Ok(());
        };
        let mut high_tide = self.high_tide;
        for voice in part.voices() {
            high_tide = high_tide.max(voice.current_position());
        }
        if high_tide.is_zero() {
            high_tide = self.whole_notes_per_measure;
        }

        let right_barlines = std::mem::take(&mut self.pending_right_barlines);
        for voice in part.voices_mut() {
            let voice_number = voice.number();
            let staff_number = voice.staff_number();
            let kind = voice.kind();
            if let Some(measure) = voice.last_measure_mut() {
                measure.pad_up_to_position(high_tide, voice_number, staff_number, element.input_line());
                if kind == VoiceKind::Regular {
                    for barline in &right_barlines {
                        measure.append_element(MeasureElement::Barline(barline.clone()));
                    }
                }
            }
            voice.finalize_last_measure();
        }
        Ok(())
    }

    // ========================================================================
    // NOTES
    // ========================================================================

    fn handle_note(&mut self, element: &MxsrElement) -> Result<(), TranslationError> {
        if element.has_child(MxsrElementKind::Grace) {
            self.diagnostics.info(
                self.here(element.input_line()),
                "grace_note_skipped",
                "grace notes are not translated",
            );
            return Ok(());
        }

        let parsed = self.parse_note(element)?;
        let voice_number = parsed.note.voice_number();
        if self.settings.trace_passes {
            log::debug!(
                "note at line {} voice {} sounding {} display {}",
                element.input_line(),
                voice_number,
                parsed.note.sounding_whole_notes(),
                parsed.note.display_whole_notes()
            );
        }

        if parsed.is_chord {
            let location = self.here(element.input_line());
            let state = self.voice_states.entry(voice_number).or_default();
            let Some(mut pending) = state.pending.take() else {
                return Err(MusicXmlError::IllFormedChord {
                    location,
                    voice: voice_number,
                }
                .into());
            };
            let mut chord = match pending.element {
                NoteOrChord::Note(first) => Chord::from_first_note(first),
                NoteOrChord::Chord(chord) => chord,
            };
            chord.add_note(parsed.note);
            pending.element = NoteOrChord::Chord(chord);
            pending.marks.merge(parsed.marks);
            state.pending = Some(pending);
            return Ok(());
        }

        self.flush_voice(voice_number)?;

        let start_position = self.part_position;
        let sounding = parsed.note.sounding_whole_notes();

        if let Some(pending) = self.pending_figured_bass.take() {
            self.attach_figured_bass(pending, &parsed, start_position)?;
        }

        self.voice_states.entry(voice_number).or_default().pending = Some(PendingEvent {
            element: NoteOrChord::Note(parsed.note),
            start_position,
            input_line: element.input_line(),
            marks: parsed.marks,
        });
        self.advance_part_position(sounding);
        Ok(())
    }

    fn parse_note(&self, element: &MxsrElement) -> Result<ParsedNote, TranslationError> {
        let location = self.here(element.input_line());

        let voice_number: u32 = child_number(element, MxsrElementKind::Voice, &location)?.unwrap_or(1);
        let staff_number: u32 = child_number(element, MxsrElementKind::Staff, &location)?.unwrap_or(1);
        let content = parse_note_content(element, &location)?;

        let duration: i64 = child_number(element, MxsrElementKind::Duration, &location)?
            .ok_or_else(|| MusicXmlError::InvalidDuration {
                location: location.clone(),
                reason: "note without <duration>".to_string(),
            })?;
        if duration <= 0 {
            return Err(MusicXmlError::InvalidDuration {
                location,
                reason: format!("note duration must be positive, found {}", duration),
            }
            .into());
        }
        let sounding = self.whole_notes_from_divisions(duration);

        let mut marks = NoteMarks::default();
        if let Some(modification) = element.child(MxsrElementKind::TimeModification) {
            let actual: u32 = child_number(modification, MxsrElementKind::ActualNotes, &location)?.unwrap_or(1);
            let normal: u32 = child_number(modification, MxsrElementKind::NormalNotes, &location)?.unwrap_or(1);
            marks.time_modification = Some((actual.max(1), normal.max(1)));
        }

        let dots = element
            .children()
            .iter()
            .filter(|c| c.kind() == MxsrElementKind::Dot)
            .count() as u32;

        let display = match element.child_text(MxsrElementKind::Type) {
            Some(note_type) => dotted_whole_notes(note_type_whole_notes(note_type, &location)?, dots),
            None => match marks.time_modification {
                Some((actual, normal)) => (sounding * actual as i64 / normal as i64).rationalised(),
                None => sounding,
            },
        };

        let mut note = Note::new(element.input_line(), content, sounding, display, dots);
        note.set_voice_and_staff(voice_number, staff_number);
        note.set_tie(parse_tie(element));

        for notations in element
            .children()
            .iter()
            .filter(|c| c.kind() == MxsrElementKind::Notations)
        {
            for child in notations.children() {
                match child.kind() {
                    MxsrElementKind::Tuplet => {
                        let location = self.here(child.input_line());
                        match child.attribute("type") {
                            Some("start") => {
                                let (actual_notes, normal_notes) =
                                    marks.time_modification.unwrap_or((3, 2));
                                marks.tuplet_start = Some(TupletStart {
                                    number: attribute_number(child, "number", &location)?.unwrap_or(1),
                                    actual_notes,
                                    normal_notes,
                                });
                            }
                            Some("stop") => marks.tuplet_stop = true,
                            _ => {}
                        }
                    }
                    MxsrElementKind::Ornaments => {
                        if let Some(tremolo) = child.child(MxsrElementKind::Tremolo) {
                            let location = self.here(tremolo.input_line());
                            let type_kind = tremolo
                                .attribute("type")
                                .and_then(TremoloTypeKind::from_musicxml)
                                .unwrap_or(TremoloTypeKind::Single);
                            let marks_number: u32 = match tremolo.text() {
                                Some(text) => parse_number(text, "tremolo", &location)?,
                                None => 3,
                            };
                            if marks_number > MAX_TREMOLO_MARKS {
                                return Err(MusicXmlError::InvalidTremoloMarks {
                                    location,
                                    marks: marks_number,
                                }
                                .into());
                            }
                            let placement = Placement::from_musicxml(tremolo.attribute("placement"));
                            match type_kind {
                                TremoloTypeKind::Single => note.set_single_tremolo_marks(marks_number),
                                _ => marks.double_tremolo = Some((type_kind, marks_number, placement)),
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        Ok(ParsedNote {
            note,
            is_chord: element.has_child(MxsrElementKind::Chord),
            marks,
        })
    }

    fn flush_all_voices(&mut self) -> Result<(), TranslationError> {
        let voice_numbers: Vec<u32> = self.voice_states.keys().copied().collect();
        for voice_number in voice_numbers {
            self.flush_voice(voice_number)?;
        }
        Ok(())
    }

    fn flush_voice(&mut self, voice_number: u32) -> Result<(), TranslationError> {
        let pending = self
            .voice_states
            .get_mut(&voice_number)
            .and_then(|state| state.pending.take());
        match pending {
            Some(event) => self.place_event(voice_number, event),
            None => Ok(()),
        }
    }

    /// Route a complete note or chord into a tremolo, a tuplet or the measure
    fn place_event(&mut self, voice_number: u32, event: PendingEvent) -> Result<(), TranslationError> {
        let location = self.here(event.input_line);
        let line = event.input_line;

        let state = self.voice_states.entry(voice_number).or_default();
        let mut tuplet = state.tuplet.take();
        let mut tremolo = state.tremolo.take();

        // implicit tuplets end with the first note outside the time modification
        if event.marks.time_modification.is_none() && tuplet.as_ref().map_or(false, |t| t.implicit) {
            if let Some(open) = tuplet.take() {
                self.append_to_voice(voice_number, MeasureElement::Tuplet(open.tuplet), open.start_position, line)?;
            }
        }

        match event.marks.double_tremolo {
            Some((TremoloTypeKind::Start, marks_number, placement)) => {
                if tremolo.is_some() {
                    return Err(MusicXmlError::DoubleTremoloWithoutStop { location, voice: voice_number }.into());
                }
                let kind = match event.element {
                    NoteOrChord::Note(_) => DoubleTremoloKind::Notes,
                    NoteOrChord::Chord(_) => DoubleTremoloKind::Chords,
                };
                let mut double_tremolo =
                    DoubleTremolo::new(line, kind, TremoloTypeKind::Start, marks_number, placement);
                double_tremolo.set_double_tremolo_first_element(event.element, location)?;
                tremolo = Some(OpenTremolo {
                    tremolo: double_tremolo,
                    start_position: event.start_position,
                });
            }
            Some((TremoloTypeKind::Stop, _, _)) => {
                let Some(mut open) = tremolo.take() else {
                    return Err(MusicXmlError::DoubleTremoloWithoutStart { location, voice: voice_number }.into());
                };
                open.tremolo.set_double_tremolo_second_element(event.element, location)?;
                self.append_to_voice(
                    voice_number,
                    MeasureElement::DoubleTremolo(open.tremolo),
                    open.start_position,
                    line,
                )?;
            }
            _ => {
                if tremolo.is_some() {
                    return Err(MusicXmlError::DoubleTremoloWithoutStop { location, voice: voice_number }.into());
                }

                if let Some(start) = event.marks.tuplet_start {
                    if let Some(open) = tuplet.take() {
                        self.diagnostics.warn(
                            location.clone(),
                            "nested_tuplet",
                            "nested tuplets are flattened, closing the enclosing one",
                        );
                        self.append_to_voice(voice_number, MeasureElement::Tuplet(open.tuplet), open.start_position, line)?;
                    }
                    tuplet = Some(OpenTuplet {
                        tuplet: Tuplet::new(line, start.number, start.actual_notes, start.normal_notes),
                        start_position: event.start_position,
                        implicit: false,
                    });
                } else if tuplet.is_none() {
                    if let Some((actual, normal)) = event.marks.time_modification.filter(|(a, n)| a != n) {
                        self.diagnostics.info(
                            location.clone(),
                            "implicit_tuplet",
                            format!("time modification {}:{} without <tuplet>", actual, normal),
                        );
                        tuplet = Some(OpenTuplet {
                            tuplet: Tuplet::new(line, 1, actual, normal),
                            start_position: event.start_position,
                            implicit: true,
                        });
                    }
                }

                match tuplet.as_mut() {
                    Some(open) => {
                        open.tuplet.add_member(event.element);
                        if event.marks.tuplet_stop {
                            if let Some(open) = tuplet.take() {
                                self.append_to_voice(
                                    voice_number,
                                    MeasureElement::Tuplet(open.tuplet),
                                    open.start_position,
                                    line,
                                )?;
                            }
                        }
                    }
                    None => {
                        let element = match event.element {
                            NoteOrChord::Note(note) => MeasureElement::Note(note),
                            NoteOrChord::Chord(chord) => MeasureElement::Chord(chord),
                        };
                        self.append_to_voice(voice_number, element, event.start_position, line)?;
                    }
                }
            }
        }

        let state = self.voice_states.entry(voice_number).or_default();
        state.tuplet = tuplet;
        state.tremolo = tremolo;
        Ok(())
    }

    // ========================================================================
    // BACKUP, FORWARD
    // ========================================================================

    fn duration_of(&self, element: &MxsrElement) -> Result<Rational, TranslationError> {
        let location = self.here(element.input_line());
        let duration: i64 = child_number(element, MxsrElementKind::Duration, &location)?
            .ok_or_else(|| MusicXmlError::InvalidDuration {
                location: location.clone(),
                reason: format!("<{}> without <duration>", element.name()),
            })?;
        Ok(self.whole_notes_from_divisions(duration))
    }

    fn handle_backup(&mut self, element: &MxsrElement) -> Result<(), TranslationError> {
        self.flush_all_voices()?;
        let whole_notes = self.duration_of(element)?;
        self.part_position = (self.part_position - whole_notes).rationalised();
        if self.part_position < Rational::zero() {
            self.diagnostics.warn(
                self.here(element.input_line()),
                "backup_before_measure_start",
                "backup goes past the start of the measure",
            );
            self.part_position = Rational::zero();
        }
        Ok(())
    }

    fn handle_forward(&mut self, element: &MxsrElement) -> Result<(), TranslationError> {
        self.flush_all_voices()?;
        let whole_notes = self.duration_of(element)?;
        self.advance_part_position(whole_notes);
        Ok(())
    }

    // ========================================================================
    // ATTRIBUTES, BARLINES
    // ========================================================================

    fn handle_attributes(&mut self, element: &MxsrElement) -> Result<(), TranslationError> {
        self.flush_all_voices()?;
        let location = self.here(element.input_line());

        if let Some(divisions_element) = element.child(MxsrElementKind::Divisions) {
            let text = divisions_element.text().unwrap_or_default();
            let divisions: i64 = parse_number(text, "divisions", &location)?;
            // whole notes are computed over `divisions * 4`
            if divisions <= 0 || divisions.checked_mul(4).is_none() {
                return Err(MusicXmlError::NonPositiveDivisions {
                    location,
                    value: text.to_string(),
                }
                .into());
            }
            self.divisions = divisions;
        }

        for clef_element in element
            .children()
            .iter()
            .filter(|c| c.kind() == MxsrElementKind::Clef)
        {
            let clef_location = self.here(clef_element.input_line());
            let staff_number: u32 = attribute_number(clef_element, "number", &clef_location)?.unwrap_or(1);
            let sign = clef_element.child_text(MxsrElementKind::Sign).unwrap_or("G");
            let line: Option<u32> = child_number(clef_element, MxsrElementKind::Line, &clef_location)?;
            let octave_change: i32 =
                child_number(clef_element, MxsrElementKind::ClefOctaveChange, &clef_location)?.unwrap_or(0);

            match ClefKind::from_musicxml(sign, line, octave_change) {
                Some(kind) => {
                    let clef = MeasureElement::Clef(Clef::new(clef_element.input_line(), kind, staff_number));
                    self.append_to_regular_voices(|v| v.staff_number() == staff_number, &clef);
                }
                None => self.diagnostics.warn(
                    clef_location,
                    "unknown_clef",
                    format!("clef sign '{}' line {:?} is not supported", sign, line),
                ),
            }
        }

        if let Some(key_element) = element.child(MxsrElementKind::Key) {
            let key_location = self.here(key_element.input_line());
            if let Some(fifths) = child_number::<i32>(key_element, MxsrElementKind::Fifths, &key_location)? {
                let mode = key_element
                    .child_text(MxsrElementKind::Mode)
                    .map(KeyMode::from_musicxml)
                    .unwrap_or(KeyMode::Major);
                let key = MeasureElement::Key(Key::new(key_element.input_line(), fifths, mode));
                self.append_to_regular_voices(|_| true, &key);
            }
        }

        if let Some(time_element) = element.child(MxsrElementKind::Time) {
            let time_location = self.here(time_element.input_line());
            let beats = time_element.child_text(MxsrElementKind::Beats);
            let beat_type = time_element.child_text(MxsrElementKind::BeatType);
            if let (Some(beats), Some(beat_type)) = (beats, beat_type) {
                let beats = parse_beats(beats, &time_location)?;
                let beat_type: u32 = parse_number(beat_type, "beat-type", &time_location)?;
                let symbol = match time_element.attribute("symbol") {
                    Some("common") => TimeSymbol::Common,
                    Some("cut") => TimeSymbol::Cut,
                    _ => TimeSymbol::None,
                };
                let time = Time::new(time_element.input_line(), beats, beat_type, symbol);
                self.whole_notes_per_measure = time.whole_notes_per_measure();

                let full = self.whole_notes_per_measure;
                if let Some(part) = self.score.fetch_part_mut(&self.current_part_id) {
                    for voice in part.voices_mut() {
                        if let Some(measure) = voice.last_measure_mut() {
                            measure.set_full_measure_whole_notes(full);
                        }
                    }
                }
                self.append_to_regular_voices(|_| true, &MeasureElement::Time(time));
            }
        }

        Ok(())
    }

    fn handle_barline(&mut self, element: &MxsrElement) -> Result<(), TranslationError> {
        self.flush_all_voices()?;

        let location = match element.attribute("location") {
            Some("left") => BarlineLocation::Left,
            Some("middle") => BarlineLocation::Middle,
            _ => BarlineLocation::Right,
        };
        let style = element
            .child_text(MxsrElementKind::BarStyle)
            .map(BarlineStyle::from_musicxml)
            .unwrap_or(BarlineStyle::Regular);
        let repeat = element
            .child(MxsrElementKind::Repeat)
            .and_then(|r| r.attribute("direction"))
            .and_then(|direction| match direction {
                "forward" => Some(RepeatDirection::Forward),
                "backward" => Some(RepeatDirection::Backward),
                _ => None,
            });

        let barline = Barline::new(element.input_line(), location, style, repeat);
        match location {
            BarlineLocation::Right => self.pending_right_barlines.push(barline),
            _ => self.append_to_regular_voices(|_| true, &MeasureElement::Barline(barline)),
        }
        Ok(())
    }

    // ========================================================================
    // FIGURED BASS
    // ========================================================================

    fn handle_figured_bass(&mut self, element: &MxsrElement) -> Result<(), TranslationError> {
        let location = self.here(element.input_line());
        let parentheses = match element.attribute("parentheses") {
            Some("yes") => FiguredBassParenthesesKind::Yes,
            _ => FiguredBassParenthesesKind::No,
        };
        let mut figured_bass = FiguredBass::new(element.input_line(), parentheses);

        for figure_element in element
            .children()
            .iter()
            .filter(|c| c.kind() == MxsrElementKind::Figure)
        {
            let figure_location = self.here(figure_element.input_line());
            let mut figure = Figure::new(figure_element.input_line());
            if let Some(prefix) = figure_element.child_text(MxsrElementKind::Prefix) {
                figure.prefix = FigurePrefixKind::from_musicxml(prefix).unwrap_or(FigurePrefixKind::None);
            }
            figure.number = child_number(figure_element, MxsrElementKind::FigureNumber, &figure_location)?;
            if let Some(suffix) = figure_element.child_text(MxsrElementKind::Suffix) {
                figure.suffix = FigureSuffixKind::from_musicxml(suffix).unwrap_or(FigureSuffixKind::None);
            }
            figured_bass.append_figure(figure);
        }

        let sounding_whole_notes = match element.child(MxsrElementKind::Duration) {
            Some(_) => Some(self.duration_of(element)?),
            None => None,
        };

        if self.pending_figured_bass.is_some() {
            self.diagnostics.warn(
                location,
                "orphan_figured_bass",
                "figured bass replaced before reaching a note",
            );
        }
        self.pending_figured_bass = Some(PendingFiguredBass {
            figured_bass,
            sounding_whole_notes,
        });
        Ok(())
    }

    /// A figured bass lasts as long as the note that follows it
    fn attach_figured_bass(
        &mut self,
        pending: PendingFiguredBass,
        parsed: &ParsedNote,
        start_position: Rational,
    ) -> Result<(), TranslationError> {
        let mut figured_bass = pending.figured_bass;
        let sounding = pending
            .sounding_whole_notes
            .unwrap_or_else(|| parsed.note.sounding_whole_notes());
        let tuplet_factor = match parsed.marks.time_modification {
            Some((actual, normal)) => Rational::new(normal as i64, actual as i64).rationalised(),
            None => Rational::one(),
        };
        figured_bass.set_durations(sounding, parsed.note.display_whole_notes(), tuplet_factor);

        let line = figured_bass.core.input_line;
        let location = self.here(line);
        let voice = self
            .score
            .fetch_part_mut(&self.current_part_id)
            .and_then(|part| part.figured_bass_voice_mut())
            .ok_or_else(|| {
                TranslationError::from(InternalError::Generic {
                    location: location.clone(),
                    message: "figured bass voice missing from the skeleton".to_string(),
                })
            })?;
        let staff_number = voice.staff_number();
        let voice_number = voice.number();
        let measure = voice.last_measure_mut().ok_or_else(|| {
            TranslationError::from(InternalError::Generic {
                location,
                message: "figured bass voice has no measure".to_string(),
            })
        })?;
        measure.pad_up_to_position(start_position, voice_number, staff_number, line);
        measure.append_element(MeasureElement::FiguredBass(figured_bass));
        Ok(())
    }
}

impl MxsrVisitor for MsrPopulator<'_> {
    fn visit_element_start(&mut self, element: &MxsrElement) -> Result<(), TranslationError> {
        match element.kind() {
            MxsrElementKind::Part => {
                self.handle_part_start(element);
                Ok(())
            }
            MxsrElementKind::Measure => {
                self.handle_measure_start(element);
                Ok(())
            }
            MxsrElementKind::Note => self.handle_note(element),
            MxsrElementKind::Backup => self.handle_backup(element),
            MxsrElementKind::Forward => self.handle_forward(element),
            MxsrElementKind::Attributes => self.handle_attributes(element),
            MxsrElementKind::Barline => self.handle_barline(element),
            MxsrElementKind::FiguredBass => self.handle_figured_bass(element),
            _ => Ok(()),
        }
    }

    fn visit_element_end(&mut self, element: &MxsrElement) -> Result<(), TranslationError> {
        match element.kind() {
            MxsrElementKind::Measure => self.handle_measure_end(element),
            _ => Ok(()),
        }
    }
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn parse_note_content(element: &MxsrElement, location: &SourceLocation) -> Result<NoteContent, TranslationError> {
    if let Some(pitch) = element.child(MxsrElementKind::Pitch) {
        let step = pitch.child_text(MxsrElementKind::Step).unwrap_or_default();
        let octave = pitch.child_text(MxsrElementKind::Octave).unwrap_or_default();
        let alter: f32 = child_number(pitch, MxsrElementKind::Alter, location)?.unwrap_or(0.0);
        return Ok(NoteContent::Pitched(make_pitch(step, octave, alter, location)?));
    }
    if let Some(unpitched) = element.child(MxsrElementKind::Unpitched) {
        let step = unpitched.child_text(MxsrElementKind::DisplayStep).unwrap_or("B");
        let octave = unpitched.child_text(MxsrElementKind::DisplayOctave).unwrap_or("4");
        return Ok(NoteContent::Unpitched(make_pitch(step, octave, 0.0, location)?));
    }
    if let Some(rest) = element.child(MxsrElementKind::Rest) {
        return Ok(NoteContent::Rest {
            measure_rest: rest.attribute("measure") == Some("yes"),
        });
    }
    Err(ParseError::MissingRequiredElement(format!(
        "{}: note without <pitch>, <unpitched> or <rest>",
        location
    ))
    .into())
}

fn make_pitch(step: &str, octave: &str, alter: f32, location: &SourceLocation) -> Result<Pitch, TranslationError> {
    let step = DiatonicStep::from_letter(step).ok_or_else(|| MusicXmlError::UnknownPitchStep {
        location: location.clone(),
        step: step.to_string(),
    })?;

    let octave_number = octave
        .parse::<i32>()
        .ok()
        .filter(|o| (0..=9).contains(o))
        .ok_or_else(|| MusicXmlError::InvalidOctave {
            location: location.clone(),
            octave: octave.to_string(),
        })?;

    let alteration = Alteration::from_semitones(alter).ok_or_else(|| MusicXmlError::InvalidNumber {
        location: location.clone(),
        element: "alter".to_string(),
        value: alter.to_string(),
    })?;

    Ok(Pitch::new(step, alteration, octave_number))
}

fn parse_tie(element: &MxsrElement) -> Option<TieKind> {
    let mut start = false;
    let mut stop = false;
    for tie in element.children().iter().filter(|c| c.kind() == MxsrElementKind::Tie) {
        match tie.attribute("type") {
            Some("start") => start = true,
            Some("stop") => stop = true,
            _ => {}
        }
    }
    match (start, stop) {
        (true, true) => Some(TieKind::Continue),
        (true, false) => Some(TieKind::Start),
        (false, true) => Some(TieKind::Stop),
        (false, false) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msr::{MeasureKind, NotePlacement};
    use crate::mxsr::parse_mxsr;
    use crate::passes::mxsr_to_msr_skeleton::MsrSkeletonBuilder;

    fn populate(body: &str) -> Result<(Score, Diagnostics), TranslationError> {
        let xml = format!(
            r#"<score-partwise>
  <part-list><score-part id="P1"><part-name>Music</part-name></score-part></part-list>
  <part id="P1">{}</part>
</score-partwise>"#,
            body
        );
        let settings = TranslationSettings {
            quiet: true,
            ..TranslationSettings::default()
        };
        let root = parse_mxsr(&xml).unwrap();
        let (skeleton, diagnostics) = MsrSkeletonBuilder::new(&settings).build(&root)?;
        MsrPopulator::new(&settings, skeleton, diagnostics).populate(&root)
    }

    fn first_voice(score: &Score) -> &Voice {
        score.fetch_part("P1").unwrap().voices().next().unwrap()
    }

    const ATTRIBUTES: &str = "<attributes><divisions>2</divisions><time><beats>3</beats><beat-type>4</beat-type></time></attributes>";

    fn note(step: &str, duration: u32, note_type: &str, extra: &str) -> String {
        format!(
            "<note><pitch><step>{}</step><octave>4</octave></pitch><duration>{}</duration><voice>1</voice><type>{}</type>{}</note>",
            step, duration, note_type, extra
        )
    }

    #[test]
    fn test_chords_are_grouped() {
        let body = format!(
            r#"<measure number="1">{}{}{}{}</measure>"#,
            ATTRIBUTES,
            note("C", 2, "quarter", ""),
            note("E", 2, "quarter", "<chord/>"),
            note("G", 4, "half", ""),
        );
        let (score, _) = populate(&body).unwrap();
        let measure = &first_voice(&score).measures()[0];

        let timed: Vec<&MeasureElement> = measure
            .elements()
            .iter()
            .filter(|e| matches!(e, MeasureElement::Note(_) | MeasureElement::Chord(_)))
            .collect();
        assert_eq!(timed.len(), 2);
        match timed[0] {
            MeasureElement::Chord(chord) => {
                assert_eq!(chord.notes().len(), 2);
                assert_eq!(chord.sounding_whole_notes(), Rational::new(1, 4));
            }
            other => panic!("expected a chord, got {:?}", other),
        }
        assert_eq!(timed[1].position_in_measure(), Rational::new(1, 4));
        assert_eq!(measure.kind(), MeasureKind::Regular);
    }

    #[test]
    fn test_chord_note_without_predecessor_is_an_error() {
        let body = format!(r#"<measure number="1">{}{}</measure>"#, ATTRIBUTES, note("E", 2, "quarter", "<chord/>"));
        assert!(matches!(
            populate(&body),
            Err(TranslationError::MusicXml(MusicXmlError::IllFormedChord { voice: 1, .. }))
        ));
    }

    #[test]
    fn test_pickup_measure_is_anacrusis() {
        let body = format!(
            r#"<measure number="0">{}{}</measure><measure number="1">{}</measure>"#,
            ATTRIBUTES,
            note("G", 2, "quarter", ""),
            note("C", 6, "half", "<dot/>"),
        );
        let (score, _) = populate(&body).unwrap();
        let voice = first_voice(&score);
        assert_eq!(voice.measures()[0].kind(), MeasureKind::Anacrusis);
        assert_eq!(voice.measures()[1].kind(), MeasureKind::Regular);
        assert_eq!(voice.measures()[1].full_measure_whole_notes(), Rational::new(3, 4));
    }

    #[test]
    fn test_tuplet_members_are_collected() {
        let triplet = |step: &str, notations: &str| {
            note(
                step,
                1,
                "eighth",
                &format!(
                    "<time-modification><actual-notes>3</actual-notes><normal-notes>2</normal-notes></time-modification>{}",
                    notations
                ),
            )
        };
        let body = format!(
            r#"<measure number="1"><attributes><divisions>3</divisions></attributes>{}{}{}{}</measure>"#,
            triplet("C", r#"<notations><tuplet type="start"/></notations>"#),
            triplet("D", ""),
            triplet("E", r#"<notations><tuplet type="stop"/></notations>"#),
            note("F", 9, "half", "<dot/>"),
        );
        let (score, _) = populate(&body).unwrap();
        let measure = &first_voice(&score).measures()[0];

        let tuplet = measure
            .elements()
            .iter()
            .find_map(|e| match e {
                MeasureElement::Tuplet(t) => Some(t),
                _ => None,
            })
            .unwrap();
        assert_eq!(tuplet.members().len(), 3);
        assert_eq!(tuplet.core.sounding_whole_notes, Rational::new(1, 4));
        assert_eq!(measure.current_position(), Rational::one());
    }

    #[test]
    fn test_double_tremolo_is_built() {
        let tremolo = |step: &str, kind: &str| {
            note(
                step,
                4,
                "half",
                &format!(r#"<notations><ornaments><tremolo type="{}">2</tremolo></ornaments></notations>"#, kind),
            )
        };
        let body = format!(
            r#"<measure number="1"><attributes><divisions>2</divisions></attributes>{}{}</measure>"#,
            tremolo("C", "start"),
            tremolo("E", "stop"),
        );
        let (score, _) = populate(&body).unwrap();
        let measure = &first_voice(&score).measures()[0];

        let double_tremolo = measure
            .elements()
            .iter()
            .find_map(|e| match e {
                MeasureElement::DoubleTremolo(t) => Some(t),
                _ => None,
            })
            .unwrap();
        assert_eq!(double_tremolo.sounding_whole_notes(), Rational::one());
        assert_eq!(double_tremolo.number_of_repeats(), 8);
        match double_tremolo.first_element() {
            Some(NoteOrChord::Note(note)) => {
                assert_eq!(note.placement(), NotePlacement::InDoubleTremolo);
                assert_eq!(note.sounding_whole_notes(), Rational::new(1, 16));
            }
            other => panic!("expected a note, got {:?}", other),
        }
        assert_eq!(measure.current_position(), Rational::one());
    }

    #[test]
    fn test_tremolo_stop_without_start_is_an_error() {
        let body = format!(
            r#"<measure number="1">{}</measure>"#,
            note("C", 4, "half", r#"<notations><ornaments><tremolo type="stop">2</tremolo></ornaments></notations>"#),
        );
        assert!(matches!(
            populate(&body),
            Err(TranslationError::MusicXml(MusicXmlError::DoubleTremoloWithoutStart { .. }))
        ));
    }

    #[test]
    fn test_backup_pads_second_voice() {
        let body = format!(
            r#"<measure number="1">{}{}<backup><duration>6</duration></backup>
<note><pitch><step>C</step><octave>3</octave></pitch><duration>2</duration><voice>2</voice><type>quarter</type></note>
</measure>"#,
            ATTRIBUTES,
            note("E", 6, "half", "<dot/>"),
        );
        let (score, _) = populate(&body).unwrap();
        let part = score.fetch_part("P1").unwrap();
        let voices: Vec<&Voice> = part.voices().collect();
        assert_eq!(voices.len(), 2);

        let second = &voices[1].measures()[0];
        assert_eq!(second.current_position(), Rational::new(3, 4));
        match second.elements().last() {
            Some(MeasureElement::Note(skip)) => {
                assert!(skip.is_skip());
                assert_eq!(skip.core.position_in_measure, Rational::new(1, 4));
            }
            other => panic!("expected padding, got {:?}", other),
        }
    }

    #[test]
    fn test_figured_bass_takes_note_duration() {
        let body = format!(
            r#"<measure number="1">{}<figured-bass><figure><figure-number>6</figure-number></figure><figure><prefix>sharp</prefix><figure-number>4</figure-number></figure></figured-bass>{}{}</measure>"#,
            ATTRIBUTES,
            note("C", 4, "half", ""),
            note("D", 2, "quarter", ""),
        );
        let (score, _) = populate(&body).unwrap();
        let voice = score.fetch_part("P1").unwrap().figured_bass_voice().unwrap();
        let measure = &voice.measures()[0];

        match &measure.elements()[0] {
            MeasureElement::FiguredBass(figured_bass) => {
                assert_eq!(figured_bass.figures().len(), 2);
                assert_eq!(figured_bass.figures()[1].prefix, FigurePrefixKind::Sharp);
                assert_eq!(figured_bass.sounding_whole_notes(), Rational::new(1, 2));
                assert_eq!(figured_bass.tuplet_factor(), Rational::one());
            }
            other => panic!("expected a figured bass, got {:?}", other),
        }
        // padded after the figured bass
        assert_eq!(measure.current_position(), Rational::new(3, 4));
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let body = r#"<measure number="1"><note><pitch><step>H</step><octave>4</octave></pitch><duration>1</duration></note></measure>"#;
        assert!(matches!(
            populate(body),
            Err(TranslationError::MusicXml(MusicXmlError::UnknownPitchStep { .. }))
        ));

        let body = r#"<measure number="1"><attributes><divisions>0</divisions></attributes></measure>"#;
        assert!(matches!(
            populate(body),
            Err(TranslationError::MusicXml(MusicXmlError::NonPositiveDivisions { .. }))
        ));
    }

    #[test]
    fn test_divisions_too_large_to_scale() {
        let body = format!(
            r#"<measure number="1"><attributes><divisions>{}</divisions></attributes></measure>"#,
            i64::MAX / 2
        );
        assert!(matches!(
            populate(&body),
            Err(TranslationError::MusicXml(MusicXmlError::NonPositiveDivisions { .. }))
        ));
    }

    #[test]
    fn test_zero_duration_note_is_a_musicxml_error() {
        let body = r#"<measure number="1"><note><pitch><step>C</step><octave>4</octave></pitch><duration>0</duration><voice>1</voice></note></measure>"#;
        assert!(matches!(
            populate(body),
            Err(TranslationError::MusicXml(MusicXmlError::InvalidDuration { .. }))
        ));
    }

    #[test]
    fn test_tremolo_marks_out_of_range() {
        for kind in ["single", "start"] {
            let body = format!(
                r#"<measure number="1">{}{}</measure>"#,
                ATTRIBUTES,
                note(
                    "C",
                    2,
                    "quarter",
                    &format!(r#"<notations><ornaments><tremolo type="{}">70</tremolo></ornaments></notations>"#, kind),
                ),
            );
            assert!(matches!(
                populate(&body),
                Err(TranslationError::MusicXml(MusicXmlError::InvalidTremoloMarks { marks: 70, .. }))
            ));
        }
    }

    #[test]
    fn test_grace_notes_are_skipped() {
        let body = format!(
            r#"<measure number="1">{}<note><grace/><pitch><step>D</step><octave>4</octave></pitch><voice>1</voice><type>eighth</type></note>{}</measure>"#,
            ATTRIBUTES,
            note("C", 6, "half", "<dot/>"),
        );
        let (score, diagnostics) = populate(&body).unwrap();
        assert!(diagnostics.has_kind("grace_note_skipped"));
        assert_eq!(first_voice(&score).measures()[0].current_position(), Rational::new(3, 4));
    }
}
