//! Pass 2a: MXSR → MSR skeleton
//!
//! Builds the score's part groups, parts, staves and voices without any
//! musical content. Part groups are paired with a stack: the implicit root
//! sits at the bottom, `start` pushes a new group and `stop` pops it into
//! the group below. Voices are created on the staff where they first
//! appear.

use crate::browser::Browser;
use crate::diagnostics::Diagnostics;
use crate::errors::{MusicXmlError, TranslationError};
use crate::msr::{
    Creator, Part, PartGroup, PartGroupBarlineKind, PartGroupId, PartGroupSymbolKind, Score,
    VoiceKind, IMPLICIT_PART_GROUP_ID,
};
use crate::mxsr::{MxsrElement, MxsrElementKind, MxsrVisitor};
use crate::passes::musicxml_values::{attribute_number, child_number, location, parse_number};
use crate::settings::TranslationSettings;
use std::collections::HashSet;

/// Builds the MSR skeleton from the MXSR tree
pub struct MsrSkeletonBuilder<'s> {
    settings: &'s TranslationSettings,
    diagnostics: Diagnostics,
    score: Score,

    /// Open part groups, the implicit root at the bottom
    part_group_stack: Vec<PartGroup>,
    next_part_group_number: u32,
    declared_part_ids: HashSet<String>,

    current_part_id: Option<String>,
}

impl<'s> MsrSkeletonBuilder<'s> {
    pub fn new(settings: &'s TranslationSettings) -> Self {
        Self {
            settings,
            diagnostics: Diagnostics::new(settings.quiet),
            score: Score::new(1),
            part_group_stack: vec![PartGroup::create_implicit_part_group(
                IMPLICIT_PART_GROUP_ID,
                1,
            )],
            next_part_group_number: IMPLICIT_PART_GROUP_ID.0 + 1,
            declared_part_ids: HashSet::new(),
            current_part_id: None,
        }
    }

    /// Run the pass over a `score-partwise` tree
    pub fn build(
        mut self,
        root: &MxsrElement,
    ) -> Result<(Score, Diagnostics), TranslationError> {
        log::info!("pass 2a: building the MSR skeleton");
        Browser::new(&mut self).browse(root)?;
        Ok((self.score, self.diagnostics))
    }

    fn source_name(&self) -> &str {
        &self.settings.input_source_name
    }

    fn top_part_group_mut(&mut self) -> &mut PartGroup {
        // the stack is never empty while the part list is being read
        let last = self.part_group_stack.len() - 1;
        &mut self.part_group_stack[last]
    }

    // ========================================================================
    // PART LIST
    // ========================================================================

    fn handle_part_group(&mut self, element: &MxsrElement) -> Result<(), TranslationError> {
        let location = location(self.source_name(), element);
        let number: u32 = attribute_number(element, "number", &location)?.unwrap_or(1);

        match element.attribute("type") {
            Some("start") => {
                let id = PartGroupId(self.next_part_group_number);
                self.next_part_group_number += 1;
                let uplink = self.top_part_group_mut().id();

                let mut group = PartGroup::new(id, number, element.input_line(), uplink);
                self.fill_part_group(&mut group, element);
                if self.settings.trace_passes {
                    log::debug!("part group {} (number {}) starts at line {}", id.0, number, element.input_line());
                }
                self.part_group_stack.push(group);
                Ok(())
            }
            Some("stop") => {
                let open_position = self.part_group_stack[1..]
                    .iter()
                    .rposition(|g| g.number() == number);

                match open_position {
                    None => Err(MusicXmlError::PartGroupNotStarted { location, number }.into()),
                    Some(position) if position + 2 != self.part_group_stack.len() => {
                        let innermost = self.top_part_group_mut().number();
                        Err(MusicXmlError::OverlappingPartGroups {
                            location,
                            stopped: number,
                            innermost,
                        }
                        .into())
                    }
                    Some(_) => {
                        self.close_innermost_part_group();
                        Ok(())
                    }
                }
            }
            other => {
                self.diagnostics.warn(
                    location,
                    "part_group_type",
                    format!("part-group type {:?} ignored", other.unwrap_or("")),
                );
                Ok(())
            }
        }
    }

    fn fill_part_group(&mut self, group: &mut PartGroup, element: &MxsrElement) {
        let lengths = &mut self.score.max_name_lengths;

        if let Some(name) = element.child_text(MxsrElementKind::GroupName) {
            group.set_part_group_name(name, lengths);
        }
        if let Some(abbreviation) = element.child_text(MxsrElementKind::GroupAbbreviation) {
            group.set_part_group_abbreviation(abbreviation);
        }
        if let Some(display) = element.child(MxsrElementKind::GroupNameDisplay) {
            if let Some(text) = display.child_text(MxsrElementKind::DisplayText) {
                group.set_name_display_text(text);
            }
            if let Some(text) = display.child_text(MxsrElementKind::AccidentalText) {
                group.set_accidental_text(text);
            }
        }
        if let Some(text) = element
            .child(MxsrElementKind::GroupAbbreviationDisplay)
            .and_then(|d| d.child_text(MxsrElementKind::DisplayText))
        {
            group.set_abbreviation_display_text(text);
        }

        if let Some(symbol) = element.child_text(MxsrElementKind::GroupSymbol) {
            match PartGroupSymbolKind::from_musicxml(symbol) {
                Some(kind) => group.set_symbol_kind(kind),
                None => self.diagnostics.warn(
                    location(&self.settings.input_source_name, element),
                    "group_symbol",
                    format!("unknown group symbol '{}'", symbol),
                ),
            }
        }
        if let Some(barline) = element.child_text(MxsrElementKind::GroupBarline) {
            group.set_barline_kind(match barline {
                "no" => PartGroupBarlineKind::No,
                _ => PartGroupBarlineKind::Yes,
            });
        }
    }

    fn close_innermost_part_group(&mut self) {
        if self.part_group_stack.len() < 2 {
            return;
        }
        if let Some(group) = self.part_group_stack.pop() {
            self.top_part_group_mut()
                .append_sub_part_group_to_part_group(group);
        }
    }

    fn handle_score_part(&mut self, element: &MxsrElement) -> Result<(), TranslationError> {
        let location = location(self.source_name(), element);
        let part_id = element.attribute("id").unwrap_or_default().to_string();
        if !self.declared_part_ids.insert(part_id.clone()) {
            // the first declaration wins, wherever its group is
            self.diagnostics.warn(
                location,
                "duplicate_part_id",
                format!("part '{}' is declared more than once in <part-list>", part_id),
            );
            return Ok(());
        }

        let mut diagnostics = std::mem::take(&mut self.diagnostics);
        let mut lengths = self.score.max_name_lengths;
        let result = self
            .top_part_group_mut()
            .append_part_to_part_group_by_its_part_id(&part_id, location, &mut diagnostics)
            .map(|part| {
                if let Some(name) = element.child_text(MxsrElementKind::PartName) {
                    part.set_part_name(name, &mut lengths);
                }
                if let Some(abbreviation) = element.child_text(MxsrElementKind::PartAbbreviation) {
                    part.set_part_abbreviation(abbreviation);
                }
                if let Some(instrument) = element
                    .child(MxsrElementKind::ScoreInstrument)
                    .and_then(|i| i.child_text(MxsrElementKind::InstrumentName))
                {
                    part.set_part_instrument_name(instrument, &mut lengths);
                }
            });
        self.score.max_name_lengths = lengths;
        self.diagnostics = diagnostics;
        result
    }

    fn finish_part_list(&mut self, element: &MxsrElement) {
        while self.part_group_stack.len() > 1 {
            let number = self.top_part_group_mut().number();
            self.diagnostics.warn(
                location(&self.settings.input_source_name, element),
                "part_group_not_stopped",
                format!("part group {} is never stopped, closing it", number),
            );
            self.close_innermost_part_group();
        }
        if let Some(root) = self.part_group_stack.pop() {
            self.score.set_implicit_part_group(root);
        }
    }

    // ========================================================================
    // PARTS
    // ========================================================================

    fn handle_part_start(&mut self, element: &MxsrElement) -> Result<(), TranslationError> {
        let location = location(self.source_name(), element);
        let part_id = element.attribute("id").unwrap_or_default().to_string();

        if !self.declared_part_ids.contains(&part_id) || self.score.fetch_part(&part_id).is_none() {
            return Err(MusicXmlError::PartNotInPartList { location, part_id }.into());
        }
        self.current_part_id = Some(part_id);
        Ok(())
    }

    fn handle_part_end(&mut self, element: &MxsrElement) {
        if let Some(part) = self
            .current_part_id
            .take()
            .and_then(|id| self.score.fetch_part_mut(&id))
        {
            if part.voices().next().is_none() {
                part.fetch_or_create_staff(1, element.input_line())
                    .fetch_or_create_voice(1, VoiceKind::Regular, element.input_line());
            }
        }
    }

    fn handle_staves(&mut self, element: &MxsrElement) -> Result<(), TranslationError> {
        let location = location(self.source_name(), element);
        let count: u32 = match element.text() {
            Some(text) => parse_number(text, "staves", &location)?,
            None => 1,
        };
        if let Some(part) = self.current_part_mut() {
            for number in 1..=count {
                part.fetch_or_create_staff(number, element.input_line());
            }
        }
        Ok(())
    }

    /// Notes and forwards name the voice and staff they belong to
    fn handle_voice_user(&mut self, element: &MxsrElement) -> Result<(), TranslationError> {
        if element.has_child(MxsrElementKind::Grace) {
            return Ok(());
        }
        let location = location(self.source_name(), element);
        let voice_number: u32 = child_number(element, MxsrElementKind::Voice, &location)?.unwrap_or(1);
        let staff_number: u32 = child_number(element, MxsrElementKind::Staff, &location)?.unwrap_or(1);
        let line = element.input_line();

        if let Some(part) = self.current_part_mut() {
            part.fetch_or_create_staff(staff_number, line);
            if part.voice_mut(voice_number).is_none() {
                part.fetch_or_create_staff(staff_number, line)
                    .fetch_or_create_voice(voice_number, VoiceKind::Regular, line);
            }
        }
        Ok(())
    }

    fn handle_figured_bass(&mut self, element: &MxsrElement) {
        if let Some(part) = self.current_part_mut() {
            part.create_part_figured_bass_voice(element.input_line());
        }
    }

    fn current_part_mut(&mut self) -> Option<&mut Part> {
        let id = self.current_part_id.as_deref()?;
        self.score.fetch_part_mut(id)
    }

    // ========================================================================
    // IDENTIFICATION
    // ========================================================================

    fn handle_identification_text(&mut self, element: &MxsrElement) {
        let Some(text) = element.text().map(str::to_string) else {
            return;
        };
        let identification = &mut self.score.identification;
        match element.kind() {
            MxsrElementKind::WorkTitle => identification.work_title = Some(text),
            MxsrElementKind::MovementTitle => identification.movement_title = Some(text),
            MxsrElementKind::Creator => identification.creators.push(Creator {
                kind: element.attribute("type").unwrap_or("composer").to_string(),
                name: text,
            }),
            MxsrElementKind::Rights => identification.rights.push(text),
            MxsrElementKind::Software => identification.software.push(text),
            _ => {}
        }
    }
}

impl MxsrVisitor for MsrSkeletonBuilder<'_> {
    fn visit_element_start(&mut self, element: &MxsrElement) -> Result<(), TranslationError> {
        match element.kind() {
            MxsrElementKind::PartGroup => self.handle_part_group(element),
            MxsrElementKind::ScorePart => self.handle_score_part(element),
            MxsrElementKind::Part => self.handle_part_start(element),
            MxsrElementKind::Staves => self.handle_staves(element),
            MxsrElementKind::Note | MxsrElementKind::Forward => self.handle_voice_user(element),
            MxsrElementKind::FiguredBass => {
                self.handle_figured_bass(element);
                Ok(())
            }
            MxsrElementKind::WorkTitle
            | MxsrElementKind::MovementTitle
            | MxsrElementKind::Creator
            | MxsrElementKind::Rights
            | MxsrElementKind::Software => {
                self.handle_identification_text(element);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn visit_element_end(&mut self, element: &MxsrElement) -> Result<(), TranslationError> {
        match element.kind() {
            MxsrElementKind::PartList => self.finish_part_list(element),
            MxsrElementKind::Part => self.handle_part_end(element),
            _ => {}
        }
        Ok(())
    }
}
