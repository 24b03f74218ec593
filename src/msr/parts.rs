//! Parts and staves

use crate::msr::part_groups::PartGroupId;
use crate::msr::score::MaxNameLengths;
use crate::msr::voices::{Voice, VoiceKind};
use serde::Serialize;

/// Staff number of the figured bass staff, never used by MusicXML
pub const FIGURED_BASS_STAFF_NUMBER: u32 = 0;

/// Voice number of the figured bass voice
pub const FIGURED_BASS_VOICE_NUMBER: u32 = 0;

// ============================================================================
// STAFF
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StaffKind {
    Regular,
    FiguredBass,
}

#[derive(Debug, Clone, Serialize)]
pub struct Staff {
    number: u32,
    kind: StaffKind,
    input_line: usize,
    voices: Vec<Voice>,
}

impl Staff {
    pub fn new(number: u32, kind: StaffKind, input_line: usize) -> Self {
        Self {
            number,
            kind,
            input_line,
            voices: Vec::new(),
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn kind(&self) -> StaffKind {
        self.kind
    }

    pub fn input_line(&self) -> usize {
        self.input_line
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn voices_mut(&mut self) -> &mut [Voice] {
        &mut self.voices
    }

    pub fn voice(&self, number: u32) -> Option<&Voice> {
        self.voices.iter().find(|v| v.number() == number)
    }

    pub fn voice_mut(&mut self, number: u32) -> Option<&mut Voice> {
        self.voices.iter_mut().find(|v| v.number() == number)
    }

    /// Lookup or create, voices keep their creation order
    pub fn fetch_or_create_voice(&mut self, number: u32, kind: VoiceKind, input_line: usize) -> &mut Voice {
        let index = match self.voices.iter().position(|v| v.number() == number) {
            Some(index) => index,
            None => {
                self.voices.push(Voice::new(number, kind, self.number, input_line));
                self.voices.len() - 1
            }
        };
        &mut self.voices[index]
    }
}

// ============================================================================
// PART
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Part {
    id: String,
    input_line: usize,
    uplink: PartGroupId,
    name: String,
    abbreviation: String,
    instrument_name: String,
    staves: Vec<Staff>,
}

impl Part {
    pub fn new(id: impl Into<String>, input_line: usize, uplink: PartGroupId) -> Self {
        Self {
            id: id.into(),
            input_line,
            uplink,
            name: String::new(),
            abbreviation: String::new(),
            instrument_name: String::new(),
            staves: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn input_line(&self) -> usize {
        self.input_line
    }

    pub fn uplink(&self) -> PartGroupId {
        self.uplink
    }

    pub(crate) fn set_uplink(&mut self, uplink: PartGroupId) {
        self.uplink = uplink;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_part_name(&mut self, name: impl Into<String>, lengths: &mut MaxNameLengths) {
        self.name = name.into();
        lengths.register_part_name(&self.name);
    }

    pub fn abbreviation(&self) -> &str {
        &self.abbreviation
    }

    pub fn set_part_abbreviation(&mut self, abbreviation: impl Into<String>) {
        self.abbreviation = abbreviation.into();
    }

    pub fn instrument_name(&self) -> &str {
        &self.instrument_name
    }

    pub fn set_part_instrument_name(&mut self, name: impl Into<String>, lengths: &mut MaxNameLengths) {
        self.instrument_name = name.into();
        lengths.register_instrument_name(&self.instrument_name);
    }

    pub fn staves(&self) -> &[Staff] {
        &self.staves
    }

    pub fn staves_mut(&mut self) -> &mut [Staff] {
        &mut self.staves
    }

    pub fn staff(&self, number: u32) -> Option<&Staff> {
        self.staves.iter().find(|s| s.number() == number)
    }

    pub fn staff_mut(&mut self, number: u32) -> Option<&mut Staff> {
        self.staves.iter_mut().find(|s| s.number() == number)
    }

    /// Regular staves only, in creation order
    pub fn regular_staves(&self) -> impl Iterator<Item = &Staff> {
        self.staves.iter().filter(|s| s.kind() == StaffKind::Regular)
    }

    /// Lookup or create a regular staff
    pub fn fetch_or_create_staff(&mut self, number: u32, input_line: usize) -> &mut Staff {
        let index = match self.staves.iter().position(|s| s.number() == number) {
            Some(index) => index,
            None => {
                self.staves.push(Staff::new(number, StaffKind::Regular, input_line));
                self.staves.len() - 1
            }
        };
        &mut self.staves[index]
    }

    /// Create the staff and voice holding the part's figured basses
    pub fn create_part_figured_bass_voice(&mut self, input_line: usize) -> &mut Voice {
        let index = match self
            .staves
            .iter()
            .position(|s| s.kind() == StaffKind::FiguredBass)
        {
            Some(index) => index,
            None => {
                self.staves.push(Staff::new(
                    FIGURED_BASS_STAFF_NUMBER,
                    StaffKind::FiguredBass,
                    input_line,
                ));
                self.staves.len() - 1
            }
        };
        self.staves[index].fetch_or_create_voice(
            FIGURED_BASS_VOICE_NUMBER,
            VoiceKind::FiguredBass,
            input_line,
        )
    }

    pub fn figured_bass_voice(&self) -> Option<&Voice> {
        self.staves
            .iter()
            .find(|s| s.kind() == StaffKind::FiguredBass)
            .and_then(|s| s.voices().first())
    }

    pub fn figured_bass_voice_mut(&mut self) -> Option<&mut Voice> {
        self.staves
            .iter_mut()
            .find(|s| s.kind() == StaffKind::FiguredBass)
            .and_then(|s| s.voices_mut().first_mut())
    }

    /// All voices of all staves, in creation order
    pub fn voices(&self) -> impl Iterator<Item = &Voice> {
        self.staves.iter().flat_map(|s| s.voices().iter())
    }

    pub fn voices_mut(&mut self) -> impl Iterator<Item = &mut Voice> {
        self.staves.iter_mut().flat_map(|s| s.voices_mut().iter_mut())
    }

    /// A regular voice by MusicXML voice number, whatever its staff
    pub fn voice_mut(&mut self, number: u32) -> Option<&mut Voice> {
        self.voices_mut()
            .find(|v| v.kind() == VoiceKind::Regular && v.number() == number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staves_and_voices_keep_creation_order() {
        let mut part = Part::new("P1", 3, PartGroupId(0));
        part.fetch_or_create_staff(2, 10)
            .fetch_or_create_voice(5, VoiceKind::Regular, 10);
        part.fetch_or_create_staff(1, 11)
            .fetch_or_create_voice(1, VoiceKind::Regular, 11);
        part.fetch_or_create_staff(2, 12)
            .fetch_or_create_voice(5, VoiceKind::Regular, 12);

        let staff_numbers: Vec<u32> = part.staves().iter().map(Staff::number).collect();
        assert_eq!(staff_numbers, vec![2, 1]);
        assert_eq!(part.voices().count(), 2);
        assert_eq!(part.voice_mut(5).map(|v| v.staff_number()), Some(2));
    }

    #[test]
    fn test_figured_bass_voice_is_created_once() {
        let mut part = Part::new("P1", 3, PartGroupId(0));
        part.fetch_or_create_staff(1, 4);
        part.create_part_figured_bass_voice(20);
        part.create_part_figured_bass_voice(30);

        assert_eq!(part.staves().len(), 2);
        assert_eq!(part.regular_staves().count(), 1);
        let voice = part.figured_bass_voice().unwrap();
        assert_eq!(voice.kind(), VoiceKind::FiguredBass);
        assert_eq!(voice.input_line(), 20);
    }

    #[test]
    fn test_instrument_name_length_is_tracked() {
        let mut lengths = MaxNameLengths::default();
        let mut part = Part::new("P1", 3, PartGroupId(0));
        part.set_part_name("Violin", &mut lengths);
        part.set_part_instrument_name("Violino primo", &mut lengths);
        part.set_part_instrument_name("Vl.", &mut lengths);
        assert_eq!(lengths.part_names, 6);
        assert_eq!(lengths.instrument_names, 13);
    }
}
