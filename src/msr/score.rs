//! The score: identification, the implicit part group and name lengths

use crate::errors::{InternalError, SourceLocation, TranslationError};
use crate::msr::part_groups::{PartGroup, PartGroupId};
use crate::msr::parts::Part;
use serde::Serialize;

/// Absolute number of the implicit root part group
pub const IMPLICIT_PART_GROUP_ID: PartGroupId = PartGroupId(0);

/// Longest names seen, used to align names in text output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MaxNameLengths {
    pub part_group_names: usize,
    pub part_names: usize,
    pub instrument_names: usize,
}

impl MaxNameLengths {
    pub fn register_part_group_name(&mut self, name: &str) {
        self.part_group_names = self.part_group_names.max(name.len());
    }

    pub fn register_part_name(&mut self, name: &str) {
        self.part_names = self.part_names.max(name.len());
    }

    pub fn register_instrument_name(&mut self, name: &str) {
        self.instrument_names = self.instrument_names.max(name.len());
    }
}

/// A `<creator type="...">` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Creator {
    pub kind: String,
    pub name: String,
}

/// Work and movement titles, creators, rights and encoding software
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Identification {
    pub work_title: Option<String>,
    pub movement_title: Option<String>,
    pub creators: Vec<Creator>,
    pub rights: Vec<String>,
    pub software: Vec<String>,
}

impl Identification {
    /// First creator of the given kind ("composer", "lyricist"...)
    pub fn creator(&self, kind: &str) -> Option<&str> {
        self.creators
            .iter()
            .find(|c| c.kind == kind)
            .map(|c| c.name.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Score {
    input_line: usize,
    pub identification: Identification,
    pub max_name_lengths: MaxNameLengths,
    part_group: PartGroup,
}

impl Score {
    pub fn new(input_line: usize) -> Self {
        Self {
            input_line,
            identification: Identification::default(),
            max_name_lengths: MaxNameLengths::default(),
            part_group: PartGroup::create_implicit_part_group(IMPLICIT_PART_GROUP_ID, input_line),
        }
    }

    pub fn input_line(&self) -> usize {
        self.input_line
    }

    pub fn implicit_part_group(&self) -> &PartGroup {
        &self.part_group
    }

    pub fn implicit_part_group_mut(&mut self) -> &mut PartGroup {
        &mut self.part_group
    }

    pub(crate) fn set_implicit_part_group(&mut self, group: PartGroup) {
        self.part_group = group;
    }

    pub fn parts(&self) -> Vec<&Part> {
        let mut parts = Vec::new();
        self.part_group.collect_part_group_parts_list(&mut parts);
        parts
    }

    pub fn fetch_part(&self, part_id: &str) -> Option<&Part> {
        self.part_group
            .fetch_part_from_part_group_by_its_part_id(part_id)
    }

    pub fn fetch_part_mut(&mut self, part_id: &str) -> Option<&mut Part> {
        self.part_group
            .fetch_part_from_part_group_by_its_part_id_mut(part_id)
    }

    pub fn part_group(&self, id: PartGroupId) -> Option<&PartGroup> {
        self.part_group.find_part_group(id)
    }

    /// Remove a part from whichever group owns it
    pub fn remove_part(&mut self, part_id: &str, location: SourceLocation) -> Result<Part, TranslationError> {
        let owner = self
            .fetch_part(part_id)
            .map(Part::uplink)
            .ok_or_else(|| {
                TranslationError::from(InternalError::PartNotFound {
                    location: location.clone(),
                    part_id: part_id.to_string(),
                    part_group: "any".to_string(),
                })
            })?;

        let group = self.part_group.find_part_group_mut(owner).ok_or_else(|| {
            TranslationError::from(InternalError::Generic {
                location: location.clone(),
                message: format!("part '{}' refers to unknown part group {}", part_id, owner.0),
            })
        })?;

        group.remove_part_from_part_group(part_id, location)
    }
}
