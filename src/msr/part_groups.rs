//! Part groups
//!
//! A part group owns an ordered list of parts and nested part groups. The
//! parent of a group is referred to by its [`PartGroupId`], the group's
//! absolute number. The implicit root group that wraps the whole part list
//! is its own parent: walking up the tree stops on that identity, see
//! [`PartGroup::is_implicit_root`].

use crate::diagnostics::Diagnostics;
use crate::errors::{InternalError, SourceLocation, TranslationError};
use crate::msr::parts::Part;
use crate::msr::score::MaxNameLengths;
use serde::Serialize;

/// Absolute number of a part group, unique in a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PartGroupId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PartGroupSymbolKind {
    None,
    Brace,
    Bracket,
    Line,
    Square,
}

impl PartGroupSymbolKind {
    pub fn from_musicxml(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::None),
            "brace" => Some(Self::Brace),
            "bracket" => Some(Self::Bracket),
            "line" => Some(Self::Line),
            "square" => Some(Self::Square),
            _ => None,
        }
    }
}

/// Whether barlines are drawn across the group's staves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PartGroupBarlineKind {
    Yes,
    No,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PartGroupImplicitKind {
    Yes,
    No,
}

/// Child of a part group
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum PartGroupElement {
    Part(Part),
    PartGroup(PartGroup),
}

#[derive(Debug, Clone, Serialize)]
pub struct PartGroup {
    id: PartGroupId,
    /// MusicXML `number` attribute, reused across start/stop pairs
    number: u32,
    input_line: usize,
    uplink: PartGroupId,
    implicit_kind: PartGroupImplicitKind,

    name: String,
    name_display_text: String,
    abbreviation: String,
    abbreviation_display_text: String,
    accidental_text: String,

    symbol_kind: PartGroupSymbolKind,
    barline_kind: PartGroupBarlineKind,

    elements: Vec<PartGroupElement>,
}

impl PartGroup {
    pub fn new(id: PartGroupId, number: u32, input_line: usize, uplink: PartGroupId) -> Self {
        Self {
            id,
            number,
            input_line,
            uplink,
            implicit_kind: PartGroupImplicitKind::No,
            name: String::new(),
            name_display_text: String::new(),
            abbreviation: String::new(),
            abbreviation_display_text: String::new(),
            accidental_text: String::new(),
            symbol_kind: PartGroupSymbolKind::None,
            barline_kind: PartGroupBarlineKind::Yes,
            elements: Vec::new(),
        }
    }

    /// The synthetic group wrapping the whole part list, its own parent
    pub fn create_implicit_part_group(id: PartGroupId, input_line: usize) -> Self {
        let mut group = Self::new(id, 0, input_line, id);
        group.implicit_kind = PartGroupImplicitKind::Yes;
        group.name = "Implicit".to_string();
        group
    }

    pub fn is_implicit_root(&self) -> bool {
        self.uplink == self.id
    }

    pub fn id(&self) -> PartGroupId {
        self.id
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn input_line(&self) -> usize {
        self.input_line
    }

    pub fn uplink(&self) -> PartGroupId {
        self.uplink
    }

    pub fn implicit_kind(&self) -> PartGroupImplicitKind {
        self.implicit_kind
    }

    pub fn elements(&self) -> &[PartGroupElement] {
        &self.elements
    }

    pub fn elements_mut(&mut self) -> &mut Vec<PartGroupElement> {
        &mut self.elements
    }

    // ------------------------------------------------------------------------
    // names and display

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_part_group_name(&mut self, name: impl Into<String>, lengths: &mut MaxNameLengths) {
        self.name = name.into();
        lengths.register_part_group_name(&self.name);
    }

    pub fn abbreviation(&self) -> &str {
        &self.abbreviation
    }

    /// Abbreviations do not count towards the name widths
    pub fn set_part_group_abbreviation(&mut self, abbreviation: impl Into<String>) {
        self.abbreviation = abbreviation.into();
    }

    pub fn name_display_text(&self) -> &str {
        &self.name_display_text
    }

    pub fn set_name_display_text(&mut self, text: impl Into<String>) {
        self.name_display_text = text.into();
    }

    pub fn abbreviation_display_text(&self) -> &str {
        &self.abbreviation_display_text
    }

    pub fn set_abbreviation_display_text(&mut self, text: impl Into<String>) {
        self.abbreviation_display_text = text.into();
    }

    pub fn accidental_text(&self) -> &str {
        &self.accidental_text
    }

    pub fn set_accidental_text(&mut self, text: impl Into<String>) {
        self.accidental_text = text.into();
    }

    pub fn symbol_kind(&self) -> PartGroupSymbolKind {
        self.symbol_kind
    }

    pub fn set_symbol_kind(&mut self, kind: PartGroupSymbolKind) {
        self.symbol_kind = kind;
    }

    pub fn barline_kind(&self) -> PartGroupBarlineKind {
        self.barline_kind
    }

    pub fn set_barline_kind(&mut self, kind: PartGroupBarlineKind) {
        self.barline_kind = kind;
    }

    // ------------------------------------------------------------------------
    // parts and sub-groups

    fn direct_part_index(&self, part_id: &str) -> Option<usize> {
        self.elements.iter().position(|element| match element {
            PartGroupElement::Part(part) => part.id() == part_id,
            PartGroupElement::PartGroup(_) => false,
        })
    }

    /// Look up the part among this group's parts, creating it when absent.
    ///
    /// Registering an ID twice is not an error: a warning is recorded and
    /// the existing part is returned.
    pub fn append_part_to_part_group_by_its_part_id(
        &mut self,
        part_id: &str,
        location: SourceLocation,
        diagnostics: &mut Diagnostics,
    ) -> Result<&mut Part, TranslationError> {
        match self.direct_part_index(part_id) {
            Some(_) => diagnostics.warn(
                location.clone(),
                "duplicate_part_id",
                format!(
                    "part '{}' already exists in part group {}",
                    part_id, self.id.0
                ),
            ),
            None => {
                let part = Part::new(part_id, location.input_line, self.id);
                self.elements.push(PartGroupElement::Part(part));
            }
        }

        let group_id = self.id;
        self.elements
            .iter_mut()
            .find_map(|element| match element {
                PartGroupElement::Part(part) if part.id() == part_id => Some(part),
                _ => None,
            })
            .ok_or_else(|| {
                InternalError::PartNotFound {
                    location,
                    part_id: part_id.to_string(),
                    part_group: group_id.0.to_string(),
                }
                .into()
            })
    }

    pub fn append_part_to_part_group(&mut self, mut part: Part) {
        part.set_uplink(self.id);
        self.elements.push(PartGroupElement::Part(part));
    }

    pub fn prepend_part_to_part_group(&mut self, mut part: Part) {
        part.set_uplink(self.id);
        self.elements.insert(0, PartGroupElement::Part(part));
    }

    pub fn append_sub_part_group_to_part_group(&mut self, mut group: PartGroup) {
        group.uplink = self.id;
        self.elements.push(PartGroupElement::PartGroup(group));
    }

    /// Detach a direct child part, handing it back to the caller
    pub fn remove_part_from_part_group(
        &mut self,
        part_id: &str,
        location: SourceLocation,
    ) -> Result<Part, TranslationError> {
        let mut removed = None;
        self.elements = std::mem::take(&mut self.elements)
            .into_iter()
            .filter_map(|element| match element {
                PartGroupElement::Part(part) if removed.is_none() && part.id() == part_id => {
                    removed = Some(part);
                    None
                }
                other => Some(other),
            })
            .collect();

        match removed {
            Some(part) => {
                log::debug!("removed part '{}' from part group {}", part_id, self.id.0);
                Ok(part)
            }
            None => Err(InternalError::PartNotFound {
                location,
                part_id: part_id.to_string(),
                part_group: self.id.0.to_string(),
            }
            .into()),
        }
    }

    /// Depth-first search through nested groups
    pub fn fetch_part_from_part_group_by_its_part_id(&self, part_id: &str) -> Option<&Part> {
        self.elements.iter().find_map(|element| match element {
            PartGroupElement::Part(part) if part.id() == part_id => Some(part),
            PartGroupElement::Part(_) => None,
            PartGroupElement::PartGroup(group) => {
                group.fetch_part_from_part_group_by_its_part_id(part_id)
            }
        })
    }

    pub fn fetch_part_from_part_group_by_its_part_id_mut(
        &mut self,
        part_id: &str,
    ) -> Option<&mut Part> {
        self.elements.iter_mut().find_map(|element| match element {
            PartGroupElement::Part(part) if part.id() == part_id => Some(part),
            PartGroupElement::Part(_) => None,
            PartGroupElement::PartGroup(group) => {
                group.fetch_part_from_part_group_by_its_part_id_mut(part_id)
            }
        })
    }

    /// Flatten the nested parts into `parts`, in traversal order
    pub fn collect_part_group_parts_list<'a>(&'a self, parts: &mut Vec<&'a Part>) {
        for element in &self.elements {
            match element {
                PartGroupElement::Part(part) => parts.push(part),
                PartGroupElement::PartGroup(group) => group.collect_part_group_parts_list(parts),
            }
        }
    }

    /// This group or one of its descendants with the given id
    pub fn find_part_group(&self, id: PartGroupId) -> Option<&PartGroup> {
        if self.id == id {
            return Some(self);
        }
        self.elements.iter().find_map(|element| match element {
            PartGroupElement::PartGroup(group) => group.find_part_group(id),
            PartGroupElement::Part(_) => None,
        })
    }

    pub fn find_part_group_mut(&mut self, id: PartGroupId) -> Option<&mut PartGroup> {
        if self.id == id {
            return Some(self);
        }
        self.elements.iter_mut().find_map(|element| match element {
            PartGroupElement::PartGroup(group) => group.find_part_group_mut(id),
            PartGroupElement::Part(_) => None,
        })
    }

    /// Ids of the enclosing groups, innermost first, up to the implicit root
    pub fn ancestor_ids<'a, F>(&self, lookup: F) -> Vec<PartGroupId>
    where
        F: Fn(PartGroupId) -> Option<&'a PartGroup>,
    {
        let mut ids = Vec::new();
        if self.is_implicit_root() {
            return ids;
        }

        let mut current = self.uplink;
        while let Some(group) = lookup(current) {
            ids.push(group.id);
            if group.is_implicit_root() {
                break;
            }
            current = group.uplink;
        }
        ids
    }

    /// True when no part is reachable from this group
    pub fn is_empty(&self) -> bool {
        let mut parts = Vec::new();
        self.collect_part_group_parts_list(&mut parts);
        parts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn here(line: usize) -> SourceLocation {
        SourceLocation::new("groups.xml", line)
    }

    #[test]
    fn test_implicit_root_is_its_own_parent() {
        let root = PartGroup::create_implicit_part_group(PartGroupId(0), 1);
        assert!(root.is_implicit_root());
        assert_eq!(root.uplink(), root.id());
        assert_eq!(root.implicit_kind(), PartGroupImplicitKind::Yes);
        assert!(root.ancestor_ids(|_| Some(&root)).is_empty());

        let nested = PartGroup::new(PartGroupId(1), 1, 3, PartGroupId(0));
        assert!(!nested.is_implicit_root());
    }

    #[test]
    fn test_part_registration_is_idempotent() {
        let mut group = PartGroup::create_implicit_part_group(PartGroupId(0), 1);
        let mut diagnostics = Diagnostics::new(true);

        let first: *const Part = group
            .append_part_to_part_group_by_its_part_id("P1", here(5), &mut diagnostics)
            .unwrap();
        assert!(diagnostics.is_empty());

        let second: *const Part = group
            .append_part_to_part_group_by_its_part_id("P1", here(9), &mut diagnostics)
            .unwrap();

        assert!(std::ptr::eq(first, second));
        assert_eq!(group.elements().len(), 1);
        assert!(diagnostics.has_kind("duplicate_part_id"));
    }

    #[test]
    fn test_nested_parts_are_collected_in_order() {
        let mut root = PartGroup::create_implicit_part_group(PartGroupId(0), 1);
        root.append_part_to_part_group(Part::new("A", 2, PartGroupId(0)));

        let mut strings = PartGroup::new(PartGroupId(1), 1, 3, PartGroupId(0));
        strings.append_part_to_part_group(Part::new("B", 4, PartGroupId(1)));
        root.append_sub_part_group_to_part_group(strings);

        root.append_part_to_part_group(Part::new("C", 6, PartGroupId(0)));

        let mut parts = Vec::new();
        root.collect_part_group_parts_list(&mut parts);
        let ids: Vec<&str> = parts.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);

        let b = root.fetch_part_from_part_group_by_its_part_id("B").unwrap();
        assert_eq!(b.uplink(), PartGroupId(1));
        assert!(root.fetch_part_from_part_group_by_its_part_id("Z").is_none());
    }

    #[test]
    fn test_prepend_puts_part_first() {
        let mut group = PartGroup::new(PartGroupId(2), 1, 1, PartGroupId(0));
        group.append_part_to_part_group(Part::new("P2", 1, PartGroupId(9)));
        group.prepend_part_to_part_group(Part::new("P1", 1, PartGroupId(9)));

        let mut parts = Vec::new();
        group.collect_part_group_parts_list(&mut parts);
        assert_eq!(parts[0].id(), "P1");
        assert!(parts.iter().all(|p| p.uplink() == PartGroupId(2)));
    }

    #[test]
    fn test_remove_part_skips_sub_groups() {
        let mut group = PartGroup::create_implicit_part_group(PartGroupId(0), 1);
        group.append_sub_part_group_to_part_group(PartGroup::new(PartGroupId(1), 1, 2, PartGroupId(0)));
        group.append_part_to_part_group(Part::new("P1", 3, PartGroupId(0)));

        let removed = group.remove_part_from_part_group("P1", here(3)).unwrap();
        assert_eq!(removed.id(), "P1");
        assert!(matches!(group.elements(), [PartGroupElement::PartGroup(_)]));
    }

    #[test]
    fn test_remove_part() {
        let mut group = PartGroup::create_implicit_part_group(PartGroupId(0), 1);
        group.append_part_to_part_group(Part::new("P1", 2, PartGroupId(0)));
        group.append_part_to_part_group(Part::new("P2", 3, PartGroupId(0)));

        let removed = group.remove_part_from_part_group("P1", here(2)).unwrap();
        assert_eq!(removed.id(), "P1");
        assert_eq!(group.elements().len(), 1);

        let missing = group.remove_part_from_part_group("P1", here(2));
        assert!(matches!(
            missing,
            Err(TranslationError::Internal(InternalError::PartNotFound { .. }))
        ));
    }

    #[test]
    fn test_ancestor_walk_stops_at_root() {
        let mut root = PartGroup::create_implicit_part_group(PartGroupId(0), 1);
        let mut outer = PartGroup::new(PartGroupId(1), 1, 2, PartGroupId(0));
        let inner = PartGroup::new(PartGroupId(2), 2, 3, PartGroupId(1));
        outer.append_sub_part_group_to_part_group(inner);
        root.append_sub_part_group_to_part_group(outer);

        let inner = root.find_part_group(PartGroupId(2)).unwrap();
        let ancestors = inner.ancestor_ids(|id| root.find_part_group(id));
        assert_eq!(ancestors, vec![PartGroupId(1), PartGroupId(0)]);
    }

    #[test]
    fn test_name_lengths_are_tracked() {
        let mut lengths = MaxNameLengths::default();
        let mut group = PartGroup::new(PartGroupId(1), 1, 1, PartGroupId(0));
        group.set_part_group_name("Strings", &mut lengths);
        group.set_part_group_abbreviation("Str.");
        assert_eq!(lengths.part_group_names, 7);

        let mut other = PartGroup::new(PartGroupId(2), 2, 1, PartGroupId(0));
        other.set_part_group_abbreviation("A very long group abbreviation");
        assert_eq!(lengths.part_group_names, 7);
        assert_eq!(other.abbreviation(), "A very long group abbreviation");
    }
}
