//! Figured bass
//!
//! A figured bass holds an ordered, append-only list of figures. Its
//! durations and tuplet factor are stored as given by the populating pass.

use crate::msr::measure_elements::MeasureElementCore;
use crate::rational::Rational;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FiguredBassParenthesesKind {
    Yes,
    No,
}

/// Accidental written before a figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FigurePrefixKind {
    None,
    DoubleFlat,
    Flat,
    FlatFlat,
    Natural,
    SharpSharp,
    Sharp,
    DoubleSharp,
}

impl FigurePrefixKind {
    pub fn from_musicxml(value: &str) -> Option<Self> {
        match value {
            "double-flat" => Some(Self::DoubleFlat),
            "flat" => Some(Self::Flat),
            "flat-flat" => Some(Self::FlatFlat),
            "natural" => Some(Self::Natural),
            "sharp-sharp" => Some(Self::SharpSharp),
            "sharp" => Some(Self::Sharp),
            "double-sharp" => Some(Self::DoubleSharp),
            _ => None,
        }
    }
}

/// Accidental or slash written after a figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FigureSuffixKind {
    None,
    DoubleFlat,
    Flat,
    FlatFlat,
    Natural,
    SharpSharp,
    Sharp,
    DoubleSharp,
    Slash,
}

impl FigureSuffixKind {
    pub fn from_musicxml(value: &str) -> Option<Self> {
        match value {
            "double-flat" => Some(Self::DoubleFlat),
            "flat" => Some(Self::Flat),
            "flat-flat" => Some(Self::FlatFlat),
            "natural" => Some(Self::Natural),
            "sharp-sharp" => Some(Self::SharpSharp),
            "sharp" => Some(Self::Sharp),
            "double-sharp" => Some(Self::DoubleSharp),
            "slash" => Some(Self::Slash),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub input_line: usize,
    pub prefix: FigurePrefixKind,
    /// `None` for a lone accidental
    pub number: Option<u32>,
    pub suffix: FigureSuffixKind,
}

impl Figure {
    pub fn new(input_line: usize) -> Self {
        Self {
            input_line,
            prefix: FigurePrefixKind::None,
            number: None,
            suffix: FigureSuffixKind::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiguredBass {
    pub core: MeasureElementCore,
    display_whole_notes: Rational,
    parentheses: FiguredBassParenthesesKind,
    tuplet_factor: Rational,
    figures: Vec<Figure>,
}

impl FiguredBass {
    pub fn new(input_line: usize, parentheses: FiguredBassParenthesesKind) -> Self {
        Self {
            core: MeasureElementCore::new(input_line, Rational::NOT_SET),
            display_whole_notes: Rational::NOT_SET,
            parentheses,
            tuplet_factor: Rational::one(),
            figures: Vec::new(),
        }
    }

    pub fn append_figure(&mut self, figure: Figure) {
        self.figures.push(figure);
    }

    pub fn figures(&self) -> &[Figure] {
        &self.figures
    }

    pub fn parentheses(&self) -> FiguredBassParenthesesKind {
        self.parentheses
    }

    pub fn sounding_whole_notes(&self) -> Rational {
        self.core.sounding_whole_notes
    }

    pub fn display_whole_notes(&self) -> Rational {
        self.display_whole_notes
    }

    pub fn tuplet_factor(&self) -> Rational {
        self.tuplet_factor
    }

    pub fn set_durations(&mut self, sounding: Rational, display: Rational, tuplet_factor: Rational) {
        self.core.sounding_whole_notes = sounding;
        self.display_whole_notes = display;
        self.tuplet_factor = tuplet_factor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_figures_keep_append_order() {
        let mut figured_bass = FiguredBass::new(3, FiguredBassParenthesesKind::No);
        for number in [6, 4, 3] {
            let mut figure = Figure::new(3);
            figure.number = Some(number);
            figured_bass.append_figure(figure);
        }
        let numbers: Vec<Option<u32>> = figured_bass.figures().iter().map(|f| f.number).collect();
        assert_eq!(numbers, vec![Some(6), Some(4), Some(3)]);
    }

    #[test]
    fn test_durations_are_stored_as_given() {
        let mut figured_bass = FiguredBass::new(3, FiguredBassParenthesesKind::Yes);
        assert!(!figured_bass.sounding_whole_notes().is_set());

        figured_bass.set_durations(Rational::new(1, 6), Rational::new(1, 4), Rational::new(2, 3));
        assert_eq!(figured_bass.sounding_whole_notes(), Rational::new(1, 6));
        assert_eq!(figured_bass.display_whole_notes(), Rational::new(1, 4));
        assert_eq!(figured_bass.tuplet_factor(), Rational::new(2, 3));
    }

    #[test]
    fn test_suffix_allows_slash_but_prefix_does_not() {
        assert_eq!(FigureSuffixKind::from_musicxml("slash"), Some(FigureSuffixKind::Slash));
        assert_eq!(FigurePrefixKind::from_musicxml("slash"), None);
        assert_eq!(FigurePrefixKind::from_musicxml("flat-flat"), Some(FigurePrefixKind::FlatFlat));
    }
}
