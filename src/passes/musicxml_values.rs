//! Reading typed values out of MXSR elements
//!
//! Malformed values are user errors carrying the element's input line.

use crate::errors::{MusicXmlError, SourceLocation, TranslationError};
use crate::mxsr::{MxsrElement, MxsrElementKind};
use crate::rational::Rational;
use std::str::FromStr;

pub(crate) fn location(source_name: &str, element: &MxsrElement) -> SourceLocation {
    SourceLocation::new(source_name, element.input_line())
}

/// Parse `text`, reporting `element_name` on failure
pub(crate) fn parse_number<T: FromStr>(
    text: &str,
    element_name: &str,
    location: &SourceLocation,
) -> Result<T, TranslationError> {
    text.trim().parse::<T>().map_err(|_| {
        MusicXmlError::InvalidNumber {
            location: location.clone(),
            element: element_name.to_string(),
            value: text.to_string(),
        }
        .into()
    })
}

/// Number held by the first child of the given kind, if any
pub(crate) fn child_number<T: FromStr>(
    element: &MxsrElement,
    kind: MxsrElementKind,
    location: &SourceLocation,
) -> Result<Option<T>, TranslationError> {
    match element.child(kind) {
        Some(child) => match child.text() {
            Some(text) => parse_number(text, child.name(), location).map(Some),
            None => Ok(None),
        },
        None => Ok(None),
    }
}

/// Number held by an attribute, if present
pub(crate) fn attribute_number<T: FromStr>(
    element: &MxsrElement,
    name: &str,
    location: &SourceLocation,
) -> Result<Option<T>, TranslationError> {
    element
        .attribute(name)
        .map(|value| parse_number(value, name, location))
        .transpose()
}

/// Beats may be written as a sum, e.g. "3+2"
pub(crate) fn parse_beats(text: &str, location: &SourceLocation) -> Result<u32, TranslationError> {
    text.split('+')
        .map(|term| parse_number::<u32>(term, "beats", location))
        .sum()
}

/// Whole notes of an undotted `<type>` value
pub(crate) fn note_type_whole_notes(
    note_type: &str,
    location: &SourceLocation,
) -> Result<Rational, TranslationError> {
    let whole_notes = match note_type {
        "maxima" => Rational::from_integer(8),
        "long" => Rational::from_integer(4),
        "breve" => Rational::from_integer(2),
        "whole" => Rational::one(),
        "half" => Rational::power_of_two_fraction(1),
        "quarter" => Rational::power_of_two_fraction(2),
        "eighth" => Rational::power_of_two_fraction(3),
        "16th" => Rational::power_of_two_fraction(4),
        "32nd" => Rational::power_of_two_fraction(5),
        "64th" => Rational::power_of_two_fraction(6),
        "128th" => Rational::power_of_two_fraction(7),
        "256th" => Rational::power_of_two_fraction(8),
        "512th" => Rational::power_of_two_fraction(9),
        "1024th" => Rational::power_of_two_fraction(10),
        other => {
            return Err(MusicXmlError::UnknownNoteType {
                location: location.clone(),
                note_type: other.to_string(),
            }
            .into())
        }
    };
    Ok(whole_notes)
}

/// `whole_notes × (2 - 1/2^dots)`
pub(crate) fn dotted_whole_notes(whole_notes: Rational, dots: u32) -> Rational {
    let factor = Rational::from_integer(2) - Rational::power_of_two_fraction(dots);
    (whole_notes * factor).rationalised()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn here() -> SourceLocation {
        SourceLocation::new("values.xml", 1)
    }

    #[test]
    fn test_dotted_whole_notes() {
        let quarter = Rational::new(1, 4);
        assert_eq!(dotted_whole_notes(quarter, 0), quarter);
        assert_eq!(dotted_whole_notes(quarter, 1), Rational::new(3, 8));
        assert_eq!(dotted_whole_notes(quarter, 2), Rational::new(7, 16));
    }

    #[test]
    fn test_composite_beats() {
        assert_eq!(parse_beats("3+2", &here()).unwrap(), 5);
        assert!(parse_beats("3+x", &here()).is_err());
    }

    #[test]
    fn test_unknown_note_type() {
        assert!(matches!(
            note_type_whole_notes("crotchet", &here()),
            Err(TranslationError::MusicXml(MusicXmlError::UnknownNoteType { .. }))
        ));
        assert_eq!(
            note_type_whole_notes("breve", &here()).unwrap(),
            Rational::from_integer(2)
        );
    }
}
