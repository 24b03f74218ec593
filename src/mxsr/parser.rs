//! XML parsing layer for MusicXML documents
//!
//! Wraps roxmltree to turn MusicXML 3.1/4.0 partwise text into an owned
//! [`MxsrElement`] tree. Only `score-partwise` documents are accepted.

use crate::errors::ParseError;
use crate::mxsr::elements::MxsrElement;
use roxmltree::{Document, Node, ParsingOptions};

/// Parse MusicXML text into the MXSR element tree.
pub fn parse_mxsr(xml: &str) -> Result<MxsrElement, ParseError> {
    // MusicXML files usually carry a DOCTYPE; it is accepted but never resolved
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };

    let doc = Document::parse_with_options(xml, options)
        .map_err(|e| ParseError::InvalidXml(format!("XML parse error: {}", e)))?;

    let root = doc.root_element();
    match root.tag_name().name() {
        "score-partwise" => {}
        "score-timewise" => {
            return Err(ParseError::UnsupportedFormat(
                "score-timewise documents are not supported, convert to score-partwise".to_string(),
            ))
        }
        other => {
            return Err(ParseError::UnsupportedFormat(format!(
                "Expected score-partwise, found {}",
                other
            )))
        }
    }

    if get_child(root, "part").is_none() {
        return Err(ParseError::MissingRequiredElement(
            "No parts found in score".to_string(),
        ));
    }

    Ok(convert_node(&doc, root))
}

fn convert_node(doc: &Document, node: Node) -> MxsrElement {
    let input_line = doc.text_pos_at(node.range().start).row as usize;
    let mut element = MxsrElement::new(node.tag_name().name(), input_line);

    for attribute in node.attributes() {
        element = element.with_attribute(attribute.name(), attribute.value());
    }

    if let Some(text) = get_text(node) {
        element = element.with_text(text);
    }

    for child in node.children().filter(|n| n.is_element()) {
        element.push_child(convert_node(doc, child));
    }

    element
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Get first child element with given tag name
fn get_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == tag)
}

/// Trimmed text content of a node, `None` when blank
fn get_text(node: Node) -> Option<String> {
    node.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mxsr::elements::MxsrElementKind;

    #[test]
    fn test_parse_simple_musicxml() {
        let xml = r#"<?xml version="1.0"?>
<!DOCTYPE score-partwise PUBLIC "-//Recordare//DTD MusicXML 3.1 Partwise//EN" "http://www.musicxml.org/dtds/partwise.dtd">
<score-partwise>
  <part id="P1">
    <measure number="1">
      <note><pitch><step>C</step><octave>4</octave></pitch></note>
    </measure>
  </part>
</score-partwise>"#;

        let root = parse_mxsr(xml).unwrap();
        assert_eq!(root.kind(), MxsrElementKind::ScorePartwise);

        let part = root.child(MxsrElementKind::Part).unwrap();
        assert_eq!(part.attribute("id"), Some("P1"));
        assert_eq!(part.input_line(), 4);

        let measure = part.child(MxsrElementKind::Measure).unwrap();
        assert_eq!(measure.attribute("number"), Some("1"));
        assert_eq!(measure.text(), None);

        let step = measure
            .child(MxsrElementKind::Note)
            .and_then(|n| n.child(MxsrElementKind::Pitch))
            .and_then(|p| p.child_text(MxsrElementKind::Step));
        assert_eq!(step, Some("C"));
    }

    #[test]
    fn test_rejects_timewise() {
        let xml = r#"<score-timewise><measure number="1"/></score-timewise>"#;
        assert!(matches!(parse_mxsr(xml), Err(ParseError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_rejects_malformed_xml() {
        assert!(matches!(parse_mxsr("<score-partwise>"), Err(ParseError::InvalidXml(_))));
    }

    #[test]
    fn test_rejects_score_without_parts() {
        let xml = r#"<score-partwise><part-list/></score-partwise>"#;
        assert!(matches!(
            parse_mxsr(xml),
            Err(ParseError::MissingRequiredElement(_))
        ));
    }
}
