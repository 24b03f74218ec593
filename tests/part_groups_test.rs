// Part groups, part filtering and their LilyPond contexts

mod common;

use common::{duet, score_part};
use msr_translator::{build_msr, translate_musicxml_to_lilypond, ExitCode, TranslationSettings};

fn grouped(symbol: &str, barline: &str) -> String {
    duet(&format!(
        r#"<part-group type="start" number="1"><group-name>Winds</group-name><group-symbol>{}</group-symbol><group-barline>{}</group-barline></part-group>
    {}{}
    <part-group type="stop" number="1"/>"#,
        symbol,
        barline,
        score_part("P1", "Oboe"),
        score_part("P2", "Horn"),
    ))
}

#[test]
fn test_bracket_group_becomes_staff_group() {
    let output = translate_musicxml_to_lilypond(&grouped("bracket", "yes"), &TranslationSettings::default())
        .unwrap()
        .output;

    assert!(
        output.contains("\\new StaffGroup \\with { instrumentName = \"Winds\" } <<"),
        "group not found:\n{}",
        output
    );
    assert!(output.contains("\\new Staff = \"Part_POne_Staff_One\""));
    assert!(output.contains("\\new Staff = \"Part_PTwo_Staff_One\""));
}

#[test]
fn test_group_layouts() {
    let cases = [
        ("brace", "yes", "\\new PianoStaff"),
        ("bracket", "no", "\\new ChoirStaff"),
        ("square", "yes", "systemStartDelimiter = #'SystemStartSquare"),
        ("line", "yes", "systemStartDelimiter = #'SystemStartBar"),
    ];
    for (symbol, barline, expected) in cases {
        let output = translate_musicxml_to_lilypond(&grouped(symbol, barline), &TranslationSettings::default())
            .unwrap()
            .output;
        assert!(output.contains(expected), "{} / {}: missing {}\n{}", symbol, barline, expected, output);
    }
}

#[test]
fn test_kept_parts_filter() {
    let settings = TranslationSettings {
        kept_part_ids: vec!["P2".to_string()],
        ..TranslationSettings::default()
    };
    let result = translate_musicxml_to_lilypond(&grouped("bracket", "yes"), &settings).unwrap();

    assert!(!result.output.contains("Part_POne"));
    assert!(result.output.contains("Part_PTwo_Staff_One_Voice_One"));
    assert!(result.diagnostics.has_kind("part_removed"));
}

#[test]
fn test_group_emptied_by_filter_is_dropped() {
    let settings = TranslationSettings {
        ignored_part_ids: vec!["P1".to_string(), "P2".to_string()],
        ..TranslationSettings::default()
    };
    let output = translate_musicxml_to_lilypond(&grouped("bracket", "yes"), &settings)
        .unwrap()
        .output;

    assert!(!output.contains("StaffGroup"));
    assert!(!output.contains("\\new Staff"));
}

#[test]
fn test_unclosed_group_is_closed_with_a_warning() {
    let musicxml = duet(&format!(
        r#"<part-group type="start" number="1"><group-symbol>bracket</group-symbol></part-group>{}{}"#,
        score_part("P1", "Oboe"),
        score_part("P2", "Horn"),
    ));
    let (score, diagnostics) = build_msr(&musicxml, &TranslationSettings::default()).unwrap();

    assert!(diagnostics.has_kind("part_group_not_stopped"));
    assert_eq!(score.parts().len(), 2);
}

#[test]
fn test_overlapping_groups_are_rejected() {
    let musicxml = duet(&format!(
        r#"<part-group type="start" number="1"/>{}
    <part-group type="start" number="2"/>{}
    <part-group type="stop" number="1"/>
    <part-group type="stop" number="2"/>"#,
        score_part("P1", "Oboe"),
        score_part("P2", "Horn"),
    ));
    let error = build_msr(&musicxml, &TranslationSettings::default()).unwrap_err();

    assert_eq!(error.exit_code(), ExitCode::OverlappingPartGroups);
    assert!(error.location().is_some());
}

#[test]
fn test_part_declared_twice_is_kept_once() {
    let musicxml = duet(&format!(
        r#"<part-group type="start" number="1"><group-symbol>bracket</group-symbol></part-group>{}
    <part-group type="stop" number="1"/>{}{}"#,
        score_part("P1", "Oboe"),
        score_part("P1", "Oboe again"),
        score_part("P2", "Horn"),
    ));
    let (score, diagnostics) = build_msr(&musicxml, &TranslationSettings::default()).unwrap();

    let ids: Vec<String> = score.parts().iter().map(|part| part.id().to_string()).collect();
    assert_eq!(ids, ["P1", "P2"]);
    assert_eq!(score.fetch_part("P1").map(|part| part.name()), Some("Oboe"));
    assert!(diagnostics.has_kind("duplicate_part_id"));
}
