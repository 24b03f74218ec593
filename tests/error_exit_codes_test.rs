// Fatal errors and the exit codes they map to

mod common;

use common::{note, opening_attributes, part, partwise, score_part};
use msr_translator::{
    translate_musicxml_to_braille, translate_musicxml_to_lilypond, ExitCode, TranslationError,
    TranslationSettings,
};

fn lilypond_error(musicxml: &str) -> TranslationError {
    translate_musicxml_to_lilypond(musicxml, &TranslationSettings::default())
        .expect_err("translation should fail")
}

#[test]
fn test_malformed_xml() {
    let error = lilypond_error("<score-partwise><part-list>");
    assert_eq!(error.exit_code(), ExitCode::InvalidXml);
    assert!(error.location().is_none());
}

#[test]
fn test_timewise_is_unsupported() {
    let error = lilypond_error(r#"<?xml version="1.0"?><score-timewise version="4.0"></score-timewise>"#);
    assert_eq!(error.exit_code(), ExitCode::UnsupportedFormat);
}

#[test]
fn test_part_missing_from_part_list() {
    let musicxml = partwise(
        "",
        &score_part("P1", "Flute"),
        &part("P9", &format!(r#"<measure number="1">{}</measure>"#, note("C", 4, 4, "whole"))),
    );
    let error = lilypond_error(&musicxml);
    assert_eq!(error.exit_code(), ExitCode::PartNotInPartList);
    assert!(error.to_string().contains("P9"));
}

#[test]
fn test_unknown_pitch_step_reports_its_line() {
    let musicxml = partwise(
        "",
        &score_part("P1", "Flute"),
        &part(
            "P1",
            &format!(r#"<measure number="1">{}{}</measure>"#, opening_attributes(), note("H", 4, 4, "whole")),
        ),
    );
    let settings = TranslationSettings {
        input_source_name: "tune.xml".to_string(),
        ..TranslationSettings::default()
    };
    let error = translate_musicxml_to_braille(&musicxml, &settings).expect_err("translation should fail");

    assert_eq!(error.exit_code(), ExitCode::UnknownPitchStep);
    let location = error.location().expect("music errors carry a location");
    assert_eq!(location.input_source_name, "tune.xml");
    assert!(location.input_line > 0);
}

#[test]
fn test_tremolo_stop_without_start() {
    let musicxml = partwise(
        "",
        &score_part("P1", "Violin"),
        &part(
            "P1",
            r#"<measure number="1"><attributes><divisions>1</divisions></attributes>
      <note><pitch><step>C</step><octave>4</octave></pitch><duration>2</duration><voice>1</voice><type>half</type>
        <notations><ornaments><tremolo type="stop">2</tremolo></ornaments></notations></note>
    </measure>"#,
        ),
    );
    assert_eq!(lilypond_error(&musicxml).exit_code(), ExitCode::DoubleTremoloWithoutStart);
}

#[test]
fn test_exit_codes_serialize_as_numbers() {
    assert_eq!(serde_json::to_string(&ExitCode::InvalidXml).unwrap(), "2");
    assert_eq!(serde_json::to_string(&ExitCode::OverlappingPartGroups).unwrap(), "18");
}

#[test]
fn test_zero_duration_note_is_blamed_on_the_input() {
    let musicxml = partwise(
        "",
        &score_part("P1", "Flute"),
        &part(
            "P1",
            &format!(r#"<measure number="1">{}{}</measure>"#, opening_attributes(), note("C", 4, 0, "quarter")),
        ),
    );
    let error = lilypond_error(&musicxml);
    assert_eq!(error.exit_code(), ExitCode::InvalidDuration);
    assert!(matches!(error, TranslationError::MusicXml(_)));
}

#[test]
fn test_tremolo_marks_beyond_eight_are_rejected() {
    let musicxml = partwise(
        "",
        &score_part("P1", "Violin"),
        &part(
            "P1",
            r#"<measure number="1"><attributes><divisions>1</divisions></attributes>
      <note><pitch><step>C</step><octave>4</octave></pitch><duration>2</duration><voice>1</voice><type>half</type>
        <notations><ornaments><tremolo type="start">70</tremolo></ornaments></notations></note>
      <note><pitch><step>E</step><octave>4</octave></pitch><duration>2</duration><voice>1</voice><type>half</type>
        <notations><ornaments><tremolo type="stop">70</tremolo></ornaments></notations></note>
    </measure>"#,
        ),
    );
    let error = lilypond_error(&musicxml);
    assert_eq!(error.exit_code(), ExitCode::InvalidTremoloMarks);
    assert!(error.location().is_some());
}
