// End-to-end MusicXML to LilyPond translation

mod common;

use common::{duet, flute_melody, note, opening_attributes, part, partwise, score_part};
use msr_translator::settings::{OctaveEntry, PitchLanguage};
use msr_translator::{translate_musicxml_to_lilypond, TranslationSettings};

fn lilypond(musicxml: &str, settings: &TranslationSettings) -> String {
    translate_musicxml_to_lilypond(musicxml, settings)
        .expect("translation should succeed")
        .output
}

#[test]
fn test_simple_melody_document() {
    let output = lilypond(&flute_melody(), &TranslationSettings::default());

    assert!(output.starts_with("\\version \"2.24.0\"\n\\language \"nederlands\"\n"));
    assert!(output.contains("  title = \"Little Tune\"\n"), "header title missing:\n{}", output);
    assert!(output.contains("  composer = \"Anonymous\"\n"));
    assert!(output.contains("Part_POne_Staff_One_Voice_One = \\absolute {\n"));
    assert!(
        output.contains("  \\clef treble \\key c \\major \\numericTimeSignature \\time 4/4 c'4 d'4 e'2 |\n"),
        "first measure not found:\n{}",
        output
    );
    assert!(output.contains("  R1 \\bar \"|.\" |\n"), "final measure not found:\n{}", output);
    assert!(output.contains("\\new Staff = \"Part_POne_Staff_One\" \\with { instrumentName = \"Flute\" } <<"));
    assert!(output.contains(
        "\\context Voice = \"Part_POne_Voice_One\" { \\Part_POne_Staff_One_Voice_One }"
    ));
    assert!(output.contains("\\accidentalStyle default"));
}

#[test]
fn test_relative_entry_and_language() {
    let settings = TranslationSettings {
        octave_entry: OctaveEntry::Relative,
        pitch_language: PitchLanguage::English,
        generate_bar_checks: false,
        ..TranslationSettings::default()
    };
    let output = lilypond(&flute_melody(), &settings);

    assert!(output.contains("\\language \"english\""));
    assert!(output.contains("Part_POne_Staff_One_Voice_One = \\relative c' {\n"));
    assert!(output.contains(" c4 d4 e2\n"), "relative pitches not found:\n{}", output);
    assert!(!output.contains(" |\n"));
}

#[test]
fn test_measure_comments() {
    let settings = TranslationSettings {
        generate_measure_comments: true,
        ..TranslationSettings::default()
    };
    let output = lilypond(&flute_melody(), &settings);

    assert!(output.contains("  % measure 1\n  \\clef treble"));
    assert!(output.contains("  % measure 2\n  R1"));
}

#[test]
fn test_score_without_identification_has_no_header() {
    let musicxml = duet(&format!("{}{}", score_part("P1", "Oboe"), score_part("P2", "Horn")));
    let output = lilypond(&musicxml, &TranslationSettings::default());

    assert!(!output.contains("\\header"));
    assert!(output.contains("c'1 |"));
    assert!(output.contains("g'1 |"));
    assert!(output.contains("instrumentName = \"Horn\""));
}

#[test]
fn test_double_tremolo() {
    let tremolo_note = |step: &str, kind: &str| {
        format!(
            r#"<note><pitch><step>{}</step><octave>4</octave></pitch><duration>2</duration><voice>1</voice><type>half</type><notations><ornaments><tremolo type="{}">2</tremolo></ornaments></notations></note>"#,
            step, kind
        )
    };
    let measure = format!(
        r#"<measure number="1">{}{}{}</measure>"#,
        opening_attributes(),
        tremolo_note("C", "start"),
        tremolo_note("E", "stop"),
    );
    let musicxml = partwise("", &score_part("P1", "Violin"), &part("P1", &measure));
    let output = lilypond(&musicxml, &TranslationSettings::default());

    assert!(
        output.contains("\\repeat tremolo 8 { c'16 e'16 } |"),
        "tremolo not found:\n{}",
        output
    );
}

#[test]
fn test_anacrusis_gets_partial() {
    let measures = format!(
        r#"<measure number="0" implicit="yes">{}{}</measure>
    <measure number="1">{}</measure>"#,
        opening_attributes(),
        note("G", 4, 1, "quarter"),
        note("C", 5, 4, "whole"),
    );
    let musicxml = partwise("", &score_part("P1", "Voice"), &part("P1", &measures));
    let output = lilypond(&musicxml, &TranslationSettings::default());

    assert!(output.contains("\\partial 4 "), "partial not found:\n{}", output);
    assert!(output.contains("g'4 |"));
    assert!(output.contains("  c''1 |\n"));
}
