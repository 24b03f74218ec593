// End-to-end MusicXML to braille translation

mod common;

use common::{duet, flute_melody, score_part};
use msr_translator::settings::BrailleOutputKind;
use msr_translator::{translate_musicxml_to_braille, TranslationSettings};

fn ascii_settings() -> TranslationSettings {
    TranslationSettings {
        braille_output_kind: BrailleOutputKind::Ascii,
        ..TranslationSettings::default()
    }
}

fn braille(musicxml: &str, settings: &TranslationSettings) -> String {
    translate_musicxml_to_braille(musicxml, settings)
        .expect("translation should succeed")
        .output
}

#[test]
fn test_simple_melody_in_braille_ascii() {
    let output = braille(&flute_melody(), &ascii_settings());

    // clef, time 4/4, octave 4 mark, C D quarters, E half, whole rest, final bar
    assert_eq!(output, "            ,FLUTE\n>/L#D4\"?:P M<K\n");
}

#[test]
fn test_unicode_output_keeps_heading_padding() {
    let output = braille(&flute_melody(), &TranslationSettings::default());
    let lines: Vec<&str> = output.lines().collect();

    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with(&"\u{2800}".repeat(12)));
    assert!(lines[1].chars().all(|c| ('\u{2800}'..='\u{283F}').contains(&c)));
    // G clef: dots 345 34 123
    assert!(lines[1].starts_with("\u{281C}\u{280C}\u{2807}"));
}

#[test]
fn test_headings_can_be_disabled() {
    let settings = TranslationSettings {
        generate_part_headings: false,
        ..ascii_settings()
    };
    let output = braille(&flute_melody(), &settings);

    assert_eq!(output, ">/L#D4\"?:P M<K\n");
}

#[test]
fn test_each_part_starts_a_section() {
    let musicxml = duet(&format!("{}{}", score_part("P1", "Oboe"), score_part("P2", "Horn")));
    let output = braille(&musicxml, &ascii_settings());
    let lines: Vec<&str> = output.lines().map(str::trim_start).collect();

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], ",OBOE");
    assert_eq!(lines[2], ",HORN");
    // whole notes C (dots 13456) and G (dots 12356) after the octave 4 mark
    assert!(lines[1].ends_with("\"Y"));
    assert!(lines[3].ends_with("\"("));
}

#[test]
fn test_pages_break_on_lines_per_page() {
    let musicxml = duet(&format!("{}{}", score_part("P1", "Oboe"), score_part("P2", "Horn")));
    let settings = TranslationSettings {
        lines_per_page: 2,
        ..ascii_settings()
    };
    let output = braille(&musicxml, &settings);

    assert_eq!(output.matches('\u{000C}').count(), 1);
}
