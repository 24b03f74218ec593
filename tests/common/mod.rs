// Shared MusicXML fixtures for the pipeline tests

#![allow(dead_code)]

/// A partwise document around the given `<part-list>` content and parts
pub fn partwise(header: &str, part_list: &str, parts: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<score-partwise version="4.0">
{}
  <part-list>
{}
  </part-list>
{}
</score-partwise>"#,
        header, part_list, parts
    )
}

pub fn score_part(id: &str, name: &str) -> String {
    format!(r#"<score-part id="{}"><part-name>{}</part-name></score-part>"#, id, name)
}

pub fn part(id: &str, measures: &str) -> String {
    format!(r#"<part id="{}">{}</part>"#, id, measures)
}

/// Divisions 1, C major, 4/4, treble clef
pub fn opening_attributes() -> &'static str {
    r#"<attributes>
        <divisions>1</divisions>
        <key><fifths>0</fifths></key>
        <time><beats>4</beats><beat-type>4</beat-type></time>
        <clef><sign>G</sign><line>2</line></clef>
      </attributes>"#
}

pub fn note(step: &str, octave: u32, duration: u32, note_type: &str) -> String {
    format!(
        r#"<note><pitch><step>{}</step><octave>{}</octave></pitch><duration>{}</duration><voice>1</voice><type>{}</type></note>"#,
        step, octave, duration, note_type
    )
}

/// Flute part: C4 D4 E4 (half), then a measure rest and a final barline
pub fn flute_melody() -> String {
    let measures = format!(
        r#"<measure number="1">{}{}{}{}</measure>
    <measure number="2">
      <note><rest measure="yes"/><duration>4</duration><voice>1</voice></note>
      <barline location="right"><bar-style>light-heavy</bar-style></barline>
    </measure>"#,
        opening_attributes(),
        note("C", 4, 1, "quarter"),
        note("D", 4, 1, "quarter"),
        note("E", 4, 2, "half"),
    );
    partwise(
        r#"<work><work-title>Little Tune</work-title></work>
  <identification><creator type="composer">Anonymous</creator></identification>"#,
        &score_part("P1", "Flute"),
        &part("P1", &measures),
    )
}

/// Two one-measure parts, each holding a whole note
pub fn duet(part_list: &str) -> String {
    let measure = |step: &str| {
        format!(
            r#"<measure number="1">{}{}</measure>"#,
            opening_attributes(),
            note(step, 4, 4, "whole")
        )
    };
    partwise(
        "",
        part_list,
        &format!("{}\n{}", part("P1", &measure("C")), part("P2", &measure("G"))),
    )
}
