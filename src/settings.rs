//! Translation settings
//!
//! A flat configuration value handed to every pass constructor. Passes only
//! read it. Settings can be deserialized from YAML or JSON (missing fields
//! take their defaults) or built in code.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors while loading settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid YAML settings: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration options for a translation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationSettings {
    /// Name used in diagnostics ("-" for standard input)
    pub input_source_name: String,

    /// Suppress warning logs (diagnostics are still collected)
    pub quiet: bool,

    /// Log every visitor callback at debug level
    pub trace_passes: bool,

    /// Parts removed from the score after MSR construction
    pub ignored_part_ids: Vec<String>,

    /// When not empty, only these parts are kept
    pub kept_part_ids: Vec<String>,

    /// Target LilyPond version (e.g., "2.24.0")
    pub target_lilypond_version: String,

    /// Note name language
    pub pitch_language: PitchLanguage,

    /// How octaves are written in LilyPond
    pub octave_entry: OctaveEntry,

    /// LilyPond accidental style
    pub accidental_style: AccidentalStyle,

    /// Emit `|` bar checks at measure ends
    pub generate_bar_checks: bool,

    /// Emit `% measure N` comments before measures
    pub generate_measure_comments: bool,

    /// Braille line width in cells
    pub cells_per_line: usize,

    /// Braille page height in lines
    pub lines_per_page: usize,

    /// Braille characters emitted by the text stage
    pub braille_output_kind: BrailleOutputKind,

    /// Start each part with its name in braille
    pub generate_part_headings: bool,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            input_source_name: "-".to_string(),
            quiet: false,
            trace_passes: false,
            ignored_part_ids: Vec::new(),
            kept_part_ids: Vec::new(),
            target_lilypond_version: "2.24.0".to_string(),
            pitch_language: PitchLanguage::Nederlands,
            octave_entry: OctaveEntry::Absolute,
            accidental_style: AccidentalStyle::Default,
            generate_bar_checks: true,
            generate_measure_comments: false,
            cells_per_line: 30,
            lines_per_page: 27,
            braille_output_kind: BrailleOutputKind::Unicode,
            generate_part_headings: true,
        }
    }
}

impl TranslationSettings {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SettingsError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a `.json` file, anything else is read as YAML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_yaml_str(&text),
        }
    }

    /// Whether a part survives the ignore/keep filters
    pub fn keeps_part(&self, part_id: &str) -> bool {
        if self.ignored_part_ids.iter().any(|id| id == part_id) {
            return false;
        }
        self.kept_part_ids.is_empty() || self.kept_part_ids.iter().any(|id| id == part_id)
    }
}

/// Note naming language for LilyPond output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PitchLanguage {
    /// Dutch: c d e f g a b (cis/ees for sharps/flats) - LilyPond default
    Nederlands,

    /// English: c d e f g a b (cs/ef for sharps/flats)
    English,

    /// German: c d e f g a h (cis/es for sharps/flats)
    Deutsch,

    /// Italian: do re mi fa sol la si (dod/mib for sharps/flats)
    Italiano,

    /// Spanish: do re mi fa sol la si (dos/mib for sharps/flats)
    Espanol,
}

impl PitchLanguage {
    /// Name used in the `\language` directive
    pub fn lilypond_name(&self) -> &'static str {
        match self {
            PitchLanguage::Nederlands => "nederlands",
            PitchLanguage::English => "english",
            PitchLanguage::Deutsch => "deutsch",
            PitchLanguage::Italiano => "italiano",
            PitchLanguage::Espanol => "espanol",
        }
    }
}

/// LilyPond octave entry mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OctaveEntry {
    /// Octave marks relative to c (octave 3)
    Absolute,
    /// Octave marks relative to the previous note, starting from c'
    Relative,
    /// Octave marks relative to c' (octave 4)
    Fixed,
}

/// LilyPond `\accidentalStyle` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccidentalStyle {
    Default,
    Voice,
    Modern,
    ModernCautionary,
    Piano,
    Dodecaphonic,
    NeoModern,
    Forget,
}

impl AccidentalStyle {
    pub fn lilypond_name(&self) -> &'static str {
        match self {
            AccidentalStyle::Default => "default",
            AccidentalStyle::Voice => "voice",
            AccidentalStyle::Modern => "modern",
            AccidentalStyle::ModernCautionary => "modern-cautionary",
            AccidentalStyle::Piano => "piano",
            AccidentalStyle::Dodecaphonic => "dodecaphonic",
            AccidentalStyle::NeoModern => "neo-modern",
            AccidentalStyle::Forget => "forget",
        }
    }
}

/// Character set for braille text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrailleOutputKind {
    /// Unicode braille patterns (U+2800..U+283F)
    Unicode,
    /// North American Braille ASCII
    Ascii,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_overrides_only_given_fields() {
        let settings = TranslationSettings::from_yaml_str(
            "pitch_language: english\noctave_entry: relative\ncells_per_line: 40\n",
        )
        .unwrap();
        assert_eq!(settings.pitch_language, PitchLanguage::English);
        assert_eq!(settings.octave_entry, OctaveEntry::Relative);
        assert_eq!(settings.cells_per_line, 40);
        assert_eq!(settings.lines_per_page, 27);
        assert_eq!(settings.target_lilypond_version, "2.24.0");
    }

    #[test]
    fn test_accidental_style_kebab_case() {
        let settings =
            TranslationSettings::from_json_str(r#"{"accidental_style": "modern-cautionary"}"#)
                .unwrap();
        assert_eq!(settings.accidental_style, AccidentalStyle::ModernCautionary);
        assert_eq!(settings.accidental_style.lilypond_name(), "modern-cautionary");
    }

    #[test]
    fn test_part_filters() {
        let mut settings = TranslationSettings::default();
        assert!(settings.keeps_part("P1"));

        settings.ignored_part_ids = vec!["P2".to_string()];
        assert!(settings.keeps_part("P1"));
        assert!(!settings.keeps_part("P2"));

        settings.kept_part_ids = vec!["P3".to_string()];
        assert!(!settings.keeps_part("P1"));
        assert!(settings.keeps_part("P3"));
    }
}
