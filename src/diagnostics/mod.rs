//! Diagnostics collected while translating
//!
//! Recoverable conditions (duplicate part IDs, unsupported elements, open
//! tuplets at a measure end...) are reported here instead of aborting the
//! run. Every mark keeps the input source name and line it came from.

use crate::errors::SourceLocation;
use serde::{Deserialize, Serialize};

/// Severity level for diagnostic marks
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Warning,
    Info,
}

/// A diagnostic anchored to an input location
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DiagnosticMark {
    pub location: SourceLocation,
    pub severity: DiagnosticSeverity,
    /// Kind identifier (e.g., "duplicate_part_id", "skipped_element")
    pub kind: String,
    /// Human-readable message
    pub message: String,
}

impl DiagnosticMark {
    pub fn new(
        location: SourceLocation,
        severity: DiagnosticSeverity,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            location,
            severity,
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Sink for the marks of one translation run
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Diagnostics {
    pub marks: Vec<DiagnosticMark>,
    #[serde(skip)]
    quiet: bool,
}

impl Diagnostics {
    pub fn new(quiet: bool) -> Self {
        Self {
            marks: Vec::new(),
            quiet,
        }
    }

    /// Record a warning and log it unless quiet
    pub fn warn(
        &mut self,
        location: SourceLocation,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) {
        let mark = DiagnosticMark::new(location, DiagnosticSeverity::Warning, kind, message);
        if !self.quiet {
            log::warn!("{}: {}", mark.location, mark.message);
        }
        self.marks.push(mark);
    }

    pub fn info(
        &mut self,
        location: SourceLocation,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) {
        let mark = DiagnosticMark::new(location, DiagnosticSeverity::Info, kind, message);
        if !self.quiet {
            log::info!("{}: {}", mark.location, mark.message);
        }
        self.marks.push(mark);
    }

    pub fn extend(&mut self, marks: impl IntoIterator<Item = DiagnosticMark>) {
        self.marks.extend(marks);
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticMark> {
        self.marks
            .iter()
            .filter(|m| m.severity == DiagnosticSeverity::Warning)
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }

    pub fn has_kind(&self, kind: &str) -> bool {
        self.marks.iter().any(|m| m.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}
