//! Error types for the translation pipeline
//!
//! Three families, all fatal for the current run:
//! - [`ParseError`]: the MusicXML text could not be turned into an element tree
//! - [`MusicXmlError`]: well-formed but non-conforming musical input
//! - [`InternalError`]: a tree invariant was violated by an earlier pass
//!
//! Each cause maps to its own [`ExitCode`] so that a front end can terminate
//! with a distinguishing status.

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use std::fmt;
use thiserror::Error;

/// Input source name and line, carried by every diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub input_source_name: String,
    pub input_line: usize,
}

impl SourceLocation {
    pub fn new(input_source_name: impl Into<String>, input_line: usize) -> Self {
        Self {
            input_source_name: input_source_name.into(),
            input_line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.input_source_name, self.input_line)
    }
}

/// Process exit codes, one per error cause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum ExitCode {
    InvalidXml = 2,
    UnsupportedFormat = 3,
    MissingRequiredElement = 4,
    UnknownPitchStep = 10,
    InvalidOctave = 11,
    InvalidNumber = 12,
    InvalidDuration = 13,
    IllFormedChord = 14,
    UnknownNoteType = 15,
    PartNotInPartList = 16,
    PartGroupNotStarted = 17,
    OverlappingPartGroups = 18,
    DoubleTremoloWithoutStop = 19,
    DoubleTremoloWithoutStart = 20,
    NonPositiveDivisions = 21,
    InvalidTremoloMarks = 22,
    TremoloRepeatsNotInteger = 40,
    TremoloMembersDisagree = 41,
    TremoloMemberKindMismatch = 42,
    PartNotFound = 43,
    VoiceNotInSkeleton = 44,
    NonPositiveWholeNotes = 45,
    Internal = 49,
}

/// Top-level error of a translation run
#[derive(Debug, Clone, Error)]
pub enum TranslationError {
    /// Fatal XML parsing error
    #[error("XML parsing failed: {0}")]
    Parse(#[from] ParseError),

    /// Non-conforming musical input
    #[error("MusicXML error: {0}")]
    MusicXml(#[from] MusicXmlError),

    /// Tree invariant violation, indicates a bug in an earlier pass
    #[error("internal error: {0}")]
    Internal(#[from] InternalError),
}

impl TranslationError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            TranslationError::Parse(e) => e.exit_code(),
            TranslationError::MusicXml(e) => e.exit_code(),
            TranslationError::Internal(e) => e.exit_code(),
        }
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            TranslationError::Parse(_) => None,
            TranslationError::MusicXml(e) => Some(e.location()),
            TranslationError::Internal(e) => Some(e.location()),
        }
    }
}

/// Fatal XML parsing errors
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    /// XML is malformed (not well-formed)
    #[error("Invalid XML: {0}")]
    InvalidXml(String),

    /// MusicXML format not supported (e.g., timewise instead of partwise)
    #[error("Unsupported MusicXML format: {0}")]
    UnsupportedFormat(String),

    /// Required structural element is missing
    #[error("Missing required element: {0}")]
    MissingRequiredElement(String),
}

impl ParseError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            ParseError::InvalidXml(_) => ExitCode::InvalidXml,
            ParseError::UnsupportedFormat(_) => ExitCode::UnsupportedFormat,
            ParseError::MissingRequiredElement(_) => ExitCode::MissingRequiredElement,
        }
    }
}

/// User-facing errors about the musical content
#[derive(Debug, Clone, Error)]
pub enum MusicXmlError {
    #[error("{location}: unknown pitch step '{step}'")]
    UnknownPitchStep { location: SourceLocation, step: String },

    #[error("{location}: invalid octave '{octave}'")]
    InvalidOctave { location: SourceLocation, octave: String },

    #[error("{location}: <{element}> value '{value}' is not a valid number")]
    InvalidNumber {
        location: SourceLocation,
        element: String,
        value: String,
    },

    #[error("{location}: invalid duration: {reason}")]
    InvalidDuration { location: SourceLocation, reason: String },

    #[error("{location}: chord note without a preceding note in voice {voice}")]
    IllFormedChord { location: SourceLocation, voice: u32 },

    #[error("{location}: unknown note type '{note_type}'")]
    UnknownNoteType { location: SourceLocation, note_type: String },

    #[error("{location}: part '{part_id}' is not declared in <part-list>")]
    PartNotInPartList { location: SourceLocation, part_id: String },

    #[error("{location}: part group {number} stopped but never started")]
    PartGroupNotStarted { location: SourceLocation, number: u32 },

    #[error("{location}: part group {stopped} stopped while part group {innermost} is still open")]
    OverlappingPartGroups {
        location: SourceLocation,
        stopped: u32,
        innermost: u32,
    },

    #[error("{location}: double tremolo started but never stopped in voice {voice}")]
    DoubleTremoloWithoutStop { location: SourceLocation, voice: u32 },

    #[error("{location}: double tremolo stop without a start in voice {voice}")]
    DoubleTremoloWithoutStart { location: SourceLocation, voice: u32 },

    #[error("{location}: divisions must be a positive count, found '{value}'")]
    NonPositiveDivisions { location: SourceLocation, value: String },

    #[error("{location}: tremolo marks must be between 0 and 8, found {marks}")]
    InvalidTremoloMarks { location: SourceLocation, marks: u32 },
}

impl MusicXmlError {
    pub fn location(&self) -> &SourceLocation {
        match self {
            MusicXmlError::UnknownPitchStep { location, .. }
            | MusicXmlError::InvalidOctave { location, .. }
            | MusicXmlError::InvalidNumber { location, .. }
            | MusicXmlError::InvalidDuration { location, .. }
            | MusicXmlError::IllFormedChord { location, .. }
            | MusicXmlError::UnknownNoteType { location, .. }
            | MusicXmlError::PartNotInPartList { location, .. }
            | MusicXmlError::PartGroupNotStarted { location, .. }
            | MusicXmlError::OverlappingPartGroups { location, .. }
            | MusicXmlError::DoubleTremoloWithoutStop { location, .. }
            | MusicXmlError::DoubleTremoloWithoutStart { location, .. }
            | MusicXmlError::NonPositiveDivisions { location, .. }
            | MusicXmlError::InvalidTremoloMarks { location, .. } => location,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        match self {
            MusicXmlError::UnknownPitchStep { .. } => ExitCode::UnknownPitchStep,
            MusicXmlError::InvalidOctave { .. } => ExitCode::InvalidOctave,
            MusicXmlError::InvalidNumber { .. } => ExitCode::InvalidNumber,
            MusicXmlError::InvalidDuration { .. } => ExitCode::InvalidDuration,
            MusicXmlError::IllFormedChord { .. } => ExitCode::IllFormedChord,
            MusicXmlError::UnknownNoteType { .. } => ExitCode::UnknownNoteType,
            MusicXmlError::PartNotInPartList { .. } => ExitCode::PartNotInPartList,
            MusicXmlError::PartGroupNotStarted { .. } => ExitCode::PartGroupNotStarted,
            MusicXmlError::OverlappingPartGroups { .. } => ExitCode::OverlappingPartGroups,
            MusicXmlError::DoubleTremoloWithoutStop { .. } => ExitCode::DoubleTremoloWithoutStop,
            MusicXmlError::DoubleTremoloWithoutStart { .. } => ExitCode::DoubleTremoloWithoutStart,
            MusicXmlError::NonPositiveDivisions { .. } => ExitCode::NonPositiveDivisions,
            MusicXmlError::InvalidTremoloMarks { .. } => ExitCode::InvalidTremoloMarks,
        }
    }
}

/// Tree invariant violations. Never downgraded to warnings.
#[derive(Debug, Clone, Error)]
pub enum InternalError {
    #[error("{location}: double tremolo number of repeats {repeats} is not an integer (sounding {sounding}, elements duration {elements_duration})")]
    TremoloRepeatsNotInteger {
        location: SourceLocation,
        repeats: String,
        sounding: String,
        elements_duration: String,
    },

    #[error("{location}: double tremolo second element lasts {second}, first element lasts {first}")]
    TremoloMembersDisagree {
        location: SourceLocation,
        first: String,
        second: String,
    },

    #[error("{location}: a {member} cannot be a member of a {tremolo} double tremolo")]
    TremoloMemberKindMismatch {
        location: SourceLocation,
        member: String,
        tremolo: String,
    },

    #[error("{location}: part '{part_id}' not found in part group {part_group}")]
    PartNotFound {
        location: SourceLocation,
        part_id: String,
        part_group: String,
    },

    #[error("{location}: voice {voice} of part '{part_id}' is missing from the skeleton")]
    VoiceNotInSkeleton {
        location: SourceLocation,
        part_id: String,
        voice: u32,
    },

    #[error("{location}: whole notes {whole_notes} must be positive")]
    NonPositiveWholeNotes {
        location: SourceLocation,
        whole_notes: String,
    },

    #[error("{location}: {message}")]
    Generic { location: SourceLocation, message: String },
}

impl InternalError {
    pub fn location(&self) -> &SourceLocation {
        match self {
            InternalError::TremoloRepeatsNotInteger { location, .. }
            | InternalError::TremoloMembersDisagree { location, .. }
            | InternalError::TremoloMemberKindMismatch { location, .. }
            | InternalError::PartNotFound { location, .. }
            | InternalError::VoiceNotInSkeleton { location, .. }
            | InternalError::NonPositiveWholeNotes { location, .. }
            | InternalError::Generic { location, .. } => location,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        match self {
            InternalError::TremoloRepeatsNotInteger { .. } => ExitCode::TremoloRepeatsNotInteger,
            InternalError::TremoloMembersDisagree { .. } => ExitCode::TremoloMembersDisagree,
            InternalError::TremoloMemberKindMismatch { .. } => ExitCode::TremoloMemberKindMismatch,
            InternalError::PartNotFound { .. } => ExitCode::PartNotFound,
            InternalError::VoiceNotInSkeleton { .. } => ExitCode::VoiceNotInSkeleton,
            InternalError::NonPositiveWholeNotes { .. } => ExitCode::NonPositiveWholeNotes,
            InternalError::Generic { .. } => ExitCode::Internal,
        }
    }
}
