//! Diagnostics produced while parsing and cross-checking sync tags.

use serde::{Deserialize, Serialize};

/// Every problem the engine can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    MalformedStartTag,
    MalformedEndTag,
    EndTagWithoutStartTag,
    StartTagWithoutEndTag,
    DuplicateMarker,
    EmptyMarker,
    SelfTargeting,
    StartTagAfterContent,
    DifferentCommentSyntax,
    CouldNotParse,
    MismatchedChecksum,
    DuplicateTarget,
    FileDoesNotExist,
    NoReturnTag,
    PendingMigration,
}

impl ErrorCode {
    /// The wire name, as used in JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedStartTag => "malformedStartTag",
            Self::MalformedEndTag => "malformedEndTag",
            Self::EndTagWithoutStartTag => "endTagWithoutStartTag",
            Self::StartTagWithoutEndTag => "startTagWithoutEndTag",
            Self::DuplicateMarker => "duplicateMarker",
            Self::EmptyMarker => "emptyMarker",
            Self::SelfTargeting => "selfTargeting",
            Self::StartTagAfterContent => "startTagAfterContent",
            Self::DifferentCommentSyntax => "differentCommentSyntax",
            Self::CouldNotParse => "couldNotParse",
            Self::MismatchedChecksum => "mismatchedChecksum",
            Self::DuplicateTarget => "duplicateTarget",
            Self::FileDoesNotExist => "fileDoesNotExist",
            Self::NoReturnTag => "noReturnTag",
            Self::PendingMigration => "pendingMigration",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Position of a diagnostic. Lines and columns are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub line: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_column: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_column: Option<usize>,
}

impl Location {
    pub fn line(line: usize) -> Self {
        Self {
            line,
            start_column: None,
            end_column: None,
        }
    }

    pub fn span(line: usize, start_column: usize, end_column: usize) -> Self {
        Self {
            line,
            start_column: Some(start_column),
            end_column: Some(end_column),
        }
    }
}

/// A concrete textual repair for one declaration line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FixAction {
    /// Drop the line entirely.
    Delete {
        line: usize,
        description: String,
        declaration: String,
    },
    /// Replace the line with `text`, keeping its terminator.
    Replace {
        line: usize,
        text: String,
        description: String,
        declaration: String,
    },
}

impl FixAction {
    pub fn line(&self) -> usize {
        match self {
            Self::Delete { line, .. } | Self::Replace { line, .. } => *line,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::Delete { description, .. } | Self::Replace { description, .. } => description,
        }
    }

    /// The original line text this fix applies to.
    pub fn declaration(&self) -> &str {
        match self {
            Self::Delete { declaration, .. } | Self::Replace { declaration, .. } => declaration,
        }
    }
}

/// One reported problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    #[serde(rename = "markerID")]
    pub marker_id: Option<String>,
    pub reason: String,
    pub code: ErrorCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<FixAction>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, marker_id: Option<&str>, reason: impl Into<String>) -> Self {
        Self {
            marker_id: marker_id.map(str::to_string),
            reason: reason.into(),
            code,
            location: None,
            fix: None,
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_fix(mut self, fix: FixAction) -> Self {
        self.fix = Some(fix);
        self
    }

    pub fn line(&self) -> Option<usize> {
        self.location.map(|l| l.line)
    }

    pub fn is_fixable(&self) -> bool {
        self.fix.is_some()
    }
}
