//! Error types
//!
//! Defines domain-specific error types for each stage of the depot: storage,
//! upload validation, tabular parsing, and the two composed operations.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Repository (storage) errors
#[derive(Debug)]
pub enum RepositoryError {
    /// Name would escape the repository root or is not a plain file name
    InvalidName(String),
    NotFound(String),
    /// Persisting a file failed; the destination keeps its previous content
    WriteFailed(String, io::Error),
    /// Listing or reading failed
    Io(io::Error),
    /// The repository root could not be created or resolved
    RootUnavailable(PathBuf, io::Error),
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryError::InvalidName(n) => write!(f, "Invalid file name: {}", n),
            RepositoryError::NotFound(n) => write!(f, "File not found: {}", n),
            RepositoryError::WriteFailed(n, e) => write!(f, "Cannot write file {}: {}", n, e),
            RepositoryError::Io(e) => write!(f, "Repository I/O error: {}", e),
            RepositoryError::RootUnavailable(p, e) => {
                write!(f, "Repository root {} unavailable: {}", p.display(), e)
            }
        }
    }
}

impl std::error::Error for RepositoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RepositoryError::WriteFailed(_, e)
            | RepositoryError::Io(e)
            | RepositoryError::RootUnavailable(_, e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for RepositoryError {
    fn from(error: io::Error) -> Self {
        RepositoryError::Io(error)
    }
}

/// Upload validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    TooLarge { size: u64, limit: u64 },
    InvalidType { sniffed: String, declared: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::TooLarge { size, limit } => {
                write!(f, "File too large: {} bytes exceeds {} bytes", size, limit)
            }
            ValidationError::InvalidType { sniffed, declared } => write!(
                f,
                "Invalid file type: content is {} (declared {})",
                sniffed, declared
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// What went wrong while reading delimiter-separated records
#[derive(Debug)]
pub enum ParseErrorKind {
    /// A quoted field was still open at end of input
    UnterminatedQuote,
    /// A quote appeared inside an unquoted field
    BareQuote,
    /// Something other than a delimiter or line break followed a closing quote
    MisplacedQuote,
    InvalidUtf8,
    /// Any other record-level failure reported by the reader
    Malformed(String),
    Read(io::Error),
}

/// Malformed delimiter structure, located by 1-based line number
#[derive(Debug)]
pub struct ParseError {
    pub line: u64,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(line: u64, kind: ParseErrorKind) -> Self {
        Self { line, kind }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ParseErrorKind::UnterminatedQuote => {
                write!(f, "line {}: quoted field is never closed", self.line)
            }
            ParseErrorKind::BareQuote => {
                write!(f, "line {}: bare \" in non-quoted field", self.line)
            }
            ParseErrorKind::MisplacedQuote => {
                write!(f, "line {}: extraneous or missing \" in quoted field", self.line)
            }
            ParseErrorKind::InvalidUtf8 => write!(f, "line {}: invalid UTF-8", self.line),
            ParseErrorKind::Malformed(msg) => write!(f, "line {}: {}", self.line, msg),
            ParseErrorKind::Read(e) => write!(f, "line {}: read failed: {}", self.line, e),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ParseErrorKind::Read(e) => Some(e),
            _ => None,
        }
    }
}

/// Failure of the validate-then-write upload pipeline
#[derive(Debug)]
pub enum IngestError {
    Validation(ValidationError),
    Repository(RepositoryError),
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::Validation(e) => write!(f, "Upload rejected: {}", e),
            IngestError::Repository(e) => write!(f, "Upload failed: {}", e),
        }
    }
}

impl std::error::Error for IngestError {}

impl From<ValidationError> for IngestError {
    fn from(error: ValidationError) -> Self {
        IngestError::Validation(error)
    }
}

impl From<RepositoryError> for IngestError {
    fn from(error: RepositoryError) -> Self {
        IngestError::Repository(error)
    }
}

/// Failure to produce a tabular preview of a stored file
#[derive(Debug)]
pub enum PreviewError {
    Repository(RepositoryError),
    Parse(ParseError),
}

impl fmt::Display for PreviewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreviewError::Repository(e) => write!(f, "Preview unavailable: {}", e),
            PreviewError::Parse(e) => write!(f, "Preview parse error: {}", e),
        }
    }
}

impl std::error::Error for PreviewError {}

impl From<RepositoryError> for PreviewError {
    fn from(error: RepositoryError) -> Self {
        PreviewError::Repository(error)
    }
}

impl From<ParseError> for PreviewError {
    fn from(error: ParseError) -> Self {
        PreviewError::Parse(error)
    }
}

/// General depot error that encompasses all error types
#[derive(Debug)]
pub enum DepotError {
    Repository(RepositoryError),
    Validation(ValidationError),
    Parse(ParseError),
    NetworkError(io::Error),
}

impl fmt::Display for DepotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepotError::Repository(e) => write!(f, "Repository error: {}", e),
            DepotError::Validation(e) => write!(f, "Validation error: {}", e),
            DepotError::Parse(e) => write!(f, "Parse error: {}", e),
            DepotError::NetworkError(e) => write!(f, "Network error: {}", e),
        }
    }
}

impl std::error::Error for DepotError {}

impl From<RepositoryError> for DepotError {
    fn from(error: RepositoryError) -> Self {
        DepotError::Repository(error)
    }
}

impl From<ValidationError> for DepotError {
    fn from(error: ValidationError) -> Self {
        DepotError::Validation(error)
    }
}

impl From<ParseError> for DepotError {
    fn from(error: ParseError) -> Self {
        DepotError::Parse(error)
    }
}

impl From<IngestError> for DepotError {
    fn from(error: IngestError) -> Self {
        match error {
            IngestError::Validation(e) => DepotError::Validation(e),
            IngestError::Repository(e) => DepotError::Repository(e),
        }
    }
}

impl From<PreviewError> for DepotError {
    fn from(error: PreviewError) -> Self {
        match error {
            PreviewError::Repository(e) => DepotError::Repository(e),
            PreviewError::Parse(e) => DepotError::Parse(e),
        }
    }
}
