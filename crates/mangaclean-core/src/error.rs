//! Error and warning types for mangaclean.
//!
//! Provides [`CleanError`] for fatal errors that stop processing of one
//! document, [`ScanWarning`] for non-fatal issues that allow best-effort
//! continuation, and [`Scanned`] for pairing a value with the warnings
//! collected while producing it.

use std::fmt;

/// Fatal error types for document processing.
///
/// A `CleanError` aborts the current document only. Batch processing
/// records it against the file and moves on to the next input.
#[derive(Debug, Clone, PartialEq)]
pub enum CleanError {
    /// Error parsing PDF structure or syntax.
    Parse(String),
    /// I/O error reading input or writing output.
    Io(String),
    /// The EPUB container could not be read or rewritten.
    Epub(String),
    /// An embedded image could not be decoded or encoded.
    Image(String),
    /// The caller supplied an argument the pipeline cannot act on.
    InvalidInput(String),
    /// Any other error not covered by specific variants.
    Other(String),
}

impl fmt::Display for CleanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleanError::Parse(msg) => write!(f, "parse error: {msg}"),
            CleanError::Io(msg) => write!(f, "I/O error: {msg}"),
            CleanError::Epub(msg) => write!(f, "EPUB error: {msg}"),
            CleanError::Image(msg) => write!(f, "image error: {msg}"),
            CleanError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            CleanError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CleanError {}

impl From<std::io::Error> for CleanError {
    fn from(err: std::io::Error) -> Self {
        CleanError::Io(err.to_string())
    }
}

/// Machine-readable warning code for categorizing recovered faults.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", content = "detail")
)]
pub enum WarningCode {
    /// The page's text model could not be interpreted; watermark
    /// detection for the affected content was skipped.
    MalformedText,
    /// A referenced font was not found in page resources.
    MissingFont,
    /// An image resource could not be resolved and was treated as absent.
    UnresolvedImage,
    /// An annotation entry could not be resolved and was left in place.
    UnresolvedAnnotation,
    /// A configured limit (e.g. Form XObject nesting) was reached.
    LimitReached,
    /// Any other warning not covered by specific variants.
    Other(String),
}

impl WarningCode {
    /// Returns the string tag for this warning code.
    pub fn as_str(&self) -> &str {
        match self {
            WarningCode::MalformedText => "MALFORMED_TEXT",
            WarningCode::MissingFont => "MISSING_FONT",
            WarningCode::UnresolvedImage => "UNRESOLVED_IMAGE",
            WarningCode::UnresolvedAnnotation => "UNRESOLVED_ANNOTATION",
            WarningCode::LimitReached => "LIMIT_REACHED",
            WarningCode::Other(_) => "OTHER",
        }
    }
}

impl fmt::Display for WarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal issue encountered while scanning or rewriting a page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanWarning {
    /// Machine-readable warning code.
    pub code: WarningCode,
    /// Human-readable description of the warning.
    pub description: String,
    /// Page index (0-based) where the warning occurred, if applicable.
    pub page: Option<usize>,
    /// Element context (e.g. an XObject or font resource name).
    pub element: Option<String>,
}

impl ScanWarning {
    /// Create a warning with a specific code and description.
    pub fn new(code: WarningCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
            page: None,
            element: None,
        }
    }

    /// Attach a page index, returning the modified warning.
    pub fn on_page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    /// Attach an element name, returning the modified warning.
    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.description)?;
        if let Some(page) = self.page {
            write!(f, " (page {page})")?;
        }
        if let Some(ref element) = self.element {
            write!(f, " [{element}]")?;
        }
        Ok(())
    }
}

/// A value paired with the warnings collected while producing it.
#[derive(Debug, Clone)]
pub struct Scanned<T> {
    /// The produced value.
    pub value: T,
    /// Warnings collected along the way.
    pub warnings: Vec<ScanWarning>,
}

impl<T> Scanned<T> {
    /// Create a result with no warnings.
    pub fn ok(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    /// Create a result with warnings.
    pub fn with_warnings(value: T, warnings: Vec<ScanWarning>) -> Self {
        Self { value, warnings }
    }

    /// Returns true if there are no warnings.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Transform the value while preserving warnings.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Scanned<U> {
        Scanned {
            value: f(self.value),
            warnings: self.warnings,
        }
    }
}
