//! Error types for the Cogwheel system

use crate::serializer::SerializerContext;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Cogwheel operations
#[derive(Error, Debug)]
pub enum CogwheelError {
    /// Reading or writing a configuration file failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input text could not be decoded by a format
    #[error("{format} parse error: {message}")]
    Parse { format: String, message: String },

    /// A value cannot be represented by the target format
    #[error("{format} cannot represent {kind} value at '{key}'")]
    UnsupportedValue {
        format: String,
        key: String,
        kind: String,
    },

    /// A serializer was registered twice for the same type
    #[error("Type '{type_name}' already has a registered serializer")]
    DuplicateSerializer { type_name: String },

    /// Deserialization produced no configuration
    #[error("Could not load configuration: {type_name}")]
    Load { type_name: String },

    /// An error handler refused to continue
    #[error("{0}")]
    Rejected(ErrorEntry),

    /// Encoding failed inside a format backend
    #[error("Format error: {0}")]
    Format(String),
}

impl CogwheelError {
    /// Build a parse error for the given format
    pub fn parse(format: impl Into<String>, message: impl Into<String>) -> Self {
        CogwheelError::Parse {
            format: format.into(),
            message: message.into(),
        }
    }

    /// Build an I/O error bound to a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CogwheelError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for Cogwheel operations
pub type Result<T> = std::result::Result<T, CogwheelError>;

/// Category of a problem found while mapping a configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required key was not found
    KeyNotFound,
    /// A key without a matching node was encountered
    UnexpectedKey,
    /// No serializer is available for a node's type
    SerializerNotFound,
    /// A value could not be read as the node's type
    MismatchedTypes,
    /// Serializer specific problem
    Custom,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::KeyNotFound => "KEY_NOT_FOUND",
            ErrorKind::UnexpectedKey => "UNEXPECTED_KEY",
            ErrorKind::SerializerNotFound => "SERIALIZER_NOT_FOUND",
            ErrorKind::MismatchedTypes => "MISMATCHED_TYPES",
            ErrorKind::Custom => "CUSTOM",
        };
        f.write_str(name)
    }
}

/// A single mapping problem, located by its key path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEntry {
    pub kind: ErrorKind,
    /// Dotted key path, empty for the document root
    pub path: String,
    pub message: String,
}

impl ErrorEntry {
    pub fn new(kind: ErrorKind, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}: {}", self.kind, self.message)
        } else {
            write!(f, "{}: {} (at '{}')", self.kind, self.message, self.path)
        }
    }
}

/// Errors collected while a value is being read
///
/// Serializers push entries here instead of failing; the configuration
/// serializer drains them through the configured [`crate::ErrorHandler`]
/// once a node is done.
#[derive(Debug, Clone, Default)]
pub struct ErrorContainer {
    entries: Vec<ErrorEntry>,
}

impl ErrorContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error at the context's current path
    pub fn error(&mut self, context: &SerializerContext, kind: ErrorKind, message: impl Into<String>) {
        self.entries
            .push(ErrorEntry::new(kind, context.path(), message));
    }

    pub fn push(&mut self, entry: ErrorEntry) {
        self.entries.push(entry);
    }

    /// Move every entry of `other` into this container
    pub fn extend(&mut self, other: ErrorContainer) {
        self.entries.extend(other.entries);
    }

    pub fn has_errors(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ErrorEntry> {
        self.entries.iter()
    }

    /// Pass every collected entry to the context's error handler.
    ///
    /// Entries are removed as they are handled. The first handler rejection
    /// is returned and the remaining entries stay in the container.
    pub fn handle_errors(&mut self, context: &SerializerContext) -> Result<()> {
        if !self.has_errors() {
            return Ok(());
        }
        let handler = context.options().error_handler();
        while !self.entries.is_empty() {
            let entry = self.entries.remove(0);
            handler.handle(context, &entry)?;
        }
        Ok(())
    }
}

impl IntoIterator for ErrorContainer {
    type Item = ErrorEntry;
    type IntoIter = std::vec::IntoIter<ErrorEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
