use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Control entries of a collection archive are missing or corrupt.
    CollectionUnreadable,
    /// A record's field count disagrees with the declared structure.
    StructureMismatch,
    /// Malformed bytes or I/O failure while reading a record file.
    DecodeFailure,
    StoreWriteFailure,
    StoreReadFailure,
    NotFound,
    Io,
    Parse,
    InvalidArgument,
    InvalidState,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub kind: ErrorKind,
    pub context: String,
}

impl Error {
    pub fn new(kind: ErrorKind, context: String) -> Self {
        Error { kind, context }
    }

    pub fn collection_unreadable(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::CollectionUnreadable, context.into())
    }

    pub fn structure_mismatch(expected: usize, got: usize) -> Self {
        Error::new(
            ErrorKind::StructureMismatch,
            format!("fields count doesn't match the structure: expected {}, got {}", expected, got),
        )
    }

    pub fn not_found(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::NotFound, context.into())
    }

    pub fn write_failure(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::StoreWriteFailure, context.into())
    }

    pub fn read_failure(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::StoreReadFailure, context.into())
    }

    /// Re-tags an error with a new kind, keeping its message as context.
    pub fn with_kind(self, kind: ErrorKind) -> Self {
        Error { kind, context: self.context }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.context)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error {
            kind: ErrorKind::Io,
            context: err.to_string(),
        }
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error {
            kind: ErrorKind::Parse,
            context: err.to_string(),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error {
            kind: ErrorKind::CollectionUnreadable,
            context: format!("zip error: {}", err),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
