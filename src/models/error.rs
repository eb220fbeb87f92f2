use camino::Utf8Path;
use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Display, Clone, PartialEq, Eq)]
pub enum SError {
    #[display("Invalid input: {_0}")]
    Validation(String),
    #[display("A mod named '{_0}' already exists")]
    Conflict(String),
    #[display("Mod '{_0}' not found")]
    ModNotFound(String),
    #[display("Mod folder '{_0}' already exists in storage")]
    ModAlreadyExists(String),
    #[display("Invalid mod package: {_0}")]
    InvalidPackage(String),
    #[display("Not a valid game folder: {_0}")]
    InvalidGameFolder(String),
    #[display("Game folder has not been selected yet")]
    SetupIncomplete,
    #[display("File or directory not found: {_0}")]
    FileOrDirectoryNotFound(String),
    #[display("I/O failure: {_0}")]
    IOError(String),
    #[display("Corrupt configuration: {_0}")]
    ConfigCorrupt(String),
    #[display("Parse error: {_0}")]
    ParseError(String),
}

impl std::error::Error for SError {}

impl SError {
    /// Wraps an I/O error with the path it happened on.
    pub fn io(path: &Utf8Path, err: std::io::Error) -> Self {
        SError::IOError(format!("{path}: {err}"))
    }
}

impl From<std::io::Error> for SError {
    fn from(e: std::io::Error) -> Self {
        SError::IOError(e.to_string())
    }
}

impl From<walkdir::Error> for SError {
    fn from(e: walkdir::Error) -> Self {
        SError::IOError(e.to_string())
    }
}

impl From<zip::result::ZipError> for SError {
    fn from(e: zip::result::ZipError) -> Self {
        match e {
            zip::result::ZipError::Io(io) => SError::IOError(io.to_string()),
            other => SError::InvalidPackage(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for SError {
    fn from(e: serde_json::Error) -> Self {
        SError::ConfigCorrupt(e.to_string())
    }
}

impl From<confy::ConfyError> for SError {
    fn from(e: confy::ConfyError) -> Self {
        SError::ParseError(e.to_string())
    }
}

impl From<std::path::StripPrefixError> for SError {
    fn from(e: std::path::StripPrefixError) -> Self {
        SError::ParseError(e.to_string())
    }
}
