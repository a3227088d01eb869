use thiserror::Error;

pub type Result<T> = std::result::Result<T, IniError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IniError {
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("section already exists: [{0}]")]
    DuplicateSection(String),

    #[error("invalid section name {name:?}: {reason}")]
    InvalidSectionName { name: String, reason: &'static str },

    #[error("invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: &'static str },

    #[error("invalid value for key {key:?}: values cannot span lines")]
    InvalidValue { key: String },
}
