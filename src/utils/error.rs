use thiserror::Error;

#[derive(Error, Debug)]
pub enum MenuError {
    #[error("Cannot parse week label '{label}': {reason}")]
    ParseError { label: String, reason: String },

    #[error("Sheet source is empty: {locator}")]
    EmptySourceError { locator: String },

    #[error("Sheet is too large ({size} bytes, limit {limit}): {locator}")]
    ContentTooLargeError {
        locator: String,
        size: u64,
        limit: u64,
    },

    #[error("Cannot fetch '{locator}': {reason}")]
    FetchError { locator: String, reason: String },

    #[error("Invalid sheet shape: {reason}")]
    InvalidShapeError { reason: String },

    #[error("Sheet decoding error: {message}")]
    DecodeError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("No week is published on the menu page")]
    NoPublishedWeekError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Parse,
    Source,
    Sheet,
    Config,
    System,
    Unavailable,
}

impl MenuError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            MenuError::ParseError { .. } => ErrorCategory::Parse,
            MenuError::EmptySourceError { .. }
            | MenuError::ContentTooLargeError { .. }
            | MenuError::FetchError { .. } => ErrorCategory::Source,
            MenuError::InvalidShapeError { .. } | MenuError::DecodeError { .. } => {
                ErrorCategory::Sheet
            }
            MenuError::ConfigError { .. }
            | MenuError::ConfigValidationError { .. }
            | MenuError::InvalidConfigValueError { .. }
            | MenuError::MissingConfigError { .. } => ErrorCategory::Config,
            MenuError::IoError(_) | MenuError::SerializationError(_) => ErrorCategory::System,
            MenuError::NoPublishedWeekError => ErrorCategory::Unavailable,
        }
    }

    /// 命令列結束碼
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Config => 1,
            ErrorCategory::Source => 2,
            ErrorCategory::Parse | ErrorCategory::Sheet => 3,
            ErrorCategory::System => 4,
            ErrorCategory::Unavailable => 5,
        }
    }
}

pub type Result<T> = std::result::Result<T, MenuError>;
