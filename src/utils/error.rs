use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Document store {operation} failed: {message}")]
    StoreError { operation: String, message: String },

    #[error("Malformed document at {path}: {message}")]
    DecodeError { path: String, message: String },

    #[error("{entity} not found")]
    NotFound { entity: String, id: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    DataAccess,
    NotFound,
    Validation,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TrackerError {
    pub fn store(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StoreError {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn decode(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DecodeError {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::HttpError(_)
            | Self::SerializationError(_)
            | Self::StoreError { .. }
            | Self::DecodeError { .. } => ErrorCategory::DataAccess,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::ValidationError { .. } | Self::Conflict { .. } => ErrorCategory::Validation,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::NotFound | ErrorCategory::Validation => ErrorSeverity::Low,
            ErrorCategory::DataAccess => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for a run that ended with this error. Never 0.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low | ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::DataAccess => format!("Could not reach the document store: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::MissingConfigError { .. } => "Add the missing key to the config file or environment",
            Self::InvalidConfigValueError { .. } | Self::ConfigValidationError { .. } => {
                "Check the value against the documented config format"
            }
            Self::ConfigError { .. } => "Check that the config file exists and is valid TOML",
            Self::HttpError(_) | Self::StoreError { .. } => {
                "Check network access, the Firestore project id and the access token"
            }
            Self::DecodeError { .. } | Self::SerializationError(_) => {
                "Inspect the stored document; it does not have the expected shape"
            }
            Self::IoError(_) => "Check file permissions and that the path exists",
            Self::NotFound { .. } | Self::ValidationError { .. } | Self::Conflict { .. } => {
                "Fix the request and try again"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
