//! Error types for the Samsara SDK
//!
//! Configuration and validation problems are surfaced as errors. Transport
//! failures are not: a publisher reports them as `false`.

use std::fmt;

use thiserror::Error;

/// Result type for SDK operations
pub type SdkResult<T> = Result<T, SdkError>;

/// Any error the SDK surfaces to its caller
#[derive(Debug, Error)]
pub enum SdkError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Validation(#[from] EventValidationError),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Invalid or missing configuration, raised when a client is built
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("URL for Ingestion API should be specified.")]
    MissingUrl,
    #[error("Invalid interval time for Samsara client.")]
    InvalidPublishInterval,
    #[error("Invalid send timeout for Samsara client.")]
    InvalidSendTimeout,
    #[error("max_buffer_size ({max}) can not be less than min_buffer_size ({min}).")]
    BufferSizeMismatch { max: usize, min: usize },
    #[error("Invalid value '{value}' for {key}.")]
    InvalidValue { key: String, value: String },
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// What is wrong with a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// Field is absent (or null)
    Required,
    /// Field holds a value of the wrong JSON type
    WrongType(&'static str),
    /// String field is empty or whitespace only
    Blank,
    /// Integer field is below the allowed minimum
    BelowMinimum(i64),
}

/// One violated rule, optionally tied to a position in a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub index: Option<usize>,
    pub field: &'static str,
    pub kind: ViolationKind,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(index) = self.index {
            write!(f, "event[{}]: ", index)?;
        }
        match &self.kind {
            ViolationKind::Required => write!(f, "Field '{}' is required", self.field),
            ViolationKind::WrongType(kind) => {
                write!(f, "Field '{}' must be of {} type", self.field, kind)
            }
            ViolationKind::Blank => write!(f, "Field '{}' can't be blank", self.field),
            ViolationKind::BelowMinimum(min) => {
                write!(f, "Field '{}' can't be less than {}", self.field, min)
            }
        }
    }
}

/// One or more events failed validation
///
/// Carries every violation found, not only the first one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventValidationError {
    pub violations: Vec<FieldViolation>,
}

impl EventValidationError {
    /// Check whether any violation concerns the given field
    pub fn mentions(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }

    /// Violations for one field
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldViolation> {
        self.violations.iter().filter(move |v| v.field == field)
    }
}

impl fmt::Display for EventValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid event(s): ")?;
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for EventValidationError {}
