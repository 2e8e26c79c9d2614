//! Error types for the MFA pipeline.
//!
//! The taxonomy mirrors the failure granularity of a run: configuration
//! problems abort the whole run, while fetch, normalization, and persistence
//! problems degrade a single URL, document, or category.

use thiserror::Error;

/// Result type alias using the MFA error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the MFA pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid configuration. Fatal for the run.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A single source URL could not be fetched or decoded.
    #[error("Fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    /// A single scraped document could not be normalized.
    #[error("Normalization error in {source_label}: {message}")]
    Normalization { source_label: String, message: String },

    /// A report or raw document could not be written.
    #[error("Persistence error at {path}: {message}")]
    Persistence { path: String, message: String },

    /// A pipeline stage failed as a whole.
    #[error("Orchestration error in {stage}: {message}")]
    Orchestration { stage: String, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML configuration parse error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Other error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a fetch error for a specific URL.
    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a normalization error for a specific document.
    pub fn normalization(source_label: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Normalization {
            source_label: source_label.into(),
            message: message.into(),
        }
    }

    /// Create a persistence error for a specific path.
    pub fn persistence(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Persistence {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an orchestration error for a named stage.
    pub fn orchestration(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Orchestration {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Create an error with additional context.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Configuration errors abort a run; everything else is degradable
    /// to the URL, document, or category it names.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Configuration(_) | Self::Yaml(_) => true,
            Self::WithContext { source, .. } => source.is_fatal(),
            _ => false,
        }
    }

    /// Short classification label used in run summaries and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Fetch { .. } => "fetch",
            Self::Normalization { .. } => "normalization",
            Self::Persistence { .. } => "persistence",
            Self::Orchestration { .. } => "orchestration",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
            Self::Yaml(_) => "yaml",
            Self::WithContext { source, .. } => source.kind(),
        }
    }
}

/// Extension trait for adding context to any error type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }
}
