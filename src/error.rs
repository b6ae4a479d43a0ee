//! Error types and handling for the `TripSense` service

use thiserror::Error;

/// Failure of a single upstream event or weather provider.
///
/// The aggregation paths catch these at the point of use and degrade the
/// failing provider to an empty contribution; they never abort siblings.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The request could not be sent or timed out
    #[error("{provider} request failed: {source}")]
    Request {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The upstream answered with a non-success status
    #[error("{provider} returned HTTP {status}")]
    Status {
        provider: &'static str,
        status: reqwest::StatusCode,
    },

    /// The payload did not match the expected shape
    #[error("{provider} response could not be decoded: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },

    /// A collaborator this provider depends on (resolver, weather,
    /// reasoning) failed before the provider could produce events
    #[error("{provider} could not produce events: {message}")]
    Upstream {
        provider: &'static str,
        message: String,
    },

    /// No API key configured for this provider
    #[error("{provider} credentials are not configured")]
    Credentials { provider: &'static str },
}

impl ProviderError {
    pub fn decode<S: Into<String>>(provider: &'static str, message: S) -> Self {
        Self::Decode {
            provider,
            message: message.into(),
        }
    }

    pub fn upstream<S: Into<String>>(provider: &'static str, message: S) -> Self {
        Self::Upstream {
            provider,
            message: message.into(),
        }
    }
}

/// Failure of the natural-language reasoning service, including responses
/// that do not conform to the requested JSON shape.
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// The request could not be sent or timed out
    #[error("reasoning request failed: {source}")]
    Request {
        #[from]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status
    #[error("reasoning service returned HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The service returned no usable completion
    #[error("reasoning service returned no completion")]
    Empty,

    /// The completion did not match the requested schema
    #[error("reasoning output did not match the expected shape: {message}")]
    Malformed { message: String },

    /// No reasoning API key configured
    #[error("reasoning credentials are not configured")]
    Credentials,
}

impl SynthesisError {
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

/// Main error type for the `TripSense` application
#[derive(Error, Debug)]
pub enum TripSenseError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// A destination that the location resolver cannot map to coordinates
    #[error("no coordinates known for '{city}'")]
    LocationNotFound { city: String },

    /// A reasoning failure in a context where it must surface (chat,
    /// itinerary generation)
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl TripSenseError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new location-not-found error
    pub fn location_not_found<S: Into<String>>(city: S) -> Self {
        Self::LocationNotFound { city: city.into() }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TripSenseError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            TripSenseError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            TripSenseError::LocationNotFound { city } => {
                format!("Unknown destination '{city}'. Try one of the supported cities.")
            }
            TripSenseError::Synthesis { .. } => {
                "The travel assistant is temporarily unavailable. Please try again.".to_string()
            }
            TripSenseError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            TripSenseError::General { message } => message.clone(),
        }
    }
}
