//! Error types and handling for the rail temperature pipeline

use thiserror::Error;

/// Main error type for the `RailTemp` library
#[derive(Error, Debug)]
pub enum RailTempError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Weather API communication errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Input validation errors (location files, coordinates)
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Structural problems with an observation table
    #[error("Schema error: {message}")]
    Schema { message: String },

    /// History store errors
    #[error("Storage error: {message}")]
    Storage { message: String },

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

impl RailTempError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new schema error
    pub fn schema<S: Into<String>>(message: S) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// A required column has no accepted name in the table at all.
    pub fn missing_column(canonical: &str) -> Self {
        Self::schema(format!("required column '{canonical}' is missing"))
    }

    /// Create a new storage error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
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
            RailTempError::Config { .. } => {
                "Configuration error. Please check your config file and environment.".to_string()
            }
            RailTempError::Api { .. } => {
                "Unable to reach the weather service. Please check your internet connection."
                    .to_string()
            }
            RailTempError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            RailTempError::Schema { message } => {
                format!("Weather data has an unexpected layout: {message}")
            }
            RailTempError::Storage { .. } => {
                "History store operation failed. The store may be corrupt or locked.".to_string()
            }
            RailTempError::Io { .. } => {
                "File operation failed. Please check file paths and permissions.".to_string()
            }
            RailTempError::General { message } => message.clone(),
        }
    }
}
