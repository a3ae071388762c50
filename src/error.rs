//! Error types for InsightOxide
//!
//! This module provides structured error handling using thiserror,
//! replacing ad-hoc String-based errors with proper typed errors.

use thiserror::Error;

/// Main error type for InsightOxide operations
#[derive(Error, Debug)]
pub enum InsightError {
    /// File I/O error
    #[error("Failed to access file: {0}")]
    FileIo(#[from] std::io::Error),

    /// HTTP transport error
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Inbound payload failed validation
    #[error("Invalid payload: {0}")]
    Payload(String),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Range endpoint returned a non-success status
    #[error("Insight endpoint returned status {status}")]
    EndpointStatus { status: u16 },

    /// Presign exchange returned an unusable response
    #[error("Presign failed: {0}")]
    Presign(String),

    /// Upload of file bytes to the presigned URL failed
    #[error("Upload failed with status {status}")]
    UploadStatus { status: u16 },
}

/// Result type alias for InsightOxide operations
pub type Result<T> = std::result::Result<T, InsightError>;

/// UI-friendly error message formatting
impl InsightError {
    /// Get a user-friendly error message suitable for displaying in UI
    pub fn user_message(&self) -> String {
        match self {
            InsightError::FileIo(e) => format!("File error: {}", e),
            InsightError::Http(e) => format!("Network error: {}", e),
            InsightError::Json(e) => format!("JSON error: {}", e),
            InsightError::Payload(msg) => format!("Payload error: {}", msg),
            InsightError::Config(msg) => format!("Config error: {}", msg),
            InsightError::EndpointStatus { status } => {
                format!("Server responded with status {}", status)
            }
            InsightError::Presign(msg) => format!("Presign error: {}", msg),
            InsightError::UploadStatus { status } => {
                format!("Upload rejected with status {}", status)
            }
        }
    }

    /// Get a short title for the error (for toast notifications)
    pub fn title(&self) -> &'static str {
        match self {
            InsightError::FileIo(_) => "File Error",
            InsightError::Http(_) => "Network Error",
            InsightError::Json(_) => "JSON Error",
            InsightError::Payload(_) => "Payload Error",
            InsightError::Config(_) => "Configuration Error",
            InsightError::EndpointStatus { .. } => "Server Error",
            InsightError::Presign(_) => "Presign Error",
            InsightError::UploadStatus { .. } => "Upload Error",
        }
    }
}
