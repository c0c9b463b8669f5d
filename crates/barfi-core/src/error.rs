//! Error types for Barfi.
//!
//! This module provides a unified error type for all upload operations,
//! with specific error variants for different failure modes.

use std::fmt;
use std::io;

use thiserror::Error;

/// A specialized `Result` type for Barfi operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The protocol phase an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    /// Creating the upload session
    Initiate,
    /// Transferring a single part (1-based part number)
    Part(usize),
    /// Finalizing the upload session
    Complete,
}

impl fmt::Display for UploadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initiate => write!(f, "initiate"),
            Self::Part(number) => write!(f, "part {number}"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// The main error type for Barfi.
#[derive(Error, Debug)]
pub enum Error {
    /// File has no content
    #[error("invalid file with size 0")]
    EmptyFile,

    /// A destination directory was given without a token
    #[error("when a directory id is supplied, a token is required")]
    DirectoryRequiresToken,

    /// File not found
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// Path exists but is not a regular file
    #[error("not a regular file: {0}")]
    NotAFile(String),

    /// Endpoint is not a usable URL
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// Endpoint as given
        endpoint: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Chunk size of zero
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,

    /// HTTP transport failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote service answered with an unexpected status code
    #[error("{phase} upload failed with status code {status}")]
    UnexpectedStatus {
        /// Phase the request belonged to
        phase: UploadPhase,
        /// HTTP status code received
        status: u16,
    },

    /// Remote service answered with a body that could not be decoded
    #[error("failed to decode {phase} response: {source}")]
    Decode {
        /// Phase the response belonged to
        phase: UploadPhase,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Service assigned a different number of part URLs than there are chunks
    #[error("service assigned {actual} upload urls, expected {expected}")]
    UploadUrlMismatch {
        /// Computed chunk count
        expected: usize,
        /// Number of URLs received
        actual: usize,
    },

    /// Parts were transferred or recorded out of order
    #[error("part {actual} is out of order, expected part {expected}")]
    PartOutOfOrder {
        /// Part number expected next
        expected: usize,
        /// Part number requested
        actual: usize,
    },

    /// Operation not allowed in the current session state
    #[error("cannot {operation} while upload is {state}")]
    InvalidState {
        /// Operation attempted
        operation: &'static str,
        /// Session state at the time
        state: String,
    },

    /// Configuration file error
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Invalid configuration value
    #[error("invalid configuration value for '{key}': {reason}")]
    InvalidConfig {
        /// Configuration key
        key: String,
        /// Reason for invalidity
        reason: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Returns the protocol phase this error belongs to, if any.
    #[must_use]
    pub const fn phase(&self) -> Option<UploadPhase> {
        match self {
            Self::UnexpectedStatus { phase, .. } | Self::Decode { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// Returns whether this error was raised before any network call.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyFile
                | Self::DirectoryRequiresToken
                | Self::FileNotFound(_)
                | Self::NotAFile(_)
                | Self::InvalidEndpoint { .. }
                | Self::InvalidChunkSize
        )
    }

    /// Returns a helpful suggestion for resolving the error, if applicable.
    #[must_use]
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::DirectoryRequiresToken => Some(
                "Pass your account token with --token, set BARFI_TOKEN,\n\
                 or store it with: barfi config set token <TOKEN>",
            ),
            Self::UnexpectedStatus { status: 401 | 403, .. } => {
                Some("Check that your token is valid and allowed to upload to this directory.")
            }
            Self::Http(_) => Some("Check your internet connection and the endpoint, then try again."),
            Self::InvalidEndpoint { .. } => {
                Some("The endpoint must be an absolute http(s) URL, e.g. https://example.com")
            }
            _ => None,
        }
    }
}
