//! Error types for contract rendering.
//!
//! Every failure is local to a single render call. Nothing is retried;
//! rendering is deterministic, so the caller reruns the whole render.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while rendering a contract group.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No fragment registered at an exclusive-choice point accepted the input.
    #[error("configuration exhaustion: no {point} fragment accepts the current configuration")]
    ConfigurationExhaustion { point: &'static str },

    /// The contract cannot be rendered as written.
    #[error("malformed contract: {message}{}{}", render_path(.path), render_body(.body))]
    MalformedContract {
        message: String,
        path: Option<String>,
        body: Option<String>,
    },

    /// The feature is recognised but not implemented for the active profile.
    #[error("unsupported operation for {profile}: {feature}")]
    Unsupported { feature: String, profile: String },

    /// A fixture file could not be written.
    #[error("failed to write fixture {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Indentation or block push/pop calls were not paired.
    #[error("unbalanced text assembly: {message}")]
    Unbalanced { message: String },

    /// A render configuration document could not be read.
    #[error("invalid render configuration: {message}")]
    Config { message: String },
}

impl RenderError {
    /// Malformed contract without a path or body snapshot.
    pub fn malformed(message: impl Into<String>) -> Self {
        RenderError::MalformedContract {
            message: message.into(),
            path: None,
            body: None,
        }
    }

    /// Malformed contract pointing at a path inside a body.
    pub fn path_not_found(path: impl Into<String>, body: impl Into<String>) -> Self {
        let path = path.into();
        RenderError::MalformedContract {
            message: format!("entry for the provided path <{}> doesn't exist in the body", path),
            path: Some(path),
            body: Some(body.into()),
        }
    }

    pub fn unsupported(feature: impl Into<String>, profile: impl Into<String>) -> Self {
        RenderError::Unsupported {
            feature: feature.into(),
            profile: profile.into(),
        }
    }

    pub fn unbalanced(message: impl Into<String>) -> Self {
        RenderError::Unbalanced {
            message: message.into(),
        }
    }
}

fn render_path(path: &Option<String>) -> String {
    match path {
        Some(path) => format!(" (path: {})", path),
        None => String::new(),
    }
}

fn render_body(body: &Option<String>) -> String {
    match body {
        Some(body) => format!(" (body: {})", body),
        None => String::new(),
    }
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
