// Error types
// -----------
// Every failure the tool can hit is one of the variants below. The driver
// turns them into an exit status; nothing is retried.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SoundlrousError>;

#[derive(Error, Debug)]
pub enum SoundlrousError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    #[error("Unknown service '{name}'. Available services: {available}")]
    UnknownService { name: String, available: String },

    #[error("SoundCloud resolve failed: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Network error: {0}")]
    Transport(#[from] TransportError),

    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

impl SoundlrousError {
    /// Returns the process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            SoundlrousError::MissingArgument(_) => 2,
            SoundlrousError::UnknownService { .. } => 2,
            SoundlrousError::Config(_) => 1,
            SoundlrousError::Resolve(_) => 1,
            SoundlrousError::Transport(_) => 1,
            SoundlrousError::Output(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize options: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("resolve endpoint answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("response is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("response is not a JSON object")]
    NotAnObject,

    #[error("resolved entity has no title, name or username")]
    Untitled,
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("could not read response body from {url}: {message}")]
    Body { url: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_missing_argument() {
        let error = SoundlrousError::MissingArgument("email".to_string());
        assert_eq!(error.exit_code(), 2);
        assert_eq!(error.to_string(), "Missing required argument: email");
    }

    #[test]
    fn test_exit_code_unknown_service() {
        let error = SoundlrousError::UnknownService {
            name: "myspace".to_string(),
            available: "posterous, tumblr".to_string(),
        };
        assert_eq!(error.exit_code(), 2);
        assert!(error.to_string().contains("myspace"));
    }

    #[test]
    fn test_exit_code_resolve_error() {
        let error = SoundlrousError::from(ResolveError::Untitled);
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_exit_code_transport_error() {
        let error = SoundlrousError::from(TransportError::Request {
            url: "http://posterous.com/api/newpost".to_string(),
            message: "connection refused".to_string(),
        });
        assert_eq!(error.exit_code(), 1);
        assert!(error.to_string().contains("connection refused"));
    }
}
