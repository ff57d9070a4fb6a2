//! Error types for Appointly

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppointlyError>;

#[derive(Error, Debug)]
pub enum AppointlyError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AppointlyError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            AppointlyError::InvalidInput(_) => 3,
            AppointlyError::Session(SessionError::NotSignedIn) => 2,
            AppointlyError::Api(ApiError::Status { status: 401, .. }) => 2,
            AppointlyError::Api(_) => 1,
            AppointlyError::Session(_) => 1,
            AppointlyError::Config(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    /// The cause is only reachable through `source()`
    #[error("Failed to read config file")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No user is signed in")]
    NotSignedIn,

    #[error("Session file error: {0}")]
    StateFile(String),

    #[error("Session state lock poisoned")]
    Poisoned,
}

/// Failures from a remote collaborator (HTTP API or device media picker)
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server responded with {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Media picker failed: {0}")]
    Picker(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            ApiError::Decode(error.to_string())
        } else if let Some(status) = error.status() {
            ApiError::Status {
                status: status.as_u16(),
                message: error.to_string(),
            }
        } else {
            ApiError::Network(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_invalid_input() {
        let error = AppointlyError::InvalidInput("Name is required".to_string());
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_not_signed_in() {
        let error = AppointlyError::Session(SessionError::NotSignedIn);
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_unauthorized_status() {
        let error = AppointlyError::Api(ApiError::Status {
            status: 401,
            message: "token expired".to_string(),
        });
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_other_api_errors() {
        let errors = vec![
            ApiError::Network("connection refused".to_string()),
            ApiError::Status {
                status: 500,
                message: "boom".to_string(),
            },
            ApiError::Decode("expected array".to_string()),
            ApiError::Picker("camera unavailable".to_string()),
        ];

        for error in errors {
            assert_eq!(AppointlyError::Api(error).exit_code(), 1);
        }
    }

    #[test]
    fn test_exit_code_config_and_session_file() {
        let config = AppointlyError::Config(ConfigError::MissingField("api.base_url".to_string()));
        assert_eq!(config.exit_code(), 1);

        let session = AppointlyError::Session(SessionError::StateFile("read-only".to_string()));
        assert_eq!(session.exit_code(), 1);
    }

    #[test]
    fn test_error_message_formatting() {
        let error = AppointlyError::Api(ApiError::Status {
            status: 404,
            message: "not found".to_string(),
        });
        assert_eq!(error.to_string(), "Server responded with 404: not found");

        let error = AppointlyError::Config(ConfigError::MissingField("api.base_url".to_string()));
        assert_eq!(error.to_string(), "Missing required field: api.base_url");
    }

    #[test]
    fn test_source_chain_names_each_cause_once() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let error: AppointlyError = ConfigError::from(io).into();

        let mut chain = vec![error.to_string()];
        let mut source = std::error::Error::source(&error);
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }
        let rendered = chain.join(": ");

        assert_eq!(rendered, "Failed to read config file: no such file");
    }

    #[test]
    fn test_error_conversion_from_session_error() {
        let error: AppointlyError = SessionError::NotSignedIn.into();
        match error {
            AppointlyError::Session(SessionError::NotSignedIn) => {}
            other => panic!("Expected session error, got {:?}", other),
        }
    }

    #[test]
    fn test_api_error_clone() {
        let original = ApiError::Network("Connection failed".to_string());
        let cloned = original.clone();

        assert_eq!(original.to_string(), cloned.to_string());
    }
}
