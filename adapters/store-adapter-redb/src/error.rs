use edm_types::error::Error as EdmError;
use std::fmt;

/// Internal error type for the redb store adapter
#[derive(Debug)]
pub enum Error {
	RedbError(String),
	JsonError(String),
	Unknown(String),
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Error::RedbError(msg) => write!(f, "redb error: {}", msg),
			Error::JsonError(msg) => write!(f, "json error: {}", msg),
			Error::Unknown(msg) => write!(f, "unknown error: {}", msg),
		}
	}
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
	fn from(e: serde_json::Error) -> Self {
		Error::JsonError(e.to_string())
	}
}

impl From<tokio::task::JoinError> for Error {
	fn from(e: tokio::task::JoinError) -> Self {
		Error::Unknown(e.to_string())
	}
}

impl From<Error> for EdmError {
	fn from(e: Error) -> Self {
		tracing::warn!("redb store error: {}", e);
		EdmError::DbError
	}
}

/// Helper to convert redb errors
pub fn from_redb_error<E: fmt::Display>(err: E) -> Error {
	Error::RedbError(err.to_string())
}

// vim: ts=4
