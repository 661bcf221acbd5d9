use edm_types::error::Error as EdmError;
use std::fmt;

/// Internal error type for the fs store adapter
#[derive(Debug)]
pub enum Error {
	IoError(std::io::Error),
	JsonError(String),
	InvalidPath(String),
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Error::IoError(e) => write!(f, "io error: {}", e),
			Error::JsonError(msg) => write!(f, "json error: {}", msg),
			Error::InvalidPath(msg) => write!(f, "invalid path: {}", msg),
		}
	}
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
	fn from(e: std::io::Error) -> Self {
		Error::IoError(e)
	}
}

impl From<serde_json::Error> for Error {
	fn from(e: serde_json::Error) -> Self {
		Error::JsonError(e.to_string())
	}
}

impl From<Error> for EdmError {
	fn from(e: Error) -> Self {
		tracing::warn!("fs store error: {}", e);
		match e {
			Error::IoError(io_err) => EdmError::Io(io_err),
			_ => EdmError::DbError,
		}
	}
}

// vim: ts=4
