//! Error taxonomy shared by every EDM crate.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub type EdmResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	/// Malformed, oversize or unknown input
	ParamError(String),
	/// Admin tier or granted permissions insufficient
	PermissionDenied,
	AdminNotFound,
	/// Duplicate admin registration
	AlreadyExists,
	/// The plugin has no handler for the requested operation
	OperationNotSupported,
	/// External subsystem failure
	SystemAbnormally(String),
	DbError,
	ConfigError(String),

	// externals
	Io(std::io::Error),
}

/// Status code carried by every response. Goes over the wire as its number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrCode {
	Ok = 0,
	PermissionDenied = 201,
	ParamError = 401,
	OperationNotSupported = 801,
	AdminNotFound = 9_200_001,
	AlreadyExists = 9_200_003,
	SystemAbnormally = 9_200_007,
}

impl ErrCode {
	pub fn as_i32(self) -> i32 {
		self as i32
	}

	pub fn from_i32(code: i32) -> Option<Self> {
		[
			ErrCode::Ok,
			ErrCode::PermissionDenied,
			ErrCode::ParamError,
			ErrCode::OperationNotSupported,
			ErrCode::AdminNotFound,
			ErrCode::AlreadyExists,
			ErrCode::SystemAbnormally,
		]
		.into_iter()
		.find(|c| c.as_i32() == code)
	}

	pub fn is_ok(self) -> bool {
		self == ErrCode::Ok
	}
}

impl Serialize for ErrCode {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_i32(self.as_i32())
	}
}

impl<'de> Deserialize<'de> for ErrCode {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let code = i32::deserialize(deserializer)?;
		ErrCode::from_i32(code)
			.ok_or_else(|| serde::de::Error::custom(format!("unknown status code {}", code)))
	}
}

impl Error {
	/// Maps the error onto the status code reported to callers.
	///
	/// Storage, io and configuration failures are not part of the caller-visible
	/// taxonomy and surface as `SystemAbnormally`.
	pub fn code(&self) -> ErrCode {
		match self {
			Error::ParamError(_) => ErrCode::ParamError,
			Error::PermissionDenied => ErrCode::PermissionDenied,
			Error::AdminNotFound => ErrCode::AdminNotFound,
			Error::AlreadyExists => ErrCode::AlreadyExists,
			Error::OperationNotSupported => ErrCode::OperationNotSupported,
			Error::SystemAbnormally(_) | Error::DbError | Error::ConfigError(_) | Error::Io(_) => {
				ErrCode::SystemAbnormally
			}
		}
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		tracing::warn!("json error: {}", err);
		Self::DbError
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Error::ParamError(msg) => write!(f, "parameter error: {}", msg),
			Error::SystemAbnormally(msg) => write!(f, "system abnormally: {}", msg),
			Error::ConfigError(msg) => write!(f, "config error: {}", msg),
			Error::Io(err) => write!(f, "io error: {}", err),
			_ => write!(f, "{:?}", self),
		}
	}
}

impl std::error::Error for Error {}


// vim: ts=4
