//! Typed in-memory policy value.

use serde::{Deserialize, Serialize};

/// Policy value, one variant per serializer kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PolicyValue {
	Bool(bool), // Must be before Int to avoid bool -> int coercion
	Int(i64),
	String(String),
	StringArray(Vec<String>),
}

impl PolicyValue {
	pub fn matches_type(&self, other: &PolicyValue) -> bool {
		matches!(
			(self, other),
			(PolicyValue::Bool(_), PolicyValue::Bool(_))
				| (PolicyValue::Int(_), PolicyValue::Int(_))
				| (PolicyValue::String(_), PolicyValue::String(_))
				| (PolicyValue::StringArray(_), PolicyValue::StringArray(_))
		)
	}

	/// Get the type name for error messages
	pub fn type_name(&self) -> &'static str {
		match self {
			PolicyValue::Bool(_) => "bool",
			PolicyValue::Int(_) => "int",
			PolicyValue::String(_) => "string",
			PolicyValue::StringArray(_) => "string-array",
		}
	}

	/// Whether the value carries no information (empty string or array).
	/// Scalars are never empty.
	pub fn is_empty(&self) -> bool {
		match self {
			PolicyValue::String(s) => s.is_empty(),
			PolicyValue::StringArray(a) => a.is_empty(),
			PolicyValue::Bool(_) | PolicyValue::Int(_) => false,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			PolicyValue::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_int(&self) -> Option<i64> {
		match self {
			PolicyValue::Int(i) => Some(*i),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			PolicyValue::String(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_string_array(&self) -> Option<&[String]> {
		match self {
			PolicyValue::StringArray(a) => Some(a),
			_ => None,
		}
	}
}

impl From<bool> for PolicyValue {
	fn from(b: bool) -> Self {
		PolicyValue::Bool(b)
	}
}

impl From<&str> for PolicyValue {
	fn from(s: &str) -> Self {
		PolicyValue::String(s.to_string())
	}
}

impl From<Vec<String>> for PolicyValue {
	fn from(a: Vec<String>) -> Self {
		PolicyValue::StringArray(a)
	}
}

// vim: ts=4
