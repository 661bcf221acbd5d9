//! Codecs between the persisted textual form of a policy value and `PolicyValue`.
//!
//! Booleans persist as `true`/`false`, integers as decimal text, strings verbatim
//! and string arrays as a JSON array. String arrays additionally support set union
//! and set difference, both preserving first-seen order.

use itertools::Itertools;

use crate::prelude::*;

/// Largest number of entries a collection policy may hold
pub const ARRAY_MAX_SIZE: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Serializer {
	Bool,
	Int,
	String,
	StringArray,
}

impl Serializer {
	pub fn default_value(self) -> PolicyValue {
		match self {
			Serializer::Bool => PolicyValue::Bool(false),
			Serializer::Int => PolicyValue::Int(0),
			Serializer::String => PolicyValue::String(String::new()),
			Serializer::StringArray => PolicyValue::StringArray(Vec::new()),
		}
	}

	/// Parses caller-supplied text. Malformed input is a `ParamError`.
	pub fn deserialize(self, data: &str) -> EdmResult<PolicyValue> {
		match self {
			Serializer::Bool => match data.trim() {
				"true" => Ok(PolicyValue::Bool(true)),
				"false" => Ok(PolicyValue::Bool(false)),
				other => Err(Error::ParamError(format!("not a bool: {:?}", other))),
			},
			Serializer::Int => data
				.trim()
				.parse::<i64>()
				.map(PolicyValue::Int)
				.map_err(|_| Error::ParamError(format!("not an integer: {:?}", data))),
			Serializer::String => Ok(PolicyValue::String(data.to_string())),
			Serializer::StringArray => {
				if data.trim().is_empty() {
					return Ok(PolicyValue::StringArray(Vec::new()));
				}
				serde_json::from_str::<Vec<String>>(data)
					.map(PolicyValue::StringArray)
					.map_err(|err| Error::ParamError(format!("not a string array: {}", err)))
			}
		}
	}

	/// Parses a value read back from the policy store. Stored text that no longer
	/// parses means the store is corrupt, not that the caller erred.
	pub fn deserialize_stored(self, data: &str) -> EdmResult<PolicyValue> {
		self.deserialize(data).map_err(|err| {
			error!("corrupt stored policy value: {}", err);
			Error::SystemAbnormally("corrupt stored policy value".into())
		})
	}

	pub fn serialize(self, value: &PolicyValue) -> EdmResult<String> {
		match (self, value) {
			(Serializer::Bool, PolicyValue::Bool(b)) => Ok(b.to_string()),
			(Serializer::Int, PolicyValue::Int(i)) => Ok(i.to_string()),
			(Serializer::String, PolicyValue::String(s)) => Ok(s.clone()),
			(Serializer::StringArray, PolicyValue::StringArray(a)) => Ok(serde_json::to_string(a)?),
			(_, value) => Err(Error::ParamError(format!(
				"{} value given to {:?} serializer",
				value.type_name(),
				self
			))),
		}
	}

	/// `a ∪ b`, entries of `a` first
	pub fn set_union(self, a: &PolicyValue, b: &PolicyValue) -> EdmResult<PolicyValue> {
		let (a, b) = self.arrays(a, b)?;
		Ok(PolicyValue::StringArray(a.iter().chain(b.iter()).unique().cloned().collect()))
	}

	/// `a − b`
	pub fn set_difference(self, a: &PolicyValue, b: &PolicyValue) -> EdmResult<PolicyValue> {
		let (a, b) = self.arrays(a, b)?;
		Ok(PolicyValue::StringArray(
			a.iter().filter(|item| !b.contains(item)).unique().cloned().collect(),
		))
	}

	fn arrays<'a>(
		self,
		a: &'a PolicyValue,
		b: &'a PolicyValue,
	) -> EdmResult<(&'a [String], &'a [String])> {
		if self != Serializer::StringArray {
			return Err(Error::OperationNotSupported);
		}
		match (a.as_string_array(), b.as_string_array()) {
			(Some(a), Some(b)) => Ok((a, b)),
			_ => Err(Error::ParamError("set operation on non-array value".into())),
		}
	}
}


// vim: ts=4
