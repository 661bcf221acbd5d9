pub use crate::error::{EdmResult, ErrCode, Error};
pub use crate::types::{AdminTier, PolicyCode, Timestamp, UserId};
pub use crate::value::PolicyValue;

pub use tracing::{debug, error, info, trace, warn};

// vim: ts=4
