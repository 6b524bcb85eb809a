//! Typed accessors bound to one storage key.
//!
//! Neither wrapper ever returns an error from `get`/`set`: failures are
//! logged and the caller sees the cached value or the default.

pub mod safety_value;
pub mod storable_value;

pub use safety_value::SafetyValue;
pub use storable_value::StorableValue;
