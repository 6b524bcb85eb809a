pub mod env;
pub mod noop;
pub mod utils;

pub use noop::{EquatableNoop, HashableNoop};
