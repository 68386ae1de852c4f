//! Runtime state for schema resolution
//!
//! The [`Environment`] is the single mutable mapping threaded through the
//! four resolution phases; [`Value`] is the closed sum type it stores.

mod environment;
mod value;

pub use environment::Environment;
pub use value::{Scalar, Value};
