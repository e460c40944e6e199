//! Operation registry
//!
//! A closed set of JSON API operations known at compile time. Each
//! [`Operation`] maps to a static [`OperationDef`] that says how to turn a
//! flat parameter object into a request.

mod registry;
mod types;

pub use registry::Operation;
pub use types::{resource_id, BodyKind, Marshaled, OperationDef, ResponseKind, BODY_KEY, RESOURCE_KEYS};

#[cfg(test)]
mod tests;
