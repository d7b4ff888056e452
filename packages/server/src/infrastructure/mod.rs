//! Infrastructure layer: concrete implementations of the domain traits.

pub mod registry;
pub mod store;
