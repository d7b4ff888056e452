//! Utilities shared by the Charla server and client binaries.

pub mod logger;
pub mod time;
