//! Utilities shared by the Veranda binaries: logging setup and time helpers.

pub mod logger;
pub mod time;
