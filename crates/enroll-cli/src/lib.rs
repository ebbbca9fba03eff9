//! Library components of the `enroll` command-line client.

pub mod commands;
pub mod logging;
pub mod store;
