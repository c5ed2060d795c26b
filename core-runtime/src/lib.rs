//! # Core Runtime Module
//!
//! Runtime infrastructure shared by the decode crates:
//! - Logging and tracing initialization
//! - Log sinks for mirroring events into a host
//!
//! ## Overview
//!
//! Library crates only emit `tracing` events. Binaries and tests call
//! [`logging::init_logging`] once to decide where those events go.

pub mod error;
pub mod logging;
pub mod sink;

pub use error::{Error, Result};
