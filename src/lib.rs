//! Workspace placeholder crate.
//!
//! This crate exposes feature flags that map to the workspace crates
//! (`core-runtime`, `core-decode`). Asset pipelines can depend on
//! `asset-audio-workspace` and pick the decoders they need without wiring each
//! crate individually.

#[cfg(any(feature = "vorbis", feature = "flat"))]
pub use core_decode as decode;

#[cfg(feature = "runtime")]
pub use core_runtime as runtime;
