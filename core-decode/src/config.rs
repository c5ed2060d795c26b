//! # Decode Configuration
//!
//! Tunables for the decode loop. Every field has a serde default, so partial
//! configuration files deserialize cleanly.

use crate::error::{DecodeError, Result};
use serde::{Deserialize, Serialize};

/// What to do when a codec produces more frames than it declared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Grow the destination and log a warning.
    #[default]
    Grow,
    /// Abort the decode with [`DecodeError::FrameOverflow`].
    Fail,
}

/// Decode loop configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeConfig {
    /// Maximum frames requested per pull.
    ///
    /// Default: 4096 frames.
    #[serde(default = "default_chunk_frames")]
    pub chunk_frames: usize,

    /// Behaviour when decoded frames exceed the declared count.
    ///
    /// Default: [`OverflowPolicy::Grow`].
    #[serde(default)]
    pub overflow_policy: OverflowPolicy,

    /// Give up after this many holes in a row. `None` tolerates any number.
    ///
    /// Default: `None`.
    #[serde(default)]
    pub max_consecutive_holes: Option<usize>,

    /// Bytes at the end of an Ogg stream searched for the final page when
    /// estimating the declared frame count.
    ///
    /// Default: 64 KiB.
    #[serde(default = "default_tail_scan_bytes")]
    pub tail_scan_bytes: u64,

    /// Upper bound on the frames per channel allocated up front from a
    /// declared count. Storage beyond it is grown as frames arrive.
    ///
    /// Default: 4 Mi frames.
    #[serde(default = "default_max_preallocated_frames")]
    pub max_preallocated_frames: usize,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            chunk_frames: default_chunk_frames(),
            overflow_policy: OverflowPolicy::default(),
            max_consecutive_holes: None,
            tail_scan_bytes: default_tail_scan_bytes(),
            max_preallocated_frames: default_max_preallocated_frames(),
        }
    }
}

impl DecodeConfig {
    /// Configuration that treats any inconsistency as fatal.
    ///
    /// - Overflow past the declared frame count fails
    /// - At most 8 holes in a row
    pub fn strict() -> Self {
        Self {
            overflow_policy: OverflowPolicy::Fail,
            max_consecutive_holes: Some(8),
            ..Default::default()
        }
    }

    pub fn with_chunk_frames(mut self, frames: usize) -> Self {
        self.chunk_frames = frames;
        self
    }

    pub fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    pub fn with_max_consecutive_holes(mut self, limit: Option<usize>) -> Self {
        self.max_consecutive_holes = limit;
        self
    }

    pub fn with_tail_scan_bytes(mut self, bytes: u64) -> Self {
        self.tail_scan_bytes = bytes;
        self
    }

    pub fn with_max_preallocated_frames(mut self, frames: usize) -> Self {
        self.max_preallocated_frames = frames;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_frames == 0 {
            return Err(DecodeError::InvalidConfig(
                "chunk_frames must be > 0".to_string(),
            ));
        }

        // Smaller than one Ogg page header can never find a page.
        if self.tail_scan_bytes < 27 {
            return Err(DecodeError::InvalidConfig(
                "tail_scan_bytes must be >= 27".to_string(),
            ));
        }

        Ok(())
    }
}

fn default_chunk_frames() -> usize {
    4096
}

fn default_tail_scan_bytes() -> u64 {
    64 * 1024
}

fn default_max_preallocated_frames() -> usize {
    4 * 1024 * 1024
}
