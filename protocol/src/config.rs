//! Size limits shared by every message buffer.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::header::INITIAL_BUFFER_POSITION;

/// Largest message the protocol allows, header included.
pub const NETWORKMESSAGE_MAXSIZE: usize = 65_500;

/// Errors produced while loading or validating [`BufferLimits`].
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read limits file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse limits: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid limits: {0}")]
    Invalid(String),
}

/// Capacity and per-field ceilings applied by a message buffer.
///
/// Built once at startup and handed to every buffer; buffers never change
/// their limits after construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BufferLimits {
    /// Total storage of one buffer.
    pub max_message_size: usize,
    /// Longest string payload accepted in either direction.
    pub max_string_size: usize,
    /// Widest single scalar field accepted by `add`.
    pub max_packet_size: usize,
}

impl Default for BufferLimits {
    fn default() -> Self {
        Self {
            max_message_size: NETWORKMESSAGE_MAXSIZE,
            max_string_size: NETWORKMESSAGE_MAXSIZE,
            max_packet_size: NETWORKMESSAGE_MAXSIZE,
        }
    }
}

impl BufferLimits {
    #[must_use]
    pub const fn new(max_message_size: usize, max_string_size: usize, max_packet_size: usize) -> Self {
        Self {
            max_message_size,
            max_string_size,
            max_packet_size,
        }
    }

    /// Parses limits from a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let parsed = toml::from_str::<Self>(content)?;
        parsed.validate()?;
        Ok(parsed)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Checks that the limits describe a buffer the frame header can address.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_message_size > usize::from(u16::MAX) {
            return Err(ConfigError::Invalid(format!(
                "max_message_size {} does not fit the u16 length header",
                self.max_message_size
            )));
        }
        if self.max_message_size <= INITIAL_BUFFER_POSITION {
            return Err(ConfigError::Invalid(format!(
                "max_message_size {} leaves no room after the {INITIAL_BUFFER_POSITION}-byte header",
                self.max_message_size
            )));
        }
        if self.max_string_size > self.max_message_size {
            return Err(ConfigError::Invalid(format!(
                "max_string_size {} exceeds max_message_size {}",
                self.max_string_size, self.max_message_size
            )));
        }
        if self.max_packet_size > self.max_message_size {
            return Err(ConfigError::Invalid(format!(
                "max_packet_size {} exceeds max_message_size {}",
                self.max_packet_size, self.max_message_size
            )));
        }
        Ok(())
    }
}
