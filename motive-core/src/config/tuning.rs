//! Persisted tuning data
//!
//! A [`ProfileConfig`] wrapped with a magic number and a version so it can
//! be written to flash (or a file) and validated when loaded on boot.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::types::ProfileConfig;

/// Magic number to identify valid tuning data
pub const TUNING_MAGIC: u32 = 0x4D4F5456; // "MOTV"

/// Current tuning data version
pub const TUNING_VERSION: u8 = 1;

/// Upper bound on the encoded size of a [`TuningRecord`]
pub const MAX_TUNING_RECORD_SIZE: usize = 128;

/// Errors from encoding or decoding tuning data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Buffer too small or value not representable
    Serialize,
    /// Bytes are not a tuning record
    Deserialize,
    /// Magic or version does not match this build
    VersionMismatch,
}

/// Versioned tuning record
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TuningRecord {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u8,
    pub profile: ProfileConfig,
}

impl Default for TuningRecord {
    fn default() -> Self {
        Self::new(ProfileConfig::default())
    }
}

impl TuningRecord {
    /// Wrap a configuration with the current magic and version
    pub const fn new(profile: ProfileConfig) -> Self {
        Self {
            magic: TUNING_MAGIC,
            version: TUNING_VERSION,
            profile,
        }
    }

    /// Check if the header matches this build
    pub fn is_valid(&self) -> bool {
        self.magic == TUNING_MAGIC && self.version == TUNING_VERSION
    }

    /// Serialize into `buf`, returning the used prefix
    #[cfg(feature = "serde")]
    pub fn encode<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        postcard::to_slice(self, buf).map_err(|_| ConfigError::Serialize)
    }

    /// Deserialize and validate a record
    #[cfg(feature = "serde")]
    pub fn decode(bytes: &[u8]) -> Result<Self, ConfigError> {
        let record: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)?;
        if !record.is_valid() {
            warn!(
                "tuning record rejected: magic {=u32:#x} version {=u8}",
                record.magic,
                record.version
            );
            return Err(ConfigError::VersionMismatch);
        }
        Ok(record)
    }
}
