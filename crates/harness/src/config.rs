// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Harness configuration loaded from TOML files or constructed
//! programmatically.
//!
//! # TOML Format
//! ```toml
//! arena_capacity = 65536
//! pool_block_size = 128
//! pool_block_count = 32
//! frame_size = 1504
//! repetitions = 100
//!
//! [frag]
//! version = 1
//! dest_eid = 16
//! source_eid = 32
//! ```

use std::path::Path;

use frag_engine::FragConfig;
use ncsi_frame::{NCSI_HEADERS_SIZE, NCSI_PACKET_MAX_SIZE};

use crate::HarnessError;

/// Configuration for the measurement harness and its cases.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Bytes in each case's bump arena.
    pub arena_capacity: usize,
    /// Block size of the message queue case's pool.
    pub pool_block_size: usize,
    /// Block count of the message queue case's pool.
    pub pool_block_count: usize,
    /// NC-SI frame size staged by the fragmentation cases.
    pub frame_size: usize,
    /// Measured repetitions per `run` invocation.
    pub repetitions: u32,
    /// MCTP identity defaults for the engines.
    pub frag: FragConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            arena_capacity: 64 * 1024,
            pool_block_size: 128,
            pool_block_count: 32,
            frame_size: NCSI_PACKET_MAX_SIZE,
            repetitions: 100,
            frag: FragConfig::default(),
        }
    }
}

impl HarnessConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HarnessError::ConfigError(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string and validates it.
    pub fn from_toml(toml_str: &str) -> Result<Self, HarnessError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| HarnessError::ConfigError(format!("TOML parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, HarnessError> {
        toml::to_string_pretty(self)
            .map_err(|e| HarnessError::ConfigError(format!("TOML serialise error: {e}")))
    }

    /// Checks the parameter ranges the cases rely on.
    pub fn validate(&self) -> Result<(), HarnessError> {
        if self.pool_block_size == 0 || self.pool_block_count == 0 {
            return Err(HarnessError::ConfigError(
                "pool_block_size and pool_block_count must be non-zero".into(),
            ));
        }
        if self.frame_size <= NCSI_HEADERS_SIZE || self.frame_size > NCSI_PACKET_MAX_SIZE {
            return Err(HarnessError::ConfigError(format!(
                "frame_size {} out of range ({}..={})",
                self.frame_size,
                NCSI_HEADERS_SIZE + 1,
                NCSI_PACKET_MAX_SIZE
            )));
        }
        if self.repetitions == 0 {
            return Err(HarnessError::ConfigError("repetitions must be >= 1".into()));
        }
        let pool_bytes = self.pool_block_size * self.pool_block_count;
        if self.arena_capacity < pool_bytes + 2 * NCSI_PACKET_MAX_SIZE {
            return Err(HarnessError::ConfigError(format!(
                "arena_capacity {} too small for the configured pool and frames",
                self.arena_capacity
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(HarnessConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
arena_capacity = 32768
frame_size = 512
repetitions = 10
"#;
        let c = HarnessConfig::from_toml(toml).unwrap();
        assert_eq!(c.arena_capacity, 32768);
        assert_eq!(c.frame_size, 512);
        assert_eq!(c.repetitions, 10);
        // Unspecified fields keep defaults.
        assert_eq!(c.pool_block_size, 128);
        assert_eq!(c.frag.dest_eid, 0x10);
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let c = HarnessConfig::default();
        let toml = c.to_toml().unwrap();
        let back = HarnessConfig::from_toml(&toml).unwrap();
        assert_eq!(back.arena_capacity, c.arena_capacity);
        assert_eq!(back.frame_size, c.frame_size);
    }

    #[test]
    fn test_rejects_bad_frame_size() {
        let c = HarnessConfig {
            frame_size: 26,
            ..Default::default()
        };
        assert!(c.validate().is_err());

        let c = HarnessConfig {
            frame_size: NCSI_PACKET_MAX_SIZE + 1,
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_pool() {
        let c = HarnessConfig {
            pool_block_count: 0,
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_rejects_undersized_arena() {
        let c = HarnessConfig {
            arena_capacity: 1024,
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }
}
