pub mod dod;
pub mod generator;
pub mod gutmann;
pub mod nist;
pub mod random;
pub mod zero;

#[cfg(test)]
mod dod_test;

pub use generator::{PassBlock, PatternGenerator, DEFAULT_BLOCK_SIZE, MAX_BLOCK_SIZE};

use crate::WipeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named wipe scheme.
///
/// Every scheme declares its pass count statically in [`WipePattern::pass_count`];
/// the engine never infers it from the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WipePattern {
    #[serde(rename = "zero_fill")]
    ZeroFill,
    #[serde(rename = "one_fill")]
    OneFill,
    #[serde(rename = "random")]
    Random,
    #[serde(rename = "dod_3_pass")]
    Dod3Pass,
    #[serde(rename = "dod_7_pass")]
    Dod7Pass,
    #[serde(rename = "gutmann")]
    Gutmann,
    #[serde(rename = "nist_clear")]
    NistClear,
    #[serde(rename = "nist_purge")]
    NistPurge,
}

/// What a single pass writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassSpec {
    /// Single byte repeated across the block
    Fill(u8),
    /// Multi-byte pattern tiled across the block, last tile truncated
    Tiled(&'static [u8]),
    /// Cryptographically secure random data
    Random,
}

/// Pass sequence of a scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Exactly these passes, in order
    Finite(&'static [PassSpec]),
    /// The same pass forever; truncated by the engine at the declared count
    Repeating(PassSpec),
}

impl WipePattern {
    pub const ALL: [WipePattern; 8] = [
        WipePattern::ZeroFill,
        WipePattern::OneFill,
        WipePattern::Random,
        WipePattern::Dod3Pass,
        WipePattern::Dod7Pass,
        WipePattern::Gutmann,
        WipePattern::NistClear,
        WipePattern::NistPurge,
    ];

    /// Canonical scheme name as used on the command line and in certificates
    pub fn as_str(&self) -> &'static str {
        match self {
            WipePattern::ZeroFill => "zero_fill",
            WipePattern::OneFill => "one_fill",
            WipePattern::Random => "random",
            WipePattern::Dod3Pass => "dod_3_pass",
            WipePattern::Dod7Pass => "dod_7_pass",
            WipePattern::Gutmann => "gutmann",
            WipePattern::NistClear => "nist_clear",
            WipePattern::NistPurge => "nist_purge",
        }
    }

    /// Declared number of passes for this scheme
    pub const fn pass_count(&self) -> u32 {
        match self {
            WipePattern::ZeroFill => 1,
            WipePattern::OneFill => 1,
            WipePattern::Random => 1,
            WipePattern::Dod3Pass => dod::DOD_3_PASS_COUNT,
            WipePattern::Dod7Pass => dod::DOD_7_PASS_COUNT,
            WipePattern::Gutmann => gutmann::GUTMANN_PASS_COUNT,
            WipePattern::NistClear => 1,
            WipePattern::NistPurge => nist::NIST_PURGE_PASS_COUNT,
        }
    }

    /// Pass sequence produced by the generator for this scheme
    pub fn schedule(&self) -> Schedule {
        match self {
            WipePattern::ZeroFill => Schedule::Repeating(zero::ZERO_FILL),
            WipePattern::OneFill => Schedule::Repeating(zero::ONE_FILL),
            WipePattern::Random => Schedule::Repeating(random::RANDOM_FILL),
            WipePattern::Dod3Pass => Schedule::Finite(&dod::DOD_3_PASS),
            WipePattern::Dod7Pass => Schedule::Finite(&dod::DOD_7_PASS),
            WipePattern::Gutmann => Schedule::Finite(&gutmann::GUTMANN_PASSES),
            WipePattern::NistClear => Schedule::Repeating(nist::NIST_CLEAR),
            WipePattern::NistPurge => Schedule::Finite(&nist::NIST_PURGE),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            WipePattern::ZeroFill => "Single pass with zeros (0x00)",
            WipePattern::OneFill => "Single pass with ones (0xFF)",
            WipePattern::Random => "Single pass with random data",
            WipePattern::Dod3Pass => "DoD 5220.22-M 3-pass method",
            WipePattern::Dod7Pass => "DoD 5220.22-M 7-pass method",
            WipePattern::Gutmann => "Gutmann 35-pass method (legacy)",
            WipePattern::NistClear => "NIST SP 800-88 Clear method",
            WipePattern::NistPurge => "NIST SP 800-88 Purge method",
        }
    }

    /// Suggested scheme for a storage class.
    ///
    /// Flash media get a single random pass since wear leveling defeats
    /// repeated overwrites; spinning disks get the 3-pass purge.
    pub fn recommended_for(storage_type: &str) -> WipePattern {
        match storage_type.trim().to_ascii_lowercase().as_str() {
            "ssd" | "nvme" | "flash" => WipePattern::NistClear,
            "hdd" | "hard_disk" => WipePattern::NistPurge,
            _ => WipePattern::NistClear,
        }
    }
}

impl Default for WipePattern {
    fn default() -> Self {
        WipePattern::NistClear
    }
}

impl fmt::Display for WipePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WipePattern {
    type Err = WipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        WipePattern::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| WipeError::UnsupportedPattern(s.to_string()))
    }
}
