// Single-byte fill schemes
//
// Fast, simple overwrite with a constant byte. Not suitable for high-security
// requirements but useful for quick sanitization and preparing media for
// reuse inside the same organization.

use super::PassSpec;

pub const ZERO_FILL: PassSpec = PassSpec::Fill(0x00);

pub const ONE_FILL: PassSpec = PassSpec::Fill(0xFF);
