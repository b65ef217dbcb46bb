// NIST SP 800-88 Rev. 1 overwrite schemes
//
// Clear is a single random overwrite. Purge here is the software-only
// approximation: random, zeros, random.

use super::PassSpec;

pub const NIST_PURGE_PASS_COUNT: u32 = 3;

/// Repeated single random pass, truncated to one pass by the engine
pub const NIST_CLEAR: PassSpec = PassSpec::Random;

pub const NIST_PURGE: [PassSpec; 3] = [PassSpec::Random, PassSpec::Fill(0x00), PassSpec::Random];
