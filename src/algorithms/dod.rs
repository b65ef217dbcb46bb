use super::PassSpec;

/// DoD 5220.22-M pass 1 pattern (all zeros)
pub const PASS_1_PATTERN: u8 = 0x00;

/// DoD 5220.22-M pass 2 pattern (all ones)
pub const PASS_2_PATTERN: u8 = 0xFF;

pub const DOD_3_PASS_COUNT: u32 = 3;
pub const DOD_7_PASS_COUNT: u32 = 7;

/// Zeros, ones, random
pub const DOD_3_PASS: [PassSpec; 3] = [
    PassSpec::Fill(PASS_1_PATTERN),
    PassSpec::Fill(PASS_2_PATTERN),
    PassSpec::Random,
];

/// Extended 7-pass variant. Pass 6 repeats the zero fill before the final
/// random pass; the sequence is kept exactly for certificate compatibility.
pub const DOD_7_PASS: [PassSpec; 7] = [
    PassSpec::Fill(PASS_1_PATTERN),
    PassSpec::Fill(PASS_2_PATTERN),
    PassSpec::Fill(0x92), // 10010010
    PassSpec::Fill(0x49), // 01001001
    PassSpec::Fill(0x24), // 00100100
    PassSpec::Fill(PASS_1_PATTERN),
    PassSpec::Random,
];
