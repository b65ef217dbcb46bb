use super::PassSpec;

pub const GUTMANN_PASS_COUNT: u32 = 35;

/// Fixed Gutmann byte patterns, one per pass.
pub(crate) const GUTMANN_PATTERNS: [&[u8]; 35] = [
    &[0x55], &[0xAA], &[0x92], &[0x49], &[0x24], &[0x00], &[0x11],
    &[0x22], &[0x33], &[0x44], &[0x55], &[0x66], &[0x77], &[0x88],
    &[0x99], &[0xAA], &[0xBB], &[0xCC], &[0xDD], &[0xEE], &[0xFF],
    &[0x92], &[0x49], &[0x24], &[0x12], &[0xED], &[0xB8], &[0x74],
    &[0x36], &[0x1B], &[0x8D], &[0xC4], &[0x62], &[0x31], &[0x18],
];

/// Each pattern tiled across the block
pub const GUTMANN_PASSES: [PassSpec; 35] = {
    let mut passes = [PassSpec::Random; 35];
    let mut i = 0;
    while i < GUTMANN_PATTERNS.len() {
        passes[i] = PassSpec::Tiled(GUTMANN_PATTERNS[i]);
        i += 1;
    }
    passes
};

/// Fill `buf` with `pattern` repeated, truncating the last tile.
pub(crate) fn tile_pattern(buf: &mut [u8], pattern: &[u8]) {
    if pattern.is_empty() {
        return;
    }
    for chunk in buf.chunks_mut(pattern.len()) {
        chunk.copy_from_slice(&pattern[..chunk.len()]);
    }
}
