// Lazy pass-block generator
//
// One yielded block represents one full-target sweep: the engine tiles it
// (or, for random passes, refreshes it) across every block of the pass.

use super::gutmann::tile_pattern;
use super::{PassSpec, Schedule, WipePattern};
use crate::crypto::secure_rng::SecureRng;
use crate::CoreResult;
use std::fmt;

/// Default bytes per yielded block
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// Largest block the engine will allocate for one pass
pub const MAX_BLOCK_SIZE: usize = 64 * 1024 * 1024;

/// Pattern data for one pass.
pub struct PassBlock {
    pass_number: u32,
    spec: PassSpec,
    data: Vec<u8>,
}

impl PassBlock {
    fn build(
        pass_number: u32,
        spec: PassSpec,
        block_size: usize,
        rng: &mut SecureRng,
    ) -> CoreResult<Self> {
        let mut data = vec![0u8; block_size];
        match spec {
            PassSpec::Fill(byte) => data.fill(byte),
            PassSpec::Tiled(pattern) => tile_pattern(&mut data, pattern),
            PassSpec::Random => rng.fill_bytes(&mut data)?,
        }

        Ok(Self {
            pass_number,
            spec,
            data,
        })
    }

    /// 1-based pass number within the scheme
    pub fn pass_number(&self) -> u32 {
        self.pass_number
    }

    pub fn spec(&self) -> PassSpec {
        self.spec
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_random(&self) -> bool {
        matches!(self.spec, PassSpec::Random)
    }

    /// Draw fresh random content for the next block of a random pass.
    /// Fixed patterns are left untouched.
    pub fn refresh(&mut self, rng: &mut SecureRng) -> CoreResult<()> {
        if self.is_random() {
            rng.fill_bytes(&mut self.data)?;
        }
        Ok(())
    }

    /// Short human-readable label ("0x00", "random", "0x92 0x49 0x24")
    pub fn label(&self) -> String {
        match self.spec {
            PassSpec::Fill(byte) => format!("0x{:02X}", byte),
            PassSpec::Tiled(pattern) => pattern
                .iter()
                .map(|b| format!("0x{:02X}", b))
                .collect::<Vec<_>>()
                .join(" "),
            PassSpec::Random => "random".to_string(),
        }
    }
}

impl fmt::Debug for PassBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PassBlock")
            .field("pass_number", &self.pass_number)
            .field("spec", &self.spec)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Ordered, restartable sequence of pass blocks for a scheme.
///
/// Finite schemes yield exactly their declared passes. Fill and random
/// schemes never end; the consumer stops at [`WipePattern::pass_count`].
pub struct PatternGenerator {
    pattern: WipePattern,
    block_size: usize,
    next_pass: usize,
    rng: SecureRng,
}

impl PatternGenerator {
    pub fn new(pattern: WipePattern, block_size: usize) -> Self {
        Self {
            pattern,
            block_size,
            next_pass: 0,
            rng: SecureRng::new(),
        }
    }

    /// Resolve a scheme by name. Fails with `UnsupportedPattern` for unknown names.
    pub fn from_name(name: &str, block_size: usize) -> CoreResult<Self> {
        Ok(Self::new(name.parse()?, block_size))
    }

    pub fn pattern(&self) -> WipePattern {
        self.pattern
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }
}

impl Iterator for PatternGenerator {
    type Item = CoreResult<PassBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        let spec = match self.pattern.schedule() {
            Schedule::Finite(passes) => *passes.get(self.next_pass)?,
            Schedule::Repeating(spec) => spec,
        };
        self.next_pass += 1;

        Some(PassBlock::build(
            self.next_pass as u32,
            spec,
            self.block_size,
            &mut self.rng,
        ))
    }
}
