use crate::{CoreResult, WipeError};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};

/// Outputs shorter than this are not compared by the continuous test
const CONTINUOUS_TEST_MIN_LEN: usize = 16;

/// Cryptographically secure random source for random wipe passes.
///
/// Backed by the OS CSPRNG through `ring`. Every output of at least 16 bytes
/// goes through a FIPS 140-2 style continuous test: two consecutive
/// identical outputs mark the generator unhealthy and fail the request.
pub struct SecureRng {
    rng: SystemRandom,
    continuous_test: ContinuousTest,
}

/// FIPS 140-2 continuous random number generator test state
#[derive(Debug, Default)]
pub struct ContinuousTest {
    last_digest: Option<[u8; 32]>,
    failures: u64,
}

impl ContinuousTest {
    /// Record an output. Returns false when it repeats the previous one.
    pub fn check(&mut self, output: &[u8]) -> bool {
        if output.len() < CONTINUOUS_TEST_MIN_LEN {
            return true;
        }

        let digest: [u8; 32] = Sha256::digest(output).into();
        let repeated = self.last_digest == Some(digest);
        self.last_digest = Some(digest);

        if repeated {
            self.failures += 1;
        }
        !repeated
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }
}

impl Default for SecureRng {
    fn default() -> Self {
        Self::new()
    }
}

impl SecureRng {
    pub fn new() -> Self {
        Self {
            rng: SystemRandom::new(),
            continuous_test: ContinuousTest::default(),
        }
    }

    /// Fill `dest` with random bytes
    pub fn fill_bytes(&mut self, dest: &mut [u8]) -> CoreResult<()> {
        self.rng
            .fill(dest)
            .map_err(|_| WipeError::Rng("system random source failed".to_string()))?;

        if !self.continuous_test.check(dest) {
            tracing::error!(len = dest.len(), "RNG continuous test failed: repeated output");
            return Err(WipeError::Rng(
                "continuous test failed: consecutive outputs are identical".to_string(),
            ));
        }

        Ok(())
    }

    pub fn is_healthy(&self) -> bool {
        self.continuous_test.failures() == 0
    }
}

/// One-shot secure random fill
pub fn secure_random_bytes(dest: &mut [u8]) -> CoreResult<()> {
    SystemRandom::new()
        .fill(dest)
        .map_err(|_| WipeError::Rng("system random source failed".to_string()))
}
