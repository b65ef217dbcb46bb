pub mod certificates;
pub mod keys;
pub mod secure_rng;

#[cfg(test)]
mod secure_rng_tests;

pub use certificates::{CertificateGenerator, CertificateVerifier, TargetInfo, WipeCertificate};
pub use keys::{PublicKeyInfo, SignatureScheme, SigningKeyPair};
pub use secure_rng::secure_random_bytes;
