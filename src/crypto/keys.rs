// Signing key management
//
// Certificates are signed with either ECDSA P-256 (generated here) or RSA-PSS
// (loaded from PKCS#8). Both schemes use randomized signatures.

use crate::{CoreResult, WipeError};
use pem::{EncodeConfig, LineEnding, Pem};
use ring::rand::SystemRandom;
use ring::signature::{
    EcdsaKeyPair, KeyPair, RsaKeyPair, UnparsedPublicKey, ECDSA_P256_SHA256_ASN1,
    ECDSA_P256_SHA256_ASN1_SIGNING, RSA_PSS_2048_8192_SHA256, RSA_PSS_SHA256,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

const PEM_LABEL: &str = "PRIVATE KEY";

/// Signature algorithm of a key pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureScheme {
    #[serde(rename = "ecdsa-p256-sha256")]
    EcdsaP256Sha256,
    #[serde(rename = "rsa-pss-sha256")]
    RsaPssSha256,
}

impl fmt::Display for SignatureScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureScheme::EcdsaP256Sha256 => f.write_str("ecdsa-p256-sha256"),
            SignatureScheme::RsaPssSha256 => f.write_str("rsa-pss-sha256"),
        }
    }
}

enum KeyMaterial {
    Ecdsa(EcdsaKeyPair),
    Rsa(RsaKeyPair),
}

/// Process-held private key used to sign certificates.
///
/// Read-only after construction, so one instance can sign from many threads.
pub struct SigningKeyPair {
    material: KeyMaterial,
    pkcs8: Vec<u8>,
    rng: SystemRandom,
}

impl SigningKeyPair {
    /// Generate a fresh ECDSA P-256 key
    pub fn generate() -> CoreResult<Self> {
        let rng = SystemRandom::new();
        let document = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &rng)
            .map_err(|_| WipeError::Signing("failed to generate ECDSA P-256 key".to_string()))?;
        Self::from_pkcs8_der(document.as_ref())
    }

    /// Load a PKCS#8 DER private key. ECDSA P-256 is tried first, then RSA.
    pub fn from_pkcs8_der(der: &[u8]) -> CoreResult<Self> {
        let rng = SystemRandom::new();

        let material = match EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, der, &rng) {
            Ok(pair) => KeyMaterial::Ecdsa(pair),
            Err(ecdsa_err) => match RsaKeyPair::from_pkcs8(der) {
                Ok(pair) => KeyMaterial::Rsa(pair),
                Err(rsa_err) => {
                    return Err(WipeError::Signing(format!(
                        "unsupported private key (ecdsa: {}, rsa: {})",
                        ecdsa_err, rsa_err
                    )))
                }
            },
        };

        Ok(Self {
            material,
            pkcs8: der.to_vec(),
            rng,
        })
    }

    /// Load a PEM-armoured PKCS#8 private key
    pub fn from_pem(pem: &str) -> CoreResult<Self> {
        let der = decode_pkcs8_pem(pem)?;
        Self::from_pkcs8_der(&der)
    }

    /// Load a private key file. PEM is detected by its armour; anything else is read as DER.
    pub fn load_pem_file(path: &Path) -> CoreResult<Self> {
        let bytes = std::fs::read(path)?;
        match std::str::from_utf8(&bytes) {
            Ok(text) if text.contains("-----BEGIN") => Self::from_pem(text),
            _ => Self::from_pkcs8_der(&bytes),
        }
    }

    /// PKCS#8 private key in PEM armour
    pub fn to_pkcs8_pem(&self) -> String {
        let block = Pem::new(PEM_LABEL, self.pkcs8.clone());
        pem::encode_config(&block, EncodeConfig::new().set_line_ending(LineEnding::LF))
    }

    /// Write the private key as PEM, replacing any existing file.
    ///
    /// On unix the file is owner-only (0600) before any key bytes are written.
    pub fn save_pem_file(&self, path: &Path) -> CoreResult<()> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        self.write_pem(options, path)
    }

    /// Like [`SigningKeyPair::save_pem_file`], but fails if `path` already exists
    pub fn create_pem_file(&self, path: &Path) -> CoreResult<()> {
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        self.write_pem(options, path)
    }

    #[cfg_attr(not(unix), allow(unused_mut))]
    fn write_pem(&self, mut options: OpenOptions, path: &Path) -> CoreResult<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(path)?;
        // mode() only applies on creation; an existing file keeps its bits otherwise
        restrict_to_owner(&file)?;
        file.write_all(self.to_pkcs8_pem().as_bytes())?;
        file.sync_all()?;
        Ok(())
    }

    pub fn scheme(&self) -> SignatureScheme {
        match self.material {
            KeyMaterial::Ecdsa(_) => SignatureScheme::EcdsaP256Sha256,
            KeyMaterial::Rsa(_) => SignatureScheme::RsaPssSha256,
        }
    }

    /// Sign `message`. Every call draws fresh randomness.
    pub fn sign(&self, message: &[u8]) -> CoreResult<Vec<u8>> {
        match &self.material {
            KeyMaterial::Ecdsa(pair) => pair
                .sign(&self.rng, message)
                .map(|sig| sig.as_ref().to_vec())
                .map_err(|_| WipeError::Signing("ECDSA signing failed".to_string())),
            KeyMaterial::Rsa(pair) => {
                let mut signature = vec![0u8; pair.public().modulus_len()];
                pair.sign(&RSA_PSS_SHA256, &self.rng, message, &mut signature)
                    .map_err(|_| WipeError::Signing("RSA-PSS signing failed".to_string()))?;
                Ok(signature)
            }
        }
    }

    /// Exportable public half
    pub fn public_key_info(&self) -> PublicKeyInfo {
        let public_key = match &self.material {
            KeyMaterial::Ecdsa(pair) => pair.public_key().as_ref().to_vec(),
            KeyMaterial::Rsa(pair) => pair.public_key().as_ref().to_vec(),
        };

        PublicKeyInfo {
            scheme: self.scheme(),
            public_key: hex::encode(public_key),
        }
    }
}

impl fmt::Debug for SigningKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKeyPair")
            .field("scheme", &self.scheme())
            .finish_non_exhaustive()
    }
}

/// Public key material as exported for third-party verification.
///
/// ECDSA keys are the uncompressed SEC1 point, RSA keys the DER `RSAPublicKey`,
/// both hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PublicKeyInfo {
    pub scheme: SignatureScheme,
    pub public_key: String,
}

impl PublicKeyInfo {
    /// Check `signature` over `message`. Malformed keys or signatures yield false.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        let Ok(key_bytes) = hex::decode(&self.public_key) else {
            return false;
        };

        match self.scheme {
            SignatureScheme::EcdsaP256Sha256 => {
                UnparsedPublicKey::new(&ECDSA_P256_SHA256_ASN1, &key_bytes)
                    .verify(message, signature)
                    .is_ok()
            }
            SignatureScheme::RsaPssSha256 => {
                UnparsedPublicKey::new(&RSA_PSS_2048_8192_SHA256, &key_bytes)
                    .verify(message, signature)
                    .is_ok()
            }
        }
    }

    pub fn to_json_pretty(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save_json(&self, path: &Path) -> CoreResult<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    pub fn load_json(path: &Path) -> CoreResult<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

/// DER body of the single PKCS#8 `PRIVATE KEY` block in `text`
fn decode_pkcs8_pem(text: &str) -> CoreResult<Vec<u8>> {
    let mut blocks =
        pem::parse_many(text).map_err(|e| WipeError::Signing(format!("invalid PEM: {}", e)))?;

    if blocks.len() != 1 {
        return Err(WipeError::Signing(format!(
            "expected exactly one PEM block, found {}",
            blocks.len()
        )));
    }

    let block = blocks.remove(0);
    if block.tag() != PEM_LABEL {
        return Err(WipeError::Signing(format!(
            "expected a PKCS#8 '{}' block, found '{}'",
            PEM_LABEL,
            block.tag()
        )));
    }

    Ok(block.into_contents())
}

#[cfg(unix)]
fn restrict_to_owner(file: &File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_to_owner(_file: &File) -> std::io::Result<()> {
    Ok(())
}
