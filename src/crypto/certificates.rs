use crate::crypto::keys::{PublicKeyInfo, SigningKeyPair};
use crate::crypto::secure_rng::secure_random_bytes;
use crate::settings::CertificateConfig;
use crate::wipe_engine::{WipeReport, WipeStatus};
use crate::{CoreResult, WipeError, WipePattern};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;

pub const CERTIFICATE_VERSION: &str = "1.0";

/// Optional identifying metadata about the wiped device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetInfo {
    pub serial_number: Option<String>,
    pub model: Option<String>,
}

/// Signed record of a finished wipe.
///
/// `certificate_hash` commits to every other field; `digital_signature` signs the
/// hex text of that hash. Instances are only produced by [`CertificateGenerator::issue`]
/// or by deserializing a saved document, and are never mutated afterwards.
/// Documents carrying keys outside this field set are rejected on load, since
/// the hash could not commit to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WipeCertificate {
    certificate_id: String,
    target_path: String,
    target_serial: Option<String>,
    target_model: Option<String>,
    target_size_bytes: u64,
    wipe_pattern: WipePattern,
    wipe_start_time: String,
    wipe_end_time: Option<String>,
    wipe_duration_seconds: f64,
    bytes_wiped: u64,
    passes_completed: u32,
    verification_hash: Option<String>,
    status: WipeStatus,
    operator: String,
    organization: String,
    compliance_standard: String,
    certificate_hash: String,
    digital_signature: String,
    created_at: String,
    version: String,
}

impl WipeCertificate {
    pub fn certificate_id(&self) -> &str {
        &self.certificate_id
    }

    pub fn target_path(&self) -> &str {
        &self.target_path
    }

    pub fn target_serial(&self) -> Option<&str> {
        self.target_serial.as_deref()
    }

    pub fn target_model(&self) -> Option<&str> {
        self.target_model.as_deref()
    }

    pub fn target_size_bytes(&self) -> u64 {
        self.target_size_bytes
    }

    pub fn wipe_pattern(&self) -> WipePattern {
        self.wipe_pattern
    }

    pub fn wipe_start_time(&self) -> &str {
        &self.wipe_start_time
    }

    pub fn wipe_end_time(&self) -> Option<&str> {
        self.wipe_end_time.as_deref()
    }

    pub fn wipe_duration_seconds(&self) -> f64 {
        self.wipe_duration_seconds
    }

    pub fn bytes_wiped(&self) -> u64 {
        self.bytes_wiped
    }

    pub fn passes_completed(&self) -> u32 {
        self.passes_completed
    }

    pub fn verification_hash(&self) -> Option<&str> {
        self.verification_hash.as_deref()
    }

    pub fn status(&self) -> WipeStatus {
        self.status
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub fn compliance_standard(&self) -> &str {
        &self.compliance_standard
    }

    pub fn certificate_hash(&self) -> &str {
        &self.certificate_hash
    }

    pub fn digital_signature(&self) -> &str {
        &self.digital_signature
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// SHA-256 (hex) of the canonical form: key-sorted compact JSON of every
    /// field except `certificate_hash` and `digital_signature`.
    pub fn compute_hash(&self) -> CoreResult<String> {
        let mut fields = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => {
                return Err(WipeError::Signing(
                    "certificate did not serialize to a JSON object".to_string(),
                ))
            }
        };
        fields.remove("certificate_hash");
        fields.remove("digital_signature");

        let sorted: BTreeMap<String, Value> = fields.into_iter().collect();
        let canonical = serde_json::to_string(&sorted)?;

        Ok(hex::encode(Sha256::digest(canonical.as_bytes())))
    }

    /// Recompute the hash and check the signature against `public_key`
    pub fn verify_with(&self, public_key: &PublicKeyInfo) -> bool {
        let expected = match self.compute_hash() {
            Ok(hash) => hash,
            Err(e) => {
                tracing::debug!(error = %e, "failed to canonicalize certificate");
                return false;
            }
        };

        if expected != self.certificate_hash {
            tracing::debug!(
                certificate_id = %self.certificate_id,
                "certificate hash mismatch"
            );
            return false;
        }

        match hex::decode(&self.digital_signature) {
            Ok(signature) => public_key.verify(self.certificate_hash.as_bytes(), &signature),
            Err(_) => false,
        }
    }

    pub fn to_json_pretty(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save_json(&self, path: &Path) -> CoreResult<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    pub fn load_json(path: &Path) -> CoreResult<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }
}

/// Issues signed certificates from frozen wipe reports
pub struct CertificateGenerator {
    config: CertificateConfig,
    key: SigningKeyPair,
}

impl CertificateGenerator {
    /// Build from config. The configured private key is loaded when the file
    /// exists; otherwise a fresh ECDSA P-256 key is generated for this process.
    pub fn new(config: CertificateConfig) -> CoreResult<Self> {
        let key = match config.private_key_path.as_deref() {
            Some(path) if path.exists() => {
                tracing::info!(path = %path.display(), "Loading certificate signing key");
                SigningKeyPair::load_pem_file(path)?
            }
            Some(path) => {
                tracing::warn!(
                    path = %path.display(),
                    "Signing key not found, generating an ephemeral key"
                );
                SigningKeyPair::generate()?
            }
            None => {
                tracing::info!("No signing key configured, generating an ephemeral key");
                SigningKeyPair::generate()?
            }
        };

        Ok(Self::with_key(config, key))
    }

    pub fn with_key(config: CertificateConfig, key: SigningKeyPair) -> Self {
        Self { config, key }
    }

    pub fn public_key_info(&self) -> PublicKeyInfo {
        self.key.public_key_info()
    }

    pub fn signing_key(&self) -> &SigningKeyPair {
        &self.key
    }

    /// Verifier holding only the public half of this generator's key
    pub fn verifier(&self) -> CertificateVerifier {
        CertificateVerifier::from_public_key(self.public_key_info())
    }

    /// Create, hash and sign a certificate for a terminal wipe report
    pub fn issue(
        &self,
        report: &WipeReport,
        target_info: Option<&TargetInfo>,
    ) -> CoreResult<WipeCertificate> {
        let info = target_info.cloned().unwrap_or_default();
        let created_at = Utc::now();

        let mut certificate = WipeCertificate {
            certificate_id: generate_certificate_id(created_at)?,
            target_path: report.target().to_string(),
            target_serial: info.serial_number,
            target_model: info.model,
            target_size_bytes: report.total_bytes(),
            wipe_pattern: report.pattern(),
            wipe_start_time: format_timestamp(report.start_time()),
            wipe_end_time: report.end_time().map(format_timestamp),
            wipe_duration_seconds: report.duration_seconds(),
            bytes_wiped: report.bytes_wiped(),
            passes_completed: report.passes_completed(),
            verification_hash: report.verification_hash().map(str::to_string),
            status: report.status(),
            operator: self.config.operator.clone(),
            organization: self.config.organization.clone(),
            compliance_standard: self.config.compliance_standard.clone(),
            certificate_hash: String::new(),
            digital_signature: String::new(),
            created_at: format_timestamp(created_at),
            version: CERTIFICATE_VERSION.to_string(),
        };

        certificate.certificate_hash = certificate.compute_hash()?;
        let signature = self.key.sign(certificate.certificate_hash.as_bytes())?;
        certificate.digital_signature = hex::encode(signature);

        tracing::info!(
            certificate_id = %certificate.certificate_id,
            target = %certificate.target_path,
            status = %certificate.status,
            scheme = %self.key.scheme(),
            "Issued wipe certificate"
        );

        Ok(certificate)
    }

    /// Verify with this generator's public key. Never errors.
    pub fn verify(&self, certificate: &WipeCertificate) -> bool {
        certificate.verify_with(&self.public_key_info())
    }
}

/// Third-party verification from exported public key material
#[derive(Debug, Clone)]
pub struct CertificateVerifier {
    public_key: PublicKeyInfo,
}

impl CertificateVerifier {
    pub fn from_public_key(public_key: PublicKeyInfo) -> Self {
        Self { public_key }
    }

    pub fn load(public_key_path: &Path) -> CoreResult<Self> {
        Ok(Self::from_public_key(PublicKeyInfo::load_json(public_key_path)?))
    }

    pub fn public_key(&self) -> &PublicKeyInfo {
        &self.public_key
    }

    pub fn verify(&self, certificate: &WipeCertificate) -> bool {
        certificate.verify_with(&self.public_key)
    }
}

/// `WC-<UTC yyyymmddHHMMSS>-<16 uppercase hex>`
fn generate_certificate_id(now: DateTime<Utc>) -> CoreResult<String> {
    let mut random = [0u8; 8];
    secure_random_bytes(&mut random)?;
    Ok(format!(
        "WC-{}-{}",
        now.format("%Y%m%d%H%M%S"),
        hex::encode_upper(random)
    ))
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}
