/// Certification integration tests
///
/// Wipe a target, issue a signed certificate from the frozen report, persist it
/// and verify it again from disk with only the exported public key.
#[path = "common/mod.rs"]
mod common;

use common::mock_target::{Faults, MockTarget};
use common::test_helpers::{path_str, temp_target};
use serde_json::Value;
use tempfile::TempDir;
use wipecert::{
    CertificateConfig, CertificateGenerator, CertificateVerifier, EngineConfig, PublicKeyInfo,
    SigningKeyPair, TargetInfo, WipeCertificate, WipeEngine, WipeOptions, WipePattern, WipeReport,
    WipeStatus,
};

fn config() -> CertificateConfig {
    CertificateConfig {
        operator: "tech-07".to_string(),
        organization: "Acme Recycling".to_string(),
        ..CertificateConfig::default()
    }
}

fn completed_file_report() -> WipeReport {
    let file = temp_target(8192, 0x5A);
    let engine = WipeEngine::new(EngineConfig::default());
    let report = engine
        .wipe(path_str(&file), WipePattern::NistPurge, &WipeOptions::default())
        .unwrap();
    assert_eq!(report.status(), WipeStatus::Completed);
    report
}

#[test]
fn test_wipe_issue_verify_end_to_end() {
    let report = completed_file_report();
    let generator = CertificateGenerator::new(config()).unwrap();
    let target_info = TargetInfo {
        serial_number: Some("S3Z9NX0K".to_string()),
        model: Some("Samsung SSD 870".to_string()),
    };

    let cert = generator.issue(&report, Some(&target_info)).unwrap();

    assert!(generator.verify(&cert));
    assert_eq!(cert.status(), WipeStatus::Completed);
    assert_eq!(cert.passes_completed(), 3);
    assert_eq!(cert.bytes_wiped(), 3 * 8192);
    assert_eq!(cert.target_size_bytes(), 8192);
    assert_eq!(cert.target_serial(), Some("S3Z9NX0K"));
    assert_eq!(cert.operator(), "tech-07");
    assert_eq!(cert.compliance_standard(), "NIST SP 800-88 Rev. 1");
    assert_eq!(cert.verification_hash(), report.verification_hash());
    assert!(cert.wipe_end_time().is_some());
}

#[test]
fn test_certificate_survives_disk_round_trip() {
    let dir = TempDir::new().unwrap();
    let cert_path = dir.path().join("cert.json");
    let key_path = dir.path().join("cert.public_key.json");

    let generator = CertificateGenerator::new(config()).unwrap();
    let cert = generator.issue(&completed_file_report(), None).unwrap();
    cert.save_json(&cert_path).unwrap();
    generator.public_key_info().save_json(&key_path).unwrap();

    // a third party holds only the public key file
    let verifier = CertificateVerifier::load(&key_path).unwrap();
    let loaded = WipeCertificate::load_json(&cert_path).unwrap();

    assert_eq!(loaded, cert);
    assert!(verifier.verify(&loaded));
}

#[test]
fn test_tampered_certificate_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let cert_path = dir.path().join("cert.json");

    let generator = CertificateGenerator::new(config()).unwrap();
    let cert = generator.issue(&completed_file_report(), None).unwrap();
    cert.save_json(&cert_path).unwrap();

    let mut json: Value = serde_json::from_str(&std::fs::read_to_string(&cert_path).unwrap()).unwrap();
    json["passes_completed"] = Value::from(7);
    std::fs::write(&cert_path, serde_json::to_string_pretty(&json).unwrap()).unwrap();

    let tampered = WipeCertificate::load_json(&cert_path).unwrap();
    assert_eq!(tampered.passes_completed(), 7);
    assert!(!generator.verify(&tampered));
}

#[test]
fn test_certificate_file_with_injected_field_fails_to_load() {
    let dir = TempDir::new().unwrap();
    let cert_path = dir.path().join("cert.json");

    let generator = CertificateGenerator::new(config()).unwrap();
    let cert = generator.issue(&completed_file_report(), None).unwrap();
    cert.save_json(&cert_path).unwrap();

    let mut json: Value = serde_json::from_str(&std::fs::read_to_string(&cert_path).unwrap()).unwrap();
    json["approved_by"] = Value::from("Chief Auditor");
    std::fs::write(&cert_path, serde_json::to_string_pretty(&json).unwrap()).unwrap();

    // the hash cannot commit to keys outside the field set, so they never load
    assert!(WipeCertificate::load_json(&cert_path).is_err());
}

#[test]
fn test_verification_is_repeatable() {
    let generator = CertificateGenerator::new(config()).unwrap();
    let cert = generator.issue(&completed_file_report(), None).unwrap();

    let first = cert.compute_hash().unwrap();
    assert_eq!(first, cert.certificate_hash());
    for _ in 0..3 {
        assert!(generator.verify(&cert));
        assert_eq!(cert.compute_hash().unwrap(), first);
    }
}

#[test]
fn test_other_key_does_not_verify() {
    let generator = CertificateGenerator::new(config()).unwrap();
    let cert = generator.issue(&completed_file_report(), None).unwrap();

    let stranger = SigningKeyPair::generate().unwrap().public_key_info();
    assert!(!cert.verify_with(&stranger));
}

#[test]
fn test_persisted_key_signs_across_generators() {
    let dir = TempDir::new().unwrap();
    let key_path = dir.path().join("signing.pem");
    SigningKeyPair::generate().unwrap().save_pem_file(&key_path).unwrap();

    let cfg = CertificateConfig {
        private_key_path: Some(key_path),
        ..config()
    };
    let issuer = CertificateGenerator::new(cfg.clone()).unwrap();
    let cert = issuer.issue(&completed_file_report(), None).unwrap();

    let later = CertificateGenerator::new(cfg).unwrap();
    assert_eq!(later.public_key_info(), issuer.public_key_info());
    assert!(later.verify(&cert));
}

#[test]
fn test_exported_public_key_json_shape() {
    let generator = CertificateGenerator::new(config()).unwrap();
    let json: Value = serde_json::from_str(&generator.public_key_info().to_json_pretty().unwrap()).unwrap();

    assert_eq!(json["scheme"], "ecdsa-p256-sha256");
    assert!(json["public_key"].as_str().unwrap().chars().all(|c| c.is_ascii_hexdigit()));

    let parsed: PublicKeyInfo = serde_json::from_value(json).unwrap();
    assert_eq!(parsed, generator.public_key_info());
}

#[test]
fn test_cancelled_wipe_can_be_certified() {
    let target = MockTarget::new("mock://cancelled", 4096, 0xAB);
    let engine = WipeEngine::with_backend(target.clone(), EngineConfig::default());
    engine.cancel();

    let report = engine
        .wipe(target.name(), WipePattern::Dod3Pass, &WipeOptions::default())
        .unwrap();
    assert_eq!(report.status(), WipeStatus::Cancelled);

    let generator = CertificateGenerator::new(config()).unwrap();
    let cert = generator.issue(&report, None).unwrap();

    assert_eq!(cert.status(), WipeStatus::Cancelled);
    assert_eq!(cert.passes_completed(), 0);
    assert_eq!(cert.bytes_wiped(), 0);
    assert!(cert.verification_hash().is_none());
    assert!(generator.verify(&cert));
}

#[test]
fn test_failed_wipe_can_be_certified() {
    let target = MockTarget::new("mock://failing", 4096, 0xAB).with_faults(Faults {
        fail_write_at: Some(2),
        ..Faults::default()
    });
    let engine = WipeEngine::with_backend(target.clone(), EngineConfig::default());
    let opts = WipeOptions {
        block_size: 1024,
        ..WipeOptions::default()
    };
    let report = engine.wipe(target.name(), WipePattern::ZeroFill, &opts).unwrap();
    assert_eq!(report.status(), WipeStatus::Failed);

    let generator = CertificateGenerator::new(config()).unwrap();
    let cert = generator.issue(&report, None).unwrap();

    assert_eq!(cert.status(), WipeStatus::Failed);
    assert_eq!(cert.bytes_wiped(), 2048);
    assert!(generator.verify(&cert));

    let json: Value = serde_json::from_str(&cert.to_json_pretty().unwrap()).unwrap();
    assert_eq!(json["status"], "failed");
}
