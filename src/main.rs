use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use wipecert::ui::{human_bytes, ProgressBar};
use wipecert::{
    AppConfig, CertificateGenerator, CertificateVerifier, FileBackend, ProgressEvent,
    SigningKeyPair, TargetBackend, TargetInfo, WipeCertificate, WipeEngine, WipeError,
    WipeOptions, WipePattern, WipeReport, WipeStatus,
};

const PROGRESS_REDRAW_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "wipecert")]
#[command(about = "Secure data wiping with signed, independently verifiable wipe certificates")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML); defaults to the platform config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter directive (e.g. "debug", "wipecert=trace")
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available wipe patterns
    Patterns,

    /// Show size and recommended pattern for a target
    Info {
        /// File or block device path
        target: String,

        /// Storage class used for the recommendation (ssd, nvme, hdd, ...)
        #[arg(long, default_value = "unknown")]
        storage_type: String,
    },

    /// Wipe a target and issue a signed certificate
    Wipe {
        /// File or block device path (e.g., /dev/sdb)
        target: String,

        /// Wipe pattern (see `wipecert patterns`)
        #[arg(short, long, default_value = "nist_clear")]
        pattern: String,

        /// Block size in bytes
        #[arg(short, long)]
        block_size: Option<usize>,

        /// Skip post-wipe verification hash
        #[arg(long)]
        no_verify: bool,

        /// Do not issue a certificate
        #[arg(long)]
        no_certificate: bool,

        /// Certificate output path
        #[arg(short = 'o', long)]
        cert_output: Option<PathBuf>,

        /// Public key output path (defaults next to the certificate)
        #[arg(long)]
        public_key_output: Option<PathBuf>,

        /// Device serial number recorded in the certificate
        #[arg(long)]
        serial: Option<String>,

        /// Device model recorded in the certificate
        #[arg(long)]
        model: Option<String>,

        /// Operator name recorded in the certificate
        #[arg(long)]
        operator: Option<String>,

        /// Organization recorded in the certificate
        #[arg(long)]
        organization: Option<String>,

        /// PKCS#8 signing key (PEM or DER)
        #[arg(short, long)]
        key: Option<PathBuf>,

        /// Delete the file after a completed wipe
        #[arg(long)]
        remove: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Disable the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Verify a certificate with an exported public key
    VerifyCert {
        /// Certificate JSON file
        certificate: PathBuf,

        /// Public key JSON file
        #[arg(long)]
        public_key: PathBuf,
    },

    /// Generate a signing key
    Keygen {
        /// Private key output (PKCS#8 PEM)
        #[arg(short, long)]
        output: PathBuf,

        /// Public key output (defaults to <output>.pub.json)
        #[arg(long)]
        public_key_output: Option<PathBuf>,

        /// Overwrite an existing key
        #[arg(long)]
        force: bool,
    },

    /// Export the public half of a signing key
    ExportPublicKey {
        /// Private key (defaults to the configured key)
        #[arg(short, long)]
        key: Option<PathBuf>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if cli.log_json {
        config.logging.json = true;
    }
    if let Some(file) = &cli.log_file {
        config.logging.file = Some(file.clone());
    }

    let _log_guard = wipecert::logging::init_tracing(&config.logging)?;

    match cli.command {
        Commands::Patterns => list_patterns(),
        Commands::Info {
            target,
            storage_type,
        } => show_info(&target, &storage_type),
        Commands::Wipe {
            target,
            pattern,
            block_size,
            no_verify,
            no_certificate,
            cert_output,
            public_key_output,
            serial,
            model,
            operator,
            organization,
            key,
            remove,
            yes,
            no_progress,
        } => {
            if let Some(block_size) = block_size {
                config.engine.block_size = block_size;
            }
            if no_verify {
                config.engine.verify = false;
            }
            if let Some(operator) = operator {
                config.certificate.operator = operator;
            }
            if let Some(organization) = organization {
                config.certificate.organization = organization;
            }
            if key.is_some() {
                config.certificate.private_key_path = key;
            }

            let request = WipeRequest {
                target,
                pattern,
                remove,
                yes,
                show_progress: !no_progress,
                certify: !no_certificate,
                cert_output,
                public_key_output,
                target_info: TargetInfo {
                    serial_number: serial,
                    model,
                },
            };
            wipe_target(request, config).await
        }
        Commands::VerifyCert {
            certificate,
            public_key,
        } => verify_certificate(&certificate, &public_key),
        Commands::Keygen {
            output,
            public_key_output,
            force,
        } => generate_key(&output, public_key_output.as_deref(), force),
        Commands::ExportPublicKey { key, output } => {
            let key = key
                .or(config.certificate.private_key_path)
                .context("no signing key given and none configured")?;
            export_public_key(&key, output.as_deref())
        }
    }
}

struct WipeRequest {
    target: String,
    pattern: String,
    remove: bool,
    yes: bool,
    show_progress: bool,
    certify: bool,
    cert_output: Option<PathBuf>,
    public_key_output: Option<PathBuf>,
    target_info: TargetInfo,
}

fn list_patterns() -> Result<()> {
    println!("{:<12} {:>6}  DESCRIPTION", "PATTERN", "PASSES");
    for pattern in WipePattern::ALL {
        println!(
            "{:<12} {:>6}  {}",
            pattern.as_str(),
            pattern.pass_count(),
            pattern.description()
        );
    }
    Ok(())
}

fn show_info(target: &str, storage_type: &str) -> Result<()> {
    let backend = FileBackend::new();
    if !backend.exists(target) {
        bail!("target does not exist: {}", target);
    }
    let size = backend
        .size(target)
        .with_context(|| format!("cannot determine size of {}", target))?;
    let recommended = WipePattern::recommended_for(storage_type);

    println!("Target:      {}", target);
    println!("Size:        {} bytes ({})", size, human_bytes(size as f64));
    println!(
        "Recommended: {} ({})",
        recommended,
        recommended.description()
    );
    Ok(())
}

async fn wipe_target(request: WipeRequest, config: AppConfig) -> Result<()> {
    let pattern: WipePattern = request.pattern.parse()?;
    let options = WipeOptions {
        block_size: config.engine.block_size,
        verify: config.engine.verify,
        remove_after: request.remove,
    };

    // Build the signer before touching the target so key problems surface early
    let generator = if request.certify {
        Some(
            CertificateGenerator::new(config.certificate.clone())
                .context("failed to initialize certificate signing")?,
        )
    } else {
        None
    };

    let backend = FileBackend::new();
    let size = if backend.exists(&request.target) {
        backend.size(&request.target).ok()
    } else {
        None
    };

    println!("\n=== Wipe ===");
    println!("Target:  {}", request.target);
    if let Some(size) = size {
        println!("Size:    {} ({} bytes)", human_bytes(size as f64), size);
    }
    println!(
        "Pattern: {} ({} pass{})",
        pattern.description(),
        pattern.pass_count(),
        if pattern.pass_count() == 1 { "" } else { "es" }
    );
    println!("Verify:  {}", if options.verify { "yes" } else { "no" });
    if request.remove {
        println!("Remove:  file is deleted after a completed wipe");
    }

    if !request.yes {
        println!("\n⚠️  ALL DATA ON THIS TARGET WILL BE PERMANENTLY DESTROYED");
        print!("Type 'YES' to continue: ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if input.trim() != "YES" {
            println!("Operation cancelled.");
            return Ok(());
        }
    }

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<ProgressEvent>();
    let engine = Arc::new(WipeEngine::new(config.engine.clone()).with_observer(tx));
    let signals = setup_signal_handler(&engine)?;

    let worker = Arc::clone(&engine);
    let target = request.target.clone();
    let mut task =
        tokio::task::spawn_blocking(move || worker.wipe(&target, pattern, &options));

    let mut bar = ProgressBar::new(40);
    let mut last_draw: Option<Instant> = None;

    let joined = loop {
        tokio::select! {
            joined = &mut task => break joined,
            Some(event) = rx.recv() => {
                if let ProgressEvent::Block(result) = event {
                    let due = last_draw.map_or(true, |t| t.elapsed() >= PROGRESS_REDRAW_INTERVAL);
                    if request.show_progress && due {
                        bar.render(&result);
                        last_draw = Some(Instant::now());
                    }
                }
            }
        }
    };
    signals.close();

    let report = joined.context("wipe task panicked")??;
    if request.show_progress {
        bar.finish(report.as_result());
    }
    print_report(&report);

    if report.status() != WipeStatus::Completed {
        bail!(
            "wipe did not complete (status: {}); no certificate issued",
            report.status()
        );
    }

    if let Some(generator) = generator {
        issue_certificate(
            &generator,
            &report,
            &request.target_info,
            request.cert_output,
            request.public_key_output,
        )?;
    }

    Ok(())
}

fn setup_signal_handler(engine: &Arc<WipeEngine>) -> Result<signal_hook::iterator::Handle> {
    use signal_hook::{consts::SIGINT, iterator::Signals};

    let mut signals = Signals::new([SIGINT])?;
    let handle = signals.handle();
    let token = engine.cancellation_token();

    std::thread::spawn(move || {
        for sig in signals.forever() {
            if sig == SIGINT {
                eprintln!("\n\n🛑 Interrupt received! Stopping after the current block...");
                token.cancel();
            }
        }
    });

    Ok(handle)
}

fn print_report(report: &WipeReport) {
    println!("\n=== Result ===");
    println!("Status:   {}", report.status());
    println!(
        "Written:  {} over {}/{} passes",
        human_bytes(report.bytes_wiped() as f64),
        report.passes_completed(),
        report.total_passes()
    );
    println!(
        "Duration: {}",
        humantime::format_duration(Duration::from_secs(report.duration().as_secs()))
    );
    if let Some(hash) = report.verification_hash() {
        println!("Verify:   sha256 {}", hash);
    }
    if let Some(err) = report.metadata().get("verification_error") {
        println!("Verify:   failed ({})", err);
    }
    if let Some(err) = report.error_message() {
        println!("Error:    {}", err);
    }
    if let Some(err) = report.metadata().get("remove_error") {
        println!("Remove:   failed ({})", err);
    }
}

fn issue_certificate(
    generator: &CertificateGenerator,
    report: &WipeReport,
    target_info: &TargetInfo,
    cert_output: Option<PathBuf>,
    public_key_output: Option<PathBuf>,
) -> Result<()> {
    let certificate = generator
        .issue(report, Some(target_info))
        .context("failed to issue certificate")?;

    let cert_path = cert_output.unwrap_or_else(|| {
        PathBuf::from(format!("{}.json", certificate.certificate_id()))
    });
    certificate
        .save_json(&cert_path)
        .with_context(|| format!("failed to write certificate to {}", cert_path.display()))?;

    let key_path = public_key_output.unwrap_or_else(|| sibling_path(&cert_path, "public_key.json"));
    generator
        .public_key_info()
        .save_json(&key_path)
        .with_context(|| format!("failed to write public key to {}", key_path.display()))?;

    println!("\n=== Certificate ===");
    println!("ID:         {}", certificate.certificate_id());
    println!("Hash:       {}", certificate.certificate_hash());
    println!("Saved to:   {}", cert_path.display());
    println!("Public key: {}", key_path.display());
    println!(
        "Verify with: wipecert verify-cert {} --public-key {}",
        cert_path.display(),
        key_path.display()
    );
    Ok(())
}

fn verify_certificate(certificate: &Path, public_key: &Path) -> Result<()> {
    let cert = WipeCertificate::load_json(certificate)
        .with_context(|| format!("failed to read certificate {}", certificate.display()))?;
    let verifier = CertificateVerifier::load(public_key)
        .with_context(|| format!("failed to read public key {}", public_key.display()))?;

    println!("Certificate: {}", cert.certificate_id());
    println!("Target:      {}", cert.target_path());
    println!("Pattern:     {}", cert.wipe_pattern());
    println!("Status:      {}", cert.status());
    println!("Issued:      {}", cert.created_at());

    if !verifier.verify(&cert) {
        bail!("certificate verification FAILED: hash or signature mismatch");
    }

    println!("✅ Certificate is authentic and unmodified");
    Ok(())
}

fn generate_key(output: &Path, public_key_output: Option<&Path>, force: bool) -> Result<()> {
    let key = SigningKeyPair::generate()?;
    let written = if force {
        key.save_pem_file(output)
    } else {
        key.create_pem_file(output)
    };
    match written {
        Err(WipeError::Io(e)) if e.kind() == io::ErrorKind::AlreadyExists => {
            bail!(
                "{} already exists (use --force to overwrite)",
                output.display()
            );
        }
        other => other.with_context(|| format!("failed to write {}", output.display()))?,
    }

    let public_path = public_key_output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(format!("{}.pub.json", output.display())));
    key.public_key_info().save_json(&public_path)?;

    println!("Private key: {} ({})", output.display(), key.scheme());
    println!("Public key:  {}", public_path.display());
    Ok(())
}

fn export_public_key(key: &Path, output: Option<&Path>) -> Result<()> {
    let key = SigningKeyPair::load_pem_file(key)
        .with_context(|| format!("failed to load signing key {}", key.display()))?;
    let info = key.public_key_info();

    match output {
        Some(path) => {
            info.save_json(path)?;
            println!("Public key written to {}", path.display());
        }
        None => println!("{}", info.to_json_pretty()?),
    }
    Ok(())
}

/// `dir/cert.json` + "public_key.json" -> `dir/cert.public_key.json`
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "certificate".to_string());
    path.with_file_name(format!("{}.{}", stem, suffix))
}
