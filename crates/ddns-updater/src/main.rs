// # ddns-updater
//
// One-shot Cloudflare dynamic DNS updater. Each invocation runs a single
// reconcile pass and exits; scheduling is left to cron or a systemd timer.
//
// This binary is a thin integration layer:
// 1. Parse the command line
// 2. Load and validate configuration (file, then environment, then defaults)
// 3. Initialize logging and the runtime
// 4. Resolve the Cloudflare zone and record identifiers
// 5. Run `DdnsEngine::check_and_update` once
//
// All reconcile logic lives in ddns-core.
//
// ## Example
//
// ```bash
// export CLOUDFLARE_API_TOKEN=your_token
// export DOMAIN=example.com
// export DNS_RECORD_NAME=home
//
// ddns-updater --dry-run
// ```

use anyhow::{Context, Result};
use clap::Parser;
use ddns_core::config::UpdaterConfig;
use ddns_core::{CheckOutcome, DdnsEngine, FileStateStore, MemoryStateStore, StateStore};
use ddns_ip_http::HttpIpSource;
use ddns_provider_cloudflare::{CloudflareClient, CloudflareProvider, RecordTarget};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Run completed (or help/version displayed)
/// - 1: Configuration or startup error
/// - 2: Runtime error
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Run completed normally
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (resolution, IP lookup, update or state write failed)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

const CONFIG_HELP: &str = "\
Configuration keys (config file first, then environment, empty means unset):
  CLOUDFLARE_API_TOKEN      API token with Zone:Read and DNS:Edit (required)
  DOMAIN                    Zone name, e.g. example.com (required)
  CLOUDFLARE_ZONE_ID        Skip the zone lookup
  CLOUDFLARE_DNS_RECORD_ID  Skip the record lookup
  DNS_RECORD_NAME           Subdomain label, @ for the apex [default: @]
  DNS_RECORD_TYPE           Record type [default: A]
  IP_STORAGE_FILE           Last-known IP file [default: /var/lib/cloudflare-ip-updater/last_ip.txt]
  IP_CHECK_SERVICES         Comma-separated lookup URLs, tried in order
  DDNS_LOG_LEVEL            trace, debug, info, warn or error [default: info]

Setting DDNS_MODE=dry-run is equivalent to --dry-run.";

/// Update a Cloudflare DNS record when the external IPv4 address changes
#[derive(Debug, Parser)]
#[command(name = "ddns-updater", version, about, after_help = CONFIG_HELP)]
struct Cli {
    /// Configuration file of KEY=VALUE lines
    #[arg(long, env = "DDNS_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override IP_STORAGE_FILE
    #[arg(long, value_name = "PATH")]
    state_file: Option<PathBuf>,

    /// Resolve and read, but log the record update instead of sending it
    #[arg(long)]
    dry_run: bool,

    /// Override DDNS_LOG_LEVEL
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Cloudflare API base URL
    #[arg(long, env = "CLOUDFLARE_API_BASE", value_name = "URL", hide = true)]
    api_base: Option<String>,
}

impl Cli {
    fn dry_run_requested(&self) -> bool {
        self.dry_run || std::env::var("DDNS_MODE").is_ok_and(|mode| mode == "dry-run")
    }

    /// Load configuration and apply command-line overrides
    fn load_config(&self) -> ddns_core::Result<UpdaterConfig> {
        let mut config = UpdaterConfig::load(self.config.as_deref())?;

        if let Some(path) = &self.state_file {
            config.state_path = path.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.to_lowercase();
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version render through the error path
            let _ = e.print();
            return if e.use_stderr() {
                DdnsExitCode::ConfigError.into()
            } else {
                DdnsExitCode::Success.into()
            };
        }
    };

    let config = match cli.load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    // Initialize tracing
    let log_level = match config.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let dry_run = cli.dry_run_requested();
    if dry_run {
        warn!("DRY-RUN mode: the DNS record and the state file will not be modified");
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run(&config, cli.api_base.as_deref(), dry_run).await {
            Ok(()) => DdnsExitCode::Success,
            Err(e) => {
                error!("Error: {:#}", e);
                if is_resolution_failure(&e) {
                    error!(
                        "Check DOMAIN, DNS_RECORD_NAME and DNS_RECORD_TYPE, or set \
                         CLOUDFLARE_ZONE_ID and CLOUDFLARE_DNS_RECORD_ID"
                    );
                }
                DdnsExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Whether the run failed because the zone or record could not be found
fn is_resolution_failure(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ddns_core::Error>()
        .is_some_and(ddns_core::Error::is_resolution)
}

/// Build the components and run one reconcile pass
async fn run(config: &UpdaterConfig, api_base: Option<&str>, dry_run: bool) -> Result<()> {
    info!("Starting Cloudflare IP updater for {}", config.record_fqdn());

    let state_store: Box<dyn StateStore> = if dry_run {
        let baseline = FileStateStore::existing(&config.state_path)
            .load_last_ip()
            .await;
        Box::new(MemoryStateStore::with_ip(baseline))
    } else {
        Box::new(FileStateStore::new(&config.state_path).await?)
    };

    let client = match api_base {
        Some(base) => CloudflareClient::with_base_url(config.api_token.clone(), base)?,
        None => CloudflareClient::new(config.api_token.clone())?,
    };
    let provider = CloudflareProvider::resolve(client, &RecordTarget::from(config), dry_run)
        .await
        .context("Failed to resolve Cloudflare identifiers")?;

    let engine = DdnsEngine::new(
        Box::new(HttpIpSource::with_services(config.ip_services.clone())),
        Box::new(provider),
        state_store,
    );

    match engine.check_and_update().await? {
        CheckOutcome::Bootstrapped { current_ip } => {
            info!("Run finished: baseline {} recorded for {}", current_ip, engine.record_name())
        }
        CheckOutcome::Unchanged { current_ip } => {
            info!("Run finished: {} still points to {}", engine.record_name(), current_ip)
        }
        CheckOutcome::Updated {
            previous_ip,
            current_ip,
            applied: true,
        } => info!(
            "Run finished: {} moved from {} to {}",
            engine.record_name(),
            previous_ip,
            current_ip
        ),
        CheckOutcome::Updated {
            previous_ip,
            current_ip,
            applied: false,
        } => info!(
            "Run finished: {} would move from {} to {} (dry run)",
            engine.record_name(),
            previous_ip,
            current_ip
        ),
    }

    Ok(())
}
