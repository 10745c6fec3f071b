// # domain-hc - Domain Monitor CLI
//
// Thin integration layer: reads configuration from the environment,
// wires the concrete collaborators into the engine, and dispatches one
// subcommand per invocation. All monitoring logic lives in
// domain-hc-core; running `domain-hc check` from cron or a systemd timer
// is the intended deployment.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// - `API_URL`: Healthchecks management API base (required),
//   e.g. `https://healthchecks.io/api/v3`
// - `API_KEY`: Project API key (required)
// - `BASE_URL`: Ping endpoint base (required), e.g. `https://hc-ping.com`
// - `DOMAIN_FILE`: Path to the domain registry file (required)
// - `MARKER_DIR`: Expiry marker directory (default /tmp/domain-hc-markers)
// - `LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export API_URL=https://healthchecks.example/api/v3
// export API_KEY=your_project_key
// export BASE_URL=https://healthchecks.example/ping
// export DOMAIN_FILE=/etc/domain-hc/domains.txt
//
// domain-hc create       # register checks for new domains
// domain-hc check        # run one monitoring pass
// ```

use std::env;
use std::io::{BufRead, Write};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use domain_hc_core::{
    DomainRegistry, EngineConfig, FileMarkerStore, HcConfig, ReconcileEngine,
};
use domain_hc_probe_http::HttpStatusProbe;
use domain_hc_provider_healthchecks::HealthchecksClient;
use domain_hc_whois::WhoisTcpLookup;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

const DEFAULT_MARKER_DIR: &str = "/tmp/domain-hc-markers";

#[derive(Debug, Parser)]
#[command(name = "domain-hc", about = "Domain availability and expiry monitor", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one monitoring pass over every registered domain
    Check,
    /// Create checks for new domains (all bare lines, or one given domain)
    Create {
        /// Domain to register; omit to process every bare line in the file
        domain: Option<String>,
    },
    /// Delete remote checks the domain file no longer references
    RemoveUnused,
    /// Delete every remote check and clear the domain file
    RemoveAll {
        /// Skip the interactive confirmation
        #[arg(long)]
        force: bool,
    },
    /// List all checks on the account
    ListChecks {
        /// Include tags in the listing
        #[arg(long, short)]
        verbose: bool,
    },
    /// List the domains in the domain file
    ListDomains,
    /// Delete expiry markers (all of them, or one domain's)
    DeleteMarkers {
        /// Domain whose marker to delete; omit to delete all markers
        domain: Option<String>,
    },
}

/// Exit codes for different termination scenarios
///
/// - 0: Success
/// - 1: Configuration error
/// - 2: Runtime error
#[derive(Debug, Clone, Copy)]
enum AppExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<AppExitCode> for ExitCode {
    fn from(code: AppExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn require_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| {
        anyhow::anyhow!(
            "{} is required. Set it via: export {}=...",
            name,
            name
        )
    })
}

/// Load configuration from environment variables
fn config_from_env() -> Result<(HcConfig, String)> {
    let config = HcConfig {
        api_url: require_env("API_URL")?,
        api_key: require_env("API_KEY")?,
        ping_url: require_env("BASE_URL")?,
        domain_file: require_env("DOMAIN_FILE")?.into(),
        marker_dir: env::var("MARKER_DIR")
            .unwrap_or_else(|_| DEFAULT_MARKER_DIR.to_string())
            .into(),
        engine: EngineConfig::default(),
    };
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    Ok((config, log_level))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (config, log_level) = match config_from_env() {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return AppExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return AppExitCode::ConfigError.into();
    }

    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => {
            eprintln!("LOG_LEVEL '{}' is not valid. Valid levels: trace, debug, info, warn, error", other);
            return AppExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return AppExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return AppExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run(cli.command, config).await {
            Ok(()) => AppExitCode::Success,
            Err(e) => {
                error!("{:#}", e);
                AppExitCode::RuntimeError
            }
        }
    })
    .into()
}

fn build_engine(config: &HcConfig) -> Result<ReconcileEngine> {
    let api = HealthchecksClient::new(&config.api_url, &config.api_key, &config.ping_url)?;
    let probe = HttpStatusProbe::new(Duration::from_secs(config.engine.status_timeout_secs))?;
    let whois = WhoisTcpLookup::new(Duration::from_secs(config.engine.whois_timeout_secs));
    let markers = FileMarkerStore::new(&config.marker_dir);

    Ok(ReconcileEngine::new(
        Box::new(api),
        Box::new(probe),
        Box::new(whois),
        Box::new(markers),
        &config.engine,
    ))
}

async fn run(command: Command, config: HcConfig) -> Result<()> {
    let engine = build_engine(&config)?;

    match command {
        Command::Check => {
            let registry = DomainRegistry::load(&config.domain_file).await?;
            engine.check_all(&registry).await;
        }
        Command::Create { domain } => {
            let mut registry = DomainRegistry::load(&config.domain_file).await?;
            match domain {
                Some(domain) => {
                    if engine.create_domain(&mut registry, &domain).await? {
                        println!("Registered {}", domain);
                    } else {
                        println!("{} is already registered", domain);
                    }
                }
                None => {
                    let resolved = engine.create_missing(&mut registry).await?;
                    println!("Registered {} domain(s)", resolved);
                }
            }
        }
        Command::RemoveUnused => {
            let registry = DomainRegistry::load(&config.domain_file).await?;
            let deleted = engine.remove_unused(&registry).await?;
            println!("Deleted {} unused check(s)", deleted);
        }
        Command::RemoveAll { force } => {
            if !force && !confirm_remove_all()? {
                println!("Aborted");
                return Ok(());
            }
            let mut registry = DomainRegistry::load(&config.domain_file).await?;
            let deleted = engine.remove_all(&mut registry).await?;
            println!("Deleted {} check(s)", deleted);
        }
        Command::ListChecks { verbose } => {
            let mut checks = engine.list_checks().await?;
            checks.sort_by(|a, b| a.name.cmp(&b.name));
            for check in checks {
                let status = check.status.as_deref().unwrap_or("unknown");
                if verbose {
                    println!("{:<30} {:<38} {:<8} [{}]", check.name, check.uuid, status, check.tags);
                } else {
                    println!("{:<30} {:<38} {}", check.name, check.uuid, status);
                }
            }
        }
        Command::ListDomains => {
            let registry = DomainRegistry::load(&config.domain_file).await?;
            for entry in registry.entries() {
                let expiry = match &entry.expiry_check {
                    Some(_) => "status+expiry",
                    None => "status only",
                };
                println!("{:<30} {}", entry.domain, expiry);
            }
            for domain in registry.pending() {
                println!("{:<30} pending", domain);
            }
        }
        Command::DeleteMarkers { domain } => {
            engine.clear_markers(domain.as_deref()).await?;
            println!("Markers deleted");
        }
    }

    Ok(())
}

/// Interactive guard for the destructive bulk delete. Requires the literal
/// answer YES on stdin.
fn confirm_remove_all() -> Result<bool> {
    eprint!("This deletes EVERY check on the account and clears the domain file. Type YES to continue: ");
    std::io::stderr().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim() == "YES")
}
