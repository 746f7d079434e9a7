//! cloudinit-netconf - first boot network config conversion
//!
//! Reads the network config from an OpenStack config-drive, translates it
//! into systemd-networkd units, writes them and restarts networking.

use anyhow::{Context, bail};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::level_filters::LevelFilter;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use cloudinit_netconf::config::{DEFAULT_CONFIG_PATH, Settings};
use cloudinit_netconf::datasources::ConfigDrive;
use cloudinit_netconf::network::restart::SystemdNetworkd;
use cloudinit_netconf::{ConversionFormat, convert_netconf, process_netconf};

#[derive(Parser)]
#[command(name = "cloudinit-netconf")]
#[command(author, version, about = "Convert legacy network config into systemd-networkd units", long_about = None)]
struct Cli {
    /// Network config format to convert (only "debian" is supported)
    #[arg(long, value_name = "FORMAT")]
    convert_netconf: Option<String>,

    /// Root of the mounted config-drive
    #[arg(long, value_name = "DIR")]
    from_configdrive: Option<PathBuf>,

    /// Exit successfully even if conversion fails
    #[arg(long)]
    ignore_failure: bool,

    /// Settings file
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Directory to write units to
    #[arg(long, value_name = "DIR")]
    unit_dir: Option<PathBuf>,

    /// Do not restart networking after writing units
    #[arg(long)]
    no_restart: bool,

    /// Print the rendered units instead of applying them
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Settings file values with command line overrides applied
    fn apply_overrides(&self, mut settings: Settings) -> Settings {
        if let Some(format) = &self.convert_netconf {
            settings.convert_netconf = Some(format.clone());
        }
        if let Some(drive) = &self.from_configdrive {
            settings.config_drive = Some(drive.clone());
        }
        if let Some(unit_dir) = &self.unit_dir {
            settings.unit_dir = unit_dir.clone();
        }
        if self.no_restart {
            settings.restart_network = false;
        }
        settings.ignore_failure |= self.ignore_failure;
        settings
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    // RUST_LOG takes precedence over -v
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();
}

async fn run(settings: &Settings, dry_run: bool) -> anyhow::Result<()> {
    let Some(format) = &settings.convert_netconf else {
        info!("No network config conversion requested");
        return Ok(());
    };
    let format: ConversionFormat = format.parse()?;

    let Some(drive) = &settings.config_drive else {
        bail!("a config-drive (--from-configdrive) is required to convert network config");
    };
    let source = ConfigDrive::new(drive);
    info!("Reading network config from config-drive at {}", source.root().display());

    if dry_run {
        let conversion = convert_netconf(format, &source)
            .await
            .context("failed to convert network config")?;
        for file in conversion.iter().flat_map(|c| &c.files) {
            println!("# {}", file.file_name());
            print!("{}", file.content);
            println!();
        }
        return Ok(());
    }

    let restarter = SystemdNetworkd::new();
    match process_netconf(format, &source, settings, &restarter).await {
        Ok(Some(conversion)) => {
            info!(
                "Applied {} units for {} interfaces",
                conversion.files.len(),
                conversion.nodes.len()
            );
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(e) if e.is_translation_error() => {
            Err(e).context("failed to translate network config")
        }
        Err(e) => Err(e).context("failed to apply network config"),
    }
}

/// Process exit status for the outcome of a run
fn exit_status(result: &anyhow::Result<()>, ignore_failure: bool) -> u8 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            error!("{:#}", e);
            if ignore_failure {
                warn!("Ignoring failure as requested");
                0
            } else {
                1
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = Settings::load(&cli.config)
        .await
        .with_context(|| format!("failed to read settings {}", cli.config.display()))?;
    let settings = cli.apply_overrides(settings);

    let result = run(&settings, cli.dry_run).await;
    Ok(ExitCode::from(exit_status(&result, settings.ignore_failure)))
}
