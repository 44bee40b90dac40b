//! hdhr-signal: antenna alignment helper for HDHomeRun tuners.
//!
//! Without `--watch` every configured channel is measured once and the
//! results are written to `antenna_scan_[<label>_]<timestamp>.json`.
//! With `--watch` the scan repeats until Ctrl+C, printing one line per pass.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use log::{error, info};
use tokio_util::sync::CancellationToken;

use hdhr_signal::logging;
use hdhr_signal::report::{print_summary, timestamp_now};
use hdhr_signal::{
    load_config, snapshot_file_name, ChannelScanner, HdhrClient, MonitorLoop, ScanSnapshot,
};

/// hdhr-signal - Per-channel signal scanner for HDHomeRun tuners
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Antenna orientation label, added to the output file name
    label: Option<String>,

    /// Monitor continuously instead of scanning once
    #[arg(short, long)]
    watch: bool,

    /// Device host name or address
    #[arg(long)]
    host: Option<String>,

    /// Configuration file path
    #[arg(short = 'f', long)]
    config: Option<PathBuf>,

    /// Wait after tuning before reading status, in milliseconds
    #[arg(long)]
    settle_ms: Option<u64>,

    /// Pause between monitor passes, in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Directory where log files are stored
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config file: {}", e);
            return Err(e.into());
        }
    };

    // Command line takes precedence over the file
    if let Some(host) = args.host {
        config.device.host = host;
    }
    if let Some(ms) = args.settle_ms {
        config.scan.settle_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = args.interval_ms {
        config.monitor.interval = Duration::from_millis(ms);
    }
    if let Some(dir) = args.log_dir {
        config.logging.log_dir = Some(dir);
    }

    logging::init_logging(
        config.logging.log_dir.as_deref(),
        config.logging.retention_days,
        args.verbose,
        config.logging.level.as_deref(),
    )?;

    info!("Device: {}", config.device.host);
    info!(
        "Channels: {}",
        if config.scan.filter.ids().is_empty() {
            "all".to_string()
        } else {
            config.scan.filter.ids().join(" ")
        }
    );

    let client = HdhrClient::new(&config.device)?;
    let scanner = ChannelScanner::new(client, config.scan.clone());

    if args.watch {
        if args.label.is_some() {
            info!("Label is ignored in watch mode");
        }
        return watch(&scanner, config.monitor).await;
    }

    scan_once(&scanner, args.label.as_deref()).await
}

async fn scan_once(
    scanner: &ChannelScanner<HdhrClient>,
    label: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let timestamp = timestamp_now();
    let file_name = snapshot_file_name(label, &timestamp);

    println!("Starting channel scan at {}", timestamp);
    println!("Results will be saved to: {}\n", file_name);

    let channels = match scanner.select_channels().await {
        Ok(channels) => channels,
        Err(e) => {
            error!("Failed to fetch lineup from {}: {}", scanner.device().endpoints().host(), e);
            return Err(e.into());
        }
    };

    let result = scanner.scan(&channels, false).await;

    let snapshot = ScanSnapshot::from_result(&result, timestamp);
    snapshot.write_to(Path::new(&file_name))?;
    print_summary(&snapshot.summary, &file_name);

    Ok(())
}

async fn watch(
    scanner: &ChannelScanner<HdhrClient>,
    monitor_config: hdhr_signal::MonitorConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Starting continuous monitoring mode...");
    println!("Press Ctrl+C to stop\n");

    let cancel = CancellationToken::new();
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_on_signal.cancel();
        }
    });

    let monitor = MonitorLoop::new(scanner, monitor_config, cancel);
    let passes = monitor.run(&mut io::stdout()).await?;
    info!("Monitor finished after {} passes", passes);

    println!("\n\nMonitoring stopped.");
    Ok(())
}
