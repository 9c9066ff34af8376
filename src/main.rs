use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use urlscan::{
    output::{print_scan, print_scans, OutputFormat},
    AsyncClient, ClientOptions, Config, ScanRequest, ScanResult, ScanStatus,
    ScreenshotResolution, SearchFilter, Visibility, WaitOptions,
};

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
    pub const MALICIOUS: u8 = 2;
}

#[derive(Parser)]
#[command(name = "urlscan")]
#[command(author, version, about = "Submit URLs to the Cloudflare URL Scanner and fetch results")]
struct Cli {
    /// API token (falls back to CLOUDFLARE_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Account id (falls back to CLOUDFLARE_ACCOUNT_ID)
    #[arg(long, global = true)]
    account_id: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, global = true)]
    format: Option<String>,

    /// Log requests and responses to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a URL for scanning
    Scan {
        url: String,

        /// Public, Unlisted or Private
        #[arg(long)]
        visibility: Option<Visibility>,

        /// Screenshot resolutions to capture (desktop, mobile, tablet)
        #[arg(long = "resolution")]
        resolutions: Vec<ScreenshotResolution>,

        /// User agent the scanner presents
        #[arg(long)]
        user_agent: Option<String>,

        /// Extra request header, as NAME=VALUE
        #[arg(long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,

        /// Wait for the scan to finish
        #[arg(long)]
        wait: bool,

        /// Seconds to wait before giving up (with --wait)
        #[arg(long)]
        wait_timeout: Option<u64>,
    },

    /// Fetch a scan by id
    Get { uuid: String },

    /// Search previous scans
    Search {
        /// Main page hostname
        #[arg(long)]
        hostname: Option<String>,

        /// Scan id
        #[arg(long)]
        uuid: Option<String>,

        /// Hostname of any request made by the page
        #[arg(long)]
        request_hostname: Option<String>,

        /// IP address of any request made by the page
        #[arg(long)]
        ip: Option<String>,

        /// Main page IP address
        #[arg(long)]
        page_ip: Option<String>,

        /// Exact URL of any request made by the page
        #[arg(long)]
        url: Option<String>,

        /// Scanned URL after redirects
        #[arg(long)]
        page_url: Option<String>,

        /// Path of any request made by the page
        #[arg(long)]
        path: Option<String>,

        /// Main page path
        #[arg(long)]
        page_path: Option<String>,

        /// Only scans made by this account
        #[arg(long)]
        account_scans: bool,

        /// Earliest scan time (RFC 3339)
        #[arg(long)]
        date_start: Option<DateTime<Utc>>,

        /// Latest scan time (RFC 3339)
        #[arg(long)]
        date_end: Option<DateTime<Utc>>,

        /// Cursor from a previous page of results
        #[arg(long)]
        next_cursor: Option<String>,

        #[arg(long)]
        limit: Option<u32>,
    },

    /// Download a screenshot
    Screenshot {
        uuid: String,

        /// desktop, mobile or tablet
        #[arg(long, conflicts_with = "all")]
        resolution: Option<String>,

        /// Fetch every resolution
        #[arg(long)]
        all: bool,

        /// Output file (or directory with --all)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Download the HAR capture
    Har {
        uuid: String,

        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

async fn run() -> Result<u8> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load().unwrap_or_else(|e| {
        warn!("ignoring config file: {:#}", e);
        Config::default()
    });

    if let Commands::Config { init, path } = cli.command {
        handle_config(init, path)?;
        return Ok(exit_codes::SUCCESS);
    }

    let format_str = cli.format.clone().unwrap_or(config.default_format.clone());
    let format = OutputFormat::from_str(&format_str).map_err(|e| anyhow::anyhow!(e))?;

    let mut options = ClientOptions::from_config(&config);
    options.api_key = cli.api_key;
    options.account_id = cli.account_id;
    let client = AsyncClient::new(options).context("Failed to create client")?;

    match cli.command {
        Commands::Scan {
            url,
            visibility,
            resolutions,
            user_agent,
            headers,
            wait,
            wait_timeout,
        } => {
            let mut request = ScanRequest::new(url)
                .with_visibility(visibility.unwrap_or(config.default_visibility))
                .with_screenshots(resolutions);
            if let Some(user_agent) = user_agent {
                request = request.with_user_agent(user_agent);
            }
            for (name, value) in headers {
                request = request.with_header(name, value);
            }

            let submitted = client.scan(request).await?;
            if !wait {
                print_scan(&submitted, format)?;
                return Ok(exit_codes::SUCCESS);
            }

            let mut wait_options = WaitOptions::from_config(&config);
            if let Some(secs) = wait_timeout {
                wait_options.timeout = Duration::from_secs(secs);
            }
            let result = wait_for(&client, &submitted, wait_options, format).await?;
            print_scan(&result, format)?;
            Ok(determine_exit_code(&result))
        }
        Commands::Get { uuid } => {
            let result = client.get_scan(&uuid).await?;
            print_scan(&result, format)?;
            Ok(determine_exit_code(&result))
        }
        Commands::Search {
            hostname,
            uuid,
            request_hostname,
            ip,
            page_ip,
            url,
            page_url,
            path,
            page_path,
            account_scans,
            date_start,
            date_end,
            next_cursor,
            limit,
        } => {
            let filter = SearchFilter {
                account_scans: account_scans.then_some(true),
                date_start,
                date_end,
                hostname: request_hostname,
                ip,
                limit,
                next_cursor,
                page_hostname: hostname,
                page_ip,
                page_path,
                page_url,
                path,
                scan_id: uuid,
                url,
            };
            let results = client.search_with(&filter).await?;
            print_scans(&results, format)?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::Screenshot {
            uuid,
            resolution,
            all,
            output,
        } => {
            if all {
                save_all_screenshots(&client, &uuid, output).await?;
            } else {
                let resolution =
                    resolution.unwrap_or_else(|| config.default_resolution.to_string());
                let bytes = client.get_screenshot(&uuid, &resolution).await?;
                let path =
                    output.unwrap_or_else(|| PathBuf::from(format!("{}-{}.png", uuid, resolution)));
                write_file(&path, &bytes)?;
            }
            Ok(exit_codes::SUCCESS)
        }
        Commands::Har { uuid, output } => {
            let bytes = client.get_har(&uuid).await?;
            let path = output.unwrap_or_else(|| PathBuf::from(format!("{}.har", uuid)));
            write_file(&path, &bytes)?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::Config { .. } => Ok(exit_codes::SUCCESS),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "urlscan=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn wait_for(
    client: &AsyncClient,
    submitted: &ScanResult,
    options: WaitOptions,
    format: OutputFormat,
) -> Result<ScanResult> {
    if !submitted.status().is_pending() {
        return Ok(submitted.clone());
    }

    let progress = if format == OutputFormat::Table {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Waiting for scan {}...", submitted.uuid()));
        Some(pb)
    } else {
        None
    };

    let result = client.wait_for_scan(submitted.uuid(), options).await;

    if let Some(pb) = progress {
        match &result {
            Ok(r) => pb.finish_with_message(format!("Scan {} finished: {}", r.uuid(), r.status())),
            Err(_) => pb.finish_and_clear(),
        }
    }

    Ok(result?)
}

/// Fetches every resolution concurrently and writes `<uuid>-<resolution>.png`
/// into `dir`.
async fn save_all_screenshots(client: &AsyncClient, uuid: &str, dir: Option<PathBuf>) -> Result<()> {
    let dir = dir.unwrap_or_else(|| PathBuf::from("."));

    let futures = ScreenshotResolution::ALL
        .into_iter()
        .map(|resolution| async move { (resolution, client.get_screenshot(uuid, resolution).await) });
    let results = join_all(futures).await;

    let mut failures = 0;
    for (resolution, result) in results {
        match result {
            Ok(bytes) => write_file(&dir.join(format!("{}-{}.png", uuid, resolution)), &bytes)?,
            Err(e) => {
                eprintln!("{} screenshot unavailable: {}", resolution, e);
                failures += 1;
            }
        }
    }

    if failures == ScreenshotResolution::ALL.len() {
        anyhow::bail!("No screenshots available for scan {}", uuid);
    }
    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    eprintln!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// A finished scan flagged malicious exits non-zero so scripts can gate on it.
fn determine_exit_code(result: &ScanResult) -> u8 {
    if result.status() == ScanStatus::Done && result.is_malicious() == Some(true) {
        exit_codes::MALICIOUS
    } else {
        exit_codes::SUCCESS
    }
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{}'", s)),
    }
}

fn handle_config(init: bool, show_path: bool) -> Result<()> {
    let config_path = Config::config_path();

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        Config::default().save()?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        return Ok(());
    }

    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'urlscan config --init' to create one.");
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
    }

    Ok(())
}
