use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgGroup, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod capture;
mod output;
mod packet;

use output::{OutputFormat, RecordWriter};
use packet::DecodeMode;

#[derive(Parser)]
#[command(name = "ja3-exporter")]
#[command(about = "Creates JA3 digests for TLS client fingerprinting from capture files or live traffic")]
#[command(group(ArgGroup::new("source").args(["pcap", "pcapng", "interface"])))]
struct Cli {
    /// Path to pcap file to be read
    #[arg(long)]
    pcap: Option<PathBuf>,

    /// Path to pcapng file to be read
    #[arg(long)]
    pcapng: Option<PathBuf>,

    /// Network interface to capture on (e.g., eth0).
    /// If no source is given, lists available interfaces and exits.
    #[arg(short, long)]
    interface: Option<String>,

    /// Compatibility mode: tolerant decode for captures that are not a
    /// clean Ethernet/IP/TCP stack (truncated frames, odd length fields)
    #[arg(short, long, default_value_t = false)]
    compat: bool,

    /// BPF filter expression
    #[arg(short, long, default_value = "tcp")]
    filter: String,

    /// Disable promiscuous mode on live captures
    #[arg(long, default_value_t = false)]
    no_promisc: bool,

    /// Snap length: max bytes captured per packet on live interfaces
    #[arg(short, long, default_value_t = 1600)]
    snaplen: i32,

    /// Output format: "json" (NDJSON, one object per line) or "text" (human-readable)
    #[arg(short, long, default_value = "json")]
    output: String,

    /// Log debug details (skipped packets, decode errors) to stderr
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .with_level(true)
        .init();

    let format = OutputFormat::parse(&cli.output)?;
    let mode = if cli.compat {
        DecodeMode::Compat
    } else {
        DecodeMode::Selective
    };

    let file = cli.pcap.as_ref().or(cli.pcapng.as_ref());

    if let Some(path) = file {
        info!("Reading capture file: {}", path.display());
        let mut cap = capture::open_file(path)?;
        let mut out = RecordWriter::new(BufWriter::new(io::stdout().lock()), format, false);
        capture::run_capture(&mut cap, capture::FILE_PRECISION, &cli.filter, mode, &mut out)?;
        return Ok(());
    }

    let iface = match cli.interface {
        Some(name) => name,
        None => {
            capture::list_interfaces()?;
            return Ok(());
        }
    };

    info!("Capturing on interface: {}", iface);
    info!("BPF filter: {}", cli.filter);
    info!("Decode mode: {:?}", mode);
    info!("Press Ctrl+C to stop");

    let mut cap = capture::open_interface(&iface, !cli.no_promisc, cli.snaplen)?;
    let mut out = RecordWriter::new(io::stdout().lock(), format, true);
    capture::run_capture(&mut cap, capture::LIVE_PRECISION, &cli.filter, mode, &mut out)?;
    Ok(())
}
