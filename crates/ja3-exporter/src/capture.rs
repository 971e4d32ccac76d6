use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use pcap::{Activated, Active, Capture, Device, Linktype, Offline, PacketHeader, Precision};
use tracing::{debug, error, info, trace};

use ja3_core::Ja3;

use crate::output::{Ja3Record, RecordWriter};
use crate::packet::{self, DecodeMode, LinkLayer};

/// Counters reported when a capture ends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CaptureStats {
    pub packets: u64,
    pub segments: u64,
    pub fingerprints: u64,
}

const PERMISSION_HINT: &str =
    "Hint: run as root or grant the binary CAP_NET_RAW (sudo setcap cap_net_raw+ep <binary>)";

/// Timestamp precision requested for live captures. libpcap ignores a
/// nanosecond request on platforms without support.
#[cfg(target_os = "linux")]
pub const LIVE_PRECISION: Precision = Precision::Nano;
#[cfg(not(target_os = "linux"))]
pub const LIVE_PRECISION: Precision = Precision::Micro;

/// Capture files always convert to the requested precision.
pub const FILE_PRECISION: Precision = Precision::Nano;

// libpcap reports the DLT value, which for raw IP differs from LINKTYPE_RAW.
#[cfg(target_os = "openbsd")]
const DLT_RAW: Linktype = Linktype(14);
#[cfg(not(target_os = "openbsd"))]
const DLT_RAW: Linktype = Linktype(12);

/// Print the interfaces a live capture could be started on.
pub fn list_interfaces() -> Result<()> {
    let devices = Device::list().context("Failed to list network devices")?;

    if devices.is_empty() {
        println!("No capture interfaces available.");
        println!("{}", PERMISSION_HINT);
    } else {
        println!("Interfaces:");
        for dev in &devices {
            let addrs = dev
                .addresses
                .iter()
                .map(|a| a.addr.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            println!(
                "  {:<16} {:<40} {}",
                dev.name,
                dev.desc.as_deref().unwrap_or("-"),
                addrs
            );
        }
    }

    println!("\nUsage: ja3-exporter (--pcap <FILE> | --pcapng <FILE> | -i <INTERFACE>)");
    Ok(())
}

/// Open a capture file. libpcap reads both pcap and pcapng.
pub fn open_file(path: &Path) -> Result<Capture<Offline>> {
    Capture::from_file_with_precision(path, FILE_PRECISION)
        .with_context(|| format!("Failed to open capture file '{}'", path.display()))
}

/// Open a live capture on the given interface.
pub fn open_interface(iface: &str, promisc: bool, snaplen: i32) -> Result<Capture<Active>> {
    let live_error = || format!("Cannot capture on '{}'.\n{}", iface, PERMISSION_HINT);

    Capture::from_device(iface)
        .with_context(live_error)?
        .promisc(promisc)
        .snaplen(snaplen)
        .precision(LIVE_PRECISION)
        // wake up every second to flush buffered records
        .timeout(1000)
        .open()
        .with_context(live_error)
}

fn link_layer(linktype: Linktype) -> Option<LinkLayer> {
    match linktype {
        Linktype::ETHERNET => Some(LinkLayer::Ethernet),
        DLT_RAW | Linktype::RAW | Linktype::IPV4 | Linktype::IPV6 => Some(LinkLayer::RawIp),
        _ => None,
    }
}

/// Capture time as nanoseconds since the Unix epoch. `tv_usec` carries
/// nanoseconds when the capture was opened with [`Precision::Nano`].
fn timestamp_nanos(header: &PacketHeader, precision: Precision) -> i64 {
    let subsec = header.ts.tv_usec as i64;
    let subsec_nanos = match precision {
        Precision::Nano => subsec,
        Precision::Micro => subsec * 1_000,
    };
    header.ts.tv_sec as i64 * 1_000_000_000 + subsec_nanos
}

/// Read packets until the source is exhausted and write one record for every
/// TCP segment that parses as a ClientHello.
///
/// Segments that are not ClientHellos are skipped; only capture and output
/// failures end the loop early.
pub fn run_capture<T, W>(
    cap: &mut Capture<T>,
    precision: Precision,
    bpf_filter: &str,
    mode: DecodeMode,
    out: &mut RecordWriter<W>,
) -> Result<CaptureStats>
where
    T: Activated + ?Sized,
    W: Write,
{
    cap.filter(bpf_filter, true)
        .with_context(|| format!("Invalid BPF filter: '{}'", bpf_filter))?;

    debug!("Capture active, BPF filter applied: {}", bpf_filter);

    let linktype = cap.get_datalink();
    let link = match link_layer(linktype) {
        Some(link) => link,
        None => bail!("Unsupported link type {:?}", linktype),
    };

    let mut stats = CaptureStats::default();

    loop {
        let packet = match cap.next_packet() {
            Ok(packet) => packet,
            Err(pcap::Error::NoMorePackets) => break,
            Err(pcap::Error::TimeoutExpired) => {
                out.flush()?;
                continue;
            }
            Err(e) => {
                error!("Capture error: {}", e);
                bail!("Capture terminated: {}", e);
            }
        };
        stats.packets += 1;

        let segment = match packet::parse_packet(packet.data, link, mode) {
            Ok(Some(segment)) => segment,
            Ok(None) => continue,
            Err(e) => {
                debug!("Packet parse error: {}", e);
                continue;
            }
        };
        stats.segments += 1;

        match Ja3::from_segment(segment.payload) {
            Ok(ja3) => {
                let record = Ja3Record::new(&segment, timestamp_nanos(packet.header, precision), &ja3);
                out.write(&record)?;
                stats.fingerprints += 1;
            }
            // most segments are simply not ClientHellos
            Err(e) => trace!(
                "No ClientHello ({}): {}:{} -> {}:{}",
                e,
                segment.src_ip,
                segment.src_port,
                segment.dst_ip,
                segment.dst_port
            ),
        }
    }

    out.flush()?;
    info!(
        "Capture finished: {} packets, {} TCP segments, {} fingerprints",
        stats.packets, stats.segments, stats.fingerprints
    );
    Ok(stats)
}
