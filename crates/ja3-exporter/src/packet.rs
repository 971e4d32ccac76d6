use std::net::IpAddr;

use anyhow::{bail, Result};
use etherparse::{LaxNetSlice, LaxSlicedPacket, NetSlice, SlicedPacket, TransportSlice};
use tracing::debug;

/// How much of the link/network stack is decoded to reach the TCP payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    /// Strict decode of well-formed Ethernet (or raw IP) / IPv4 / IPv6 / TCP.
    Selective,
    /// Lax decode that tolerates truncated captures and length fields that
    /// disagree with the captured data. Slower, but finds TCP payloads in
    /// stacks the strict decoder rejects.
    Compat,
}

/// Link-layer framing of a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkLayer {
    Ethernet,
    RawIp,
}

/// Addressing and payload of one TCP segment.
#[derive(Debug, PartialEq, Eq)]
pub struct Segment<'a> {
    pub src_ip: IpAddr,
    pub src_port: u16,
    pub dst_ip: IpAddr,
    pub dst_port: u16,
    pub payload: &'a [u8],
}

/// Parse a raw captured packet and extract the TCP segment it carries.
/// No TLS-level inspection.
///
/// Returns:
/// - `Ok(Some(segment))` if the packet contains a TCP segment with payload
/// - `Ok(None)` if the packet is not TCP or has no payload (SYN, ACK, FIN, etc.)
/// - `Err` if packet parsing fails (truncated headers, no IP header, etc.)
pub fn parse_packet(raw: &[u8], link: LinkLayer, mode: DecodeMode) -> Result<Option<Segment<'_>>> {
    match mode {
        DecodeMode::Selective => parse_selective(raw, link),
        DecodeMode::Compat => parse_compat(raw, link),
    }
}

fn parse_selective(raw: &[u8], link: LinkLayer) -> Result<Option<Segment<'_>>> {
    let sliced = match link {
        LinkLayer::Ethernet => SlicedPacket::from_ethernet(raw)?,
        LinkLayer::RawIp => SlicedPacket::from_ip(raw)?,
    };

    let (src_ip, dst_ip) = match &sliced.net {
        Some(NetSlice::Ipv4(ipv4)) => {
            let hdr = ipv4.header();
            (
                IpAddr::V4(hdr.source_addr()),
                IpAddr::V4(hdr.destination_addr()),
            )
        }
        Some(NetSlice::Ipv6(ipv6)) => {
            let hdr = ipv6.header();
            (
                IpAddr::V6(hdr.source_addr()),
                IpAddr::V6(hdr.destination_addr()),
            )
        }
        _ => bail!("No IP header found"),
    };

    Ok(tcp_segment(src_ip, dst_ip, sliced.transport.as_ref()))
}

fn parse_compat(raw: &[u8], link: LinkLayer) -> Result<Option<Segment<'_>>> {
    let lax = match link {
        LinkLayer::Ethernet => LaxSlicedPacket::from_ethernet(raw)?,
        LinkLayer::RawIp => LaxSlicedPacket::from_ip(raw)?,
    };

    if let Some((err, layer)) = &lax.stop_err {
        debug!("Partial decode, stopped at {:?}: {}", layer, err);
    }

    let (src_ip, dst_ip) = match &lax.net {
        Some(LaxNetSlice::Ipv4(ipv4)) => {
            let hdr = ipv4.header();
            (
                IpAddr::V4(hdr.source_addr()),
                IpAddr::V4(hdr.destination_addr()),
            )
        }
        Some(LaxNetSlice::Ipv6(ipv6)) => {
            let hdr = ipv6.header();
            (
                IpAddr::V6(hdr.source_addr()),
                IpAddr::V6(hdr.destination_addr()),
            )
        }
        _ => bail!("No IP header found"),
    };

    Ok(tcp_segment(src_ip, dst_ip, lax.transport.as_ref()))
}

fn tcp_segment<'a>(
    src_ip: IpAddr,
    dst_ip: IpAddr,
    transport: Option<&TransportSlice<'a>>,
) -> Option<Segment<'a>> {
    match transport {
        Some(TransportSlice::Tcp(tcp)) if !tcp.payload().is_empty() => Some(Segment {
            src_ip,
            src_port: tcp.source_port(),
            dst_ip,
            dst_port: tcp.destination_port(),
            payload: tcp.payload(),
        }),
        _ => None,
    }
}
