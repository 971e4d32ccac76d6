use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use ja3_core::Ja3;

use crate::packet::Segment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => anyhow::bail!("Invalid output format '{}'. Expected 'text' or 'json'.", s),
        }
    }
}

/// One fingerprinted segment, in the field order of the reference JA3 tools.
#[derive(Debug, Serialize)]
pub struct Ja3Record<'a> {
    pub destination_ip: String,
    pub destination_port: u16,
    pub ja3: &'a str,
    pub ja3_digest: &'a str,
    pub source_ip: String,
    pub source_port: u16,
    pub sni: String,
    /// Capture time, nanoseconds since the Unix epoch
    pub timestamp: i64,
}

impl<'a> Ja3Record<'a> {
    pub fn new(segment: &Segment<'_>, timestamp: i64, ja3: &'a Ja3) -> Self {
        Self {
            destination_ip: segment.dst_ip.to_string(),
            destination_port: segment.dst_port,
            ja3: ja3.ja3_string(),
            ja3_digest: ja3.ja3_hash(),
            source_ip: segment.src_ip.to_string(),
            source_port: segment.src_port,
            sni: ja3.sni(),
            timestamp,
        }
    }
}

/// Writes records to an underlying stream, one per fingerprinted segment.
pub struct RecordWriter<W: Write> {
    inner: W,
    format: OutputFormat,
    flush_each: bool,
}

impl<W: Write> RecordWriter<W> {
    /// `flush_each` pushes every record out immediately, for live captures.
    pub fn new(inner: W, format: OutputFormat, flush_each: bool) -> Self {
        Self {
            inner,
            format,
            flush_each,
        }
    }

    pub fn write(&mut self, record: &Ja3Record<'_>) -> Result<()> {
        match self.format {
            OutputFormat::Json => self.write_json(record),
            OutputFormat::Text => self.write_text(record),
        }
        .context("Failed to write record")?;

        if self.flush_each {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush().context("Failed to flush output")
    }

    fn write_json(&mut self, record: &Ja3Record<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.inner, record)?;
        self.inner.write_all(b"\n")?;
        Ok(())
    }

    fn write_text(&mut self, record: &Ja3Record<'_>) -> Result<()> {
        let w = &mut self.inner;
        writeln!(w, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(w, "  Time:       {}", format_timestamp(record.timestamp))?;
        writeln!(w, "  Source:     {}:{}", record.source_ip, record.source_port)?;
        writeln!(
            w,
            "  Dest:       {}:{}",
            record.destination_ip, record.destination_port
        )?;
        let sni = if record.sni.is_empty() {
            "(none)"
        } else {
            record.sni.as_str()
        };
        writeln!(w, "  SNI:        {}", sni)?;
        writeln!(w, "  ──────────────────────────────────────────────────")?;
        writeln!(w, "  JA3:        {}", record.ja3_digest)?;
        writeln!(w, "  JA3 raw:    {}", record.ja3)?;
        writeln!(w, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n")?;
        Ok(())
    }
}

/// RFC 3339 with microseconds, or the raw nanosecond count if out of range.
fn format_timestamp(nanos: i64) -> String {
    let secs = nanos.div_euclid(1_000_000_000);
    let subsec = nanos.rem_euclid(1_000_000_000) as u32;
    match chrono::DateTime::from_timestamp(secs, subsec) {
        Some(dt) => dt.to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
        None => nanos.to_string(),
    }
}
