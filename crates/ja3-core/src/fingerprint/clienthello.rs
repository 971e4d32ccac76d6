use tracing::trace;

use crate::fingerprint::error::ParseError;
use crate::fingerprint::grease::{collect_u16_without_grease, is_grease_u16};
use crate::fingerprint::reader::Reader;
use crate::fingerprint::types::Ja3;

const RECORD_HEADER_LEN: usize = 5;
// handshake type + length + version + random + session id length
const HANDSHAKE_FIXED_LEN: usize = 6 + 32 + 1;
const RANDOM_LEN: usize = 32;
const EXTENSION_HEADER_LEN: usize = 4;
// list length + name type + name length
const SNI_HEADER_LEN: usize = 5;

const CONTENT_TYPE_HANDSHAKE: u8 = 22;
const HANDSHAKE_TYPE_CLIENT_HELLO: u8 = 1;

const EXT_SERVER_NAME: u16 = 0x0000;
const EXT_SUPPORTED_GROUPS: u16 = 0x000a;
const EXT_EC_POINT_FORMATS: u16 = 0x000b;
const SNI_HOST_NAME: u8 = 0;

// SSL 3.0 through TLS 1.2 share the 0x03 major byte
const VERSION_MASK: u16 = 0xFFFC;
const TLS13: u16 = 0x0304;

/// SSL 3.0 to TLS 1.2, or TLS 1.3.
pub fn is_supported_version(version: u16) -> bool {
    version & VERSION_MASK == 0x0300 || version == TLS13
}

/// Parse one TCP payload into a JA3 fingerprint.
///
/// The input must start with a TLS record header and hold the complete
/// ClientHello. Bytes past the declared record length are ignored.
/// Fails fast on the first malformed field; see [`ParseError`] for the
/// numbered length and version checks.
pub fn parse_client_hello(segment: &[u8]) -> Result<Ja3, ParseError> {
    let result = parse_record(segment);
    if let Err(e) = &result {
        trace!(len = segment.len(), error = %e, "segment rejected");
    }
    result
}

fn parse_record(segment: &[u8]) -> Result<Ja3, ParseError> {
    let mut r = Reader::new(segment);
    r.ensure(RECORD_HEADER_LEN, 1)?;

    if r.read_u8(1)? != CONTENT_TYPE_HANDSHAKE {
        return Err(ParseError::ContentType);
    }

    if !is_supported_version(r.read_u16(1)?) {
        return Err(ParseError::Version(1));
    }

    let record_len = r.read_u16(1)? as usize;
    let handshake = r.read_bytes(record_len, 2)?;

    parse_handshake(handshake)
}

fn parse_handshake(hs: &[u8]) -> Result<Ja3, ParseError> {
    let mut r = Reader::new(hs);
    r.ensure(HANDSHAKE_FIXED_LEN, 3)?;

    if r.read_u8(3)? != HANDSHAKE_TYPE_CLIENT_HELLO {
        return Err(ParseError::HandshakeType);
    }

    // must cover the rest of the record exactly
    let handshake_len = r.read_u24(3)? as usize;
    if r.remaining() != handshake_len {
        return Err(ParseError::Length(4));
    }

    let version = r.read_u16(3)?;
    if !is_supported_version(version) {
        return Err(ParseError::Version(2));
    }

    r.skip(RANDOM_LEN, 3)?;
    let session_id_len = r.read_u8(3)? as usize;
    r.skip(session_id_len, 5)?;

    let cipher_len = r.read_u16(6)? as usize;
    // cipher suites plus the compression methods length byte
    r.ensure(cipher_len + 1, 7)?;
    let cipher_suites = collect_u16_without_grease(r.read_bytes(cipher_len, 7)?);

    let compression_len = r.read_u8(7)? as usize;
    r.skip(compression_len, 8)?;

    let mut ja3 = Ja3 {
        version,
        cipher_suites,
        ..Ja3::default()
    };
    parse_extensions(&mut ja3, r.rest())?;
    Ok(ja3)
}

/// Walk the extension block, filling extensions, curves, point formats and SNI.
///
/// An empty block is valid: the length field itself is omitted when a
/// ClientHello carries no extensions.
fn parse_extensions(ja3: &mut Ja3, block: &[u8]) -> Result<(), ParseError> {
    if block.is_empty() {
        return Ok(());
    }

    let mut r = Reader::new(block);
    let declared_len = r.read_u16(9)? as usize;
    r.ensure(declared_len, 10)?;

    while !r.is_empty() {
        r.ensure(EXTENSION_HEADER_LEN, 11)?;
        let ext_type = r.read_u16(11)?;
        let ext_len = r.read_u16(11)? as usize;

        if !is_grease_u16(ext_type) {
            ja3.extensions.push(ext_type);
        }

        let body = r.read_bytes(ext_len, 12)?;

        match ext_type {
            EXT_SERVER_NAME => ja3.sni = parse_server_name(body)?,
            EXT_SUPPORTED_GROUPS => ja3.elliptic_curves = parse_supported_groups(body)?,
            EXT_EC_POINT_FORMATS => {
                ja3.elliptic_curve_point_formats = parse_ec_point_formats(body)?
            }
            _ => {}
        }
    }

    Ok(())
}

/// Only the first entry of the server name list is read.
fn parse_server_name(body: &[u8]) -> Result<Vec<u8>, ParseError> {
    let mut r = Reader::new(body);
    r.ensure(SNI_HEADER_LEN, 13)?;

    // list length is not checked on its own
    let _list_len = r.read_u16(13)?;
    let name_type = r.read_u8(13)?;
    let name_len = r.read_u16(13)? as usize;

    if r.remaining() != name_len {
        return Err(ParseError::Length(14));
    }

    match name_type {
        SNI_HOST_NAME => Ok(r.rest().to_vec()),
        _ => Err(ParseError::SniType),
    }
}

fn parse_supported_groups(body: &[u8]) -> Result<Vec<u16>, ParseError> {
    let mut r = Reader::new(body);
    let len = r.read_u16(15)? as usize;
    if r.remaining() != len {
        return Err(ParseError::Length(16));
    }
    Ok(collect_u16_without_grease(r.rest()))
}

/// Point formats are kept verbatim, GREASE-looking bytes included.
fn parse_ec_point_formats(body: &[u8]) -> Result<Vec<u8>, ParseError> {
    let mut r = Reader::new(body);
    let len = r.read_u8(17)? as usize;
    if r.remaining() != len {
        return Err(ParseError::Length(18));
    }
    Ok(r.rest().to_vec())
}

impl Ja3 {
    /// Parse a TCP payload holding a TLS ClientHello record.
    ///
    /// Equivalent to [`parse_client_hello`].
    pub fn from_segment(segment: &[u8]) -> Result<Self, ParseError> {
        parse_client_hello(segment)
    }
}
