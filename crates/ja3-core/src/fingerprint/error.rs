/// Reasons a TCP payload is rejected as a ClientHello.
///
/// Length and version failures carry the number of the check that tripped,
/// so a rejected segment can be traced back to the exact field that was
/// short or malformed. Callers should treat every variant the same way:
/// the segment is not a usable ClientHello and is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("length check {0} failed")]
    Length(u8),
    #[error("content type not matching")]
    ContentType,
    #[error("version check {0} failed")]
    Version(u8),
    #[error("handshake type not matching")]
    HandshakeType,
    #[error("SNI type not supported")]
    SniType,
}

impl ParseError {
    /// Check site number for length and version failures.
    pub fn site(&self) -> Option<u8> {
        match self {
            Self::Length(site) | Self::Version(site) => Some(*site),
            _ => None,
        }
    }

    pub fn is_length(&self) -> bool {
        matches!(self, Self::Length(_))
    }
}
