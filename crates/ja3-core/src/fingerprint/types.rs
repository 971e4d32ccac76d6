use std::sync::OnceLock;

/// Fields of one ClientHello that make up its JA3 fingerprint.
///
/// Built by [`parse_client_hello`](crate::fingerprint::clienthello::parse_client_hello)
/// or directly through [`Ja3::new`]. All fields are owned copies; nothing
/// borrows the captured segment. The canonical string and its digest are
/// derived lazily and cached, see [`Ja3::ja3_string`] and [`Ja3::ja3_hash`].
#[derive(Debug, Clone, Default)]
pub struct Ja3 {
    /// ClientHello body version (e.g., 0x0303 for TLS 1.2), not the record-layer version
    pub(crate) version: u16,
    /// Cipher suite values in wire order, GREASE removed
    pub(crate) cipher_suites: Vec<u16>,
    /// Extension type codes in wire order, GREASE removed
    pub(crate) extensions: Vec<u16>,
    /// Supported groups / named curves (from extension 0x000a), GREASE removed
    pub(crate) elliptic_curves: Vec<u16>,
    /// EC point format values (from extension 0x000b), unfiltered
    pub(crate) elliptic_curve_point_formats: Vec<u8>,
    /// Server Name Indication, raw hostname bytes
    pub(crate) sni: Vec<u8>,
    pub(crate) ja3_string: OnceLock<String>,
    pub(crate) ja3_hash: OnceLock<String>,
}

impl Ja3 {
    /// Build a fingerprint from already decoded fields.
    ///
    /// Values are taken as given: no GREASE filtering is applied here.
    pub fn new(
        version: u16,
        cipher_suites: Vec<u16>,
        extensions: Vec<u16>,
        elliptic_curves: Vec<u16>,
        elliptic_curve_point_formats: Vec<u8>,
        sni: Vec<u8>,
    ) -> Self {
        Self {
            version,
            cipher_suites,
            extensions,
            elliptic_curves,
            elliptic_curve_point_formats,
            sni,
            ja3_string: OnceLock::new(),
            ja3_hash: OnceLock::new(),
        }
    }

    pub fn version(&self) -> u16 {
        self.version
    }

    pub fn cipher_suites(&self) -> &[u16] {
        &self.cipher_suites
    }

    pub fn extensions(&self) -> &[u16] {
        &self.extensions
    }

    pub fn elliptic_curves(&self) -> &[u16] {
        &self.elliptic_curves
    }

    pub fn elliptic_curve_point_formats(&self) -> &[u8] {
        &self.elliptic_curve_point_formats
    }

    pub fn sni_bytes(&self) -> &[u8] {
        &self.sni
    }

    /// SNI hostname as text, empty if the ClientHello carried none.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    pub fn sni(&self) -> String {
        String::from_utf8_lossy(&self.sni).into_owned()
    }
}

/// Equality over the parsed fields only; cache state is ignored.
impl PartialEq for Ja3 {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.cipher_suites == other.cipher_suites
            && self.extensions == other.extensions
            && self.elliptic_curves == other.elliptic_curves
            && self.elliptic_curve_point_formats == other.elliptic_curve_point_formats
            && self.sni == other.sni
    }
}

impl Eq for Ja3 {}
