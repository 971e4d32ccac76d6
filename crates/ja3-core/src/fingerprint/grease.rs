/// The 16 GREASE values reserved by RFC 8701: 0x0A0A, 0x1A1A, ..., 0xFAFA.
pub const GREASE_VALUES: [u16; 16] = [
    0x0A0A, 0x1A1A, 0x2A2A, 0x3A3A, 0x4A4A, 0x5A5A, 0x6A6A, 0x7A7A, 0x8A8A, 0x9A9A, 0xAAAA,
    0xBABA, 0xCACA, 0xDADA, 0xEAEA, 0xFAFA,
];

const GREASE_MASK: u16 = 0x0F0F;

/// Check if a u16 value is a GREASE value.
///
/// Matches any value of the form `0x?A?A`. This is wider than
/// [`GREASE_VALUES`] (high nibbles may differ), which is what JA3 has always
/// filtered on.
pub fn is_grease_u16(val: u16) -> bool {
    val & GREASE_MASK == 0x0A0A
}

/// Decode big-endian u16 entries, dropping GREASE values.
///
/// A trailing odd byte is ignored.
pub(crate) fn collect_u16_without_grease(block: &[u8]) -> Vec<u16> {
    block
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .filter(|v| !is_grease_u16(*v))
        .collect()
}
