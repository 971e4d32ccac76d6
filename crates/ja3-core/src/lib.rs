//! JA3 fingerprints from TLS ClientHello messages.
//!
//! Feed the payload of a TCP segment that starts a TLS record to
//! [`Ja3::from_segment`]. On success the returned [`Ja3`] exposes the
//! parsed fields, the canonical JA3 string, its MD5 digest and the SNI
//! hostname.
//!
//! ```
//! # let segment: &[u8] = &[22, 3, 0, 0, 44, 1, 0, 0, 40, 3, 0,
//! #     42, 42, 42, 42, 42, 42, 42, 42, 42, 42, 42, 42, 42, 42, 42, 42,
//! #     42, 42, 42, 42, 42, 42, 42, 42, 42, 42, 42, 42, 42, 42, 42, 42,
//! #     0, 0, 2, 21, 21, 0];
//! let ja3 = ja3_core::Ja3::from_segment(segment).unwrap();
//! assert_eq!(ja3.ja3_string(), "768,5397,,,");
//! assert_eq!(ja3.ja3_hash(), "185477c6143146afd64ba7bc72210566");
//! ```

pub mod fingerprint;

pub use fingerprint::clienthello::parse_client_hello;
pub use fingerprint::error::ParseError;
pub use fingerprint::types::Ja3;
