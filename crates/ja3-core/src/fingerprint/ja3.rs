use std::fmt;

use md5::{Digest, Md5};

use crate::fingerprint::types::Ja3;

impl Ja3 {
    /// The canonical JA3 string.
    ///
    /// JA3 format: `SSLVersion,Ciphers,Extensions,EllipticCurves,EcPointFormats`
    ///
    /// - Fields separated by commas
    /// - Values within each field separated by dashes
    /// - All values in decimal
    ///
    /// Computed on first call and cached for the lifetime of the value.
    pub fn ja3_string(&self) -> &str {
        self.ja3_string.get_or_init(|| marshal(self))
    }

    pub fn ja3_bytes(&self) -> &[u8] {
        self.ja3_string().as_bytes()
    }

    /// MD5 digest of [`Ja3::ja3_string`], lower-case hex. Cached like the string.
    pub fn ja3_hash(&self) -> &str {
        self.ja3_hash.get_or_init(|| {
            let mut hasher = Md5::new();
            hasher.update(self.ja3_bytes());
            hex::encode(hasher.finalize())
        })
    }
}

impl fmt::Display for Ja3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ja3_string())
    }
}

/// Render the canonical string into a buffer sized up front.
fn marshal(ja3: &Ja3) -> String {
    let mut out = String::with_capacity(estimated_len(ja3));
    out.push_str(&ja3.version.to_string());
    out.push(',');
    push_list(&mut out, &ja3.cipher_suites);
    out.push(',');
    push_list(&mut out, &ja3.extensions);
    out.push(',');
    push_list(&mut out, &ja3.elliptic_curves);
    out.push(',');
    push_list(&mut out, &ja3.elliptic_curve_point_formats);
    out
}

// u16 needs up to 5 digits, u8 up to 3, plus one separator each.
fn estimated_len(ja3: &Ja3) -> usize {
    6 * (1 + ja3.cipher_suites.len() + ja3.extensions.len() + ja3.elliptic_curves.len())
        + 4 * ja3.elliptic_curve_point_formats.len()
}

fn push_list<T: ToString>(out: &mut String, values: &[T]) {
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            out.push('-');
        }
        out.push_str(&v.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_42() -> Ja3 {
        Ja3::new(
            42,
            vec![42; 5],
            vec![42; 5],
            vec![42; 5],
            vec![42; 5],
            vec![],
        )
    }

    #[test]
    fn test_ja3_all_fields() {
        let ja3 = all_42();
        assert_eq!(
            ja3.ja3_string(),
            "42,42-42-42-42-42,42-42-42-42-42,42-42-42-42-42,42-42-42-42-42"
        );
        assert_eq!(ja3.ja3_hash(), "51b238d92972b9f5b232922107e05b9a");
    }

    #[test]
    fn test_ja3_version_only() {
        let ja3 = Ja3::new(42, vec![], vec![], vec![], vec![], vec![]);
        assert_eq!(ja3.ja3_string(), "42,,,,");
    }

    #[test]
    fn test_ja3_unpopulated() {
        let ja3 = Ja3::default();
        assert_eq!(ja3.ja3_string(), "0,,,,");
        assert_eq!(ja3.ja3_hash(), "2432bebf06532faf89aae784a9aae4ef");
    }

    #[test]
    fn test_ja3_basic() {
        let ja3 = Ja3::new(
            0x0303, // TLS 1.2 = 771 decimal
            vec![0x1301, 0x1302, 0x1303, 0xC02B, 0xC02F],
            vec![0x0000, 0x0017, 0x000a, 0x000b, 0x000d],
            vec![0x001d, 0x0017, 0x0018],
            vec![0x00],
            b"example.com".to_vec(),
        );

        assert_eq!(
            ja3.ja3_string(),
            "771,4865-4866-4867-49195-49199,0-23-10-11-13,29-23-24,0"
        );
        assert_eq!(ja3.ja3_hash().len(), 32);
        assert!(ja3.ja3_hash().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn cached_values_are_stable() {
        let ja3 = all_42();
        let first = ja3.ja3_string() as *const str;
        let second = ja3.ja3_string() as *const str;
        assert_eq!(first, second);
        assert_eq!(ja3.ja3_hash(), ja3.ja3_hash());
        assert_eq!(ja3.ja3_bytes(), ja3.ja3_string().as_bytes());
    }

    #[test]
    fn display_matches_string() {
        let ja3 = all_42();
        assert_eq!(ja3.to_string(), ja3.ja3_string());
    }

    #[test]
    fn capacity_covers_widest_values() {
        let ja3 = Ja3::new(
            u16::MAX,
            vec![u16::MAX; 3],
            vec![u16::MAX; 3],
            vec![u16::MAX; 3],
            vec![u8::MAX; 3],
            vec![],
        );
        let s = marshal(&ja3);
        assert!(s.len() <= estimated_len(&ja3));
        assert!(s.starts_with("65535,65535-65535-65535,"));
        assert!(s.ends_with(",255-255-255"));
    }

    #[test]
    fn concurrent_readers_see_one_value() {
        let ja3 = std::sync::Arc::new(all_42());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ja3 = ja3.clone();
                std::thread::spawn(move || ja3.ja3_hash().to_string())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), "51b238d92972b9f5b232922107e05b9a");
        }
    }
}
