use crate::fingerprint::error::ParseError;

/// Bounds-checked big-endian cursor over a byte slice.
///
/// Every read names the length check it belongs to; running out of bytes
/// yields `ParseError::Length(site)` and leaves the cursor where it was.
#[derive(Debug, Clone)]
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Fail with `site` unless at least `n` bytes remain.
    pub(crate) fn ensure(&self, n: usize, site: u8) -> Result<(), ParseError> {
        if self.remaining() < n {
            return Err(ParseError::Length(site));
        }
        Ok(())
    }

    pub(crate) fn read_bytes(&mut self, n: usize, site: u8) -> Result<&'a [u8], ParseError> {
        self.ensure(n, site)?;
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub(crate) fn skip(&mut self, n: usize, site: u8) -> Result<(), ParseError> {
        self.read_bytes(n, site).map(|_| ())
    }

    pub(crate) fn read_u8(&mut self, site: u8) -> Result<u8, ParseError> {
        Ok(self.read_bytes(1, site)?[0])
    }

    pub(crate) fn read_u16(&mut self, site: u8) -> Result<u16, ParseError> {
        let b = self.read_bytes(2, site)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub(crate) fn read_u24(&mut self, site: u8) -> Result<u32, ParseError> {
        let b = self.read_bytes(3, site)?;
        Ok(u32::from_be_bytes([0, b[0], b[1], b[2]]))
    }

    /// Consume and return everything left.
    pub(crate) fn rest(&mut self) -> &'a [u8] {
        let out = &self.buf[self.pos..];
        self.pos = self.buf.len();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian() {
        let mut r = Reader::new(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
        assert_eq!(r.read_u8(1).unwrap(), 0x01);
        assert_eq!(r.read_u16(1).unwrap(), 0x0203);
        assert_eq!(r.read_u24(1).unwrap(), 0x040506);
        assert!(r.is_empty());
    }

    #[test]
    fn short_read_reports_site_and_keeps_position() {
        let mut r = Reader::new(&[0xAA, 0xBB, 0xCC]);
        r.skip(2, 1).unwrap();
        assert_eq!(r.read_u16(9), Err(ParseError::Length(9)));
        assert_eq!(r.remaining(), 1);
        assert_eq!(r.read_bytes(4, 12), Err(ParseError::Length(12)));
        assert_eq!(r.rest(), &[0xCC]);
        assert_eq!(r.rest(), &[] as &[u8]);
    }

    #[test]
    fn ensure_does_not_consume() {
        let r = Reader::new(&[0u8; 4]);
        assert!(r.ensure(4, 3).is_ok());
        assert_eq!(r.ensure(5, 3), Err(ParseError::Length(3)));
        assert_eq!(r.remaining(), 4);
    }
}
