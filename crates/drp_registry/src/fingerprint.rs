//! Content fingerprinting for packaged inputs.

use std::fmt;
use std::io::{self, Read};

use xxhash_rust::xxh3::Xxh3;

/// 128-bit content digest over an input's file bytes, folded in enumeration
/// order. Used purely as a cache key, so order dependence is acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u128);

impl Fingerprint {
    pub fn as_u128(&self) -> u128 {
        self.0
    }

    /// Render the digest as 32 lowercase hex characters, the form used as a
    /// registry key.
    pub fn to_hex(&self) -> String {
        format!("{:032x}", self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

/// Streaming fingerprint builder.
///
/// Bytes are folded through a fixed-size buffer so large inputs are never
/// held in memory whole. Folding only reads; inputs are never mutated.
pub struct Fingerprinter {
    hasher: Xxh3,
}

impl Fingerprinter {
    pub fn new() -> Self {
        Self { hasher: Xxh3::new() }
    }

    /// Fold a reader's bytes into the digest. Returns the number of bytes
    /// consumed.
    pub fn fold<R: Read>(&mut self, mut reader: R) -> io::Result<u64> {
        let mut buffer = [0u8; 8192];
        let mut consumed = 0u64;
        loop {
            let read = reader.read(&mut buffer)?;
            if read == 0 {
                break;
            }
            self.hasher.update(&buffer[..read]);
            consumed += read as u64;
        }
        Ok(consumed)
    }

    pub fn finish(self) -> Fingerprint {
        Fingerprint(self.hasher.digest128())
    }
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn fingerprint_of(chunks: &[&[u8]]) -> Fingerprint {
        let mut fingerprinter = Fingerprinter::new();
        for chunk in chunks {
            fingerprinter.fold(Cursor::new(chunk)).unwrap();
        }
        fingerprinter.finish()
    }

    #[test]
    fn identical_bytes_produce_identical_digests() {
        assert_eq!(
            fingerprint_of(&[b"hero.duf", b"texture bytes"]),
            fingerprint_of(&[b"hero.duf", b"texture bytes"])
        );
    }

    #[test]
    fn digest_depends_on_fold_order() {
        assert_ne!(
            fingerprint_of(&[b"first", b"second"]),
            fingerprint_of(&[b"second", b"first"])
        );
    }

    #[test]
    fn chunking_does_not_affect_the_digest() {
        assert_eq!(
            fingerprint_of(&[b"first", b"second"]),
            fingerprint_of(&[b"firstsecond"])
        );
    }

    #[test]
    fn fold_reports_consumed_bytes() {
        let mut fingerprinter = Fingerprinter::new();
        let consumed = fingerprinter.fold(Cursor::new(b"12345")).unwrap();
        assert_eq!(consumed, 5);
    }

    #[test]
    fn hex_rendering_is_32_lowercase_chars() {
        let hex = fingerprint_of(&[b"anything"]).to_hex();
        assert_eq!(hex.len(), 32);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
