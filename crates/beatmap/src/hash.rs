//! Content hashing.
//!
//! The game identifies beatmaps by the MD5 digest of the raw `.osu` file, so
//! that is the one hash used here. It is always computed over the exact bytes
//! handed in: no BOM stripping, no line-ending normalisation.

use crate::error::{Error, ErrorKind};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Length in bytes of a [`Digest`].
pub const DIGEST_LEN: usize = 16;

/// A fixed-size content digest of a beatmap file.
///
/// Renders as 32 lowercase hexadecimal characters, which is the join key used
/// by both collection formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// Hash a byte slice.
    ///
    /// ```
    /// use osupack_beatmap::Digest;
    ///
    /// let digest = Digest::of(b"");
    /// assert_eq!(digest.to_string(), "d41d8cd98f00b204e9800998ecf8427e");
    /// ```
    #[must_use]
    pub fn of(bytes: impl AsRef<[u8]>) -> Self {
        Self(md5::compute(bytes.as_ref()).0)
    }
}

impl From<[u8; DIGEST_LEN]> for Digest {
    fn from(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }
}

impl Display for Digest {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl FromStr for Digest {
    type Err = Error;
    /// Parse 32 hex characters (either case).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != DIGEST_LEN * 2 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            exn::bail!(ErrorKind::InvalidDigest(s.to_string()));
        }
        let mut bytes = [0u8; DIGEST_LEN];
        for (index, byte) in bytes.iter_mut().enumerate() {
            let pair = &s[index * 2..index * 2 + 2];
            *byte = match u8::from_str_radix(pair, 16) {
                Ok(value) => value,
                Err(_) => exn::bail!(ErrorKind::InvalidDigest(s.to_string())),
            };
        }
        Ok(Self(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_digest_is_deterministic() {
        let content = b"osu file format v14\r\n\r\n[General]\r\nMode: 0\r\n";
        assert_eq!(Digest::of(content), Digest::of(content));
    }

    #[test]
    fn test_single_byte_mutation_changes_digest() {
        let content = b"osu file format v14\r\n\r\n[General]\r\nMode: 0\r\n".to_vec();
        let original = Digest::of(&content);
        for index in 0..content.len() {
            let mut mutated = content.clone();
            mutated[index] ^= 0x01;
            assert_ne!(Digest::of(&mutated), original, "mutation at byte {index}");
        }
    }

    #[test]
    fn test_line_endings_are_not_normalised() {
        assert_ne!(Digest::of(b"a\r\nb"), Digest::of(b"a\nb"));
    }

    #[rstest]
    #[case(b"".as_slice(), "d41d8cd98f00b204e9800998ecf8427e")]
    #[case(b"abc".as_slice(), "900150983cd24fb0d6963f7d28e17f72")]
    fn test_known_digests(#[case] input: &[u8], #[case] expected: &str) {
        let rendered = Digest::of(input).to_string();
        assert_eq!(rendered, expected);
        assert_eq!(rendered.len(), 32);
        assert_eq!(rendered, rendered.to_lowercase());
    }

    #[rstest]
    #[case("900150983cd24fb0d6963f7d28e17f72")]
    #[case("900150983CD24FB0D6963F7D28E17F72")]
    fn test_parse(#[case] input: &str) {
        assert_eq!(input.parse::<Digest>().unwrap(), Digest::of(b"abc"));
    }

    #[rstest]
    #[case("")]
    #[case("900150983cd24fb0d6963f7d28e17f7")]
    #[case("900150983cd24fb0d6963f7d28e17f72aa")]
    #[case("zz0150983cd24fb0d6963f7d28e17f72")]
    #[case("+00150983cd24fb0d6963f7d28e17f72")]
    #[case("9001509ü3cd24fb0d6963f7d28e17f7")]
    fn test_parse_invalid(#[case] input: &str) {
        let err = input.parse::<Digest>().unwrap_err();
        assert!(matches!(*err, ErrorKind::InvalidDigest(_)));
    }
}
