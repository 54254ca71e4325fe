//! Owned, validated envelope value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::envelope::{HEADER_LEN, MAX_DIGEST_LEN, decode_envelope};
use crate::error::{Error, Result};
use crate::registry::{Codec, Registry};
use crate::stream::{Content, DEFAULT_CHUNK_SIZE, feed};

/// A digest tagged with the code of the algorithm that produced it.
///
/// Displays and parses as the lowercase hex of its envelope; serializes the
/// same way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Multihash {
    code:   u8,
    digest: Vec<u8>,
}

impl Multihash {
    /// Wraps a precomputed digest under a builtin code.
    pub fn new(code: u8, digest: impl Into<Vec<u8>>) -> Result<Self> {
        Self::new_in(Registry::builtin(), code, digest)
    }

    /// Wraps a precomputed digest. The code must be a member of `registry` and
    /// the digest must fit the envelope, so the value always decodes again.
    pub fn new_in(registry: &Registry, code: u8, digest: impl Into<Vec<u8>>) -> Result<Self> {
        let digest = digest.into();
        if !registry.contains_code(code) {
            return Err(Error::UnknownCodec(format!("{code:#04x}")));
        }
        if digest.is_empty() {
            return Err(Error::EmptyDigest);
        }
        if digest.len() > MAX_DIGEST_LEN {
            return Err(Error::DigestTooLong(digest.len()));
        }
        Ok(Self { code, digest })
    }

    /// Decodes an envelope against the builtin registry.
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        Self::from_bytes_in(Registry::builtin(), buf)
    }

    pub fn from_bytes_in(registry: &Registry, buf: &[u8]) -> Result<Self> {
        let (code, digest) = decode_envelope(registry, buf)?;
        Ok(Self {
            code,
            digest: digest.to_vec(),
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.digest.len());
        out.push(self.code);
        out.push(self.digest.len() as u8);
        out.extend_from_slice(&self.digest);
        out
    }

    pub fn code(&self) -> u8 { self.code }

    pub fn digest(&self) -> &[u8] { &self.digest }

    /// Builtin codec for this code, if any. Values decoded against another
    /// registry should use [`Multihash::codec_in`].
    pub fn codec(&self) -> Option<&'static Codec> { self.codec_in(Registry::builtin()) }

    pub fn codec_in<'r>(&self, registry: &'r Registry) -> Option<&'r Codec> {
        registry.by_code(self.code)
    }

    /// Rehashes `content` with this digest's codec and compares.
    pub fn verify<'a>(&self, content: impl Into<Content<'a>>) -> Result<()> {
        self.verify_in(Registry::builtin(), content.into(), DEFAULT_CHUNK_SIZE)
    }

    pub fn verify_in(
        &self,
        registry: &Registry,
        content: Content<'_>,
        chunk_size: usize,
    ) -> Result<()> {
        let codec = registry
            .by_code(self.code)
            .ok_or_else(|| Error::UnknownCodec(format!("{:#04x}", self.code)))?;

        let mut hasher = codec.hasher();
        feed(hasher.as_mut(), content, chunk_size)?;
        let actual = hasher.finalize();

        if actual == self.digest {
            Ok(())
        } else {
            Err(Error::Mismatch {
                expected: self.digest.clone(),
                actual,
            })
        }
    }
}

impl fmt::Display for Multihash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}{:02x}", self.code, self.digest.len())?;
        f.write_str(&hex::encode(&self.digest))
    }
}

impl FromStr for Multihash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> { Self::from_bytes(&hex::decode(s)?) }
}

impl TryFrom<&[u8]> for Multihash {
    type Error = Error;

    fn try_from(buf: &[u8]) -> Result<Self> { Self::from_bytes(buf) }
}

impl From<Multihash> for Vec<u8> {
    fn from(multihash: Multihash) -> Self { multihash.to_bytes() }
}

impl Serialize for Multihash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Multihash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{SHA1, SHA2_256};

    const SHA1_MULTIHASH: &str = "111488c2f11fb2ce392acb5b2986e640211c4690073e";

    #[test]
    fn test_parse_and_display() {
        let multihash: Multihash = SHA1_MULTIHASH.parse().unwrap();
        assert_eq!(multihash.code(), SHA1);
        assert_eq!(multihash.digest().len(), 20);
        assert_eq!(multihash.codec().map(Codec::name), Some("sha1"));
        assert_eq!(multihash.to_string(), SHA1_MULTIHASH);
        assert_eq!(hex::encode(multihash.to_bytes()), SHA1_MULTIHASH);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!("zz".parse::<Multihash>(), Err(Error::InvalidHex(_))));
        assert!(matches!("1114".parse::<Multihash>(), Err(Error::BufferTooShort(2))));
    }

    #[test]
    fn test_new_caps_digest() {
        assert!(Multihash::new(SHA1, vec![0; 127]).is_ok());
        assert!(matches!(
            Multihash::new(SHA1, vec![0; 128]),
            Err(Error::DigestTooLong(128))
        ));
    }

    #[test]
    fn test_new_rejects_undecodable_values() {
        assert!(matches!(Multihash::new(0x02, vec![1, 2, 3]), Err(Error::UnknownCodec(_))));
        assert!(matches!(Multihash::new(SHA1, Vec::new()), Err(Error::EmptyDigest)));

        let registry = Registry::builtin().restrict(&["sha1"]).unwrap();
        assert!(Multihash::new_in(&registry, SHA1, vec![1]).is_ok());
        assert!(matches!(
            Multihash::new_in(&registry, SHA2_256, vec![1]),
            Err(Error::UnknownCodec(_))
        ));
    }

    #[test]
    fn test_new_values_roundtrip_through_text() {
        for (code, len) in [(SHA1, 1), (SHA1, 20), (SHA2_256, 127)] {
            let multihash = Multihash::new(code, vec![0x5a; len]).unwrap();

            let parsed: Multihash = multihash.to_string().parse().unwrap();
            assert_eq!(parsed, multihash);

            let json = serde_json::to_string(&multihash).unwrap();
            let back: Multihash = serde_json::from_str(&json).unwrap();
            assert_eq!(back, multihash);
        }
    }

    #[test]
    fn test_codec_in_follows_registry() {
        let multihash: Multihash = SHA1_MULTIHASH.parse().unwrap();
        let registry = Registry::builtin().restrict(&["sha2-256"]).unwrap();
        assert!(multihash.codec_in(&registry).is_none());
        assert_eq!(multihash.codec().map(Codec::name), Some("sha1"));

        let sha1_only = Registry::builtin().restrict(&["sha1"]).unwrap();
        let decoded = Multihash::from_bytes_in(&sha1_only, &multihash.to_bytes()).unwrap();
        assert_eq!(decoded.codec_in(&sha1_only).map(Codec::code), Some(SHA1));
    }

    #[test]
    fn test_verify() {
        let multihash: Multihash = SHA1_MULTIHASH.parse().unwrap();
        multihash.verify("multihash").unwrap();
        assert!(matches!(multihash.verify("multihash!"), Err(Error::Mismatch { .. })));
    }

    #[test]
    fn test_verify_unknown_code() {
        let multihash = Multihash::new(SHA1, vec![1, 2, 3]).unwrap();
        let registry = Registry::builtin().restrict(&["sha2-256"]).unwrap();
        assert!(matches!(
            multihash.verify_in(&registry, b"abc".into(), DEFAULT_CHUNK_SIZE),
            Err(Error::UnknownCodec(_))
        ));
    }

    #[test]
    fn test_serde_as_hex_string() {
        let multihash = Multihash::new(SHA2_256, vec![0xab; 32]).unwrap();
        let json = serde_json::to_string(&multihash).unwrap();
        assert_eq!(json, format!("\"1220{}\"", "ab".repeat(32)));

        let back: Multihash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, multihash);
        assert!(serde_json::from_str::<Multihash>("\"ff0100\"").is_err());
    }
}
