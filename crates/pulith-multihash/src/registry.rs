//! Codec table: name, one-byte wire code and hasher factory.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;

use crate::error::{Error, Result};
use crate::hasher::{DigestHasher, FactoryFn, Hasher};

/// Highest application-specific code. Codes `0x00..=APP_CODE_MAX` are reserved
/// for caller-defined algorithms and never map to a registry entry.
pub const APP_CODE_MAX: u8 = 0x0f;

pub const MD5: u8 = 0xd5;
pub const SHA1: u8 = 0x11;
pub const SHA2_256: u8 = 0x12;
pub const SHA2_512: u8 = 0x13;
pub const SHA3_512: u8 = 0x14;
pub const SHA3_384: u8 = 0x15;
pub const SHA3_256: u8 = 0x16;
pub const SHA3_224: u8 = 0x17;
pub const BLAKE2B_64: u8 = 0x40;
pub const BLAKE2S_32: u8 = 0x41;

static BUILTIN: Lazy<Registry> = Lazy::new(|| Registry::new(builtin_codecs()).unwrap());

/// Returns `true` for application-specific codes.
pub fn is_app_code(code: u8) -> bool { code <= APP_CODE_MAX }

/// A named hash algorithm bound to its wire code.
#[derive(Clone, Copy)]
pub struct Codec {
    name:       &'static str,
    code:       u8,
    digest_len: usize,
    factory:    FactoryFn,
}

impl Codec {
    pub const fn new(name: &'static str, code: u8, digest_len: usize, factory: FactoryFn) -> Self {
        Self {
            name,
            code,
            digest_len,
            factory,
        }
    }

    pub fn name(&self) -> &'static str { self.name }

    pub fn code(&self) -> u8 { self.code }

    /// Native output length of the algorithm in bytes.
    pub fn digest_len(&self) -> usize { self.digest_len }

    pub fn factory(&self) -> FactoryFn { self.factory }

    pub fn hasher(&self) -> Box<dyn Hasher> { (self.factory)() }

    /// One-shot digest of `data`.
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        let mut hasher = self.hasher();
        hasher.update(data);
        hasher.finalize()
    }
}

impl PartialEq for Codec {
    fn eq(&self, other: &Self) -> bool { self.code == other.code && self.name == other.name }
}

impl Eq for Codec {}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("name", &self.name)
            .field("code", &format_args!("{:#04x}", self.code))
            .field("digest_len", &self.digest_len)
            .finish()
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name) }
}

/// The statically declared codec table.
///
/// SHA-3 and BLAKE2 entries are present only when their cargo features are
/// enabled.
pub fn builtin_codecs() -> Vec<Codec> {
    #[allow(unused_mut)]
    let mut codecs = vec![
        Codec::new("md5", MD5, 16, DigestHasher::<md5::Md5>::boxed),
        Codec::new("sha1", SHA1, 20, DigestHasher::<sha1::Sha1>::boxed),
        Codec::new("sha2-256", SHA2_256, 32, DigestHasher::<sha2::Sha256>::boxed),
        Codec::new("sha2-512", SHA2_512, 64, DigestHasher::<sha2::Sha512>::boxed),
    ];

    #[cfg(feature = "sha3")]
    codecs.extend([
        Codec::new("sha3-224", SHA3_224, 28, DigestHasher::<sha3::Sha3_224>::boxed),
        Codec::new("sha3-256", SHA3_256, 32, DigestHasher::<sha3::Sha3_256>::boxed),
        Codec::new("sha3-384", SHA3_384, 48, DigestHasher::<sha3::Sha3_384>::boxed),
        Codec::new("sha3-512", SHA3_512, 64, DigestHasher::<sha3::Sha3_512>::boxed),
    ]);

    #[cfg(feature = "blake2")]
    codecs.extend([
        Codec::new("blake2b-64", BLAKE2B_64, 64, DigestHasher::<blake2::Blake2b512>::boxed),
        Codec::new("blake2s-32", BLAKE2S_32, 32, DigestHasher::<blake2::Blake2s256>::boxed),
    ]);

    codecs
}

/// Immutable lookup tables over a set of codecs.
///
/// Names and codes are two independent unique indices over the same entries.
#[derive(Debug, Clone)]
pub struct Registry {
    codecs:  Vec<Codec>,
    by_name: HashMap<&'static str, usize>,
    by_code: HashMap<u8, usize>,
}

impl Registry {
    /// Builds a registry, rejecting tables with a repeated name or code.
    pub fn new(codecs: impl IntoIterator<Item = Codec>) -> Result<Self> {
        let codecs: Vec<Codec> = codecs.into_iter().collect();
        let mut by_name = HashMap::with_capacity(codecs.len());
        let mut by_code = HashMap::with_capacity(codecs.len());

        for (idx, codec) in codecs.iter().enumerate() {
            if by_name.insert(codec.name, idx).is_some() {
                return Err(Error::DuplicateCodec(codec.name.to_string()));
            }
            if by_code.insert(codec.code, idx).is_some() {
                return Err(Error::DuplicateCodec(format!("{:#04x}", codec.code)));
            }
        }

        tracing::debug!(codecs = codecs.len(), "built codec registry");

        Ok(Self {
            codecs,
            by_name,
            by_code,
        })
    }

    /// The process-wide registry over [`builtin_codecs`].
    pub fn builtin() -> &'static Registry { &BUILTIN }

    pub fn by_name(&self, name: &str) -> Option<&Codec> {
        self.by_name.get(name).map(|&idx| &self.codecs[idx])
    }

    pub fn by_code(&self, code: u8) -> Option<&Codec> {
        self.by_code.get(&code).map(|&idx| &self.codecs[idx])
    }

    pub fn code_of(&self, name: &str) -> Option<u8> { self.by_name(name).map(Codec::code) }

    pub fn contains_code(&self, code: u8) -> bool { self.by_code.contains_key(&code) }

    pub fn iter(&self) -> impl Iterator<Item = &Codec> { self.codecs.iter() }

    pub fn len(&self) -> usize { self.codecs.len() }

    pub fn is_empty(&self) -> bool { self.codecs.is_empty() }

    /// Returns a registry holding only the named codecs, in the given order.
    pub fn restrict<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        let codecs = names
            .iter()
            .map(|name| {
                self.by_name(name.as_ref())
                    .copied()
                    .ok_or_else(|| Error::UnknownCodec(name.as_ref().to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(codecs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_indices_agree() {
        let registry = Registry::builtin();
        assert_eq!(registry.len(), builtin_codecs().len());

        for codec in registry.iter() {
            assert_eq!(registry.by_code(codec.code()), Some(codec));
            assert_eq!(registry.by_name(codec.name()), Some(codec));
            assert_eq!(registry.code_of(codec.name()), Some(codec.code()));
            assert!(!is_app_code(codec.code()));
        }
    }

    #[test]
    fn test_builtin_names_and_codes_unique() {
        let codecs = builtin_codecs();
        let names: HashSet<_> = codecs.iter().map(Codec::name).collect();
        let codes: HashSet<_> = codecs.iter().map(Codec::code).collect();
        assert_eq!(names.len(), codecs.len());
        assert_eq!(codes.len(), codecs.len());
    }

    #[test]
    fn test_digest_len_matches_hasher_output() {
        for codec in Registry::builtin().iter() {
            assert_eq!(codec.digest(b"abc").len(), codec.digest_len(), "{codec}");
        }
    }

    #[test]
    fn test_core_codes() {
        let registry = Registry::builtin();
        assert_eq!(registry.code_of("md5"), Some(0xd5));
        assert_eq!(registry.code_of("sha1"), Some(0x11));
        assert_eq!(registry.code_of("sha2-256"), Some(0x12));
        assert_eq!(registry.code_of("sha2-512"), Some(0x13));
        assert!(registry.by_name("sha3").is_none());
        assert!(registry.by_code(0x00).is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let sha1 = Registry::builtin().by_name("sha1").copied().unwrap();
        let clash = Codec::new("sha1", 0x99, 20, sha1.factory());
        assert!(matches!(
            Registry::new([sha1, clash]),
            Err(Error::DuplicateCodec(name)) if name == "sha1"
        ));
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let sha1 = Registry::builtin().by_name("sha1").copied().unwrap();
        let clash = Codec::new("other", SHA1, 20, sha1.factory());
        assert!(matches!(
            Registry::new([sha1, clash]),
            Err(Error::DuplicateCodec(code)) if code == "0x11"
        ));
    }

    #[test]
    fn test_restrict() {
        let registry = Registry::builtin().restrict(&["sha1", "sha2-256"]).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains_code(SHA1));
        assert!(!registry.contains_code(MD5));

        let err = Registry::builtin().restrict(&["sha1", "whirlpool"]).unwrap_err();
        assert!(matches!(err, Error::UnknownCodec(name) if name == "whirlpool"));
    }

    #[test]
    fn test_app_code_range() {
        assert!(is_app_code(0x00));
        assert!(is_app_code(0x0f));
        assert!(!is_app_code(0x10));
        assert!(!is_app_code(SHA1));
    }
}
