//! Self-describing digests.
//!
//! An envelope tags a raw digest with the one-byte code of the algorithm that
//! produced it and the digest length, so it can be verified without external
//! metadata:
//!
//! ```text
//! byte 0     code
//! byte 1     digest length (0..=127)
//! bytes 2..  digest
//! ```
//!
//! Hash primitives come from the RustCrypto crates; nothing here implements an
//! algorithm. The registry is immutable and safe to share between threads.
//!
//! # Example
//!
//! ```
//! use pulith_multihash::{decode, encode};
//!
//! let envelope = encode("multihash", "sha2-256").unwrap();
//! assert_eq!(&envelope[..2], &[0x12u8, 0x20]);
//!
//! let (code, digest) = decode(&envelope).unwrap();
//! assert_eq!(code, 0x12);
//! assert_eq!(digest.len(), 32);
//! ```

pub use self::config::Config;
pub use self::envelope::{
    MAX_DIGEST_LEN, MAX_ENVELOPE_LEN, MIN_ENVELOPE_LEN, decode_envelope, encode_envelope,
};
pub use self::error::{Error, Result};
pub use self::hasher::{
    DigestHasher, FactoryFn, Hasher, Md5Hasher, Sha1Hasher, Sha256Hasher, Sha512Hasher,
};
pub use self::multihash::Multihash;
pub use self::reader::HashingReader;
pub use self::registry::{APP_CODE_MAX, Codec, Registry, builtin_codecs, is_app_code};
pub use self::resolve::{HashFactory, Identifier, Resolver};
pub use self::stream::{
    ChunkSource, Content, DEFAULT_CHUNK_SIZE, compute_envelope, compute_envelope_with,
};

#[cfg(feature = "sha3")]
pub use self::hasher::Sha3_512Hasher;

#[cfg(feature = "blake2")]
pub use self::hasher::{Blake2bHasher, Blake2sHasher};

pub mod codes {
    //! Wire codes of the builtin codecs.
    pub use crate::registry::{
        BLAKE2B_64, BLAKE2S_32, MD5, SHA1, SHA2_256, SHA2_512, SHA3_224, SHA3_256, SHA3_384,
        SHA3_512,
    };
}

mod config;
mod envelope;
mod error;
mod hasher;
mod multihash;
mod reader;
mod registry;
mod resolve;
mod stream;

use std::io::Read;

/// Hashes `content` under `identifier` using the builtin registry.
pub fn encode<'a>(
    content: impl Into<Content<'a>>,
    identifier: impl Into<Identifier>,
) -> Result<Vec<u8>> {
    compute_envelope(
        &Resolver::default(),
        content.into(),
        &identifier.into(),
        DEFAULT_CHUNK_SIZE,
    )
}

/// Packs a precomputed digest; see [`encode_envelope`].
pub fn encode_digest(digest: &[u8], code: u8) -> Result<Vec<u8>> { encode_envelope(digest, code) }

/// Decodes an envelope against the builtin registry.
pub fn decode(buf: &[u8]) -> Result<(u8, &[u8])> { decode_envelope(Registry::builtin(), buf) }

/// Checks that `envelope` is the digest of `content`.
pub fn verify<'a>(content: impl Into<Content<'a>>, envelope: &[u8]) -> Result<()> {
    Multihash::from_bytes(envelope)?.verify(content)
}

/// Hashing engine bound to one registry and read size.
#[derive(Debug, Clone)]
pub struct Multihasher {
    registry:   Registry,
    chunk_size: usize,
    default:    Option<Identifier>,
}

impl Default for Multihasher {
    fn default() -> Self { Self::new(Registry::builtin().clone()) }
}

impl Multihasher {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            chunk_size: DEFAULT_CHUNK_SIZE,
            default: None,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let registry = match &config.codecs {
            Some(names) => Registry::builtin().restrict(names.as_slice())?,
            None => Registry::builtin().clone(),
        };
        let default = config.default_identifier()?;

        let hasher = Self {
            registry,
            chunk_size: config.chunk_size,
            default: None,
        };
        if let Some(identifier) = &default {
            // Fail at load time rather than on first use.
            hasher.resolver().code(identifier)?;
        }

        Ok(Self { default, ..hasher })
    }

    /// Sets the reader chunk size. Zero is rejected, as in [`Config::validate`].
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be greater than zero".to_string()));
        }
        self.chunk_size = chunk_size;
        Ok(self)
    }

    pub fn with_default(mut self, identifier: impl Into<Identifier>) -> Self {
        self.default = Some(identifier.into());
        self
    }

    pub fn registry(&self) -> &Registry { &self.registry }

    pub fn chunk_size(&self) -> usize { self.chunk_size }

    pub fn resolver(&self) -> Resolver<'_> { Resolver::new(&self.registry) }

    pub fn encode<'a>(
        &self,
        content: impl Into<Content<'a>>,
        identifier: impl Into<Identifier>,
    ) -> Result<Vec<u8>> {
        compute_envelope(
            &self.resolver(),
            content.into(),
            &identifier.into(),
            self.chunk_size,
        )
    }

    /// Encodes with the configured default codec.
    pub fn encode_default<'a>(&self, content: impl Into<Content<'a>>) -> Result<Vec<u8>> {
        let identifier = self
            .default
            .as_ref()
            .ok_or_else(|| Error::InvalidConfig("no default codec configured".to_string()))?;
        compute_envelope(&self.resolver(), content.into(), identifier, self.chunk_size)
    }

    /// Encodes with a caller-supplied factory under an application-specific code.
    pub fn encode_with<'a>(
        &self,
        content: impl Into<Content<'a>>,
        code: u8,
        factory: &HashFactory,
    ) -> Result<Vec<u8>> {
        if !is_app_code(code) {
            return Err(Error::UnrecognizedCodec(format!(
                "{code:#04x} (custom factories need an application-specific code)"
            )));
        }
        compute_envelope_with(content.into(), code, factory, self.chunk_size)
    }

    pub fn decode<'b>(&self, buf: &'b [u8]) -> Result<(u8, &'b [u8])> {
        decode_envelope(&self.registry, buf)
    }

    pub fn verify<'a>(&self, content: impl Into<Content<'a>>, envelope: &[u8]) -> Result<()> {
        Multihash::from_bytes_in(&self.registry, envelope)?.verify_in(
            &self.registry,
            content.into(),
            self.chunk_size,
        )
    }

    /// Wraps `reader` so that everything read through it is hashed under `identifier`.
    pub fn reader<R: Read>(
        &self,
        reader: R,
        identifier: impl Into<Identifier>,
    ) -> Result<HashingReader<R>> {
        let resolver = self.resolver();
        let code = resolver.code(&identifier.into())?;
        let factory = resolver.hash_factory(&Identifier::from(code))?;
        Ok(HashingReader::new(reader, code, factory.hasher()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_restricts_registry() {
        let config =
            Config::from_toml_str("codecs = [\"sha1\"]\ndefault_codec = \"sha1\"").unwrap();
        let hasher = Multihasher::from_config(&config).unwrap();

        assert_eq!(hasher.registry().len(), 1);
        assert_eq!(hasher.encode_default("multihash").unwrap()[0], codes::SHA1);
        assert!(matches!(hasher.encode("x", "md5"), Err(Error::UnrecognizedCodec(_))));

        let md5 = encode("x", "md5").unwrap();
        assert!(matches!(hasher.decode(&md5), Err(Error::UnknownCodec(_))));
    }

    #[test]
    fn test_from_config_rejects_unknown_default() {
        let config =
            Config::from_toml_str("codecs = [\"sha1\"]\ndefault_codec = \"md5\"").unwrap();
        assert!(matches!(
            Multihasher::from_config(&config),
            Err(Error::UnrecognizedCodec(_))
        ));
    }

    #[test]
    fn test_encode_default_requires_config() {
        assert!(matches!(
            Multihasher::default().encode_default("x"),
            Err(Error::InvalidConfig(_))
        ));
        let hasher = Multihasher::default().with_default("sha2-256");
        assert_eq!(hasher.encode_default("x").unwrap(), encode("x", "sha2-256").unwrap());
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        assert!(matches!(
            Multihasher::default().with_chunk_size(0),
            Err(Error::InvalidConfig(_))
        ));
        assert_eq!(Multihasher::default().with_chunk_size(1).unwrap().chunk_size(), 1);
    }

    #[test]
    fn test_encode_with_requires_app_code() {
        let hasher = Multihasher::default();
        let factory = HashFactory::custom(Sha1Hasher::boxed);
        let envelope = hasher.encode_with("testing", 0x0f, &factory).unwrap();
        assert_eq!(envelope[0], 0x0f);
        assert!(matches!(
            hasher.encode_with("testing", codes::SHA1, &factory),
            Err(Error::UnrecognizedCodec(_))
        ));
    }

    #[test]
    fn test_reader_matches_encode() {
        let hasher = Multihasher::default().with_chunk_size(2).unwrap();
        let mut reader = hasher.reader(&b"streamed content"[..], "sha2-512").unwrap();
        std::io::copy(&mut reader, &mut std::io::sink()).unwrap();
        let envelope = reader.finish().unwrap();

        assert_eq!(envelope, hasher.encode("streamed content", "sha2-512").unwrap());
        hasher.verify("streamed content", &envelope).unwrap();
    }
}
