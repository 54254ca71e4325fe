use digest::Digest;

/// Incremental hash computation.
///
/// `update` may be called any number of times; `finalize` consumes the state,
/// so a hasher is never reused after producing its digest.
pub trait Hasher: Send {
    fn update(&mut self, data: &[u8]);
    fn finalize(self: Box<Self>) -> Vec<u8>;
}

/// Creates a fresh hasher for a registered codec.
pub type FactoryFn = fn() -> Box<dyn Hasher>;

/// Adapts any RustCrypto [`Digest`] into a [`Hasher`].
pub struct DigestHasher<D: Digest + Send>(D);

impl<D: Digest + Send> Hasher for DigestHasher<D> {
    fn update(&mut self, data: &[u8]) { Digest::update(&mut self.0, data); }
    fn finalize(self: Box<Self>) -> Vec<u8> { self.0.finalize().to_vec() }
}

impl<D: Digest + Send> Default for DigestHasher<D> {
    fn default() -> Self { Self::new() }
}

impl<D: Digest + Send> DigestHasher<D> {
    pub fn new() -> Self { Self(D::new()) }

    pub fn digest(data: &[u8]) -> Vec<u8> { D::digest(data).to_vec() }
}

impl<D: Digest + Send + 'static> DigestHasher<D> {
    pub fn boxed() -> Box<dyn Hasher> { Box::new(Self::new()) }
}

pub type Md5Hasher = DigestHasher<md5::Md5>;
pub type Sha1Hasher = DigestHasher<sha1::Sha1>;
pub type Sha256Hasher = DigestHasher<sha2::Sha256>;
pub type Sha512Hasher = DigestHasher<sha2::Sha512>;

#[cfg(feature = "sha3")]
pub type Sha3_512Hasher = DigestHasher<sha3::Sha3_512>;

#[cfg(feature = "blake2")]
pub type Blake2bHasher = DigestHasher<blake2::Blake2b512>;

#[cfg(feature = "blake2")]
pub type Blake2sHasher = DigestHasher<blake2::Blake2s256>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hasher() {
        let mut hasher = Sha256Hasher::boxed();
        hasher.update(b"hello ");
        hasher.update(b"world");
        let hash = hasher.finalize();

        let expected =
            hex::decode("b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9")
                .unwrap();
        assert_eq!(hash, expected);
        assert_eq!(Sha256Hasher::digest(b"hello world"), expected);
    }

    #[test]
    fn test_md5_hasher() {
        assert_eq!(
            hex::encode(Md5Hasher::digest(b"multihash")),
            "1ff1d062dc3bfcfd7a9218e64c1308a0"
        );
    }

    #[cfg(feature = "blake2")]
    #[test]
    fn test_blake2_output_lengths() {
        assert_eq!(Blake2bHasher::digest(b"").len(), 64);
        assert_eq!(Blake2sHasher::digest(b"").len(), 32);
    }
}
