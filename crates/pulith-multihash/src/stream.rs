//! Incremental hashing over the supported content shapes.
//!
//! A [`Content`] is either bounded (bytes, text) or sequential (a reader or a
//! chunk producer). Sequential sources are consumed exactly once, front to
//! back. Reading advances the caller's reader; it is never closed here. Sharing
//! one reader between concurrent calls is the caller's problem.

use std::fmt;
use std::io::{self, Read};

use crate::envelope::encode_envelope;
use crate::error::Result;
use crate::hasher::Hasher;
use crate::resolve::{HashFactory, Identifier, Resolver};

/// Read size used for [`Content::Reader`] unless configured otherwise.
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Producer of byte chunks, drained once.
pub trait ChunkSource {
    /// Feeds the next chunk into `hasher`. Returns the chunk length, or `None`
    /// once the source is exhausted.
    fn feed_next(&mut self, hasher: &mut dyn Hasher) -> Option<io::Result<usize>>;
}

impl<I, B> ChunkSource for I
where
    I: Iterator<Item = io::Result<B>>,
    B: AsRef<[u8]>,
{
    fn feed_next(&mut self, hasher: &mut dyn Hasher) -> Option<io::Result<usize>> {
        self.next().map(|chunk| {
            chunk.map(|chunk| {
                let chunk = chunk.as_ref();
                hasher.update(chunk);
                chunk.len()
            })
        })
    }
}

/// Content to be hashed.
pub enum Content<'a> {
    Bytes(&'a [u8]),
    /// Hashed as its UTF-8 encoding.
    Text(&'a str),
    Reader(&'a mut dyn Read),
    Chunks(Box<dyn ChunkSource + 'a>),
}

impl<'a> Content<'a> {
    pub fn reader<R: Read>(reader: &'a mut R) -> Self { Self::Reader(reader) }

    /// Infallible chunk producer, e.g. an iterator over buffers.
    pub fn chunks<I, B>(chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        I::IntoIter: 'a,
        B: AsRef<[u8]> + 'a,
    {
        Self::Chunks(Box::new(chunks.into_iter().map(Ok::<B, io::Error>)))
    }

    /// Fallible chunk producer; the first error aborts hashing.
    pub fn try_chunks<I, B>(chunks: I) -> Self
    where
        I: IntoIterator<Item = io::Result<B>>,
        I::IntoIter: 'a,
        B: AsRef<[u8]> + 'a,
    {
        Self::Chunks(Box::new(chunks.into_iter()))
    }
}

impl fmt::Debug for Content<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Text(text) => f.debug_tuple("Text").field(&text.len()).finish(),
            Self::Reader(_) => f.write_str("Reader(..)"),
            Self::Chunks(_) => f.write_str("Chunks(..)"),
        }
    }
}

impl<'a> From<&'a [u8]> for Content<'a> {
    fn from(bytes: &'a [u8]) -> Self { Self::Bytes(bytes) }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Content<'a> {
    fn from(bytes: &'a [u8; N]) -> Self { Self::Bytes(bytes) }
}

impl<'a> From<&'a Vec<u8>> for Content<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self { Self::Bytes(bytes) }
}

impl<'a> From<&'a str> for Content<'a> {
    fn from(text: &'a str) -> Self { Self::Text(text) }
}

impl<'a> From<&'a String> for Content<'a> {
    fn from(text: &'a String) -> Self { Self::Text(text) }
}

/// Feeds all of `content` into `hasher`, returning the number of bytes ingested.
pub fn feed(hasher: &mut dyn Hasher, content: Content<'_>, chunk_size: usize) -> Result<u64> {
    let total = match content {
        Content::Bytes(bytes) => {
            hasher.update(bytes);
            bytes.len() as u64
        }
        Content::Text(text) => {
            hasher.update(text.as_bytes());
            text.len() as u64
        }
        Content::Reader(reader) => feed_reader(hasher, reader, chunk_size)?,
        Content::Chunks(mut chunks) => {
            let mut total = 0u64;
            while let Some(len) = chunks.feed_next(hasher) {
                let len = len?;
                tracing::trace!(len, "hashed chunk");
                total += len as u64;
            }
            total
        }
    };
    Ok(total)
}

fn feed_reader(hasher: &mut dyn Hasher, reader: &mut dyn Read, chunk_size: usize) -> Result<u64> {
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        hasher.update(&buf[..n]);
        tracing::trace!(len = n, "hashed chunk");
        total += n as u64;
    }
}

/// Hashes `content` with a hasher from `factory` and packs the digest under `code`.
pub fn compute_envelope_with(
    content: Content<'_>,
    code: u8,
    factory: &HashFactory,
    chunk_size: usize,
) -> Result<Vec<u8>> {
    let mut hasher = factory.hasher();
    let total = feed(hasher.as_mut(), content, chunk_size)?;
    let digest = hasher.finalize();
    tracing::debug!(code, bytes = total, digest_len = digest.len(), "computed digest");
    encode_envelope(&digest, code)
}

/// Resolves `identifier`, hashes `content` and returns the envelope.
///
/// The code is resolved first; the factory is then looked up by that code, so
/// application-specific codes and bare custom factories fail here. Use
/// [`compute_envelope_with`] to pair a custom factory with an application code.
pub fn compute_envelope(
    resolver: &Resolver<'_>,
    content: Content<'_>,
    identifier: &Identifier,
    chunk_size: usize,
) -> Result<Vec<u8>> {
    let code = resolver.code(identifier)?;
    let factory = resolver.hash_factory(&Identifier::from(code))?;
    compute_envelope_with(content, code, &factory, chunk_size)
}
