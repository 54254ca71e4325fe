use std::io::{self, Read};

use crate::envelope::{decode_envelope, encode_envelope};
use crate::error::{Error, Result};
use crate::hasher::Hasher;
use crate::registry::Registry;

/// Streaming reader that hashes data as it passes through.
/// Wraps any `Read` source so content can be hashed while it is being copied.
pub struct HashingReader<R> {
    reader: R,
    hasher: Box<dyn Hasher>,
    code:   u8,
    bytes:  u64,
}

impl<R> HashingReader<R> {
    /// Create a new hashing reader producing envelopes under `code`.
    pub fn new(reader: R, code: u8, hasher: Box<dyn Hasher>) -> Self {
        Self {
            reader,
            hasher,
            code,
            bytes: 0,
        }
    }

    pub fn code(&self) -> u8 { self.code }

    /// Bytes hashed so far.
    pub fn bytes_read(&self) -> u64 { self.bytes }

    /// Finalize and return the envelope of everything read.
    pub fn finish(self) -> Result<Vec<u8>> {
        let digest = self.hasher.finalize();
        encode_envelope(&digest, self.code)
    }

    /// Finalize and compare against an expected envelope.
    /// Returns error on mismatch.
    pub fn verify(self, registry: &Registry, expected: &[u8]) -> Result<()> {
        decode_envelope(registry, expected)?;
        let actual = self.finish()?;
        if actual == expected {
            Ok(())
        } else {
            Err(Error::Mismatch {
                expected: expected.to_vec(),
                actual,
            })
        }
    }
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.reader.read(buf)?;
        if n > 0 {
            self.hasher.update(&buf[..n]);
            self.bytes += n as u64;
        }
        Ok(n)
    }
}
