//! Wire format: `[code, length] ++ digest`.
//!
//! Both header fields are single bytes. The digest is capped at
//! [`MAX_DIGEST_LEN`] bytes, so an envelope is between [`MIN_ENVELOPE_LEN`] and
//! [`MAX_ENVELOPE_LEN`] bytes long.

use crate::error::{Error, Result};
use crate::registry::Registry;

pub const HEADER_LEN: usize = 2;
pub const MAX_DIGEST_LEN: usize = 127;
pub const MIN_ENVELOPE_LEN: usize = HEADER_LEN + 1;
pub const MAX_ENVELOPE_LEN: usize = HEADER_LEN + MAX_DIGEST_LEN;

/// Packs a precomputed digest under `code`.
///
/// The code is not checked against any registry.
pub fn encode_envelope(digest: &[u8], code: u8) -> Result<Vec<u8>> {
    if digest.len() > MAX_DIGEST_LEN {
        return Err(Error::DigestTooLong(digest.len()));
    }

    let mut out = Vec::with_capacity(HEADER_LEN + digest.len());
    out.push(code);
    out.push(digest.len() as u8);
    out.extend_from_slice(digest);
    Ok(out)
}

/// Splits an envelope into its code and digest.
///
/// The code must be a member of `registry`; application-specific codes are
/// rejected. The declared length has to match the remaining bytes exactly.
pub fn decode_envelope<'a>(registry: &Registry, buf: &'a [u8]) -> Result<(u8, &'a [u8])> {
    if buf.len() < MIN_ENVELOPE_LEN {
        return Err(Error::BufferTooShort(buf.len()));
    }
    if buf.len() > MAX_ENVELOPE_LEN {
        return Err(Error::BufferTooLong(buf.len()));
    }

    let (code, length) = (buf[0], buf[1]);

    if !registry.contains_code(code) {
        return Err(Error::UnknownCodec(format!("{code:#04x}")));
    }

    let digest = &buf[HEADER_LEN..];
    if digest.len() != usize::from(length) {
        return Err(Error::LengthMismatch {
            declared: length,
            actual:   digest.len(),
        });
    }

    Ok((code, digest))
}
