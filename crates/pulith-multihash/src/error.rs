use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown codec: {0}")]
    UnknownCodec(String),

    #[error("{0} is not a recognized codec identifier")]
    UnrecognizedCodec(String),

    #[error("unsupported identifier type: {0}")]
    UnsupportedIdentifierType(&'static str),

    #[error("buffer too short: {0} bytes")]
    BufferTooShort(usize),

    #[error("buffer too long: {0} bytes")]
    BufferTooLong(usize),

    #[error("inconsistent length ({actual} != {declared})")]
    LengthMismatch { declared: u8, actual: usize },

    #[error("digest length {0} exceeds 127 bytes")]
    DigestTooLong(usize),

    #[error("digest is empty")]
    EmptyDigest,

    #[error("digest mismatch: expected {expected:?}, got {actual:?}")]
    Mismatch {
        expected: Vec<u8>,
        actual:   Vec<u8>,
    },

    #[error("duplicate codec in table: {0}")]
    DuplicateCodec(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    InvalidHex(#[from] hex::FromHexError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
