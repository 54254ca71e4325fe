//! TOML-backed settings for a [`Multihasher`](crate::Multihasher).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::resolve::Identifier;
use crate::stream::DEFAULT_CHUNK_SIZE;

/// Engine settings.
///
/// ```toml
/// chunk_size = 65536
/// codecs = ["sha2-256", "blake2b-64"]
/// default_codec = "sha2-256"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Read size for reader content.
    pub chunk_size:    usize,
    /// Restricts the registry to these codec names. `None` keeps every
    /// builtin codec.
    pub codecs:        Option<Vec<String>>,
    /// Codec used by `encode_default`, as a name or a numeric code.
    pub default_codec: Option<toml::Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size:    DEFAULT_CHUNK_SIZE,
            codecs:        None,
            default_codec: None,
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be greater than zero".to_string()));
        }
        if matches!(&self.codecs, Some(codecs) if codecs.is_empty()) {
            return Err(Error::InvalidConfig("codecs must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn default_identifier(&self) -> Result<Option<Identifier>> {
        self.default_codec.as_ref().map(Identifier::try_from).transpose()
    }
}
