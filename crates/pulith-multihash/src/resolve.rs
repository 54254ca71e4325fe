//! Identifier normalization.
//!
//! Callers name a hash function by registered name, by numeric code (also as a
//! digit-only string), or by handing over a factory directly. [`Resolver`]
//! turns any of these into a [`HashFactory`] or a canonical wire code.

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::hasher::Hasher;
use crate::registry::{Codec, Registry, is_app_code};

const DEPRECATED_SHA3_ALIAS: &str = "sha3";
const SHA3_ALIAS_TARGET: &str = "sha3-512";

/// Source of fresh hashers.
#[derive(Clone)]
pub enum HashFactory {
    /// Factory of a registry entry.
    Registered(Codec),
    /// Caller-supplied algorithm, bypassing the registry.
    Custom(Arc<dyn Fn() -> Box<dyn Hasher> + Send + Sync>),
}

impl HashFactory {
    pub fn custom<F>(factory: F) -> Self
    where
        F: Fn() -> Box<dyn Hasher> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(factory))
    }

    pub fn hasher(&self) -> Box<dyn Hasher> {
        match self {
            Self::Registered(codec) => codec.hasher(),
            Self::Custom(factory) => factory(),
        }
    }

    pub fn codec(&self) -> Option<&Codec> {
        match self {
            Self::Registered(codec) => Some(codec),
            Self::Custom(_) => None,
        }
    }
}

impl PartialEq for HashFactory {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Registered(a), Self::Registered(b)) => a == b,
            (Self::Custom(a), Self::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for HashFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registered(codec) => f.debug_tuple("Registered").field(codec).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<Codec> for HashFactory {
    fn from(codec: Codec) -> Self { Self::Registered(codec) }
}

/// A caller's way of naming a hash function.
#[derive(Debug, Clone, PartialEq)]
pub enum Identifier {
    /// Registered name, the deprecated `"sha3"` alias, or a digit-only code.
    Name(String),
    /// Numeric code. Values above `u8::MAX` never resolve.
    Code(u64),
    Factory(HashFactory),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "\"{name}\""),
            Self::Code(code) => write!(f, "{code}"),
            Self::Factory(HashFactory::Registered(codec)) => write!(f, "factory of {codec}"),
            Self::Factory(HashFactory::Custom(_)) => f.write_str("custom hash factory"),
        }
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self { Self::Name(name.to_string()) }
}

impl From<String> for Identifier {
    fn from(name: String) -> Self { Self::Name(name) }
}

impl From<u8> for Identifier {
    fn from(code: u8) -> Self { Self::Code(code.into()) }
}

impl From<u64> for Identifier {
    fn from(code: u64) -> Self { Self::Code(code) }
}

impl From<HashFactory> for Identifier {
    fn from(factory: HashFactory) -> Self { Self::Factory(factory) }
}

impl From<&Codec> for Identifier {
    fn from(codec: &Codec) -> Self { Self::Code(codec.code().into()) }
}

impl TryFrom<&toml::Value> for Identifier {
    type Error = Error;

    fn try_from(value: &toml::Value) -> Result<Self> {
        match value {
            toml::Value::String(name) => Ok(Self::Name(name.clone())),
            toml::Value::Integer(code) => u64::try_from(*code)
                .map(Self::Code)
                .map_err(|_| Error::UnknownCodec(code.to_string())),
            other => Err(Error::UnsupportedIdentifierType(other.type_str())),
        }
    }
}

/// Resolves identifiers against one registry.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'r> {
    registry: &'r Registry,
}

impl Default for Resolver<'static> {
    fn default() -> Self { Self::new(Registry::builtin()) }
}

impl<'r> Resolver<'r> {
    pub fn new(registry: &'r Registry) -> Self { Self { registry } }

    pub fn registry(&self) -> &'r Registry { self.registry }

    /// Resolves `identifier` to a factory for fresh hashers.
    ///
    /// Application-specific codes have no registry entry and fail here.
    pub fn hash_factory(&self, identifier: &Identifier) -> Result<HashFactory> {
        let unknown = || Error::UnknownCodec(identifier.to_string());

        match identifier {
            Identifier::Factory(factory) => Ok(factory.clone()),
            Identifier::Code(code) => self.registered(*code).ok_or_else(unknown),
            Identifier::Name(name) => {
                let name = canonical_name(name);
                if let Some(codec) = self.registry.by_name(name) {
                    Ok(HashFactory::Registered(*codec))
                } else {
                    parse_digits(name)
                        .and_then(|code| self.registered(code))
                        .ok_or_else(unknown)
                }
            }
        }
    }

    /// Resolves `identifier` to its wire code.
    ///
    /// Unlike [`Resolver::hash_factory`], application-specific codes are
    /// returned verbatim.
    pub fn code(&self, identifier: &Identifier) -> Result<u8> {
        let unrecognized = || Error::UnrecognizedCodec(identifier.to_string());

        match identifier {
            Identifier::Factory(HashFactory::Registered(codec))
                if self.registry.by_code(codec.code()) == Some(codec) =>
            {
                Ok(codec.code())
            }
            Identifier::Factory(_) => Err(unrecognized()),
            Identifier::Code(code) => self.known_code(*code).ok_or_else(unrecognized),
            Identifier::Name(name) => {
                let name = canonical_name(name);
                self.registry
                    .code_of(name)
                    .or_else(|| parse_digits(name).and_then(|code| self.known_code(code)))
                    .ok_or_else(unrecognized)
            }
        }
    }

    /// Checks whether `identifier` resolves to a code.
    #[deprecated(note = "use `Resolver::code` instead")]
    pub fn is_valid_code(&self, identifier: &Identifier) -> bool {
        tracing::warn!("is_valid_code() is deprecated; use code() instead");
        self.code(identifier).is_ok()
    }

    fn registered(&self, code: u64) -> Option<HashFactory> {
        let code = u8::try_from(code).ok()?;
        self.registry.by_code(code).copied().map(HashFactory::Registered)
    }

    fn known_code(&self, code: u64) -> Option<u8> {
        u8::try_from(code)
            .ok()
            .filter(|&code| self.registry.contains_code(code) || is_app_code(code))
    }
}

fn canonical_name(name: &str) -> &str {
    if name == DEPRECATED_SHA3_ALIAS {
        tracing::warn!(
            alias = DEPRECATED_SHA3_ALIAS,
            "the codec name \"sha3\" is deprecated; use \"{SHA3_ALIAS_TARGET}\""
        );
        SHA3_ALIAS_TARGET
    } else {
        name
    }
}

fn parse_digits(name: &str) -> Option<u64> {
    if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
        name.parse().ok()
    } else {
        None
    }
}
