//! Public keys and the identifiers derived from them.
use std::{
    array::TryFromSliceError,
    fmt::{self, Debug, Display, Formatter},
    str::FromStr,
};

use blake2::{
    digest::{Update, VariableOutput},
    VarBlake2b,
};
use serde::{de::Error as SerdeError, Deserialize, Deserializer, Serialize, Serializer};

use crate::bytesrepr::{self, FromBytes, ToBytes};

/// The number of bytes in a Blake2b digest.
pub const BLAKE2B_DIGEST_LENGTH: usize = 32;
/// The number of bytes in an ed25519 public key.
pub const PUBLIC_KEY_LENGTH: usize = 32;
/// The number of bytes in an [`Address`].
pub const ADDRESS_LENGTH: usize = BLAKE2B_DIGEST_LENGTH;
/// The number of bytes in a [`PushKeyId`].
pub const PUSH_KEY_ID_LENGTH: usize = 20;
/// Human readable prefix of a push key id.
pub const PUSH_KEY_ID_PREFIX: &str = "pk1";

const PUSH_KEY_DOMAIN: &[u8] = b"push-key";

/// Computes a Blake2b-256 digest over the concatenation of `parts`.
pub fn blake2b<T: AsRef<[u8]>>(parts: &[T]) -> [u8; BLAKE2B_DIGEST_LENGTH] {
    let mut result = [0; BLAKE2B_DIGEST_LENGTH];
    // NOTE: Assumed safe as `BLAKE2B_DIGEST_LENGTH` is a valid value for a hasher
    let mut hasher = VarBlake2b::new(BLAKE2B_DIGEST_LENGTH).expect("should create hasher");
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize_variable(|slice| {
        result.copy_from_slice(slice);
    });
    result
}

macro_rules! hex_newtype {
    ($name:ident, $length:expr, $prefix:expr) => {
        impl $name {
            /// Returns the raw bytes.
            pub fn value(&self) -> [u8; $length] {
                self.0
            }

            /// Returns a reference to the raw bytes.
            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<[u8; $length]> for $name {
            fn from(bytes: [u8; $length]) -> Self {
                $name(bytes)
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = TryFromSliceError;

            fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
                <[u8; $length]>::try_from(bytes).map($name)
            }
        }

        impl Display for $name {
            fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
                write!(formatter, "{}{}", $prefix, hex::encode(self.0))
            }
        }

        impl Debug for $name {
            fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
                write!(formatter, "{}({})", stringify!($name), self)
            }
        }

        impl FromStr for $name {
            type Err = hex::FromHexError;

            fn from_str(input: &str) -> Result<Self, Self::Err> {
                let hex_part = input.strip_prefix($prefix).unwrap_or(input);
                let mut bytes = [0u8; $length];
                hex::decode_to_slice(hex_part, &mut bytes)?;
                Ok($name(bytes))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let string = String::deserialize(deserializer)?;
                $name::from_str(&string).map_err(SerdeError::custom)
            }
        }

        impl ToBytes for $name {
            fn serialized_length(&self) -> usize {
                $length
            }

            fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
                self.0.write_bytes(writer)
            }
        }

        impl FromBytes for $name {
            fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
                let (inner, remainder) = <[u8; $length]>::from_bytes(bytes)?;
                Ok(($name(inner), remainder))
            }
        }
    };
}

/// A raw ed25519 public key.
///
/// Keys reach the engine only after their signatures have been verified, so any 32 bytes are
/// accepted here without curve-point validation.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PublicKey([u8; PUBLIC_KEY_LENGTH]);

hex_newtype!(PublicKey, PUBLIC_KEY_LENGTH, "");

impl PublicKey {
    /// Derives the account address owned by this key.
    pub fn to_address(&self) -> Address {
        Address::from_public_key(self)
    }

    /// Derives the push key id of this key.
    pub fn to_push_key_id(&self) -> PushKeyId {
        PushKeyId::from_public_key(self)
    }
}

/// The address of an account: the Blake2b-256 digest of its public key.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; ADDRESS_LENGTH]);

hex_newtype!(Address, ADDRESS_LENGTH, "");

impl Address {
    /// Derives the address of `public_key`.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        Address(blake2b(&[public_key.as_bytes()]))
    }
}

impl From<&PublicKey> for Address {
    fn from(public_key: &PublicKey) -> Self {
        Address::from_public_key(public_key)
    }
}

/// Identifier of a registered push key.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PushKeyId([u8; PUSH_KEY_ID_LENGTH]);

hex_newtype!(PushKeyId, PUSH_KEY_ID_LENGTH, PUSH_KEY_ID_PREFIX);

impl PushKeyId {
    /// Derives the push key id of `public_key`.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let digest = blake2b(&[PUSH_KEY_DOMAIN, public_key.as_bytes()]);
        let mut id = [0u8; PUSH_KEY_ID_LENGTH];
        id.copy_from_slice(&digest[..PUSH_KEY_ID_LENGTH]);
        PushKeyId(id)
    }
}

/// A Blake2b-256 hash digest.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest([u8; BLAKE2B_DIGEST_LENGTH]);

hex_newtype!(Digest, BLAKE2B_DIGEST_LENGTH, "");

impl Digest {
    /// Creates a digest of `data`.
    pub fn hash<T: AsRef<[u8]>>(data: T) -> Digest {
        Digest(blake2b(&[data]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_key_id_is_a_pure_function_of_the_key() {
        let key = PublicKey::from([7u8; PUBLIC_KEY_LENGTH]);
        let other = PublicKey::from([8u8; PUBLIC_KEY_LENGTH]);
        assert_eq!(key.to_push_key_id(), PushKeyId::from_public_key(&key));
        assert_ne!(key.to_push_key_id(), other.to_push_key_id());
        assert!(key.to_push_key_id().to_string().starts_with(PUSH_KEY_ID_PREFIX));
    }

    #[test]
    fn address_differs_from_push_key_id_digest() {
        let key = PublicKey::from([1u8; PUBLIC_KEY_LENGTH]);
        assert_ne!(
            &key.to_address().as_bytes()[..PUSH_KEY_ID_LENGTH],
            key.to_push_key_id().as_bytes()
        );
    }

    #[test]
    fn should_parse_display_form() {
        let id = PublicKey::from([3u8; PUBLIC_KEY_LENGTH]).to_push_key_id();
        assert_eq!(id.to_string().parse::<PushKeyId>().unwrap(), id);

        let address = PublicKey::from([4u8; PUBLIC_KEY_LENGTH]).to_address();
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(serde_json::from_str::<Address>(&json).unwrap(), address);
    }

    #[test]
    fn bytesrepr_roundtrip() {
        bytesrepr::test_serialization_roundtrip(&PublicKey::from([9u8; PUBLIC_KEY_LENGTH]));
        bytesrepr::test_serialization_roundtrip(&Digest::hash(b"abc"));
    }
}
