//! Contains serialization and deserialization code for types used throughout the system.
//!
//! The encoding is canonical: every value has exactly one byte representation, which is what
//! transaction hashes are computed over.
use std::collections::BTreeMap;

use thiserror::Error as ThisError;

/// The number of bytes in a serialized `()`.
pub const UNIT_SERIALIZED_LENGTH: usize = 0;
/// The number of bytes in a serialized `bool`.
pub const BOOL_SERIALIZED_LENGTH: usize = 1;
/// The number of bytes in a serialized `u8`.
pub const U8_SERIALIZED_LENGTH: usize = 1;
/// The number of bytes in a serialized `u32`.
pub const U32_SERIALIZED_LENGTH: usize = 4;
/// The number of bytes in a serialized `u64`.
pub const U64_SERIALIZED_LENGTH: usize = 8;
/// The number of bytes in a serialized `i64`.
pub const I64_SERIALIZED_LENGTH: usize = 8;
/// The number of bytes in a serialized `f64`.
pub const F64_SERIALIZED_LENGTH: usize = 8;
/// The tag representing a `None` value.
pub const OPTION_NONE_TAG: u8 = 0;
/// The tag representing a `Some` value.
pub const OPTION_SOME_TAG: u8 = 1;

/// Serialization and deserialization errors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ThisError)]
#[repr(u8)]
pub enum Error {
    /// Early end of stream while deserializing.
    #[error("Deserialization error: early end of stream")]
    EarlyEndOfStream = 0,
    /// Formatting error while deserializing.
    #[error("Deserialization error: formatting")]
    Formatting,
    /// Not all input bytes were consumed in [`deserialize`].
    #[error("Deserialization error: left-over bytes")]
    LeftOverBytes,
    /// Out of memory error.
    #[error("Serialization error: out of memory")]
    OutOfMemory,
}

/// A type which can be serialized to a `Vec<u8>`.
pub trait ToBytes {
    /// Serializes `&self` to a `Vec<u8>`.
    fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut buffer = allocate_buffer(self)?;
        self.write_bytes(&mut buffer)?;
        Ok(buffer)
    }

    /// Returns the length of the `Vec<u8>` which would be returned from a successful call to
    /// `to_bytes()` or `into_bytes()`.
    fn serialized_length(&self) -> usize;

    /// Writes `&self` into a mutable `writer`.
    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error>;
}

/// A type which can be deserialized from a `Vec<u8>`.
pub trait FromBytes: Sized {
    /// Deserializes the slice into `Self`.
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error>;
}

/// Returns a `Vec<u8>` initialized with sufficient capacity to hold `to_be_serialized` after
/// serialization.
pub fn allocate_buffer<T: ToBytes + ?Sized>(to_be_serialized: &T) -> Result<Vec<u8>, Error> {
    let serialized_length = to_be_serialized.serialized_length();
    if serialized_length > u32::MAX as usize {
        return Err(Error::OutOfMemory);
    }
    Ok(Vec::with_capacity(serialized_length))
}

/// Deserializes `bytes` into an instance of `T`.
///
/// Returns an error if the bytes cannot be deserialized into `T` or if not all of the input bytes
/// are consumed in the operation.
pub fn deserialize<T: FromBytes>(bytes: &[u8]) -> Result<T, Error> {
    let (t, remainder) = T::from_bytes(bytes)?;
    if remainder.is_empty() {
        Ok(t)
    } else {
        Err(Error::LeftOverBytes)
    }
}

/// Serializes `t` into a `Vec<u8>`.
pub fn serialize(t: impl ToBytes) -> Result<Vec<u8>, Error> {
    t.to_bytes()
}

/// Safely splits the slice at the given point.
pub(crate) fn safe_split_at(bytes: &[u8], n: usize) -> Result<(&[u8], &[u8]), Error> {
    if n > bytes.len() {
        Err(Error::EarlyEndOfStream)
    } else {
        Ok(bytes.split_at(n))
    }
}

fn write_length(length: usize, writer: &mut Vec<u8>) -> Result<(), Error> {
    let length = u32::try_from(length).map_err(|_| Error::OutOfMemory)?;
    writer.extend_from_slice(&length.to_le_bytes());
    Ok(())
}

impl ToBytes for () {
    fn serialized_length(&self) -> usize {
        UNIT_SERIALIZED_LENGTH
    }

    fn write_bytes(&self, _writer: &mut Vec<u8>) -> Result<(), Error> {
        Ok(())
    }
}

impl FromBytes for () {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        Ok(((), bytes))
    }
}

impl ToBytes for bool {
    fn serialized_length(&self) -> usize {
        BOOL_SERIALIZED_LENGTH
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
        writer.push(u8::from(*self));
        Ok(())
    }
}

impl FromBytes for bool {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        match bytes.split_first() {
            None => Err(Error::EarlyEndOfStream),
            Some((byte, rem)) => match byte {
                1 => Ok((true, rem)),
                0 => Ok((false, rem)),
                _ => Err(Error::Formatting),
            },
        }
    }
}

impl ToBytes for u8 {
    fn serialized_length(&self) -> usize {
        U8_SERIALIZED_LENGTH
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
        writer.push(*self);
        Ok(())
    }
}

impl FromBytes for u8 {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        match bytes.split_first() {
            None => Err(Error::EarlyEndOfStream),
            Some((byte, rem)) => Ok((*byte, rem)),
        }
    }
}

macro_rules! impl_to_from_bytes_for_number {
    ($type:ty, $length:expr) => {
        impl ToBytes for $type {
            fn serialized_length(&self) -> usize {
                $length
            }

            fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
                writer.extend_from_slice(&self.to_le_bytes());
                Ok(())
            }
        }

        impl FromBytes for $type {
            fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
                let (bytes, remainder) = safe_split_at(bytes, $length)?;
                let mut result = [0u8; $length];
                result.copy_from_slice(bytes);
                Ok((<$type>::from_le_bytes(result), remainder))
            }
        }
    };
}

impl_to_from_bytes_for_number!(u32, U32_SERIALIZED_LENGTH);
impl_to_from_bytes_for_number!(u64, U64_SERIALIZED_LENGTH);
impl_to_from_bytes_for_number!(i64, I64_SERIALIZED_LENGTH);

// Floats are written as their raw IEEE-754 bits so that every value, NaN payloads included,
// survives a round trip unchanged.
impl ToBytes for f64 {
    fn serialized_length(&self) -> usize {
        F64_SERIALIZED_LENGTH
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
        self.to_bits().write_bytes(writer)
    }
}

impl FromBytes for f64 {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        let (bits, remainder) = u64::from_bytes(bytes)?;
        Ok((f64::from_bits(bits), remainder))
    }
}

impl ToBytes for String {
    fn serialized_length(&self) -> usize {
        U32_SERIALIZED_LENGTH + self.len()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
        write_length(self.len(), writer)?;
        writer.extend_from_slice(self.as_bytes());
        Ok(())
    }
}

impl FromBytes for String {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        let (size, remainder) = u32::from_bytes(bytes)?;
        let (str_bytes, remainder) = safe_split_at(remainder, size as usize)?;
        let result = String::from_utf8(str_bytes.to_vec()).map_err(|_| Error::Formatting)?;
        Ok((result, remainder))
    }
}

impl<T: ToBytes> ToBytes for Vec<T> {
    fn serialized_length(&self) -> usize {
        U32_SERIALIZED_LENGTH + self.iter().map(ToBytes::serialized_length).sum::<usize>()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
        write_length(self.len(), writer)?;
        for item in self.iter() {
            item.write_bytes(writer)?;
        }
        Ok(())
    }
}

impl<T: FromBytes> FromBytes for Vec<T> {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        let (count, mut stream) = u32::from_bytes(bytes)?;
        // Every element occupies at least one byte except zero-sized ones, so cap the
        // preallocation by the remaining input.
        let mut result = Vec::with_capacity((count as usize).min(stream.len()));
        for _ in 0..count {
            let (value, remainder) = T::from_bytes(stream)?;
            result.push(value);
            stream = remainder;
        }
        Ok((result, stream))
    }
}

impl<const N: usize> ToBytes for [u8; N] {
    fn serialized_length(&self) -> usize {
        N
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
        writer.extend_from_slice(self);
        Ok(())
    }
}

impl<const N: usize> FromBytes for [u8; N] {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        let (bytes, remainder) = safe_split_at(bytes, N)?;
        let mut result = [0u8; N];
        result.copy_from_slice(bytes);
        Ok((result, remainder))
    }
}

impl<T: ToBytes> ToBytes for Option<T> {
    fn serialized_length(&self) -> usize {
        U8_SERIALIZED_LENGTH
            + match self {
                Some(value) => value.serialized_length(),
                None => 0,
            }
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
        match self {
            None => writer.push(OPTION_NONE_TAG),
            Some(value) => {
                writer.push(OPTION_SOME_TAG);
                value.write_bytes(writer)?;
            }
        }
        Ok(())
    }
}

impl<T: FromBytes> FromBytes for Option<T> {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        let (tag, rem) = u8::from_bytes(bytes)?;
        match tag {
            OPTION_NONE_TAG => Ok((None, rem)),
            OPTION_SOME_TAG => {
                let (t, rem) = T::from_bytes(rem)?;
                Ok((Some(t), rem))
            }
            _ => Err(Error::Formatting),
        }
    }
}

impl<K: ToBytes, V: ToBytes> ToBytes for BTreeMap<K, V> {
    fn serialized_length(&self) -> usize {
        U32_SERIALIZED_LENGTH
            + self
                .iter()
                .map(|(key, value)| key.serialized_length() + value.serialized_length())
                .sum::<usize>()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
        write_length(self.len(), writer)?;
        for (key, value) in self.iter() {
            key.write_bytes(writer)?;
            value.write_bytes(writer)?;
        }
        Ok(())
    }
}

impl<K: FromBytes + Ord, V: FromBytes> FromBytes for BTreeMap<K, V> {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        let (num_keys, mut stream) = u32::from_bytes(bytes)?;
        let mut result = BTreeMap::new();
        for _ in 0..num_keys {
            let (key, rem) = K::from_bytes(stream)?;
            let (value, rem) = V::from_bytes(rem)?;
            // Keys must arrive strictly ascending, otherwise the input is not canonical.
            if let Some((last_key, _)) = result.last_key_value() {
                if key <= *last_key {
                    return Err(Error::Formatting);
                }
            }
            result.insert(key, value);
            stream = rem;
        }
        Ok((result, stream))
    }
}

/// Asserts that `t` can be serialized and when deserialized back into an instance `T` compares
/// equal to `t`.
///
/// Also asserts that `t.serialized_length()` is the same as the actual number of bytes of the
/// serialized `t` instance.
#[cfg(any(test, feature = "testing"))]
#[track_caller]
pub fn test_serialization_roundtrip<T>(t: &T)
where
    T: std::fmt::Debug + ToBytes + FromBytes + PartialEq,
{
    let serialized = ToBytes::to_bytes(t).expect("Unable to serialize data");
    assert_eq!(
        serialized.len(),
        t.serialized_length(),
        "\nLength of serialized data: {},\nserialized_length() yielded: {},\nserialized data: {:?}, t is {:?}",
        serialized.len(),
        t.serialized_length(),
        serialized,
        t
    );
    let deserialized = deserialize::<T>(&serialized).expect("Unable to deserialize data");
    assert_eq!(*t, deserialized);

    let reserialized = ToBytes::to_bytes(&deserialized).expect("Unable to re-serialize data");
    assert_eq!(serialized, reserialized, "encoding is not canonical");
}
