//! Canonical hashing
//!
//! Values are serialized into a pre-image buffer with a deterministic,
//! type-driven encoding and digested with BLAKE2b-512. Domain types choose
//! what they contribute by implementing [`HashPart`] themselves; plain records
//! use [`hash_record!`](crate::hash_record) to hash every field in declaration
//! order.

use crate::constants::HASH_SIZE;
use crate::error::CryptoError;
use std::fmt;

/// 64-byte BLAKE2b digest
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash([u8; HASH_SIZE]);

impl Hash {
    /// Digest of an absent value
    pub const ZERO: Hash = Hash([0; HASH_SIZE]);

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let data: [u8; HASH_SIZE] = bytes.try_into().map_err(|_| CryptoError::InvalidLength {
            expected: HASH_SIZE,
            actual: bytes.len(),
        })?;
        Ok(Self(data))
    }

    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    /// Parse the `0x`-prefixed big-endian hex form
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let mut bytes = crate::ecc::decode_hex(s)?;
        bytes.reverse();
        Self::from_bytes(&bytes)
    }

    /// `0x`-prefixed hex of the bytes in big-endian order
    pub fn to_hex(&self) -> String {
        let mut bytes = self.0;
        bytes.reverse();
        format!("0x{}", hex::encode(bytes))
    }
}

impl Default for Hash {
    fn default() -> Self {
        Hash::ZERO
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl serde::Serialize for Hash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Hash {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hash::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl HashPart for Hash {
    fn hash_part(&self, buf: &mut Vec<u8>, _write_length: bool) {
        buf.extend_from_slice(&self.0);
    }
}

/// Contribution of a value to a hash pre-image
pub trait HashPart {
    /// Append the canonical encoding of `self` to `buf`.
    ///
    /// `write_length` controls whether variable-length values are prefixed
    /// with their compact-encoded length.
    fn hash_part(&self, buf: &mut Vec<u8>, write_length: bool);

    /// Encoding of a sequence of `Self`.
    ///
    /// The default writes the element count (iff `write_length`) followed by
    /// each element with its own length prefix. Byte sequences override this
    /// to write raw bytes.
    fn hash_slice(items: &[Self], buf: &mut Vec<u8>, write_length: bool)
    where
        Self: Sized,
    {
        if write_length {
            write_compact_length(items.len() as u64, buf);
        }
        for item in items {
            item.hash_part(buf, true);
        }
    }
}

impl HashPart for u8 {
    fn hash_part(&self, buf: &mut Vec<u8>, _write_length: bool) {
        buf.push(*self);
    }

    fn hash_slice(items: &[u8], buf: &mut Vec<u8>, write_length: bool) {
        if write_length {
            write_compact_length(items.len() as u64, buf);
        }
        buf.extend_from_slice(items);
    }
}

impl HashPart for u32 {
    fn hash_part(&self, buf: &mut Vec<u8>, _write_length: bool) {
        buf.extend_from_slice(&self.to_le_bytes());
    }
}

impl HashPart for u64 {
    fn hash_part(&self, buf: &mut Vec<u8>, _write_length: bool) {
        buf.extend_from_slice(&self.to_le_bytes());
    }
}

impl HashPart for str {
    fn hash_part(&self, buf: &mut Vec<u8>, write_length: bool) {
        u8::hash_slice(self.as_bytes(), buf, write_length);
    }
}

impl HashPart for String {
    fn hash_part(&self, buf: &mut Vec<u8>, write_length: bool) {
        self.as_str().hash_part(buf, write_length);
    }
}

impl<T: HashPart> HashPart for [T] {
    fn hash_part(&self, buf: &mut Vec<u8>, write_length: bool) {
        T::hash_slice(self, buf, write_length);
    }
}

impl<T: HashPart> HashPart for Vec<T> {
    fn hash_part(&self, buf: &mut Vec<u8>, write_length: bool) {
        T::hash_slice(self, buf, write_length);
    }
}

impl<T: HashPart + ?Sized> HashPart for &T {
    fn hash_part(&self, buf: &mut Vec<u8>, write_length: bool) {
        (**self).hash_part(buf, write_length);
    }
}

/// Implement [`HashPart`] for a record by hashing its fields in order,
/// each with its length prefix.
#[macro_export]
macro_rules! hash_record {
    ($ty:ty { $($field:ident),+ $(,)? }) => {
        impl $crate::hash::HashPart for $ty {
            fn hash_part(&self, buf: &mut Vec<u8>, _write_length: bool) {
                $( $crate::hash::HashPart::hash_part(&self.$field, buf, true); )+
            }
        }
    };
}

/// Append `value` in compact length encoding
pub fn write_compact_length(value: u64, buf: &mut Vec<u8>) {
    match value {
        0..=0xFC => buf.push(value as u8),
        0xFD..=0xFFFF => {
            buf.push(0xFD);
            buf.extend_from_slice(&(value as u16).to_le_bytes());
        }
        0x1_0000..=0xFFFF_FFFF => {
            buf.push(0xFE);
            buf.extend_from_slice(&(value as u32).to_le_bytes());
        }
        _ => {
            buf.push(0xFF);
            buf.extend_from_slice(&value.to_le_bytes());
        }
    }
}

/// BLAKE2b-512 of raw bytes
pub fn hash(data: &[u8]) -> Hash {
    let digest = blake2b_simd::Params::new().hash_length(HASH_SIZE).hash(data);
    let mut out = [0u8; HASH_SIZE];
    out.copy_from_slice(digest.as_bytes());
    Hash(out)
}

/// Hash a value through its canonical encoding
pub fn hash_full<T: HashPart + ?Sized>(value: &T) -> Hash {
    let mut buf = Vec::new();
    value.hash_part(&mut buf, true);
    hash(&buf)
}

/// Like [`hash_full`], with absent values hashing to [`Hash::ZERO`]
pub fn hash_full_opt<T: HashPart>(value: Option<&T>) -> Hash {
    value.map_or(Hash::ZERO, hash_full)
}

/// Hash several values as one pre-image.
///
/// The top-level arguments are written without length prefixes, so they
/// must be fixed-width or self-delimiting.
pub fn hash_multi(values: &[&dyn HashPart]) -> Hash {
    let mut buf = Vec::new();
    for value in values {
        value.hash_part(&mut buf, false);
    }
    hash(&buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode<T: HashPart + ?Sized>(value: &T, write_length: bool) -> Vec<u8> {
        let mut buf = Vec::new();
        value.hash_part(&mut buf, write_length);
        buf
    }

    #[test]
    fn test_compact_length_boundaries() {
        let cases: [(u64, Vec<u8>); 7] = [
            (0, vec![0x00]),
            (0xFC, vec![0xFC]),
            (0xFD, vec![0xFD, 0xFD, 0x00]),
            (0xFFFF, vec![0xFD, 0xFF, 0xFF]),
            (0x1_0000, vec![0xFE, 0x00, 0x00, 0x01, 0x00]),
            (0xFFFF_FFFF, vec![0xFE, 0xFF, 0xFF, 0xFF, 0xFF]),
            (0x1_0000_0000, vec![0xFF, 0, 0, 0, 0, 1, 0, 0, 0]),
        ];
        for (value, expected) in cases {
            let mut buf = Vec::new();
            write_compact_length(value, &mut buf);
            assert_eq!(buf, expected, "value {:#x}", value);
        }
    }

    #[test]
    fn test_integer_encoding() {
        assert_eq!(encode(&0x0102_0304u32, true), vec![4, 3, 2, 1]);
        assert_eq!(encode(&1u64, false), vec![1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_bytes_length_prefix() {
        let bytes = vec![0xAAu8, 0xBB];
        assert_eq!(encode(&bytes, true), vec![2, 0xAA, 0xBB]);
        assert_eq!(encode(&bytes, false), vec![0xAA, 0xBB]);
    }

    #[test]
    fn test_string_encoding() {
        assert_eq!(encode("abc", true), vec![3, b'a', b'b', b'c']);
        assert_eq!(encode(&String::from("abc"), false), b"abc".to_vec());
    }

    #[test]
    fn test_sequence_elements_always_prefixed() {
        let items = vec![vec![1u8], vec![2u8, 3]];
        assert_eq!(encode(&items, true), vec![2, 1, 1, 2, 2, 3]);
        assert_eq!(encode(&items, false), vec![1, 1, 2, 2, 3]);
    }

    struct Record {
        id: u32,
        name: String,
    }
    hash_record!(Record { id, name });

    #[test]
    fn test_record_fields_in_order() {
        let record = Record { id: 7, name: "x".into() };
        assert_eq!(encode(&record, false), vec![7, 0, 0, 0, 1, b'x']);
    }

    #[test]
    fn test_hash_opt_none_is_zero() {
        assert_eq!(hash_full_opt::<u32>(None), Hash::ZERO);
        assert_ne!(hash_full_opt(Some(&0u32)), Hash::ZERO);
    }

    #[test]
    fn test_hash_multi_omits_top_level_length() {
        let bytes = vec![1u8, 2, 3];
        let expected = hash(&[1, 2, 3, 9, 0, 0, 0]);
        assert_eq!(hash_multi(&[&bytes, &9u32]), expected);
        assert_ne!(hash_multi(&[&bytes, &9u32]), hash_full(&bytes));
    }

    #[test]
    fn test_hash_is_blake2b_512() {
        // BLAKE2b-512 of the empty string
        let expected = "786a02f742015903c6c6fd852552d272912f4740e15847618a86e217f71f5419\
                        d25e1031afee585313896444934eb04b903a685b1448b755d56f701afe9be2ce";
        assert_eq!(hex::encode(hash(&[]).as_bytes()), expected);
    }

    #[test]
    fn test_hex_round_trip() {
        let h = hash(b"abc");
        assert!(h.to_hex().starts_with("0x"));
        assert_eq!(Hash::from_hex(&h.to_hex()).unwrap(), h);
        assert!(Hash::from_bytes(&[0u8; 32]).is_err());
    }
}
