//! Scalar and point arithmetic over the Curve25519 prime-order group
//!
//! Both types are plain 32-byte values. Arithmetic decodes them into
//! curve25519-dalek types, so a value may hold bytes that are not a valid
//! element; check [`Scalar::is_valid`] / [`Point::is_valid`] on untrusted data.
//!
//! The all-zero value of each type (`NULL`) acts as the additive identity:
//! binary operations with a `NULL` operand short-circuit instead of reaching
//! the curve library.

use crate::constants::{POINT_SIZE, SCALAR_SIZE};
use crate::error::CryptoError;
use crate::hash::{Hash, HashPart};
use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar as DalekScalar;
use rand::RngCore;
use std::fmt;

/// Decode a hex string with an optional `0x` prefix
pub(crate) fn decode_hex(s: &str) -> Result<Vec<u8>, CryptoError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(digits).map_err(|e| CryptoError::InvalidHex(e.to_string()))
}

/// Byte-order and text conversions shared by `Scalar` and `Point`.
///
/// The stored bytes are little-endian, the order the curve library consumes.
/// Hex strings are big-endian with a `0x` prefix.
macro_rules! fixed_bytes {
    ($name:ident, $size:expr) => {
        impl $name {
            pub const NULL: $name = $name([0; $size]);

            pub fn from_bytes_le(bytes: &[u8]) -> Result<Self, CryptoError> {
                let data: [u8; $size] =
                    bytes.try_into().map_err(|_| CryptoError::InvalidLength {
                        expected: $size,
                        actual: bytes.len(),
                    })?;
                Ok(Self(data))
            }

            pub fn from_bytes_be(bytes: &[u8]) -> Result<Self, CryptoError> {
                let mut value = Self::from_bytes_le(bytes)?;
                value.0.reverse();
                Ok(value)
            }

            pub fn to_bytes_le(&self) -> [u8; $size] {
                self.0
            }

            pub fn to_bytes_be(&self) -> [u8; $size] {
                let mut bytes = self.0;
                bytes.reverse();
                bytes
            }

            pub fn as_bytes(&self) -> &[u8; $size] {
                &self.0
            }

            pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
                Self::from_bytes_be(&decode_hex(s)?)
            }

            pub fn to_hex(&self) -> String {
                format!("0x{}", hex::encode(self.to_bytes_be()))
            }

            pub fn is_null(&self) -> bool {
                self.0 == [0; $size]
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::NULL
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                $name::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }

        impl HashPart for $name {
            fn hash_part(&self, buf: &mut Vec<u8>, _write_length: bool) {
                buf.extend_from_slice(&self.0);
            }
        }
    };
}

/// Element of the scalar field modulo the group order L
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Scalar([u8; SCALAR_SIZE]);

fixed_bytes!(Scalar, SCALAR_SIZE);

impl Scalar {
    fn from_dalek(s: DalekScalar) -> Self {
        Self(s.to_bytes())
    }

    fn to_dalek(self) -> DalekScalar {
        DalekScalar::from_bytes_mod_order(self.0)
    }

    /// Uniformly random non-zero scalar
    pub fn random() -> Self {
        let mut wide = [0u8; 64];
        loop {
            rand::thread_rng().fill_bytes(&mut wide);
            let s = DalekScalar::from_bytes_mod_order_wide(&wide);
            if s != DalekScalar::ZERO {
                return Self::from_dalek(s);
            }
        }
    }

    /// Reduce a 64-byte hash into the scalar field
    pub fn from_hash(hash: &Hash) -> Self {
        Self::from_dalek(DalekScalar::from_bytes_mod_order_wide(hash.as_bytes()))
    }

    /// 0 < value < L
    pub fn is_valid(&self) -> bool {
        Option::<DalekScalar>::from(DalekScalar::from_canonical_bytes(self.0))
            .map_or(false, |s| s != DalekScalar::ZERO)
    }

    pub fn add(&self, other: &Scalar) -> Scalar {
        if other.is_null() {
            return *self;
        }
        if self.is_null() {
            return *other;
        }
        Self::from_dalek(self.to_dalek() + other.to_dalek())
    }

    pub fn sub(&self, other: &Scalar) -> Scalar {
        if other.is_null() {
            return *self;
        }
        if self.is_null() {
            return other.negate();
        }
        Self::from_dalek(self.to_dalek() - other.to_dalek())
    }

    pub fn mul(&self, other: &Scalar) -> Scalar {
        if self.is_null() || other.is_null() {
            return Scalar::NULL;
        }
        Self::from_dalek(self.to_dalek() * other.to_dalek())
    }

    pub fn negate(&self) -> Scalar {
        Self::from_dalek(-self.to_dalek())
    }

    /// The scalar `c` such that `self + c == 1`
    pub fn complement(&self) -> Scalar {
        Self::from_dalek(DalekScalar::ONE - self.to_dalek())
    }

    /// Multiplicative inverse; `NULL` maps to `NULL`
    pub fn invert(&self) -> Scalar {
        if self.is_null() {
            return Scalar::NULL;
        }
        Self::from_dalek(self.to_dalek().invert())
    }

    /// Multiplication by the base point, without clamping
    pub fn to_point(&self) -> Point {
        if self.is_null() {
            return Point::NULL;
        }
        Point::from_edwards(&EdwardsPoint::mul_base(&self.to_dalek()))
    }
}

/// Compressed Edwards-Y encoding of a group element
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point([u8; POINT_SIZE]);

fixed_bytes!(Point, POINT_SIZE);

impl Point {
    fn from_edwards(point: &EdwardsPoint) -> Self {
        Self(point.compress().to_bytes())
    }

    fn decompress(&self) -> Result<EdwardsPoint, CryptoError> {
        CompressedEdwardsY(self.0)
            .decompress()
            .ok_or(CryptoError::InvalidPoint)
    }

    pub fn random() -> Self {
        Scalar::random().to_point()
    }

    /// Canonical encoding of a torsion-free element that is not of small order
    pub fn is_valid(&self) -> bool {
        match self.decompress() {
            Ok(point) => {
                !point.is_small_order()
                    && point.is_torsion_free()
                    && point.compress().to_bytes() == self.0
            }
            Err(_) => false,
        }
    }

    pub fn add(&self, other: &Point) -> Result<Point, CryptoError> {
        if other.is_null() {
            return Ok(*self);
        }
        if self.is_null() {
            return Ok(*other);
        }
        Ok(Self::from_edwards(&(self.decompress()? + other.decompress()?)))
    }

    pub fn sub(&self, other: &Point) -> Result<Point, CryptoError> {
        if other.is_null() {
            return Ok(*self);
        }
        if self.is_null() {
            return Ok(Self::from_edwards(&-other.decompress()?));
        }
        Ok(Self::from_edwards(&(self.decompress()? - other.decompress()?)))
    }

    pub fn scalar_mul(&self, scalar: &Scalar) -> Result<Point, CryptoError> {
        if self.is_null() || scalar.is_null() {
            return Ok(Point::NULL);
        }
        Ok(Self::from_edwards(&(self.decompress()? * scalar.to_dalek())))
    }
}

/// A secret scalar with its public point, `V == v·G`
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pair {
    pub v: Scalar,
    pub V: Point,
}

impl Pair {
    pub fn from_scalar(v: Scalar) -> Self {
        Self { v, V: v.to_point() }
    }

    pub fn random() -> Self {
        Self::from_scalar(Scalar::random())
    }
}
