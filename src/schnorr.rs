//! Schnorr signatures over the Curve25519 group
//!
//! The challenge is `c = H(X, R, payload)` reduced into the scalar field, and
//! `s = r + c·x`. Because everything is linear, signatures made by several
//! parties over the same aggregate key `X1 + X2` and aggregate nonce
//! `R1 + R2` add up into one signature valid for the aggregate key.

use crate::constants::{POINT_SIZE, SIGNATURE_SIZE};
use crate::ecc::{decode_hex, Pair, Point, Scalar};
use crate::error::CryptoError;
use crate::hash::{hash_full, HashPart};
use std::fmt;

/// Wire form of a signature: `R` followed by `s`
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_SIZE]);

/// Decomposed signature
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sig {
    pub R: Point,
    pub s: Scalar,
}

impl Sig {
    pub fn to_signature(&self) -> Signature {
        Signature::from_parts(&self.R, &self.s)
    }
}

impl Signature {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let data: [u8; SIGNATURE_SIZE] =
            bytes.try_into().map_err(|_| CryptoError::InvalidLength {
                expected: SIGNATURE_SIZE,
                actual: bytes.len(),
            })?;
        Ok(Self(data))
    }

    #[allow(non_snake_case)]
    pub fn from_parts(R: &Point, s: &Scalar) -> Self {
        let mut data = [0u8; SIGNATURE_SIZE];
        data[..POINT_SIZE].copy_from_slice(R.as_bytes());
        data[POINT_SIZE..].copy_from_slice(s.as_bytes());
        Self(data)
    }

    /// Split into `(R, s)`. Neither part is checked for validity.
    pub fn to_sig(&self) -> Sig {
        let mut r = [0u8; POINT_SIZE];
        let mut s = [0u8; SIGNATURE_SIZE - POINT_SIZE];
        r.copy_from_slice(&self.0[..POINT_SIZE]);
        s.copy_from_slice(&self.0[POINT_SIZE..]);
        Sig {
            R: Point::from_bytes_le(&r).unwrap_or(Point::NULL),
            s: Scalar::from_bytes_le(&s).unwrap_or(Scalar::NULL),
        }
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.0
    }

    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        Self::from_bytes(&decode_hex(s)?)
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

impl serde::Serialize for Signature {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Signature {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Signature::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl HashPart for Signature {
    fn hash_part(&self, buf: &mut Vec<u8>, _write_length: bool) {
        buf.extend_from_slice(&self.0);
    }
}

/// Pre-image of the challenge
#[allow(non_snake_case)]
struct Message<'a, T: ?Sized> {
    X: &'a Point,
    R: &'a Point,
    payload: &'a T,
}

impl<T: HashPart + ?Sized> HashPart for Message<'_, T> {
    fn hash_part(&self, buf: &mut Vec<u8>, _write_length: bool) {
        self.X.hash_part(buf, true);
        self.R.hash_part(buf, true);
        self.payload.hash_part(buf, true);
    }
}

#[allow(non_snake_case)]
fn challenge<T: HashPart + ?Sized>(X: &Point, R: &Point, data: &T) -> Scalar {
    Scalar::from_hash(&hash_full(&Message { X, R, payload: data }))
}

/// Single-signer signature with a fresh random nonce
pub fn sign<T: HashPart + ?Sized>(key: &Pair, data: &T) -> Signature {
    let nonce = Pair::random();
    sign_with_nonce(&key.v, &key.V, &nonce.v, &nonce.V, data)
}

/// Sign with a caller-chosen nonce.
///
/// `X` and `R` need not be `x·G` and `r·G`: for multi-party signing they are
/// the aggregate key and nonce while `x` and `r` are this party's shares.
#[allow(non_snake_case)]
pub fn sign_with_nonce<T: HashPart + ?Sized>(
    x: &Scalar,
    X: &Point,
    r: &Scalar,
    R: &Point,
    data: &T,
) -> Signature {
    let c = challenge(X, R, data);
    let s = r.add(&c.mul(x));
    Signature::from_parts(R, &s)
}

/// Check `s·G == R + c·X`
#[allow(non_snake_case)]
pub fn verify<T: HashPart + ?Sized>(X: &Point, signature: &Signature, data: &T) -> bool {
    let Sig { R, s } = signature.to_sig();
    if !s.is_valid() || !X.is_valid() || !R.is_valid() {
        return false;
    }
    let c = challenge(X, &R, data);
    let expected = match X.scalar_mul(&c).and_then(|cX| R.add(&cX)) {
        Ok(point) => point,
        Err(_) => return false,
    };
    s.to_point() == expected
}
