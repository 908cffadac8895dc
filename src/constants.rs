//! Fixed widths and default consensus limits

/// Width of a `Scalar` in bytes
pub const SCALAR_SIZE: usize = 32;

/// Width of a `Point` in bytes
pub const POINT_SIZE: usize = 32;

/// Width of a `Hash` (BLAKE2b-512) in bytes
pub const HASH_SIZE: usize = 64;

/// Width of a `Signature` in bytes: R followed by s
pub const SIGNATURE_SIZE: usize = POINT_SIZE + SCALAR_SIZE;

/// Default maximum total byte size of the stack during script execution
pub const MAX_STACK_TOTAL_SIZE: usize = 16_384;

/// Default maximum byte size of a single stack item
pub const MAX_STACK_ITEM_SIZE: usize = 512;

/// Default maximum number of public keys in a multi-signature check
pub const MAX_MULTI_SIG_KEYS: u8 = 5;
