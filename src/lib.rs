//! # Script Engine
//!
//! Spend authorization for a UTXO ledger: Curve25519 keys, Schnorr
//! signatures, a canonical hashing scheme and a small stack-based script
//! language.
//!
//! ## Architecture
//!
//! The crate is layered bottom-up:
//! - Primitives: [`ecc`] (Scalar, Point), [`hash`] (canonical BLAKE2b hashing)
//! - Signatures: [`schnorr`] (sign, verify, additive aggregation)
//! - Script: [`opcode`], [`stack`], [`scope`], [`script`] (validation, builder)
//! - Authorization: [`lock`] (Lock / Unlock), [`engine`] (the interpreter)
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: the engine holds only its limits, every call is deterministic
//! 2. **Errors as Values**: a rejected spend is a [`ScriptError`] with a stable message
//! 3. **Panics for Bugs**: broken internal invariants panic and are never reported as rejections
//! 4. **Exact Version Pinning**: consensus-critical crypto dependencies are pinned
//!
//! ## Usage
//!
//! ```rust
//! use script_engine::{schnorr, Engine, Lock, Pair, Transaction, TxInput, Unlock};
//! use script_engine::hash::hash;
//!
//! let engine = Engine::default();
//! let owner = Pair::random();
//! let lock = Lock::key(&owner.V);
//!
//! let input = TxInput::new(hash(b"utxo"), Unlock::default(), 0);
//! let tx = Transaction {
//!     inputs: vec![input.clone()],
//!     ..Default::default()
//! };
//! let unlock = Unlock::key(&schnorr::sign(&owner, &tx));
//!
//! assert!(engine.execute(&lock, &unlock, &tx, &input).is_ok());
//! ```

pub mod config;
pub mod constants;
pub mod ecc;
pub mod engine;
pub mod error;
pub mod hash;
pub mod lock;
pub mod opcode;
pub mod schnorr;
pub mod scope;
pub mod script;
pub mod stack;
pub mod types;

// Re-export commonly used types
pub use config::EngineConfig;
pub use ecc::{Pair, Point, Scalar};
pub use engine::{sequence_challenge, Engine};
pub use error::{ConfigError, CryptoError, Result, ScriptError};
pub use hash::{hash_full, hash_multi, Hash, HashPart};
pub use lock::{Lock, LockType, Unlock};
pub use opcode::OP;
pub use schnorr::{Sig, Signature};
pub use script::{validate_script, Script, ScriptBuilder, ScriptType};
pub use stack::Stack;
pub use types::{utxo_key, Amount, Height, Transaction, TxInput, TxOutput};
