pub mod alphabet;
pub mod config;
pub mod error;
pub mod generator;
pub mod loader;
pub mod mapping;
pub mod permutation;
pub mod pipeline;
pub mod translate;
pub mod validator;
// cmd and reports are binary modules (see main.rs).

pub use error::{CfResult, CipherForgeError};

/// Number of symbols in both the source and the target alphabet.
pub const ALPHABET_SIZE: usize = 27;

/// Mask with one bit set for every valid symbol index.
pub const FULL_MASK: u32 = (1 << ALPHABET_SIZE) - 1;
