//! Cryptographic primitives
//!
//! secp256k1 recoverable ECDSA behind an explicitly constructed context.

pub mod secp256k1;

pub use self::secp256k1::{
    EcContext, RecoverableParts, COMPRESSED_PUBLIC_KEY_LEN, UNCOMPRESSED_PUBLIC_KEY_LEN,
};
