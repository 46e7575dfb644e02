//! Infrastructure layer - alloy-backed codecs
//!
//! This layer contains:
//! - ABI call and event encoding/decoding using alloy-dyn-abi
//! - Contract bindings over a parsed ABI
//! - EIP-712 hashing and path navigation

pub mod abi;
pub mod eip712;
