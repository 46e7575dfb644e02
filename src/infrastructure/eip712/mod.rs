//! EIP-712 typed data hashing and navigation

mod hasher;
mod navigator;

pub use hasher::{
    domain_separator, encode_typed_data, hashes, message_hash, typed_data_hash,
    typed_domain_separator, StructuredDataHasher, TypedDataHashes, TYPED_DATA_PREFIX,
};
pub use navigator::{encode_leaf, TypeGraphNavigator};
