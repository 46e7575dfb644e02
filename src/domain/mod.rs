//! Domain layer - models independent of the encoding backend

pub mod abi;
pub mod hex;
pub mod typed_data;
