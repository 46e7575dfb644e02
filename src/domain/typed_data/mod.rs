//! EIP-712 typed data model

mod json;
mod types;

pub use json::{domain_from_json, element_type, member_value_from_json, TypedData};
pub use types::{
    MemberDescription, MemberValue, TypeGraph, TypeRef, TypedDataDomain, DOMAIN_TYPE,
};
