//! EIP-712 structured data hashing
//!
//! `encodeType` lists the primary type followed by its struct dependencies in
//! alphabetical order. Member values encode to one word each: scalars as their
//! ABI word, `string`/`bytes` as the keccak256 of their content, structs as
//! their `hashStruct` and arrays as the keccak256 of the concatenated element
//! encodings.

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{keccak256, B256};
use serde::Serialize;
use tracing::trace;

use crate::domain::typed_data::{
    element_type, MemberValue, TypeGraph, TypeRef, TypedData, TypedDataDomain, DOMAIN_TYPE,
};
use crate::error::TypeGraphError;

/// `\x19\x01` prefix of the signed pre-image
pub const TYPED_DATA_PREFIX: [u8; 2] = [0x19, 0x01];

/// The three hashes a signer needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedDataHashes {
    pub domain_separator: B256,
    pub message_hash: B256,
    pub typed_data_hash: B256,
}

/// Hashes struct values against one type graph
#[derive(Debug, Clone, Copy)]
pub struct StructuredDataHasher<'a> {
    types: &'a TypeGraph,
}

impl<'a> StructuredDataHasher<'a> {
    pub fn new(types: &'a TypeGraph) -> Self {
        Self { types }
    }

    /// `Primary(type name,...)Dep1(...)Dep2(...)`
    pub fn encode_type(&self, primary: &str) -> Result<String, TypeGraphError> {
        let mut encoded = self.encode_struct_type(primary)?;
        for dependency in self.types.dependencies(primary)? {
            encoded.push_str(&self.encode_struct_type(&dependency)?);
        }
        Ok(encoded)
    }

    pub fn type_hash(&self, primary: &str) -> Result<B256, TypeGraphError> {
        self.encode_type(primary).map(|encoded| keccak256(encoded.as_bytes()))
    }

    /// `typeHash ‖ enc(member_1) ‖ ... ‖ enc(member_n)`
    pub fn encode_data(&self, primary: &str, value: &MemberValue) -> Result<Vec<u8>, TypeGraphError> {
        let members = self.types.members(primary)?;
        let MemberValue::Struct(values) = value else {
            return Err(TypeGraphError::ValueMismatch {
                type_name: primary.to_string(),
            });
        };
        if values.len() != members.len() {
            return Err(TypeGraphError::MemberCountMismatch {
                type_name: primary.to_string(),
                expected: members.len(),
                actual: values.len(),
            });
        }

        let mut encoded = Vec::with_capacity(32 * (members.len() + 1));
        encoded.extend_from_slice(self.type_hash(primary)?.as_slice());
        for (member, value) in members.iter().zip(values) {
            encoded.extend_from_slice(self.encode_value(&member.kind, value)?.as_slice());
        }
        Ok(encoded)
    }

    pub fn hash_struct(&self, primary: &str, value: &MemberValue) -> Result<B256, TypeGraphError> {
        let hash = keccak256(self.encode_data(primary, value)?);
        trace!(ty = primary, %hash, "hashed struct");
        Ok(hash)
    }

    /// Encode one member value of type `ty` into its 32-byte slot
    pub fn encode_value(&self, ty: &str, value: &MemberValue) -> Result<B256, TypeGraphError> {
        let mismatch = || TypeGraphError::ValueMismatch {
            type_name: ty.to_string(),
        };
        match (self.types.resolve(ty)?, value) {
            (TypeRef::Struct(name), MemberValue::Struct(_)) => self.hash_struct(&name, value),
            (TypeRef::Array { len, .. }, MemberValue::Array(items)) => {
                if let Some(expected) = len {
                    if items.len() != expected {
                        return Err(TypeGraphError::ArrayLengthMismatch {
                            type_name: ty.to_string(),
                            expected,
                            actual: items.len(),
                        });
                    }
                }
                let element = element_type(ty);
                let mut concatenated = Vec::with_capacity(32 * items.len());
                for item in items {
                    concatenated.extend_from_slice(self.encode_value(element, item)?.as_slice());
                }
                Ok(keccak256(&concatenated))
            }
            (TypeRef::String, MemberValue::Leaf(DynSolValue::String(s))) => Ok(keccak256(s.as_bytes())),
            (TypeRef::Bytes, MemberValue::Leaf(DynSolValue::Bytes(b))) => Ok(keccak256(b)),
            (TypeRef::Primitive(sol), MemberValue::Leaf(leaf)) if leaf.matches(&sol) => {
                leaf.as_word().ok_or_else(mismatch)
            }
            _ => Err(mismatch()),
        }
    }

    fn encode_struct_type(&self, name: &str) -> Result<String, TypeGraphError> {
        let members = self
            .types
            .members(name)?
            .iter()
            .map(|member| format!("{} {}", member.kind.trim(), member.name))
            .collect::<Vec<_>>();
        Ok(format!("{name}({})", members.join(",")))
    }
}

/// `hashStruct(EIP712Domain, domain)` with the type derived from the present fields
pub fn domain_separator(domain: &TypedDataDomain) -> Result<B256, TypeGraphError> {
    let types = TypeGraph::new().with_type(DOMAIN_TYPE, domain.members());
    StructuredDataHasher::new(&types).hash_struct(DOMAIN_TYPE, &domain.to_value())
}

/// `hashStruct(EIP712Domain, domain)` against the domain type of the document
pub fn typed_domain_separator(typed: &TypedData) -> Result<B256, TypeGraphError> {
    StructuredDataHasher::new(&typed.types).hash_struct(DOMAIN_TYPE, &typed.domain_value()?)
}

/// `hashStruct(primaryType, message)`
pub fn message_hash(typed: &TypedData) -> Result<B256, TypeGraphError> {
    StructuredDataHasher::new(&typed.types).hash_struct(&typed.primary_type, &typed.message)
}

/// The 66-byte pre-image `0x19 0x01 ‖ domainSeparator ‖ messageHash`
pub fn encode_typed_data(typed: &TypedData) -> Result<[u8; 66], TypeGraphError> {
    let hashes = pre_image_parts(typed)?;
    Ok(pre_image(hashes.0, hashes.1))
}

/// `keccak256(0x19 0x01 ‖ domainSeparator ‖ messageHash)`
pub fn typed_data_hash(typed: &TypedData) -> Result<B256, TypeGraphError> {
    encode_typed_data(typed).map(keccak256)
}

/// All three hashes in one pass
pub fn hashes(typed: &TypedData) -> Result<TypedDataHashes, TypeGraphError> {
    let (domain_separator, message_hash) = pre_image_parts(typed)?;
    Ok(TypedDataHashes {
        domain_separator,
        message_hash,
        typed_data_hash: keccak256(pre_image(domain_separator, message_hash)),
    })
}

fn pre_image_parts(typed: &TypedData) -> Result<(B256, B256), TypeGraphError> {
    typed.types.ensure_closed(&typed.primary_type)?;
    typed.types.ensure_closed(DOMAIN_TYPE)?;
    Ok((typed_domain_separator(typed)?, message_hash(typed)?))
}

fn pre_image(domain_separator: B256, message_hash: B256) -> [u8; 66] {
    let mut buf = [0u8; 66];
    buf[..2].copy_from_slice(&TYPED_DATA_PREFIX);
    buf[2..34].copy_from_slice(domain_separator.as_slice());
    buf[34..].copy_from_slice(message_hash.as_slice());
    buf
}
