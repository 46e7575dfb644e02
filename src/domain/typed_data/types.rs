//! Typed data model: domain, type graph and member value tree

use std::collections::{BTreeMap, BTreeSet};

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::error::TypeGraphError;

/// Name of the domain struct type
pub const DOMAIN_TYPE: &str = "EIP712Domain";

/// One declared member of a struct type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDescription {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl MemberDescription {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }
}

/// Resolved shape of a type string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// Fixed-size scalar: uintN, intN, bool, address, bytesN
    Primitive(DynSolType),
    /// Dynamic `bytes`
    Bytes,
    /// Dynamic `string`
    String,
    /// Named struct present in the graph
    Struct(String),
    /// `T[]` or `T[N]`
    Array {
        element: Box<TypeRef>,
        len: Option<usize>,
    },
}

/// Struct type name -> ordered member list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeGraph(BTreeMap<String, Vec<MemberDescription>>);

impl TypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a struct definition
    pub fn insert(&mut self, name: impl Into<String>, members: Vec<MemberDescription>) {
        self.0.insert(name.into(), members);
    }

    /// Builder form of [`TypeGraph::insert`]
    pub fn with_type(mut self, name: impl Into<String>, members: Vec<MemberDescription>) -> Self {
        self.insert(name, members);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Members of a struct type
    pub fn members(&self, name: &str) -> Result<&[MemberDescription], TypeGraphError> {
        self.0
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| TypeGraphError::UnknownType(name.to_string()))
    }

    /// Resolve a type string against the graph
    pub fn resolve(&self, ty: &str) -> Result<TypeRef, TypeGraphError> {
        let ty = ty.trim();
        if let Some(body) = ty.strip_suffix(']') {
            let open = body
                .rfind('[')
                .ok_or_else(|| TypeGraphError::UnknownType(ty.to_string()))?;
            let len = match &body[open + 1..] {
                "" => None,
                digits => Some(
                    digits
                        .parse::<usize>()
                        .map_err(|_| TypeGraphError::UnknownType(ty.to_string()))?,
                ),
            };
            let element = self.resolve(&body[..open])?;
            return Ok(TypeRef::Array {
                element: Box::new(element),
                len,
            });
        }

        if self.contains(ty) {
            return Ok(TypeRef::Struct(ty.to_string()));
        }

        match ty {
            "string" => Ok(TypeRef::String),
            "bytes" => Ok(TypeRef::Bytes),
            _ => match DynSolType::parse(ty) {
                Ok(
                    sol @ (DynSolType::Uint(_)
                    | DynSolType::Int(_)
                    | DynSolType::Bool
                    | DynSolType::Address
                    | DynSolType::FixedBytes(_)),
                ) => Ok(TypeRef::Primitive(sol)),
                _ => Err(TypeGraphError::UnknownType(ty.to_string())),
            },
        }
    }

    /// Struct types transitively referenced by `root`, excluding `root` itself
    pub fn dependencies(&self, root: &str) -> Result<BTreeSet<String>, TypeGraphError> {
        let mut found = BTreeSet::new();
        let mut pending = vec![root.to_string()];
        while let Some(name) = pending.pop() {
            for member in self.members(&name)? {
                if let Some(dep) = struct_name(&self.resolve(&member.kind)?) {
                    if dep != root && found.insert(dep.clone()) {
                        pending.push(dep);
                    }
                }
            }
        }
        Ok(found)
    }

    /// Check that every type reachable from `root` resolves
    pub fn ensure_closed(&self, root: &str) -> Result<(), TypeGraphError> {
        self.dependencies(root).map(|_| ())
    }
}

fn struct_name(ty: &TypeRef) -> Option<String> {
    match ty {
        TypeRef::Struct(name) => Some(name.clone()),
        TypeRef::Array { element, .. } => struct_name(element),
        _ => None,
    }
}

/// A node of a typed data message tree
#[derive(Debug, Clone, PartialEq)]
pub enum MemberValue {
    /// Scalar, string or bytes value
    Leaf(DynSolValue),
    /// Struct instance, values in member declaration order
    Struct(Vec<MemberValue>),
    /// Array of leaves or structs
    Array(Vec<MemberValue>),
}

impl MemberValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self::Leaf(DynSolValue::String(value.into()))
    }

    pub fn address(value: Address) -> Self {
        Self::Leaf(DynSolValue::Address(value))
    }

    pub fn uint(value: U256, bits: usize) -> Self {
        Self::Leaf(DynSolValue::Uint(value, bits))
    }

    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        Self::Leaf(DynSolValue::Bytes(value.into()))
    }

    pub fn boolean(value: bool) -> Self {
        Self::Leaf(DynSolValue::Bool(value))
    }

    pub fn word(value: B256) -> Self {
        Self::Leaf(DynSolValue::FixedBytes(value, 32))
    }
}

/// Domain of a typed data signature; only present fields are hashed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypedDataDomain {
    pub name: Option<String>,
    pub version: Option<String>,
    pub chain_id: Option<U256>,
    pub verifying_contract: Option<Address>,
    pub salt: Option<B256>,
}

impl TypedDataDomain {
    /// Member list of the domain type, canonical order, present fields only
    pub fn members(&self) -> Vec<MemberDescription> {
        let mut members = Vec::new();
        if self.name.is_some() {
            members.push(MemberDescription::new("name", "string"));
        }
        if self.version.is_some() {
            members.push(MemberDescription::new("version", "string"));
        }
        if self.chain_id.is_some() {
            members.push(MemberDescription::new("chainId", "uint256"));
        }
        if self.verifying_contract.is_some() {
            members.push(MemberDescription::new("verifyingContract", "address"));
        }
        if self.salt.is_some() {
            members.push(MemberDescription::new("salt", "bytes32"));
        }
        members
    }

    /// Domain values laid out by a declared `EIP712Domain` member list
    ///
    /// Members are taken in the declared order; a declared member whose field
    /// is absent fails with `MissingMember`.
    pub fn value_for(&self, members: &[MemberDescription]) -> Result<MemberValue, TypeGraphError> {
        members
            .iter()
            .map(|member| {
                self.member_value(member)
                    .ok_or_else(|| TypeGraphError::MissingMember {
                        type_name: DOMAIN_TYPE.to_string(),
                        member: member.name.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(MemberValue::Struct)
    }

    fn member_value(&self, member: &MemberDescription) -> Option<MemberValue> {
        match member.name.as_str() {
            "name" => self.name.clone().map(MemberValue::string),
            "version" => self.version.clone().map(MemberValue::string),
            "chainId" => {
                let bits = match DynSolType::parse(member.kind.trim()) {
                    Ok(DynSolType::Uint(bits)) => bits,
                    _ => 256,
                };
                self.chain_id.map(|id| MemberValue::uint(id, bits))
            }
            "verifyingContract" => self.verifying_contract.map(MemberValue::address),
            "salt" => self.salt.map(MemberValue::word),
            _ => None,
        }
    }

    /// Values matching [`TypedDataDomain::members`]
    pub fn to_value(&self) -> MemberValue {
        let mut values = Vec::new();
        if let Some(name) = &self.name {
            values.push(MemberValue::string(name.clone()));
        }
        if let Some(version) = &self.version {
            values.push(MemberValue::string(version.clone()));
        }
        if let Some(chain_id) = self.chain_id {
            values.push(MemberValue::uint(chain_id, 256));
        }
        if let Some(contract) = self.verifying_contract {
            values.push(MemberValue::address(contract));
        }
        if let Some(salt) = self.salt {
            values.push(MemberValue::word(salt));
        }
        MemberValue::Struct(values)
    }
}
