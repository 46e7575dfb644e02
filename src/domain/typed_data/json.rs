//! `eth_signTypedData_v4` documents
//!
//! JSON values are converted into [`MemberValue`] trees guided by the declared
//! member types, so the resulting tree is ordered by declaration and every leaf
//! already carries its ABI type.

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Address, B256, U256};
use serde::Deserialize;
use serde_json::Value;

use super::types::{
    MemberDescription, MemberValue, TypeGraph, TypeRef, TypedDataDomain, DOMAIN_TYPE,
};
use crate::domain::hex;
use crate::error::TypeGraphError;

/// A complete typed data request
#[derive(Debug, Clone, PartialEq)]
pub struct TypedData {
    pub domain: TypedDataDomain,
    pub types: TypeGraph,
    pub primary_type: String,
    pub message: MemberValue,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTypedData {
    types: TypeGraph,
    primary_type: String,
    #[serde(default)]
    domain: Value,
    message: Value,
}

impl TypedData {
    /// Assemble typed data
    ///
    /// A declared `EIP712Domain` is kept as is; without one the domain type is
    /// derived from the present domain fields.
    pub fn new(
        domain: TypedDataDomain,
        mut types: TypeGraph,
        primary_type: impl Into<String>,
        message: MemberValue,
    ) -> Self {
        if !types.contains(DOMAIN_TYPE) {
            types.insert(DOMAIN_TYPE, domain.members());
        }
        Self {
            domain,
            types,
            primary_type: primary_type.into(),
            message,
        }
    }

    /// Members of the domain type in the graph
    pub fn domain_members(&self) -> Result<&[MemberDescription], TypeGraphError> {
        self.types.members(DOMAIN_TYPE)
    }

    /// Domain values in the order of the domain type
    pub fn domain_value(&self) -> Result<MemberValue, TypeGraphError> {
        self.domain.value_for(self.domain_members()?)
    }

    /// Parse a JSON typed data document
    pub fn from_json(json: &str) -> Result<Self, TypeGraphError> {
        let raw: RawTypedData = serde_json::from_str(json)
            .map_err(|e| TypeGraphError::InvalidDocument(e.to_string()))?;
        let domain = domain_from_json(&raw.domain)?;
        raw.types.ensure_closed(&raw.primary_type)?;
        if raw.types.contains(DOMAIN_TYPE) {
            raw.types.ensure_closed(DOMAIN_TYPE)?;
        }
        let message = member_value_from_json(&raw.types, &raw.primary_type, &raw.message)?;
        Ok(Self::new(domain, raw.types, raw.primary_type, message))
    }
}

/// Read the well-known domain fields from a JSON object
pub fn domain_from_json(value: &Value) -> Result<TypedDataDomain, TypeGraphError> {
    if value.is_null() {
        return Ok(TypedDataDomain::default());
    }
    let object = value
        .as_object()
        .ok_or_else(|| TypeGraphError::InvalidDocument("domain is not an object".to_string()))?;

    let text = |key: &str| -> Result<Option<String>, TypeGraphError> {
        match object.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(TypeGraphError::ValueMismatch {
                type_name: "string".to_string(),
            }),
        }
    };

    let chain_id = match object.get("chainId") {
        None | Some(Value::Null) => None,
        Some(v) => match leaf_from_json(&DynSolType::Uint(256), v)? {
            DynSolValue::Uint(id, _) => Some(id),
            _ => None,
        },
    };
    let verifying_contract = match object.get("verifyingContract") {
        None | Some(Value::Null) => None,
        Some(v) => Some(address_from_json(v)?),
    };
    let salt = match object.get("salt") {
        None | Some(Value::Null) => None,
        Some(v) => match leaf_from_json(&DynSolType::FixedBytes(32), v)? {
            DynSolValue::FixedBytes(word, _) => Some(word),
            _ => None,
        },
    };

    Ok(TypedDataDomain {
        name: text("name")?,
        version: text("version")?,
        chain_id,
        verifying_contract,
        salt,
    })
}

/// Convert a JSON value of type `ty` into a member value tree
pub fn member_value_from_json(
    graph: &TypeGraph,
    ty: &str,
    value: &Value,
) -> Result<MemberValue, TypeGraphError> {
    match graph.resolve(ty)? {
        TypeRef::Struct(name) => {
            let object = value.as_object().ok_or_else(|| TypeGraphError::ValueMismatch {
                type_name: name.clone(),
            })?;
            let members = graph.members(&name)?;
            let values = members
                .iter()
                .map(|member| {
                    let field = object.get(&member.name).ok_or_else(|| {
                        TypeGraphError::MissingMember {
                            type_name: name.clone(),
                            member: member.name.clone(),
                        }
                    })?;
                    member_value_from_json(graph, &member.kind, field)
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(MemberValue::Struct(values))
        }
        TypeRef::Array { .. } => {
            let items = value.as_array().ok_or_else(|| TypeGraphError::ValueMismatch {
                type_name: ty.to_string(),
            })?;
            let element = element_type(ty);
            let values = items
                .iter()
                .map(|item| member_value_from_json(graph, element, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(MemberValue::Array(values))
        }
        TypeRef::String => match value {
            Value::String(s) => Ok(MemberValue::string(s.clone())),
            _ => Err(TypeGraphError::ValueMismatch {
                type_name: ty.to_string(),
            }),
        },
        TypeRef::Bytes => match value {
            Value::String(s) => hex::decode(s).map(MemberValue::bytes).map_err(|_| {
                TypeGraphError::ValueMismatch {
                    type_name: ty.to_string(),
                }
            }),
            _ => Err(TypeGraphError::ValueMismatch {
                type_name: ty.to_string(),
            }),
        },
        TypeRef::Primitive(sol) => leaf_from_json(&sol, value).map(MemberValue::Leaf),
    }
}

/// Element type of an array type string: strips the last `[..]` group
pub fn element_type(ty: &str) -> &str {
    match ty.trim().strip_suffix(']').and_then(|body| body.rfind('[')) {
        Some(open) => &ty.trim()[..open],
        None => ty,
    }
}

fn leaf_from_json(ty: &DynSolType, value: &Value) -> Result<DynSolValue, TypeGraphError> {
    let mismatch = || TypeGraphError::ValueMismatch {
        type_name: ty.sol_type_name().into_owned(),
    };
    match (ty, value) {
        (DynSolType::Bool, Value::Bool(b)) => Ok(DynSolValue::Bool(*b)),
        (DynSolType::Bool, Value::String(s)) => match s.as_str() {
            "true" => Ok(DynSolValue::Bool(true)),
            "false" => Ok(DynSolValue::Bool(false)),
            _ => Err(mismatch()),
        },
        (DynSolType::Address, v) => address_from_json(v).map(DynSolValue::Address),
        (DynSolType::FixedBytes(size), Value::String(s)) => {
            let bytes = hex::decode(s).map_err(|_| mismatch())?;
            if bytes.len() > *size {
                return Err(mismatch());
            }
            let mut word = B256::ZERO;
            word[..bytes.len()].copy_from_slice(&bytes);
            Ok(DynSolValue::FixedBytes(word, *size))
        }
        (DynSolType::Uint(_) | DynSolType::Int(_), Value::Number(n)) => {
            if !(n.is_u64() || n.is_i64()) {
                return Err(mismatch());
            }
            ty.coerce_str(&n.to_string()).map_err(|_| mismatch())
        }
        (DynSolType::Uint(bits), Value::String(s)) if s.starts_with("0x") || s.starts_with("0X") => {
            let value = U256::from_str_radix(hex::strip_prefix(s), 16).map_err(|_| mismatch())?;
            Ok(DynSolValue::Uint(value, *bits))
        }
        (DynSolType::Uint(_) | DynSolType::Int(_), Value::String(s)) => {
            ty.coerce_str(s.trim()).map_err(|_| mismatch())
        }
        _ => Err(mismatch()),
    }
}

fn address_from_json(value: &Value) -> Result<Address, TypeGraphError> {
    let mismatch = || TypeGraphError::ValueMismatch {
        type_name: "address".to_string(),
    };
    let text = value.as_str().ok_or_else(mismatch)?;
    let bytes = hex::decode(text).map_err(|_| mismatch())?;
    if bytes.len() != 20 {
        return Err(mismatch());
    }
    Ok(Address::from_slice(&bytes))
}
