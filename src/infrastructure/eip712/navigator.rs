//! Path-based walk over typed data for interactive signers
//!
//! A path starts with a root selector: `0` picks the domain, anything else the
//! message. Every following step indexes a struct member (declaration order)
//! or an array element.

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::U256;

use crate::domain::typed_data::{element_type, MemberValue, TypeGraph, TypedData, DOMAIN_TYPE};
use crate::error::TypeGraphError;

/// Resolves values in a domain and message tree by member path
#[derive(Debug, Clone)]
pub struct TypeGraphNavigator<'a> {
    types: &'a TypeGraph,
    primary_type: &'a str,
    message: &'a MemberValue,
    domain: MemberValue,
}

impl<'a> TypeGraphNavigator<'a> {
    /// Fails when the domain lacks a field its domain type declares
    pub fn new(typed: &'a TypedData) -> Result<Self, TypeGraphError> {
        Ok(Self {
            types: &typed.types,
            primary_type: &typed.primary_type,
            message: &typed.message,
            domain: typed.domain_value()?,
        })
    }

    /// Value and type name at `path`
    pub fn resolve_at_path(&self, path: &[u32]) -> Result<(&MemberValue, String), TypeGraphError> {
        let invalid = |step: usize| TypeGraphError::InvalidPath {
            path: path.to_vec(),
            step,
        };

        let (&root, steps) = path.split_first().ok_or_else(|| invalid(0))?;
        let (mut value, mut ty) = if root == 0 {
            (&self.domain, DOMAIN_TYPE.to_string())
        } else {
            (self.message, self.primary_type.to_string())
        };

        for (offset, &index) in steps.iter().enumerate() {
            let step = offset + 1;
            let index = index as usize;
            match value {
                MemberValue::Struct(values) => {
                    let members = self.types.members(&ty)?;
                    let member = members.get(index).ok_or_else(|| invalid(step))?;
                    value = values.get(index).ok_or_else(|| invalid(step))?;
                    ty = member.kind.trim().to_string();
                }
                MemberValue::Array(items) => {
                    value = items.get(index).ok_or_else(|| invalid(step))?;
                    ty = element_type(&ty).to_string();
                }
                MemberValue::Leaf(_) => return Err(invalid(step)),
            }
        }

        Ok((value, ty))
    }

    /// Resolve `path` and encode the value found there
    pub fn encode_at_path(&self, path: &[u32]) -> Result<Vec<u8>, TypeGraphError> {
        let (value, ty) = self.resolve_at_path(path)?;
        encode_leaf(value, &ty)
    }
}

/// Device encoding of a single value
///
/// Integers are big-endian at their declared width, `bool` is one byte,
/// `address` and `bytesN` keep their raw length, `string` is UTF-8 and
/// `bytes` passes through. Arrays only report their length as a 2-byte
/// big-endian count.
pub fn encode_leaf(value: &MemberValue, ty: &str) -> Result<Vec<u8>, TypeGraphError> {
    let ty = ty.trim();
    let mismatch = || TypeGraphError::ValueMismatch {
        type_name: ty.to_string(),
    };

    let leaf = match value {
        MemberValue::Array(items) => {
            let count = u16::try_from(items.len()).map_err(|_| mismatch())?;
            return Ok(count.to_be_bytes().to_vec());
        }
        MemberValue::Struct(_) => return Err(TypeGraphError::UnsupportedLeafType(ty.to_string())),
        MemberValue::Leaf(leaf) => leaf,
    };

    let sol = DynSolType::parse(ty).map_err(|_| TypeGraphError::UnsupportedLeafType(ty.to_string()))?;
    match (&sol, leaf) {
        (DynSolType::Uint(bits), DynSolValue::Uint(v, _)) => {
            if v.bit_len() > *bits {
                return Err(mismatch());
            }
            Ok(word_tail(*v, bits / 8))
        }
        (DynSolType::Int(bits), DynSolValue::Int(v, _)) => Ok(word_tail(v.into_raw(), bits / 8)),
        (DynSolType::Bool, DynSolValue::Bool(b)) => Ok(vec![u8::from(*b)]),
        (DynSolType::Address, DynSolValue::Address(address)) => Ok(address.to_vec()),
        (DynSolType::FixedBytes(size), DynSolValue::FixedBytes(word, _)) => {
            Ok(word[..*size].to_vec())
        }
        (DynSolType::String, DynSolValue::String(s)) => Ok(s.as_bytes().to_vec()),
        (DynSolType::Bytes, DynSolValue::Bytes(b)) => Ok(b.clone()),
        (
            DynSolType::Uint(_)
            | DynSolType::Int(_)
            | DynSolType::Bool
            | DynSolType::Address
            | DynSolType::FixedBytes(_)
            | DynSolType::String
            | DynSolType::Bytes,
            _,
        ) => Err(mismatch()),
        _ => Err(TypeGraphError::UnsupportedLeafType(ty.to_string())),
    }
}

/// Last `width` bytes of the big-endian word
fn word_tail(value: U256, width: usize) -> Vec<u8> {
    let word = value.to_be_bytes::<32>();
    word[32 - width..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, I256};

    const MAIL: &str = r#"{
        "types": {
            "EIP712Domain": [
                {"name": "name", "type": "string"},
                {"name": "version", "type": "string"},
                {"name": "chainId", "type": "uint256"},
                {"name": "verifyingContract", "type": "address"}
            ],
            "Person": [
                {"name": "name", "type": "string"},
                {"name": "wallets", "type": "address[]"}
            ],
            "Mail": [
                {"name": "from", "type": "Person"},
                {"name": "to", "type": "Person[]"},
                {"name": "contents", "type": "string"}
            ]
        },
        "primaryType": "Mail",
        "domain": {
            "name": "Ether Mail",
            "version": "1",
            "chainId": 1,
            "verifyingContract": "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC"
        },
        "message": {
            "from": {"name": "Cow", "wallets": ["0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826", "0xDeaDbeefdEAdbeefdEadbEEFdeadbeEFdEaDbeeF"]},
            "to": [{"name": "Bob", "wallets": ["0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB"]}],
            "contents": "Hello, Bob!"
        }
    }"#;

    #[test]
    fn test_resolve_domain() {
        let typed = TypedData::from_json(MAIL).unwrap();
        let navigator = TypeGraphNavigator::new(&typed).unwrap();

        let (value, ty) = navigator.resolve_at_path(&[0, 2]).unwrap();
        assert_eq!(ty, "uint256");
        assert_eq!(encode_leaf(value, &ty).unwrap(), vec![0u8; 31].into_iter().chain([1]).collect::<Vec<_>>());

        let (_, ty) = navigator.resolve_at_path(&[0]).unwrap();
        assert_eq!(ty, DOMAIN_TYPE);
    }

    #[test]
    fn test_resolve_message_path() {
        let typed = TypedData::from_json(MAIL).unwrap();
        let navigator = TypeGraphNavigator::new(&typed).unwrap();

        let (value, ty) = navigator.resolve_at_path(&[1, 0, 1]).unwrap();
        assert_eq!(ty, "address[]");
        assert_eq!(encode_leaf(value, &ty).unwrap(), vec![0, 2]);

        let (value, ty) = navigator.resolve_at_path(&[1, 0, 1, 1]).unwrap();
        assert_eq!(ty, "address");
        assert_eq!(
            encode_leaf(value, &ty).unwrap(),
            address!("DeaDbeefdEAdbeefdEadbEEFdeadbeEFdEaDbeeF").to_vec()
        );

        let (_, ty) = navigator.resolve_at_path(&[1, 1, 0]).unwrap();
        assert_eq!(ty, "Person");

        let bytes = navigator.encode_at_path(&[1, 2]).unwrap();
        assert_eq!(bytes, b"Hello, Bob!".to_vec());
    }

    #[test]
    fn test_domain_path_follows_declared_type() {
        let json = MAIL.replace(
            r#"{"name": "name", "type": "string"},
                {"name": "version", "type": "string"},
                {"name": "chainId", "type": "uint256"},
                {"name": "verifyingContract", "type": "address"}"#,
            r#"{"name": "verifyingContract", "type": "address"},
                {"name": "name", "type": "string"}"#,
        );
        let typed = TypedData::from_json(&json).unwrap();
        let navigator = TypeGraphNavigator::new(&typed).unwrap();

        let (_, ty) = navigator.resolve_at_path(&[0, 0]).unwrap();
        assert_eq!(ty, "address");
        assert_eq!(navigator.encode_at_path(&[0, 1]).unwrap(), b"Ether Mail".to_vec());
        assert!(matches!(
            navigator.resolve_at_path(&[0, 2]),
            Err(TypeGraphError::InvalidPath { step: 1, .. })
        ));
    }

    #[test]
    fn test_invalid_path() {
        let typed = TypedData::from_json(MAIL).unwrap();
        let navigator = TypeGraphNavigator::new(&typed).unwrap();

        assert!(matches!(
            navigator.resolve_at_path(&[1, 5]),
            Err(TypeGraphError::InvalidPath { step: 1, .. })
        ));
        assert!(matches!(
            navigator.resolve_at_path(&[1, 2, 0]),
            Err(TypeGraphError::InvalidPath { step: 2, .. })
        ));
        assert!(matches!(
            navigator.resolve_at_path(&[]),
            Err(TypeGraphError::InvalidPath { step: 0, .. })
        ));
    }

    #[test]
    fn test_struct_is_not_a_leaf() {
        let typed = TypedData::from_json(MAIL).unwrap();
        let navigator = TypeGraphNavigator::new(&typed).unwrap();
        assert!(matches!(
            navigator.encode_at_path(&[1, 0]),
            Err(TypeGraphError::UnsupportedLeafType(ty)) if ty == "Person"
        ));
    }

    #[test]
    fn test_encode_leaf_widths() {
        assert_eq!(
            encode_leaf(&MemberValue::uint(U256::from(0x1234u64), 16), "uint16").unwrap(),
            vec![0x12, 0x34]
        );
        assert_eq!(
            encode_leaf(&MemberValue::Leaf(DynSolValue::Int(I256::MINUS_ONE, 8)), "int8").unwrap(),
            vec![0xff]
        );
        assert_eq!(encode_leaf(&MemberValue::boolean(true), "bool").unwrap(), vec![1]);
        assert_eq!(
            encode_leaf(&MemberValue::bytes(vec![0xde, 0xad]), "bytes").unwrap(),
            vec![0xde, 0xad]
        );
        assert!(matches!(
            encode_leaf(&MemberValue::uint(U256::from(300u64), 8), "uint8"),
            Err(TypeGraphError::ValueMismatch { .. })
        ));
        assert!(matches!(
            encode_leaf(&MemberValue::string("x"), "function"),
            Err(TypeGraphError::UnsupportedLeafType(_))
        ));
    }

    #[test]
    fn test_encode_fixed_bytes() {
        let mut word = alloy_primitives::B256::ZERO;
        word[0] = 0xab;
        word[1] = 0xcd;
        let value = MemberValue::Leaf(DynSolValue::FixedBytes(word, 2));
        assert_eq!(encode_leaf(&value, "bytes2").unwrap(), vec![0xab, 0xcd]);
    }
}
