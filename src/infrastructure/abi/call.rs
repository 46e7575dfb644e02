//! Call data codec built on alloy-dyn-abi
//!
//! Arguments are always laid out in encoding order: explicit parameter `order`
//! first, declaration position breaking ties. Decoded values come back in the
//! same order, paired with the parameter that produced them.

use std::fmt;
use std::sync::Arc;

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Bytes, U256};
use tracing::trace;

use crate::domain::abi::{
    encoding_positions, selector_of, sorted, ConstructorSignature, DecodedArg, ErrorSignature,
    FromParameterOutputs, FunctionSignature, Parameter, ParameterOutputs, SignatureRegistry,
};
use crate::domain::hex;
use crate::error::{ConfigurationError, DecodeError, Result};

const SELECTOR_LEN: usize = 4;
const WORD: usize = 32;

/// Selector of `Error(string)`
pub const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];
/// Selector of `Panic(uint256)`
pub const PANIC_SELECTOR: [u8; 4] = [0x4e, 0x48, 0x7b, 0x71];

/// Call data decoded against a known function
#[derive(Debug, Clone)]
pub struct DecodedCall {
    pub function: Arc<FunctionSignature>,
    pub arguments: ParameterOutputs,
}

impl DecodedCall {
    /// Arguments formatted for display
    pub fn to_args(&self) -> Vec<DecodedArg> {
        self.arguments.to_args()
    }
}

/// Why a call reverted
#[derive(Debug, Clone, PartialEq)]
pub enum RevertReason {
    /// `revert("...")` / `require(cond, "...")`
    Message(String),
    /// Compiler-inserted `Panic(uint256)`
    Panic(U256),
    /// A custom error known to a registry
    Custom {
        error: Arc<ErrorSignature>,
        arguments: ParameterOutputs,
    },
}

impl fmt::Display for RevertReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(message) => write!(f, "reverted: {message}"),
            Self::Panic(code) => match panic_description(*code) {
                Some(description) => write!(f, "panic 0x{code:x}: {description}"),
                None => write!(f, "panic 0x{code:x}"),
            },
            Self::Custom { error, .. } => write!(f, "reverted with {}", error.canonical),
        }
    }
}

/// Human description of a Solidity panic code
pub fn panic_description(code: U256) -> Option<&'static str> {
    let code: u64 = code.try_into().ok()?;
    Some(match code {
        0x00 => "generic compiler panic",
        0x01 => "assertion failed",
        0x11 => "arithmetic overflow or underflow",
        0x12 => "division or modulo by zero",
        0x21 => "invalid enum value",
        0x22 => "invalid storage byte array encoding",
        0x31 => "pop on empty array",
        0x32 => "array index out of bounds",
        0x41 => "out of memory",
        0x51 => "call to uninitialized function",
        _ => return None,
    })
}

/// Function call encoding and decoding
pub struct CallCodec;

impl CallCodec {
    /// Encode `selector ++ arguments`; `args` are given in declaration order
    pub fn encode_call(function: &FunctionSignature, args: &[DynSolValue]) -> Result<Bytes> {
        let body = encode_arguments(&function.canonical, &function.inputs, args)?;
        let mut data = Vec::with_capacity(SELECTOR_LEN + body.len());
        data.extend_from_slice(&function.selector);
        data.extend_from_slice(&body);
        trace!(function = %function.canonical, len = data.len(), "encoded call");
        Ok(data.into())
    }

    /// [`CallCodec::encode_call`] as a lowercase `0x` string
    pub fn encode_call_hex(function: &FunctionSignature, args: &[DynSolValue]) -> Result<String> {
        Self::encode_call(function, args).map(hex::encode_prefixed)
    }

    /// Encode contract creation data: bytecode followed by constructor arguments
    pub fn encode_deployment(
        bytecode: &[u8],
        constructor: Option<&ConstructorSignature>,
        args: &[DynSolValue],
    ) -> Result<Bytes> {
        let body = match constructor {
            Some(constructor) => encode_arguments("constructor", &constructor.inputs, args)?,
            None if args.is_empty() => Vec::new(),
            None => {
                return Err(ConfigurationError::ArgumentMismatch {
                    signature: "constructor".to_string(),
                    reason: format!("no constructor declared but {} arguments given", args.len()),
                }
                .into())
            }
        };
        let mut data = bytecode.to_vec();
        data.extend_from_slice(&body);
        Ok(data.into())
    }

    /// Decode call data (selector included) back into the function inputs
    pub fn decode_input(function: &FunctionSignature, data: &[u8]) -> Result<ParameterOutputs> {
        ensure_selector(&function.canonical, data)?;
        let selector = &data[..SELECTOR_LEN];
        if selector != function.selector {
            return Err(DecodeError::SelectorMismatch {
                signature: function.canonical.clone(),
                expected: function.selector_hex(),
                actual: hex::encode_prefixed(selector),
            }
            .into());
        }
        decode_parameters(
            &function.canonical,
            function.ordered_inputs(),
            &data[SELECTOR_LEN..],
        )
    }

    /// Decode return data into the function outputs, in encoding order
    pub fn decode_return(function: &FunctionSignature, data: &[u8]) -> Result<ParameterOutputs> {
        decode_parameters(&function.canonical, function.ordered_outputs(), data)
    }

    /// Decode return data into a caller-described shape
    pub fn decode_return_as<T: FromParameterOutputs>(
        function: &FunctionSignature,
        data: &[u8],
    ) -> Result<T> {
        T::from_outputs(Self::decode_return(function, data)?)
    }

    /// Decode revert data as the given custom error
    pub fn decode_custom_error(data: &[u8], error: &ErrorSignature) -> Result<ParameterOutputs> {
        ensure_selector(&error.canonical, data)?;
        let selector = &data[..SELECTOR_LEN];
        if selector != error.selector {
            return Err(DecodeError::NotMatchingError {
                signature: error.canonical.clone(),
                expected: error.selector_hex(),
                actual: hex::encode_prefixed(selector),
            }
            .into());
        }
        decode_parameters(&error.canonical, sorted(&error.inputs), &data[SELECTOR_LEN..])
    }

    /// Decode the built-in `Error(string)` and `Panic(uint256)` revert payloads
    pub fn decode_revert_reason(data: &[u8]) -> Option<RevertReason> {
        if data.len() < SELECTOR_LEN {
            return None;
        }
        let (selector, body) = data.split_at(SELECTOR_LEN);
        if selector == ERROR_STRING_SELECTOR {
            match DynSolType::Tuple(vec![DynSolType::String]).abi_decode_params(body) {
                Ok(DynSolValue::Tuple(mut values)) => match values.pop() {
                    Some(DynSolValue::String(message)) => Some(RevertReason::Message(message)),
                    _ => None,
                },
                _ => None,
            }
        } else if selector == PANIC_SELECTOR {
            match DynSolType::Tuple(vec![DynSolType::Uint(256)]).abi_decode_params(body) {
                Ok(DynSolValue::Tuple(mut values)) => match values.pop() {
                    Some(DynSolValue::Uint(code, _)) => Some(RevertReason::Panic(code)),
                    _ => None,
                },
                _ => None,
            }
        } else {
            None
        }
    }

    /// Decode revert data, falling back to custom errors known to `registry`
    pub fn decode_revert(registry: &SignatureRegistry, data: &[u8]) -> Option<RevertReason> {
        if let Some(reason) = Self::decode_revert_reason(data) {
            return Some(reason);
        }
        let selector: [u8; 4] = data.get(..SELECTOR_LEN)?.try_into().ok()?;
        let error = registry.error(selector)?;
        match Self::decode_custom_error(data, error) {
            Ok(arguments) => Some(RevertReason::Custom {
                error: error.clone(),
                arguments,
            }),
            Err(err) => {
                trace!(error = %error.canonical, %err, "revert data does not decode as custom error");
                None
            }
        }
    }

    /// Whether `data` begins with `selector`; both are boundary hex strings
    pub fn is_data_for_signature(selector: &str, data: &str) -> bool {
        hex::strip_prefix(selector).len() == SELECTOR_LEN * 2
            && hex::starts_with_ignore_case(data, selector)
    }

    /// Whether `data` was produced for `function`
    pub fn is_call_to(function: &FunctionSignature, data: &[u8]) -> bool {
        data.len() >= SELECTOR_LEN && data[..SELECTOR_LEN] == function.selector
    }

    /// Look the selector up in `registry` and decode the call data
    ///
    /// Returns `Ok(None)` for unknown selectors.
    pub fn decode_calldata(registry: &SignatureRegistry, data: &[u8]) -> Result<Option<DecodedCall>> {
        let Some(selector) = data.get(..SELECTOR_LEN) else {
            return Err(DecodeError::DataTooShort {
                signature: "<unknown>".to_string(),
                expected: SELECTOR_LEN,
                actual: data.len(),
            }
            .into());
        };
        let mut key = [0u8; 4];
        key.copy_from_slice(selector);
        match registry.function(key) {
            Some(function) => {
                let arguments = Self::decode_input(function, data)?;
                Ok(Some(DecodedCall {
                    function: function.clone(),
                    arguments,
                }))
            }
            None => Ok(None),
        }
    }
}

/// Selector of a canonical function or error signature, as boundary hex
pub fn selector_hex(canonical: &str) -> String {
    hex::encode_prefixed(selector_of(canonical))
}

/// Head/tail encode `args` (declaration order at every level) in encoding order
pub(crate) fn encode_arguments(
    signature: &str,
    params: &[Parameter],
    args: &[DynSolValue],
) -> Result<Vec<u8>> {
    if params.len() != args.len() {
        return Err(ConfigurationError::ArgumentMismatch {
            signature: signature.to_string(),
            reason: format!("expected {} arguments, got {}", params.len(), args.len()),
        }
        .into());
    }

    let mut ordered = Vec::with_capacity(args.len());
    for idx in encoding_positions(params) {
        let param = &params[idx];
        let ty = param.sol_type()?;
        let value = param.to_encoding_order(&args[idx]);
        if !value.matches(&ty) {
            return Err(ConfigurationError::ArgumentMismatch {
                signature: signature.to_string(),
                reason: format!(
                    "argument `{}` is not a `{}`",
                    param.display_name(idx),
                    ty.sol_type_name()
                ),
            }
            .into());
        }
        ordered.push(value);
    }

    Ok(DynSolValue::Tuple(ordered).abi_encode_params())
}

/// Decode `data` against already ordered parameters
pub(crate) fn decode_parameters(
    signature: &str,
    params: Vec<&Parameter>,
    data: &[u8],
) -> Result<ParameterOutputs> {
    if params.is_empty() {
        return Ok(ParameterOutputs::default());
    }

    let types = params
        .iter()
        .map(|param| param.sol_type())
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let head: usize = types.iter().map(head_size).sum();
    if data.len() < head {
        return Err(DecodeError::DataTooShort {
            signature: signature.to_string(),
            expected: head,
            actual: data.len(),
        }
        .into());
    }

    let decoded = DynSolType::Tuple(types)
        .abi_decode_params(data)
        .map_err(|e| DecodeError::Abi {
            signature: signature.to_string(),
            reason: e.to_string(),
        })?;

    let values = match decoded {
        DynSolValue::Tuple(values) => values,
        other => vec![other],
    };
    if values.len() != params.len() {
        return Err(DecodeError::FieldCountMismatch {
            signature: signature.to_string(),
            expected: params.len(),
            actual: values.len(),
        }
        .into());
    }

    Ok(ParameterOutputs::from_ordered(params, values))
}

fn ensure_selector(signature: &str, data: &[u8]) -> Result<()> {
    if data.len() < SELECTOR_LEN {
        return Err(DecodeError::DataTooShort {
            signature: signature.to_string(),
            expected: SELECTOR_LEN,
            actual: data.len(),
        }
        .into());
    }
    Ok(())
}

/// Bytes a type occupies in the head of an encoding
fn head_size(ty: &DynSolType) -> usize {
    if ty.is_dynamic() {
        return WORD;
    }
    match ty {
        DynSolType::Tuple(types) => types.iter().map(head_size).sum(),
        DynSolType::FixedArray(inner, len) => head_size(inner) * len,
        _ => WORD,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, Address};

    fn transfer() -> FunctionSignature {
        FunctionSignature::new(
            "transfer",
            vec![
                Parameter::new("to", "address", 1),
                Parameter::new("amount", "uint256", 2),
            ],
            vec![Parameter::new("", "bool", 1)],
        )
        .unwrap()
    }

    const RECIPIENT: Address = address!("1111111111111111111111111111111111111111");

    #[test]
    fn test_encode_transfer() {
        let data = CallCodec::encode_call(
            &transfer(),
            &[
                DynSolValue::Address(RECIPIENT),
                DynSolValue::Uint(U256::from(1000u64), 256),
            ],
        )
        .unwrap();
        assert_eq!(data.len(), 4 + 64);
        assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(&data[16..36], RECIPIENT.as_slice());
        assert_eq!(data[67], 0xe8);
        assert_eq!(data[66], 0x03);
    }

    #[test]
    fn test_zero_argument_call_is_selector() {
        let total_supply = FunctionSignature::new("totalSupply", vec![], vec![]).unwrap();
        let hex = CallCodec::encode_call_hex(&total_supply, &[]).unwrap();
        assert_eq!(hex, "0x18160ddd");
    }

    #[test]
    fn test_explicit_order_wins() {
        // declared (amount, to) but encoded (to, amount)
        let reordered = FunctionSignature::new(
            "transfer",
            vec![
                Parameter::new("amount", "uint256", 2),
                Parameter::new("to", "address", 1),
            ],
            vec![],
        )
        .unwrap();
        let args = [
            DynSolValue::Uint(U256::from(1000u64), 256),
            DynSolValue::Address(RECIPIENT),
        ];
        let data = CallCodec::encode_call(&reordered, &args).unwrap();
        let expected = CallCodec::encode_call(&transfer(), &[args[1].clone(), args[0].clone()])
            .unwrap();
        assert_eq!(data, expected);

        let decoded = CallCodec::decode_input(&reordered, &data).unwrap();
        assert_eq!(decoded.0[0].parameter.name, "to");
        assert_eq!(decoded.uint("amount").unwrap(), U256::from(1000u64));
    }

    #[test]
    fn test_argument_mismatch() {
        let err = CallCodec::encode_call(&transfer(), &[DynSolValue::Address(RECIPIENT)])
            .unwrap_err();
        assert_eq!(err.reason(), "ArgumentMismatch");

        let err = CallCodec::encode_call(
            &transfer(),
            &[DynSolValue::Bool(true), DynSolValue::Uint(U256::ZERO, 256)],
        )
        .unwrap_err();
        assert_eq!(err.reason(), "ArgumentMismatch");
        assert!(err.to_string().contains("transfer(address,uint256)"));
    }

    #[test]
    fn test_decode_input_short_and_mismatched() {
        let err = CallCodec::decode_input(&transfer(), &[0xa9, 0x05]).unwrap_err();
        assert_eq!(err.reason(), "DataTooShort");

        let err = CallCodec::decode_input(&transfer(), &[0xde, 0xad, 0xbe, 0xef]).unwrap_err();
        assert_eq!(err.reason(), "SelectorMismatch");
    }

    #[test]
    fn test_decode_return() {
        let mut word = [0u8; 32];
        word[31] = 1;
        let outputs = CallCodec::decode_return(&transfer(), &word).unwrap();
        assert_eq!(outputs.len(), 1);
        assert!(outputs.0[0].value.as_bool().unwrap());

        let err = CallCodec::decode_return(&transfer(), &word[..8]).unwrap_err();
        assert_eq!(err.reason(), "DataTooShort");
    }

    #[test]
    fn test_revert_reason() {
        let mut data = ERROR_STRING_SELECTOR.to_vec();
        data.extend(DynSolValue::Tuple(vec![DynSolValue::String("nope".into())]).abi_encode_params());
        assert_eq!(
            CallCodec::decode_revert_reason(&data),
            Some(RevertReason::Message("nope".into()))
        );

        let mut data = PANIC_SELECTOR.to_vec();
        data.extend(DynSolValue::Uint(U256::from(0x11u64), 256).abi_encode());
        let reason = CallCodec::decode_revert_reason(&data).unwrap();
        assert_eq!(reason, RevertReason::Panic(U256::from(0x11u64)));
        assert!(reason.to_string().contains("overflow"));

        assert!(CallCodec::decode_revert_reason(&[0xde, 0xad]).is_none());
    }

    #[test]
    fn test_is_data_for_signature() {
        assert!(CallCodec::is_data_for_signature("0xA9059CBB", "0xa9059cbb0000"));
        assert!(!CallCodec::is_data_for_signature("0xa9059c", "0xa9059cbb"));
        assert!(!CallCodec::is_data_for_signature("0x095ea7b3", "0xa9059cbb"));
        assert_eq!(selector_hex("approve(address,uint256)"), "0x095ea7b3");
    }

    #[test]
    fn test_deployment_without_constructor() {
        let data = CallCodec::encode_deployment(&[0x60, 0x80], None, &[]).unwrap();
        assert_eq!(data.as_ref(), &[0x60, 0x80]);
        let err = CallCodec::encode_deployment(&[0x60], None, &[DynSolValue::Bool(true)])
            .unwrap_err();
        assert_eq!(err.reason(), "ArgumentMismatch");
    }
}
