//! Decoded values and the conversions out of them

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use super::param::{sorted, Parameter};
use crate::domain::hex;
use crate::error::{DecodeError, Result};

/// A decoded parameter rendered for display or serialization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedArg {
    /// Parameter name (or "arg{n}" if unnamed)
    pub name: String,
    /// Canonical type (e.g., "address", "(uint256,address)")
    pub kind: String,
    /// Decoded value as a formatted string
    pub value: String,
}

/// One decoded parameter with the typed value
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterOutput {
    pub parameter: Parameter,
    pub value: DynSolValue,
}

/// Decoded parameters in encoding order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterOutputs(pub Vec<ParameterOutput>);

impl ParameterOutputs {
    /// Pair ordered parameters with their decoded values
    pub fn from_ordered(params: Vec<&Parameter>, values: Vec<DynSolValue>) -> Self {
        Self(
            params
                .into_iter()
                .zip(values)
                .map(|(parameter, value)| ParameterOutput {
                    parameter: parameter.clone(),
                    value,
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParameterOutput> {
        self.0.iter()
    }

    /// Look up a value by parameter name
    pub fn get(&self, name: &str) -> Option<&DynSolValue> {
        self.0
            .iter()
            .find(|output| output.parameter.name == name)
            .map(|output| &output.value)
    }

    /// Look up a value by parameter name, failing when absent
    pub fn require(&self, name: &str) -> Result<&DynSolValue> {
        self.get(name).ok_or_else(|| output_error(name))
    }

    /// Values in encoding order
    pub fn into_values(self) -> Vec<DynSolValue> {
        self.0.into_iter().map(|output| output.value).collect()
    }

    pub fn uint(&self, name: &str) -> Result<U256> {
        match self.require(name)? {
            DynSolValue::Uint(value, _) => Ok(*value),
            _ => Err(output_error(name)),
        }
    }

    pub fn address(&self, name: &str) -> Result<Address> {
        match self.require(name)? {
            DynSolValue::Address(value) => Ok(*value),
            _ => Err(output_error(name)),
        }
    }

    pub fn boolean(&self, name: &str) -> Result<bool> {
        match self.require(name)? {
            DynSolValue::Bool(value) => Ok(*value),
            _ => Err(output_error(name)),
        }
    }

    pub fn string(&self, name: &str) -> Result<String> {
        match self.require(name)? {
            DynSolValue::String(value) => Ok(value.clone()),
            _ => Err(output_error(name)),
        }
    }

    pub fn bytes(&self, name: &str) -> Result<Vec<u8>> {
        match self.require(name)? {
            DynSolValue::Bytes(value) => Ok(value.clone()),
            DynSolValue::FixedBytes(word, size) => Ok(word[..*size].to_vec()),
            _ => Err(output_error(name)),
        }
    }

    pub fn word(&self, name: &str) -> Result<B256> {
        match self.require(name)? {
            DynSolValue::FixedBytes(word, 32) => Ok(*word),
            _ => Err(output_error(name)),
        }
    }

    /// View a tuple output through its components
    pub fn nested(&self, name: &str) -> Result<ParameterOutputs> {
        let output = self
            .0
            .iter()
            .find(|output| output.parameter.name == name)
            .ok_or_else(|| output_error(name))?;
        match &output.value {
            DynSolValue::Tuple(values) => Ok(nested_outputs(&output.parameter, values.clone())),
            _ => Err(output_error(name)),
        }
    }

    /// View a tuple-array output as one set of outputs per element
    pub fn nested_list(&self, name: &str) -> Result<Vec<ParameterOutputs>> {
        let output = self
            .0
            .iter()
            .find(|output| output.parameter.name == name)
            .ok_or_else(|| output_error(name))?;
        let elements = match &output.value {
            DynSolValue::Array(elements) | DynSolValue::FixedArray(elements) => elements,
            _ => return Err(output_error(name)),
        };
        elements
            .iter()
            .map(|element| match element {
                DynSolValue::Tuple(values) => Ok(nested_outputs(&output.parameter, values.clone())),
                _ => Err(output_error(name)),
            })
            .collect()
    }

    /// Render every output for display
    pub fn to_args(&self) -> Vec<DecodedArg> {
        self.0
            .iter()
            .enumerate()
            .map(|(idx, output)| DecodedArg {
                name: output.parameter.display_name(idx),
                kind: output
                    .parameter
                    .canonical_type()
                    .unwrap_or_else(|_| output.parameter.kind.clone()),
                value: format_value(&output.value),
            })
            .collect()
    }
}

fn nested_outputs(parent: &Parameter, values: Vec<DynSolValue>) -> ParameterOutputs {
    ParameterOutputs::from_ordered(sorted(&parent.components), values)
}

fn output_error(name: &str) -> crate::Error {
    DecodeError::Output {
        name: name.to_string(),
    }
    .into()
}

/// Caller-described shape that decoded outputs convert into
pub trait FromParameterOutputs: Sized {
    fn from_outputs(outputs: ParameterOutputs) -> Result<Self>;
}

impl FromParameterOutputs for ParameterOutputs {
    fn from_outputs(outputs: ParameterOutputs) -> Result<Self> {
        Ok(outputs)
    }
}

impl FromParameterOutputs for Vec<DynSolValue> {
    fn from_outputs(outputs: ParameterOutputs) -> Result<Self> {
        Ok(outputs.into_values())
    }
}

/// Format a DynSolValue for display
pub fn format_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Int(i, _) => i.to_string(),
        DynSolValue::Uint(u, _) => u.to_string(),
        DynSolValue::FixedBytes(word, size) => {
            let bytes = &word.as_slice()[..(*size).min(32)];
            hex::encode_prefixed(bytes)
        }
        DynSolValue::Address(addr) => addr.to_checksum(None),
        DynSolValue::Function(func) => hex::encode_prefixed(func.as_slice()),
        DynSolValue::Bytes(bytes) => hex::encode_prefixed(bytes),
        DynSolValue::String(s) => format!("\"{s}\""),
        DynSolValue::Array(arr) | DynSolValue::FixedArray(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            format!("[{}]", items.join(", "))
        }
        DynSolValue::Tuple(fields) => {
            let items: Vec<String> = fields.iter().map(format_value).collect();
            format!("({})", items.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outputs() -> ParameterOutputs {
        let params = [
            Parameter::new("owner", "address", 1),
            Parameter::new("position", "tuple", 2).with_components(vec![
                Parameter::new("liquidity", "uint128", 1),
                Parameter::new("active", "bool", 2),
            ]),
            Parameter::new("", "string", 3),
        ];
        ParameterOutputs::from_ordered(
            params.iter().collect(),
            vec![
                DynSolValue::Address(Address::repeat_byte(0x11)),
                DynSolValue::Tuple(vec![
                    DynSolValue::Uint(U256::from(7u64), 128),
                    DynSolValue::Bool(true),
                ]),
                DynSolValue::String("ok".into()),
            ],
        )
    }

    #[test]
    fn test_named_access() {
        let outputs = outputs();
        assert_eq!(outputs.address("owner").unwrap(), Address::repeat_byte(0x11));
        assert!(outputs.uint("owner").is_err());
        assert!(outputs.get("missing").is_none());
    }

    #[test]
    fn test_nested_tuple() {
        let position = outputs().nested("position").unwrap();
        assert_eq!(position.uint("liquidity").unwrap(), U256::from(7u64));
        assert!(position.boolean("active").unwrap());
    }

    #[test]
    fn test_to_args() {
        let args = outputs().to_args();
        assert_eq!(args[1].kind, "(uint128,bool)");
        assert_eq!(args[1].value, "(7, true)");
        assert_eq!(args[2].name, "arg2");
        assert_eq!(args[2].value, "\"ok\"");
    }
}
