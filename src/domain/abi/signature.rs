//! Function, event and error signatures with their derived hashes

use alloy_primitives::{keccak256, B256};
use serde::{Deserialize, Serialize};

use super::param::{canonical_list, sorted, Parameter};
use crate::domain::hex;
use crate::error::ConfigurationError;

/// Compute the 4-byte selector of a canonical signature string
pub fn selector_of(canonical: &str) -> [u8; 4] {
    let hash = keccak256(canonical.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

fn ensure_name(name: &str) -> Result<(), ConfigurationError> {
    if name.trim().is_empty() {
        return Err(ConfigurationError::InvalidDescriptor {
            name: String::new(),
            reason: "missing name".to_string(),
        });
    }
    Ok(())
}

fn canonical(name: &str, inputs: &[Parameter]) -> Result<String, ConfigurationError> {
    ensure_name(name)?;
    canonical_list(inputs)
        .map(|list| format!("{name}({list})"))
        .map_err(|err| ConfigurationError::InvalidDescriptor {
            name: name.to_string(),
            reason: err.to_string(),
        })
}

/// A function signature with its metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    /// Function name
    pub name: String,
    /// Input parameters in declaration order
    pub inputs: Vec<Parameter>,
    /// Output parameters in declaration order
    pub outputs: Vec<Parameter>,
    /// Canonical signature string (e.g., "transfer(address,uint256)")
    pub canonical: String,
    /// 4-byte function selector
    pub selector: [u8; 4],
}

impl FunctionSignature {
    pub fn new(
        name: impl Into<String>,
        inputs: Vec<Parameter>,
        outputs: Vec<Parameter>,
    ) -> Result<Self, ConfigurationError> {
        let name = name.into();
        let canonical = canonical(&name, &inputs)?;
        // outputs never reach the canonical string but must still be valid types
        canonical_list(&outputs).map_err(|err| ConfigurationError::InvalidDescriptor {
            name: name.clone(),
            reason: err.to_string(),
        })?;
        let selector = selector_of(&canonical);
        Ok(Self {
            name,
            inputs,
            outputs,
            canonical,
            selector,
        })
    }

    /// Get selector as hex string
    pub fn selector_hex(&self) -> String {
        hex::encode_prefixed(self.selector)
    }

    /// Inputs in encoding order
    pub fn ordered_inputs(&self) -> Vec<&Parameter> {
        sorted(&self.inputs)
    }

    /// Outputs in encoding order
    pub fn ordered_outputs(&self) -> Vec<&Parameter> {
        sorted(&self.outputs)
    }
}

/// An event signature with its topic hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSignature {
    /// Event name
    pub name: String,
    /// Parameters in declaration order, indexed and non-indexed
    pub inputs: Vec<Parameter>,
    /// Anonymous events carry no topic 0
    #[serde(default)]
    pub anonymous: bool,
    /// Canonical signature string (e.g., "Transfer(address,address,uint256)")
    pub canonical: String,
    /// keccak256 of the canonical string
    pub topic: B256,
}

impl EventSignature {
    pub fn new(
        name: impl Into<String>,
        inputs: Vec<Parameter>,
        anonymous: bool,
    ) -> Result<Self, ConfigurationError> {
        let name = name.into();
        let canonical = canonical(&name, &inputs)?;
        let topic = keccak256(canonical.as_bytes());
        Ok(Self {
            name,
            inputs,
            anonymous,
            canonical,
            topic,
        })
    }

    /// Get topic hash as hex string
    pub fn topic_hex(&self) -> String {
        hex::encode_prefixed(self.topic)
    }

    /// Indexed parameters in encoding order
    pub fn indexed_inputs(&self) -> Vec<&Parameter> {
        sorted(&self.inputs).into_iter().filter(|p| p.indexed).collect()
    }

    /// Non-indexed parameters in encoding order
    pub fn data_inputs(&self) -> Vec<&Parameter> {
        sorted(&self.inputs).into_iter().filter(|p| !p.indexed).collect()
    }
}

/// A custom error signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSignature {
    /// Error name
    pub name: String,
    /// Parameters in declaration order
    pub inputs: Vec<Parameter>,
    /// Canonical signature string (e.g., "InsufficientBalance(uint256,uint256)")
    pub canonical: String,
    /// 4-byte error selector
    pub selector: [u8; 4],
}

impl ErrorSignature {
    pub fn new(name: impl Into<String>, inputs: Vec<Parameter>) -> Result<Self, ConfigurationError> {
        let name = name.into();
        let canonical = canonical(&name, &inputs)?;
        let selector = selector_of(&canonical);
        Ok(Self {
            name,
            inputs,
            canonical,
            selector,
        })
    }

    /// Get selector as hex string
    pub fn selector_hex(&self) -> String {
        hex::encode_prefixed(self.selector)
    }
}

/// Constructor parameters, used for deployment data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorSignature {
    pub inputs: Vec<Parameter>,
}
