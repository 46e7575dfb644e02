//! Parameter model shared by functions, events and errors

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_json_abi::{EventParam, InternalType, Param};
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// A single function, event or error parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name (may be empty)
    pub name: String,
    /// Encoding position; ties fall back to declaration position
    pub order: u32,
    /// Solidity type as declared (e.g. "uint256", "tuple[]")
    pub kind: String,
    /// Whether the parameter is stored in a log topic (events only)
    #[serde(default)]
    pub indexed: bool,
    /// Tuple members when `kind` starts with "tuple"
    #[serde(default)]
    pub components: Vec<Parameter>,
    /// Struct name behind a tuple, when known
    #[serde(default)]
    pub struct_name: Option<String>,
}

impl Parameter {
    /// Create a parameter with an explicit encoding order
    pub fn new(name: impl Into<String>, kind: impl Into<String>, order: u32) -> Self {
        Self {
            name: name.into(),
            order,
            kind: kind.into(),
            indexed: false,
            components: Vec::new(),
            struct_name: None,
        }
    }

    /// Mark the parameter as indexed
    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    /// Attach tuple components
    pub fn with_components(mut self, components: Vec<Parameter>) -> Self {
        self.components = components;
        self
    }

    /// Attach the struct name behind a tuple
    pub fn with_struct_name(mut self, name: impl Into<String>) -> Self {
        self.struct_name = Some(name.into());
        self
    }

    /// Canonical type string with tuples expanded, e.g. "(uint256,address)[]"
    pub fn canonical_type(&self) -> Result<String, ConfigurationError> {
        let kind = self.kind.trim();
        if kind.is_empty() {
            return Err(self.invalid_type("empty type"));
        }

        let canonical = if let Some(suffix) = kind.strip_prefix("tuple") {
            if !suffix.is_empty() && !suffix.starts_with('[') {
                return Err(self.invalid_type("unexpected characters after `tuple`"));
            }
            if self.components.is_empty() {
                return Err(self.invalid_type("tuple without components"));
            }
            format!("({}){}", canonical_list(&self.components)?, suffix)
        } else {
            let (base, suffix) = match kind.find('[') {
                Some(pos) => kind.split_at(pos),
                None => (kind, ""),
            };
            let base = match base {
                "uint" => "uint256",
                "int" => "int256",
                "byte" => "bytes1",
                other => other,
            };
            format!("{base}{suffix}")
        };

        DynSolType::parse(&canonical).map_err(|e| self.invalid_type(&e.to_string()))?;
        Ok(canonical)
    }

    /// Resolve the parameter to a dynamic ABI type
    pub fn sol_type(&self) -> Result<DynSolType, ConfigurationError> {
        let canonical = self.canonical_type()?;
        DynSolType::parse(&canonical).map_err(|e| self.invalid_type(&e.to_string()))
    }

    /// Rearrange a value given in declaration order into encoding order
    ///
    /// Tuple values are permuted by their components' order, recursively, and
    /// every element of a tuple array is permuted the same way.
    pub fn to_encoding_order(&self, value: &DynSolValue) -> DynSolValue {
        if self.components.is_empty() {
            return value.clone();
        }
        match value {
            DynSolValue::Tuple(values) if values.len() == self.components.len() => {
                DynSolValue::Tuple(
                    encoding_positions(&self.components)
                        .into_iter()
                        .map(|idx| self.components[idx].to_encoding_order(&values[idx]))
                        .collect(),
                )
            }
            DynSolValue::Array(items) => {
                DynSolValue::Array(items.iter().map(|item| self.to_encoding_order(item)).collect())
            }
            DynSolValue::FixedArray(items) => DynSolValue::FixedArray(
                items.iter().map(|item| self.to_encoding_order(item)).collect(),
            ),
            other => other.clone(),
        }
    }

    /// Display name, falling back to `arg{position}` for unnamed parameters
    pub fn display_name(&self, position: usize) -> String {
        if self.name.trim().is_empty() {
            format!("arg{position}")
        } else {
            self.name.clone()
        }
    }

    /// Build from a JSON ABI function/error parameter at a declaration position
    pub fn from_json_param(param: &Param, position: usize) -> Self {
        Self {
            name: param.name.clone(),
            order: position as u32 + 1,
            kind: param.ty.clone(),
            indexed: false,
            components: json_components(&param.components),
            struct_name: struct_name(param.internal_type.as_ref()),
        }
    }

    /// Build from a JSON ABI event parameter at a declaration position
    pub fn from_event_param(param: &EventParam, position: usize) -> Self {
        Self {
            name: param.name.clone(),
            order: position as u32 + 1,
            kind: param.ty.clone(),
            indexed: param.indexed,
            components: json_components(&param.components),
            struct_name: struct_name(param.internal_type.as_ref()),
        }
    }

    fn invalid_type(&self, reason: &str) -> ConfigurationError {
        ConfigurationError::InvalidType {
            param: self.name.clone(),
            ty: self.kind.clone(),
            reason: reason.to_string(),
        }
    }
}

fn json_components(components: &[Param]) -> Vec<Parameter> {
    components
        .iter()
        .enumerate()
        .map(|(idx, component)| Parameter::from_json_param(component, idx))
        .collect()
}

fn struct_name(internal_type: Option<&InternalType>) -> Option<String> {
    match internal_type {
        Some(InternalType::Struct { ty, .. }) => {
            // "Pool.Key[]" -> "Key"
            let base = ty.split('[').next().unwrap_or(ty);
            Some(base.rsplit('.').next().unwrap_or(base).to_string())
        }
        _ => None,
    }
}

/// Parameters sorted by explicit order, declaration position breaking ties
pub fn sorted(params: &[Parameter]) -> Vec<&Parameter> {
    let mut ordered: Vec<&Parameter> = params.iter().collect();
    // `sort_by_key` is stable, so equal orders keep declaration position
    ordered.sort_by_key(|param| param.order);
    ordered
}

/// Declaration indices in encoding order
pub fn encoding_positions(params: &[Parameter]) -> Vec<usize> {
    let mut positions: Vec<usize> = (0..params.len()).collect();
    positions.sort_by_key(|&idx| params[idx].order);
    positions
}

/// Comma-separated canonical types in encoding order
pub fn canonical_list(params: &[Parameter]) -> Result<String, ConfigurationError> {
    let types = sorted(params)
        .into_iter()
        .map(Parameter::canonical_type)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(types.join(","))
}
