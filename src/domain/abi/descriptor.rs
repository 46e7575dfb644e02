//! Contract descriptors: the functions, events and errors of one contract
//!
//! A descriptor is built once from a JSON ABI, a human-readable ABI or a set
//! of declared message kinds. All three sources normalize into the same
//! [`Parameter`](super::Parameter) and signature shapes.

use std::sync::Arc;

use alloy_json_abi::JsonAbi;

use super::catalog::{CatalogEntry, TypeCatalog};
use super::message::MessageKind;
use super::param::Parameter;
use super::signature::{ConstructorSignature, ErrorSignature, EventSignature, FunctionSignature};
use crate::domain::hex;
use crate::error::{ConfigurationError, Result};

/// The signature set of one contract
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractDescriptor {
    pub functions: Vec<Arc<FunctionSignature>>,
    pub events: Vec<Arc<EventSignature>>,
    pub errors: Vec<Arc<ErrorSignature>>,
    pub constructor: Option<ConstructorSignature>,
}

impl ContractDescriptor {
    /// Create a new empty descriptor
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON ABI, either a raw array or an artifact with an "abi" field
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| ConfigurationError::InvalidAbi(e.to_string()))?;

        let abi_value = if value.is_array() {
            value
        } else if let Some(abi) = value.get("abi") {
            abi.clone()
        } else {
            return Err(ConfigurationError::InvalidAbi("no ABI array found".to_string()).into());
        };

        let abi: JsonAbi = serde_json::from_value(abi_value)
            .map_err(|e| ConfigurationError::InvalidAbi(e.to_string()))?;
        Self::from_json_abi(&abi)
    }

    /// Parse human-readable signatures such as
    /// `"function transfer(address to, uint256 amount) returns (bool)"`
    pub fn from_human_readable<'a>(signatures: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let abi = JsonAbi::parse(signatures)
            .map_err(|e| ConfigurationError::InvalidAbi(e.to_string()))?;
        Self::from_json_abi(&abi)
    }

    /// Normalize an already parsed ABI document
    pub fn from_json_abi(abi: &JsonAbi) -> Result<Self> {
        let mut descriptor = Self::new();

        for function in abi.functions() {
            let inputs = json_params(&function.inputs);
            let outputs = json_params(&function.outputs);
            descriptor
                .functions
                .push(Arc::new(FunctionSignature::new(&function.name, inputs, outputs)?));
        }

        for event in abi.events() {
            let inputs = event
                .inputs
                .iter()
                .enumerate()
                .map(|(idx, param)| Parameter::from_event_param(param, idx))
                .collect();
            descriptor
                .events
                .push(Arc::new(EventSignature::new(&event.name, inputs, event.anonymous)?));
        }

        for error in abi.errors() {
            let inputs = json_params(&error.inputs);
            descriptor
                .errors
                .push(Arc::new(ErrorSignature::new(&error.name, inputs)?));
        }

        descriptor.constructor = abi.constructor.as_ref().map(|constructor| ConstructorSignature {
            inputs: json_params(&constructor.inputs),
        });

        Ok(descriptor)
    }

    /// Add a declared message kind, resolved through the catalog
    pub fn with_message<M: MessageKind>(mut self, catalog: &TypeCatalog) -> Result<Self> {
        match catalog.register_or_get::<M>()? {
            CatalogEntry::Function(function) => self.functions.push(function),
            CatalogEntry::Event(event) => self.events.push(event),
            CatalogEntry::Error(error) => self.errors.push(error),
        }
        Ok(self)
    }

    /// Find a function by name, canonical signature or `0x` selector
    pub fn function(&self, id: &str) -> Option<&Arc<FunctionSignature>> {
        let id = id.trim();
        if is_hex_of_len(id, 4) {
            return self
                .functions
                .iter()
                .find(|f| hex::eq_ignore_case(&f.selector_hex(), id));
        }
        self.functions
            .iter()
            .find(|f| f.canonical == id)
            .or_else(|| self.functions.iter().find(|f| f.name == id))
    }

    /// Find an event by name, canonical signature or `0x` topic hash
    pub fn event(&self, id: &str) -> Option<&Arc<EventSignature>> {
        let id = id.trim();
        if is_hex_of_len(id, 32) {
            return self
                .events
                .iter()
                .find(|e| hex::eq_ignore_case(&e.topic_hex(), id));
        }
        self.events
            .iter()
            .find(|e| e.canonical == id)
            .or_else(|| self.events.iter().find(|e| e.name == id))
    }

    /// Find a custom error by name, canonical signature or `0x` selector
    pub fn error(&self, id: &str) -> Option<&Arc<ErrorSignature>> {
        let id = id.trim();
        if is_hex_of_len(id, 4) {
            return self
                .errors
                .iter()
                .find(|e| hex::eq_ignore_case(&e.selector_hex(), id));
        }
        self.errors
            .iter()
            .find(|e| e.canonical == id)
            .or_else(|| self.errors.iter().find(|e| e.name == id))
    }
}

fn json_params(params: &[alloy_json_abi::Param]) -> Vec<Parameter> {
    params
        .iter()
        .enumerate()
        .map(|(idx, param)| Parameter::from_json_param(param, idx))
        .collect()
}

fn is_hex_of_len(id: &str, bytes: usize) -> bool {
    let has_marker = id.starts_with("0x") || id.starts_with("0X");
    let payload = hex::strip_prefix(id);
    has_marker && payload.len() == bytes * 2 && payload.chars().all(|c| c.is_ascii_hexdigit())
}
