//! Signature registry - functions and errors by selector, events by topic

use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::B256;

use super::descriptor::ContractDescriptor;
use super::signature::{ErrorSignature, EventSignature, FunctionSignature};
use crate::domain::hex;

/// Registry of signatures gathered from many descriptors
#[derive(Debug, Default, Clone)]
pub struct SignatureRegistry {
    functions: HashMap<[u8; 4], Arc<FunctionSignature>>,
    events: HashMap<B256, Arc<EventSignature>>,
    errors: HashMap<[u8; 4], Arc<ErrorSignature>>,
}

impl SignatureRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert every signature of a descriptor
    ///
    /// Note: First signature for a given selector or topic wins (no overwrite)
    pub fn insert_descriptor(&mut self, descriptor: &ContractDescriptor) {
        for function in &descriptor.functions {
            self.functions
                .entry(function.selector)
                .or_insert_with(|| function.clone());
        }
        for event in &descriptor.events {
            self.events.entry(event.topic).or_insert_with(|| event.clone());
        }
        for error in &descriptor.errors {
            self.errors.entry(error.selector).or_insert_with(|| error.clone());
        }
    }

    /// Look up a function by selector
    pub fn function(&self, selector: [u8; 4]) -> Option<&Arc<FunctionSignature>> {
        self.functions.get(&selector)
    }

    /// Look up a function by selector hex string (e.g., "0xa9059cbb")
    pub fn function_hex(&self, selector_hex: &str) -> Option<&Arc<FunctionSignature>> {
        self.function(parse_selector(selector_hex)?)
    }

    /// Look up an event by topic hash
    pub fn event(&self, topic: B256) -> Option<&Arc<EventSignature>> {
        self.events.get(&topic)
    }

    /// Look up a custom error by selector
    pub fn error(&self, selector: [u8; 4]) -> Option<&Arc<ErrorSignature>> {
        self.errors.get(&selector)
    }

    /// Look up a custom error by selector hex string
    pub fn error_hex(&self, selector_hex: &str) -> Option<&Arc<ErrorSignature>> {
        self.error(parse_selector(selector_hex)?)
    }

    /// Get the number of registered signatures of all kinds
    pub fn len(&self) -> usize {
        self.functions.len() + self.events.len() + self.errors.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Merge another registry into this one
    ///
    /// Signatures from the other registry are only added if their
    /// selector or topic is not already present (first wins).
    pub fn merge(&mut self, other: Self) {
        for (selector, function) in other.functions {
            self.functions.entry(selector).or_insert(function);
        }
        for (topic, event) in other.events {
            self.events.entry(topic).or_insert(event);
        }
        for (selector, error) in other.errors {
            self.errors.entry(selector).or_insert(error);
        }
    }

    /// Get all functions
    pub fn functions(&self) -> impl Iterator<Item = &Arc<FunctionSignature>> {
        self.functions.values()
    }

    /// Get all events
    pub fn events(&self) -> impl Iterator<Item = &Arc<EventSignature>> {
        self.events.values()
    }
}

fn parse_selector(selector_hex: &str) -> Option<[u8; 4]> {
    let normalized = hex::strip_prefix(selector_hex);
    if normalized.len() != 8 {
        return None;
    }
    hex::decode(normalized).ok()?.try_into().ok()
}
