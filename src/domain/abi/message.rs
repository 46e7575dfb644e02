//! Declarative message kinds
//!
//! A message kind is a Rust type that describes one function, event or error
//! of a contract. It supplies its metadata explicitly through [`MessageKind`]
//! and, when it carries argument values, lays them out through
//! [`EncodeArguments`].

use alloy_dyn_abi::DynSolValue;

use super::param::Parameter;

/// What a declared message kind describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageTag {
    Function,
    Event,
    Error,
}

/// Declarative metadata for a message kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDescription {
    pub tag: MessageTag,
    pub name: String,
    pub inputs: Vec<Parameter>,
    pub outputs: Vec<Parameter>,
    pub anonymous: bool,
}

impl MessageDescription {
    fn new(tag: MessageTag, name: impl Into<String>) -> Self {
        Self {
            tag,
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            anonymous: false,
        }
    }

    pub fn function(name: impl Into<String>) -> Self {
        Self::new(MessageTag::Function, name)
    }

    pub fn event(name: impl Into<String>) -> Self {
        Self::new(MessageTag::Event, name)
    }

    pub fn error(name: impl Into<String>) -> Self {
        Self::new(MessageTag::Error, name)
    }

    /// Append an input parameter
    pub fn input(mut self, param: Parameter) -> Self {
        self.inputs.push(param);
        self
    }

    /// Append an output parameter (functions only)
    pub fn output(mut self, param: Parameter) -> Self {
        self.outputs.push(param);
        self
    }

    /// Mark an event as anonymous
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }
}

/// A type that declares one function, event or error
pub trait MessageKind: 'static {
    fn describe() -> MessageDescription;
}

/// Argument values of a message, in parameter declaration order
pub trait EncodeArguments {
    fn arguments(&self) -> Vec<DynSolValue>;
}
