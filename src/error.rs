//! Error taxonomy shared by every codec component

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level error, one variant per failure category
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    TypeGraph(#[from] TypeGraphError),
}

/// Malformed or unregistrable message kinds and ABI descriptions
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("invalid descriptor `{name}`: {reason}")]
    InvalidDescriptor { name: String, reason: String },

    #[error("invalid type `{ty}` for parameter `{param}`: {reason}")]
    InvalidType { param: String, ty: String, reason: String },

    #[error("invalid ABI description: {0}")]
    InvalidAbi(String),

    #[error("argument mismatch for `{signature}`: {reason}")]
    ArgumentMismatch { signature: String, reason: String },

    #[error("invalid hex value `{value}`")]
    InvalidHex { value: String },
}

/// A function, event or error that is absent from a descriptor
#[derive(Debug, Error)]
pub enum NotFoundError {
    #[error("function `{0}` not found")]
    Function(String),
    #[error("event `{0}` not found")]
    Event(String),
    #[error("error `{0}` not found")]
    Error(String),
}

/// Undersized data, selector mismatch or malformed payloads
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("data too short for `{signature}`: need at least {expected} bytes, got {actual}")]
    DataTooShort { signature: String, expected: usize, actual: usize },

    #[error("data selector {actual} does not match function `{signature}` ({expected})")]
    SelectorMismatch { signature: String, expected: String, actual: String },

    #[error("data selector {actual} does not match error `{signature}` ({expected})")]
    NotMatchingError { signature: String, expected: String, actual: String },

    #[error("log does not match event `{signature}` (topic {expected})")]
    NotMatchingEvent { signature: String, expected: String },

    #[error("expected {expected} indexed topics for `{signature}`, got {actual}")]
    FieldCountMismatch { signature: String, expected: usize, actual: usize },

    #[error("failed to decode `{signature}`: {reason}")]
    Abi { signature: String, reason: String },

    #[error("output `{name}` missing or of unexpected type")]
    Output { name: String },
}

/// Failures while resolving or walking an EIP-712 type graph
#[derive(Debug, Error)]
pub enum TypeGraphError {
    #[error("unknown type `{0}`")]
    UnknownType(String),

    #[error("struct `{type_name}` declares {expected} members but {actual} values were supplied")]
    MemberCountMismatch { type_name: String, expected: usize, actual: usize },

    #[error("member `{member}` of `{type_name}` is missing")]
    MissingMember { type_name: String, member: String },

    #[error("value does not match type `{type_name}`")]
    ValueMismatch { type_name: String },

    #[error("array type `{type_name}` expects {expected} elements, got {actual}")]
    ArrayLengthMismatch { type_name: String, expected: usize, actual: usize },

    #[error("unsupported leaf type `{0}`")]
    UnsupportedLeafType(String),

    #[error("path {path:?} cannot be resolved at step {step}")]
    InvalidPath { path: Vec<u32>, step: usize },

    #[error("invalid typed data document: {0}")]
    InvalidDocument(String),
}

impl Error {
    /// Short reason tag, stable across message wording changes
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Configuration(err) => match err {
                ConfigurationError::InvalidDescriptor { .. } => "InvalidDescriptor",
                ConfigurationError::InvalidType { .. } => "InvalidType",
                ConfigurationError::InvalidAbi(_) => "InvalidAbi",
                ConfigurationError::ArgumentMismatch { .. } => "ArgumentMismatch",
                ConfigurationError::InvalidHex { .. } => "InvalidHex",
            },
            Self::NotFound(_) => "NotFound",
            Self::Decode(err) => match err {
                DecodeError::DataTooShort { .. } => "DataTooShort",
                DecodeError::SelectorMismatch { .. } => "SelectorMismatch",
                DecodeError::NotMatchingError { .. } => "NotMatchingError",
                DecodeError::NotMatchingEvent { .. } => "NotMatchingEvent",
                DecodeError::FieldCountMismatch { .. } => "FieldCountMismatch",
                DecodeError::Abi { .. } => "Abi",
                DecodeError::Output { .. } => "Output",
            },
            Self::TypeGraph(err) => match err {
                TypeGraphError::UnknownType(_) => "UnknownType",
                TypeGraphError::MemberCountMismatch { .. } => "MemberCountMismatch",
                TypeGraphError::MissingMember { .. } => "MissingMember",
                TypeGraphError::ValueMismatch { .. } => "ValueMismatch",
                TypeGraphError::ArrayLengthMismatch { .. } => "ArrayLengthMismatch",
                TypeGraphError::UnsupportedLeafType(_) => "UnsupportedLeafType",
                TypeGraphError::InvalidPath { .. } => "InvalidPath",
                TypeGraphError::InvalidDocument(_) => "InvalidDocument",
            },
        }
    }
}
