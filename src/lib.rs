//! abikit - contract ABI call/event codec and EIP-712 structured data hashing
//!
//! The [`domain`] layer holds the parameter, signature and typed-data models.
//! The [`infrastructure`] layer implements the alloy-backed codecs on top of
//! them: [`CallCodec`], [`EventCodec`], [`ContractBinding`],
//! [`StructuredDataHasher`] and [`TypeGraphNavigator`].

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use domain::abi::{
    ContractDescriptor, EncodeArguments, ErrorSignature, EventSignature, FromParameterOutputs,
    FunctionSignature, MessageDescription, MessageKind, Parameter, ParameterOutputs,
    SignatureRegistry, TypeCatalog,
};
pub use domain::typed_data::{
    MemberDescription, MemberValue, TypeGraph, TypedData, TypedDataDomain,
};
pub use error::{
    ConfigurationError, DecodeError, Error, NotFoundError, Result, TypeGraphError,
};
pub use infrastructure::abi::{
    BlockParameter, CallCodec, ContractBinding, DecodedCall, DecodedEvent,
    EventBinding, EventCodec, FunctionBinding, LogFilter, RevertReason,
};
pub use infrastructure::eip712::{StructuredDataHasher, TypeGraphNavigator, TypedDataHashes};
