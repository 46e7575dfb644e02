//! ABI domain models
//!
//! Parameters, signatures, declared message kinds and the catalog that
//! memoizes them, independent of the codec implementation.

mod catalog;
mod decoder;
mod descriptor;
mod message;
mod param;
mod registry;
mod signature;

pub use catalog::{CatalogEntry, TypeCatalog};
pub use decoder::{format_value, DecodedArg, FromParameterOutputs, ParameterOutput, ParameterOutputs};
pub use descriptor::ContractDescriptor;
pub use message::{EncodeArguments, MessageDescription, MessageKind, MessageTag};
pub use param::{canonical_list, encoding_positions, sorted, Parameter};
pub use registry::SignatureRegistry;
pub use signature::{
    selector_of, ConstructorSignature, ErrorSignature, EventSignature, FunctionSignature,
};
