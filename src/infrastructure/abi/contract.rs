//! A contract address bound to its descriptor

use std::sync::Arc;

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, Bytes, Log};

use super::call::{CallCodec, RevertReason};
use super::event::{BlockParameter, DecodedEvent, EventCodec, LogFilter};
use crate::domain::abi::{
    ContractDescriptor, EncodeArguments, ErrorSignature, EventSignature, FromParameterOutputs,
    FunctionSignature, MessageKind, ParameterOutputs, SignatureRegistry, TypeCatalog,
};
use crate::error::{NotFoundError, Result};

/// Contract address plus the signatures it understands
#[derive(Debug, Clone)]
pub struct ContractBinding {
    address: Address,
    descriptor: Arc<ContractDescriptor>,
}

impl ContractBinding {
    pub fn new(address: Address, descriptor: ContractDescriptor) -> Self {
        Self {
            address,
            descriptor: Arc::new(descriptor),
        }
    }

    /// Bind from a JSON ABI (raw array or artifact object)
    pub fn from_json(address: Address, abi: &str) -> Result<Self> {
        Ok(Self::new(address, ContractDescriptor::from_json(abi)?))
    }

    /// Bind from human-readable signatures
    pub fn from_human_readable<'a>(
        address: Address,
        signatures: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self> {
        Ok(Self::new(
            address,
            ContractDescriptor::from_human_readable(signatures)?,
        ))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn descriptor(&self) -> &ContractDescriptor {
        &self.descriptor
    }

    /// Function by name, canonical signature or `0x` selector
    pub fn function(&self, id: &str) -> Result<FunctionBinding> {
        let function = self
            .descriptor
            .function(id)
            .ok_or_else(|| NotFoundError::Function(id.to_string()))?;
        Ok(FunctionBinding {
            address: self.address,
            function: function.clone(),
        })
    }

    /// Event by name, canonical signature or `0x` topic hash
    pub fn event(&self, id: &str) -> Result<EventBinding> {
        let event = self
            .descriptor
            .event(id)
            .ok_or_else(|| NotFoundError::Event(id.to_string()))?;
        Ok(EventBinding {
            address: self.address,
            event: event.clone(),
        })
    }

    /// Custom error by name, canonical signature or `0x` selector
    pub fn error(&self, id: &str) -> Result<Arc<ErrorSignature>> {
        self.descriptor
            .error(id)
            .cloned()
            .ok_or_else(|| NotFoundError::Error(id.to_string()).into())
    }

    /// Function binding for a declared message kind
    pub fn function_for<M: MessageKind>(&self, catalog: &TypeCatalog) -> Result<FunctionBinding> {
        Ok(FunctionBinding {
            address: self.address,
            function: catalog.function::<M>()?,
        })
    }

    /// Event binding for a declared message kind
    pub fn event_for<M: MessageKind>(&self, catalog: &TypeCatalog) -> Result<EventBinding> {
        Ok(EventBinding {
            address: self.address,
            event: catalog.event::<M>()?,
        })
    }

    /// Encode a declared call in one step
    pub fn encode_message<M: MessageKind + EncodeArguments>(
        &self,
        catalog: &TypeCatalog,
        message: &M,
    ) -> Result<Bytes> {
        let function = catalog.function::<M>()?;
        CallCodec::encode_call(&function, &message.arguments())
    }

    /// Filter over every log of this contract, `earliest..latest` unless given
    pub fn default_filter(
        &self,
        from_block: Option<BlockParameter>,
        to_block: Option<BlockParameter>,
    ) -> LogFilter {
        LogFilter::default().with_address(self.address).with_blocks(
            from_block.unwrap_or(BlockParameter::Earliest),
            to_block.unwrap_or(BlockParameter::Latest),
        )
    }

    /// Creation data for this contract
    pub fn encode_deployment(&self, bytecode: &[u8], args: &[DynSolValue]) -> Result<Bytes> {
        CallCodec::encode_deployment(bytecode, self.descriptor.constructor.as_ref(), args)
    }

    /// Decode revert data using this contract's custom errors
    pub fn decode_revert(&self, data: &[u8]) -> Option<RevertReason> {
        let mut registry = SignatureRegistry::new();
        registry.insert_descriptor(&self.descriptor);
        CallCodec::decode_revert(&registry, data)
    }
}

/// One function of a bound contract
#[derive(Debug, Clone)]
pub struct FunctionBinding {
    address: Address,
    function: Arc<FunctionSignature>,
}

impl FunctionBinding {
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn signature(&self) -> &FunctionSignature {
        &self.function
    }

    pub fn encode(&self, args: &[DynSolValue]) -> Result<Bytes> {
        CallCodec::encode_call(&self.function, args)
    }

    pub fn encode_hex(&self, args: &[DynSolValue]) -> Result<String> {
        CallCodec::encode_call_hex(&self.function, args)
    }

    pub fn decode_input(&self, data: &[u8]) -> Result<ParameterOutputs> {
        CallCodec::decode_input(&self.function, data)
    }

    pub fn decode_return(&self, data: &[u8]) -> Result<ParameterOutputs> {
        CallCodec::decode_return(&self.function, data)
    }

    pub fn decode_return_as<T: FromParameterOutputs>(&self, data: &[u8]) -> Result<T> {
        CallCodec::decode_return_as(&self.function, data)
    }
}

/// One event of a bound contract
#[derive(Debug, Clone)]
pub struct EventBinding {
    address: Address,
    event: Arc<EventSignature>,
}

impl EventBinding {
    pub fn signature(&self) -> &EventSignature {
        &self.event
    }

    /// Address-scoped filter with per-indexed-parameter candidate values
    pub fn filter(&self, value_sets: &[Option<Vec<DynSolValue>>]) -> Result<LogFilter> {
        EventCodec::filter(&self.event, Some(self.address), value_sets)
    }

    /// [`EventBinding::filter`] restricted to a block range
    pub fn filter_between(
        &self,
        value_sets: &[Option<Vec<DynSolValue>>],
        from_block: Option<BlockParameter>,
        to_block: Option<BlockParameter>,
    ) -> Result<LogFilter> {
        Ok(self.filter(value_sets)?.with_blocks(
            from_block.unwrap_or(BlockParameter::Earliest),
            to_block.unwrap_or(BlockParameter::Latest),
        ))
    }

    pub fn matches_signature(&self, log: &Log) -> bool {
        EventCodec::matches_signature(&self.event, log)
    }

    pub fn matches_filter(&self, filter: &LogFilter) -> bool {
        EventCodec::matches_filter(&self.event, self.address, filter)
    }

    pub fn decode_log(&self, log: &Log) -> Result<DecodedEvent> {
        EventCodec::decode_log(&self.event, log)
    }

    pub fn decode_logs(&self, logs: &[Log]) -> Result<Vec<DecodedEvent>> {
        EventCodec::decode_logs(&self.event, logs)
    }

    pub fn decode_log_as<T: FromParameterOutputs>(&self, log: &Log) -> Result<T> {
        EventCodec::decode_log_as(&self.event, log)
    }
}
