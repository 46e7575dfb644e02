//! Event log filters and log decoding
//!
//! Topic slot 0 carries the event topic hash (absent for anonymous events),
//! followed by one slot per indexed parameter in encoding order. Indexed
//! reference types (`string`, `bytes`, arrays, tuples) only survive as the
//! keccak256 of their encoding, so they decode back to that 32-byte hash.

use std::fmt;
use std::str::FromStr;

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{keccak256, Address, Log, B256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use super::call::decode_parameters;
use crate::domain::abi::{
    sorted, EventSignature, FromParameterOutputs, Parameter, ParameterOutput, ParameterOutputs,
    SignatureRegistry,
};
use crate::domain::hex;
use crate::error::{ConfigurationError, DecodeError, Result};

/// Block bound of a log filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockParameter {
    Earliest,
    Latest,
    Pending,
    Number(u64),
}

impl fmt::Display for BlockParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Earliest => f.write_str("earliest"),
            Self::Latest => f.write_str("latest"),
            Self::Pending => f.write_str("pending"),
            Self::Number(n) => write!(f, "0x{n:x}"),
        }
    }
}

impl FromStr for BlockParameter {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "earliest" => Ok(Self::Earliest),
            "latest" => Ok(Self::Latest),
            "pending" => Ok(Self::Pending),
            lower if lower.starts_with("0x") => u64::from_str_radix(&lower[2..], 16)
                .map(Self::Number)
                .map_err(|_| ConfigurationError::InvalidHex {
                    value: trimmed.to_string(),
                }),
            decimal => decimal
                .parse::<u64>()
                .map(Self::Number)
                .map_err(|_| ConfigurationError::InvalidHex {
                    value: trimmed.to_string(),
                }),
        }
    }
}

impl Serialize for BlockParameter {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for BlockParameter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Topic slots: `None` matches anything, `Some(set)` matches any member
pub type TopicSlots = Vec<Option<Vec<String>>>;

/// A log filter in the `eth_getLogs` request shape
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    /// Contract addresses, empty for any
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<String>,
    #[serde(default)]
    pub topics: TopicSlots,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_block: Option<BlockParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_block: Option<BlockParameter>,
}

impl LogFilter {
    /// Restrict the filter to one more address
    pub fn with_address(mut self, address: Address) -> Self {
        self.address.push(hex::encode_prefixed(address));
        self
    }

    pub fn with_topics(mut self, topics: TopicSlots) -> Self {
        self.topics = topics;
        self
    }

    pub fn with_blocks(mut self, from: BlockParameter, to: BlockParameter) -> Self {
        self.from_block = Some(from);
        self.to_block = Some(to);
        self
    }

    /// Whether the filter admits `address`; an empty restriction admits all
    pub fn allows_address(&self, address: Address) -> bool {
        let address = hex::encode_prefixed(address);
        self.address.is_empty() || self.address.iter().any(|a| hex::eq_ignore_case(a, &address))
    }

    /// Evaluate the address and topic constraints against a log
    ///
    /// Slots are ANDed, members of a slot are ORed. A log with fewer topics
    /// than constrained slots does not match.
    pub fn matches_log(&self, log: &Log) -> bool {
        if !self.allows_address(log.address) {
            return false;
        }
        let topics = log.data.topics();
        self.topics.iter().enumerate().all(|(idx, slot)| match slot {
            None => true,
            Some(set) => topics.get(idx).is_some_and(|topic| {
                let topic = hex::encode_prefixed(topic);
                set.iter().any(|candidate| hex::eq_ignore_case(candidate, &topic))
            }),
        })
    }
}

/// A decoded log record, values in encoding order
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEvent {
    pub name: String,
    pub address: Address,
    pub outputs: ParameterOutputs,
}

/// Event filter construction and log decoding
pub struct EventCodec;

impl EventCodec {
    /// Build topic slots from candidate values per indexed parameter
    ///
    /// `value_sets[i]` constrains the i-th indexed parameter; missing trailing
    /// entries are wildcards.
    pub fn build_filter_topics(
        event: &EventSignature,
        value_sets: &[Option<Vec<DynSolValue>>],
    ) -> Result<TopicSlots> {
        let indexed = event.indexed_inputs();
        if value_sets.len() > indexed.len() {
            return Err(ConfigurationError::ArgumentMismatch {
                signature: event.canonical.clone(),
                reason: format!(
                    "{} topic value sets given but only {} indexed parameters",
                    value_sets.len(),
                    indexed.len()
                ),
            }
            .into());
        }

        let mut slots = Vec::with_capacity(indexed.len() + 1);
        if !event.anonymous {
            slots.push(Some(vec![event.topic_hex()]));
        }
        for (idx, param) in indexed.iter().enumerate() {
            let slot = match value_sets.get(idx) {
                None | Some(None) => None,
                Some(Some(values)) => Some(
                    values
                        .iter()
                        .map(|value| {
                            encode_topic(&event.canonical, param, value).map(hex::encode_prefixed)
                        })
                        .collect::<Result<Vec<_>>>()?,
                ),
            };
            slots.push(slot);
        }
        Ok(slots)
    }

    /// Filter scoped to `address` with the given topic constraints
    pub fn filter(
        event: &EventSignature,
        address: Option<Address>,
        value_sets: &[Option<Vec<DynSolValue>>],
    ) -> Result<LogFilter> {
        let mut filter = LogFilter::default().with_topics(Self::build_filter_topics(event, value_sets)?);
        if let Some(address) = address {
            filter = filter.with_address(address);
        }
        Ok(filter)
    }

    /// Whether a log was emitted by `event`
    ///
    /// Anonymous events carry no topic hash, so only the topic count is checked.
    pub fn matches_signature(event: &EventSignature, log: &Log) -> bool {
        let topics = log.data.topics();
        if event.anonymous {
            return topics.len() == event.indexed_inputs().len();
        }
        topics
            .first()
            .is_some_and(|topic| hex::eq_ignore_case(&hex::encode_prefixed(topic), &event.topic_hex()))
    }

    /// Whether `filter` selects `event` for a contract at `address`
    pub fn matches_filter(event: &EventSignature, address: Address, filter: &LogFilter) -> bool {
        if !filter.allows_address(address) {
            return false;
        }
        if event.anonymous {
            return true;
        }
        match filter.topics.first() {
            Some(Some(set)) => set.iter().any(|t| hex::eq_ignore_case(t, &event.topic_hex())),
            _ => false,
        }
    }

    /// Decode one log into its parameters
    pub fn decode_log(event: &EventSignature, log: &Log) -> Result<DecodedEvent> {
        let topics = log.data.topics();
        let skip = usize::from(!event.anonymous);
        if !event.anonymous && !Self::matches_signature(event, log) {
            return Err(DecodeError::NotMatchingEvent {
                signature: event.canonical.clone(),
                expected: event.topic_hex(),
            }
            .into());
        }

        let indexed = event.indexed_inputs();
        if topics.len() != indexed.len() + skip {
            return Err(DecodeError::FieldCountMismatch {
                signature: event.canonical.clone(),
                expected: indexed.len() + skip,
                actual: topics.len(),
            }
            .into());
        }

        let mut indexed_values = Vec::with_capacity(indexed.len());
        for (param, topic) in indexed.iter().zip(&topics[skip..]) {
            indexed_values.push(decode_topic(&event.canonical, param, *topic)?);
        }
        let mut indexed_values = indexed_values.into_iter();

        let mut data_values = decode_parameters(&event.canonical, event.data_inputs(), &log.data.data)?
            .into_values()
            .into_iter();

        let mut outputs = Vec::with_capacity(event.inputs.len());
        for param in sorted(&event.inputs) {
            let value = if param.indexed {
                indexed_values.next()
            } else {
                data_values.next()
            };
            let value = value.ok_or_else(|| DecodeError::FieldCountMismatch {
                signature: event.canonical.clone(),
                expected: event.inputs.len(),
                actual: outputs.len(),
            })?;
            outputs.push(ParameterOutput {
                parameter: param.clone(),
                value,
            });
        }

        Ok(DecodedEvent {
            name: event.name.clone(),
            address: log.address,
            outputs: ParameterOutputs(outputs),
        })
    }

    /// Decode every log emitted by `event`, skipping the others in place
    pub fn decode_logs(event: &EventSignature, logs: &[Log]) -> Result<Vec<DecodedEvent>> {
        let mut decoded = Vec::new();
        for (idx, log) in logs.iter().enumerate() {
            if !Self::matches_signature(event, log) {
                debug!(event = %event.canonical, index = idx, address = %log.address, "skipping non-matching log");
                continue;
            }
            decoded.push(Self::decode_log(event, log)?);
        }
        Ok(decoded)
    }

    /// Decode one log into a caller-described shape
    pub fn decode_log_as<T: FromParameterOutputs>(event: &EventSignature, log: &Log) -> Result<T> {
        T::from_outputs(Self::decode_log(event, log)?.outputs)
    }

    /// Find the event by topic 0 in `registry` and decode the log
    ///
    /// Returns `Ok(None)` for logs without topics or with an unknown topic.
    pub fn decode_with_registry(registry: &SignatureRegistry, log: &Log) -> Result<Option<DecodedEvent>> {
        let Some(topic) = log.data.topics().first() else {
            return Ok(None);
        };
        match registry.event(*topic) {
            Some(event) => Self::decode_log(event, log).map(Some),
            None => Ok(None),
        }
    }
}

/// Encode one indexed value into its topic word
pub fn encode_topic(signature: &str, param: &Parameter, value: &DynSolValue) -> Result<B256> {
    let ty = param.sol_type()?;
    let value = &param.to_encoding_order(value);
    if !value.matches(&ty) {
        return Err(ConfigurationError::ArgumentMismatch {
            signature: signature.to_string(),
            reason: format!(
                "topic value for `{}` is not a `{}`",
                param.name,
                ty.sol_type_name()
            ),
        }
        .into());
    }
    match value {
        DynSolValue::String(s) => Ok(keccak256(s.as_bytes())),
        DynSolValue::Bytes(b) => Ok(keccak256(b)),
        DynSolValue::Array(_) | DynSolValue::FixedArray(_) | DynSolValue::Tuple(_) => {
            let mut buf = Vec::new();
            encode_in_place(value, &mut buf);
            Ok(keccak256(&buf))
        }
        other => other.as_word().ok_or_else(|| {
            ConfigurationError::ArgumentMismatch {
                signature: signature.to_string(),
                reason: format!("`{}` cannot be used as a topic", param.name),
            }
            .into()
        }),
    }
}

/// In-place encoding of an indexed reference value: every element padded to
/// a word, `string`/`bytes` as raw padded content without a length prefix
fn encode_in_place(value: &DynSolValue, buf: &mut Vec<u8>) {
    match value {
        DynSolValue::String(s) => pad_to_word(s.as_bytes(), buf),
        DynSolValue::Bytes(b) => pad_to_word(b, buf),
        DynSolValue::Array(values) | DynSolValue::FixedArray(values) | DynSolValue::Tuple(values) => {
            for value in values {
                encode_in_place(value, buf);
            }
        }
        other => {
            if let Some(word) = other.as_word() {
                buf.extend_from_slice(word.as_slice());
            }
        }
    }
}

fn pad_to_word(bytes: &[u8], buf: &mut Vec<u8>) {
    buf.extend_from_slice(bytes);
    let rem = bytes.len() % 32;
    if rem != 0 {
        buf.resize(buf.len() + 32 - rem, 0);
    }
}

fn decode_topic(signature: &str, param: &Parameter, topic: B256) -> Result<DynSolValue> {
    let ty = param.sol_type()?;
    match ty {
        DynSolType::String
        | DynSolType::Bytes
        | DynSolType::Array(_)
        | DynSolType::FixedArray(..)
        | DynSolType::Tuple(_) => Ok(DynSolValue::FixedBytes(topic, 32)),
        ty => ty.abi_decode(topic.as_slice()).map_err(|e| {
            DecodeError::Abi {
                signature: signature.to_string(),
                reason: format!("topic `{}`: {e}", param.name),
            }
            .into()
        }),
    }
}
