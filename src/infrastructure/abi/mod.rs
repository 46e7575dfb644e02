//! ABI infrastructure - alloy-based call and event codecs and contract bindings

mod call;
mod contract;
mod event;

pub use call::{
    panic_description, selector_hex, CallCodec, DecodedCall, RevertReason, ERROR_STRING_SELECTOR,
    PANIC_SELECTOR,
};
pub use contract::{ContractBinding, EventBinding, FunctionBinding};
pub use event::{encode_topic, BlockParameter, DecodedEvent, EventCodec, LogFilter, TopicSlots};
