//! Memoized signatures for declared message kinds

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::{debug, trace};

use super::message::{MessageDescription, MessageKind, MessageTag};
use super::signature::{ErrorSignature, EventSignature, FunctionSignature};
use crate::error::{ConfigurationError, Result};

/// A cached signature of any kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEntry {
    Function(Arc<FunctionSignature>),
    Event(Arc<EventSignature>),
    Error(Arc<ErrorSignature>),
}

impl CatalogEntry {
    /// Build the signature a description declares
    pub fn from_description(desc: MessageDescription) -> Result<Self, ConfigurationError> {
        let entry = match desc.tag {
            MessageTag::Function => Self::Function(Arc::new(FunctionSignature::new(
                desc.name,
                desc.inputs,
                desc.outputs,
            )?)),
            MessageTag::Event => Self::Event(Arc::new(EventSignature::new(
                desc.name,
                desc.inputs,
                desc.anonymous,
            )?)),
            MessageTag::Error => {
                Self::Error(Arc::new(ErrorSignature::new(desc.name, desc.inputs)?))
            }
        };
        Ok(entry)
    }

    /// Canonical signature string of the entry
    pub fn canonical(&self) -> &str {
        match self {
            Self::Function(f) => &f.canonical,
            Self::Event(e) => &e.canonical,
            Self::Error(e) => &e.canonical,
        }
    }
}

static GLOBAL: Lazy<TypeCatalog> = Lazy::new(TypeCatalog::new);

/// Concurrency-safe cache of signatures keyed by message kind
#[derive(Debug, Default)]
pub struct TypeCatalog {
    entries: RwLock<HashMap<TypeId, CatalogEntry>>,
}

impl TypeCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide catalog for callers that do not hold their own
    pub fn global() -> &'static TypeCatalog {
        &GLOBAL
    }

    /// Return the cached signature for `M`, extracting it on first use
    ///
    /// Extraction runs outside the lock. When two threads race on first use
    /// the first published entry wins and both callers receive it.
    pub fn register_or_get<M: MessageKind>(&self) -> Result<CatalogEntry> {
        let key = TypeId::of::<M>();
        if let Some(entry) = self.entries.read().get(&key) {
            trace!(kind = type_name::<M>(), "catalog hit");
            return Ok(entry.clone());
        }

        let entry = CatalogEntry::from_description(M::describe()).map_err(|err| {
            debug!(kind = type_name::<M>(), %err, "rejected message kind");
            match err {
                ConfigurationError::InvalidDescriptor { name, reason } if name.is_empty() => {
                    ConfigurationError::InvalidDescriptor {
                        name: type_name::<M>().to_string(),
                        reason,
                    }
                }
                other => other,
            }
        })?;

        let mut entries = self.entries.write();
        let published = entries.entry(key).or_insert(entry).clone();
        debug!(
            kind = type_name::<M>(),
            signature = published.canonical(),
            "registered message kind"
        );
        Ok(published)
    }

    /// Function signature for `M`
    pub fn function<M: MessageKind>(&self) -> Result<Arc<FunctionSignature>> {
        match self.register_or_get::<M>()? {
            CatalogEntry::Function(function) => Ok(function),
            other => Err(wrong_kind::<M>(&other, "function")),
        }
    }

    /// Event signature for `M`
    pub fn event<M: MessageKind>(&self) -> Result<Arc<EventSignature>> {
        match self.register_or_get::<M>()? {
            CatalogEntry::Event(event) => Ok(event),
            other => Err(wrong_kind::<M>(&other, "event")),
        }
    }

    /// Error signature for `M`
    pub fn error<M: MessageKind>(&self) -> Result<Arc<ErrorSignature>> {
        match self.register_or_get::<M>()? {
            CatalogEntry::Error(error) => Ok(error),
            other => Err(wrong_kind::<M>(&other, "error")),
        }
    }

    /// Number of cached message kinds
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

fn wrong_kind<M: MessageKind>(entry: &CatalogEntry, expected: &str) -> crate::Error {
    ConfigurationError::InvalidDescriptor {
        name: type_name::<M>().to_string(),
        reason: format!("declared as `{}`, not a {expected}", entry.canonical()),
    }
    .into()
}
