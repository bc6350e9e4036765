//! Model entries, base templates and the capability view over them.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::domain::{CapabilitySet, default_capabilities};

/// A named bundle of capability and token defaults shared by model entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseModel {
    pub name: String,
    #[serde(default)]
    pub capabilities: CapabilitySet,
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
}

/// A concrete model the gateway knows about.
///
/// Every value is optional; unset, zero and empty values fall back to the
/// referenced base template (see [`ModelView`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub name: String,
    /// Name of the base template this entry inherits from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<CapabilitySet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u32>,

    /// Index of the resolved base template in the owning registry.
    #[serde(skip)]
    pub(crate) base_index: Option<usize>,
}

static DEFAULT_ENTRY: LazyLock<ModelEntry> = LazyLock::new(ModelEntry::default_entry);

impl ModelEntry {
    /// An entry with no overrides and no base.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: None,
            capabilities: None,
            input_tokens: None,
            output_tokens: None,
            base_index: None,
        }
    }

    /// The entry used for models absent from the registry.
    #[must_use]
    pub fn default_entry() -> Self {
        Self {
            capabilities: Some(default_capabilities()),
            ..Self::new("default")
        }
    }

    /// Whether the `base` reference resolved when the registry was built.
    #[must_use]
    pub const fn has_resolved_base(&self) -> bool {
        self.base_index.is_some()
    }
}

fn non_zero(value: Option<u32>) -> Option<u32> {
    value.filter(|n| *n != 0)
}

fn non_empty(set: Option<&CapabilitySet>) -> Option<&CapabilitySet> {
    set.filter(|s| !s.is_empty())
}

/// Read-only view of a model entry together with its resolved base.
///
/// Each effective value falls back from the entry to the base template
/// to a hard default. A zero token count or an empty capability set
/// counts as unset.
#[derive(Debug, Clone, Copy)]
pub struct ModelView<'a> {
    entry: &'a ModelEntry,
    base: Option<&'a BaseModel>,
}

impl<'a> ModelView<'a> {
    #[must_use]
    pub const fn new(entry: &'a ModelEntry, base: Option<&'a BaseModel>) -> Self {
        Self { entry, base }
    }

    /// View over [`ModelEntry::default_entry`].
    #[must_use]
    pub fn fallback() -> ModelView<'static> {
        ModelView::new(&DEFAULT_ENTRY, None)
    }

    #[must_use]
    pub const fn entry(&self) -> &'a ModelEntry {
        self.entry
    }

    #[must_use]
    pub const fn base(&self) -> Option<&'a BaseModel> {
        self.base
    }

    #[must_use]
    pub fn name(&self) -> &'a str {
        &self.entry.name
    }

    #[must_use]
    pub fn effective_input_tokens(&self) -> u32 {
        non_zero(self.entry.input_tokens)
            .or_else(|| self.base.and_then(|b| non_zero(Some(b.input_tokens))))
            .unwrap_or(0)
    }

    #[must_use]
    pub fn effective_output_tokens(&self) -> u32 {
        non_zero(self.entry.output_tokens)
            .or_else(|| self.base.and_then(|b| non_zero(Some(b.output_tokens))))
            .unwrap_or(0)
    }

    /// Input plus output budget.
    #[must_use]
    pub fn effective_context_length(&self) -> u64 {
        u64::from(self.effective_input_tokens()) + u64::from(self.effective_output_tokens())
    }

    #[must_use]
    pub fn effective_capabilities(&self) -> CapabilitySet {
        non_empty(self.entry.capabilities.as_ref())
            .or_else(|| self.base.and_then(|b| non_empty(Some(&b.capabilities))))
            .cloned()
            .unwrap_or_else(default_capabilities)
    }
}
