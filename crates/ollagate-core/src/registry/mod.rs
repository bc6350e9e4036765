//! Model registry loaded from the models YAML file.
//!
//! The file holds two lists: `bases`, reusable templates of capabilities
//! and token budgets, and `models`, the concrete model names clients can
//! ask for. A model may name one base; its unset values are inherited
//! from that base through [`ModelView`].
//!
//! ```yaml
//! bases:
//!   - name: gpt-4
//!     capabilities: [completion, tools, vision]
//!     input_tokens: 100000
//!     output_tokens: 8000
//! models:
//!   - name: gpt-4.1-mini
//!     base: gpt-4
//! ```
//!
//! The registry is built once and never mutated afterwards. Lookups go
//! through two name → index maps; on duplicate names the last entry wins.

mod model;

pub use model::{BaseModel, ModelEntry, ModelView};

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from loading or querying the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read models file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse models config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("model '{0}' not found")]
    ModelNotFound(String),
}

/// On-disk shape of the models file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelsDocument {
    #[serde(default)]
    pub bases: Vec<BaseModel>,
    #[serde(default)]
    pub models: Vec<ModelEntry>,
}

/// Base templates and model entries with their name lookups.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    bases: Vec<BaseModel>,
    models: Vec<ModelEntry>,
    model_lookup: HashMap<String, usize>,
}

impl ModelRegistry {
    /// A registry with no bases and no models.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the registry from a YAML file.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let contents = std::fs::read_to_string(path).map_err(|source| RegistryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::from_yaml_str(&contents)?;
        debug!(
            path = %path.display(),
            bases = registry.bases.len(),
            models = registry.models.len(),
            "Loaded model registry"
        );
        Ok(registry)
    }

    /// Load the registry, treating a missing file as an empty registry.
    ///
    /// A file that exists but cannot be read or parsed is still an error.
    pub fn load_optional(path: &Path) -> Result<Self, RegistryError> {
        match Self::load(path) {
            Err(RegistryError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Models file not found, every model uses defaults");
                Ok(Self::empty())
            }
            other => other,
        }
    }

    /// Parse the registry from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, RegistryError> {
        let document: ModelsDocument = serde_yaml::from_str(yaml)?;
        Ok(Self::from_document(document))
    }

    /// Build the registry and its lookup maps from a parsed document.
    ///
    /// A model naming an unknown base is kept with no base; this is
    /// logged, not an error.
    #[must_use]
    pub fn from_document(document: ModelsDocument) -> Self {
        let ModelsDocument { bases, mut models } = document;

        let base_lookup: HashMap<String, usize> = bases
            .iter()
            .enumerate()
            .map(|(idx, base)| (base.name.clone(), idx))
            .collect();

        let mut model_lookup = HashMap::with_capacity(models.len());
        for (idx, model) in models.iter_mut().enumerate() {
            model_lookup.insert(model.name.clone(), idx);
            model.base_index = None;

            if let Some(base_name) = &model.base {
                match base_lookup.get(base_name) {
                    Some(&base_idx) => model.base_index = Some(base_idx),
                    None => warn!(
                        model = %model.name,
                        base = %base_name,
                        "Model references non-existent base"
                    ),
                }
            }
        }

        Self {
            bases,
            models,
            model_lookup,
        }
    }

    /// Look up a model by name.
    pub fn get_model(&self, name: &str) -> Result<ModelView<'_>, RegistryError> {
        self.model_lookup
            .get(name)
            .map(|&idx| self.view(&self.models[idx]))
            .ok_or_else(|| RegistryError::ModelNotFound(name.to_string()))
    }

    /// Look up a model, falling back to the default entry when absent.
    #[must_use]
    pub fn resolve_or_default(&self, name: &str) -> ModelView<'_> {
        self.get_model(name).unwrap_or_else(|_| {
            warn!(model = %name, "Model not found, using default config");
            ModelView::fallback()
        })
    }

    fn view<'a>(&'a self, entry: &'a ModelEntry) -> ModelView<'a> {
        ModelView::new(entry, entry.base_index.and_then(|idx| self.bases.get(idx)))
    }

    #[must_use]
    pub fn bases(&self) -> &[BaseModel] {
        &self.bases
    }

    #[must_use]
    pub fn models(&self) -> &[ModelEntry] {
        &self.models
    }

    /// Number of model entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
