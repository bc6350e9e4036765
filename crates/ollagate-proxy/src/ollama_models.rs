//! Local-dialect (Ollama API) data models.

use chrono::{DateTime, Utc};
use ollagate_core::{Capability, ModelView};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::models::{CloudModel, null_as_default};

/// Version reported on `/api/version`.
///
/// Clients such as editor extensions gate features on this value.
pub const OLLAMA_API_VERSION: &str = "0.6.4";

// ── /api/version ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionResponse {
    pub version: String,
}

// ── /api/tags ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse {
    pub models: Vec<ListModelResponse>,
}

impl ListResponse {
    /// Map a backend listing into the local shape.
    pub fn from_cloud(models: &[CloudModel]) -> Self {
        Self {
            models: models.iter().map(ListModelResponse::from_cloud).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListModelResponse {
    pub name: String,
    pub model: String,
    pub modified_at: DateTime<Utc>,
    pub size: i64,
    pub digest: String,
    pub details: ModelDetails,
}

impl ListModelResponse {
    /// The backend exposes neither size nor digest, so both stay empty.
    pub fn from_cloud(model: &CloudModel) -> Self {
        Self {
            name: model.id.clone(),
            model: model.id.clone(),
            modified_at: DateTime::from_timestamp(model.created, 0).unwrap_or_default(),
            size: 0,
            digest: String::new(),
            details: ModelDetails::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDetails {
    pub parent_model: String,
    pub format: String,
    pub family: String,
    pub families: Vec<String>,
    pub parameter_size: String,
    pub quantization_level: String,
}

// ── /api/show ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShowRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub model: String,
    /// Older clients send `name` instead of `model`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

impl ShowRequest {
    pub fn effective_model(&self) -> &str {
        if self.model.is_empty() {
            &self.name
        } else {
            &self.model
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowResponse {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub license: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub modelfile: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub parameters: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub template: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub system: String,
    pub details: ModelDetails,
    pub model_info: Map<String, Value>,
    pub capabilities: Vec<Capability>,
    pub modified_at: DateTime<Utc>,
}

impl ShowResponse {
    /// Describe a registry model. Descriptive fields the gateway cannot
    /// know stay empty.
    pub fn from_view(view: &ModelView<'_>) -> Self {
        let mut model_info = Map::new();
        model_info.insert("general.architecture".to_string(), json!("llama"));
        model_info.insert(
            "llama.context_length".to_string(),
            json!(view.effective_context_length()),
        );

        Self {
            license: String::new(),
            modelfile: String::new(),
            parameters: String::new(),
            template: String::new(),
            system: String::new(),
            details: ModelDetails {
                format: "gguf".to_string(),
                ..ModelDetails::default()
            },
            model_info,
            capabilities: view.effective_capabilities().into_iter().collect(),
            modified_at: Utc::now(),
        }
    }
}

// ── Errors ─────────────────────────────────────────────────────────────

/// Local-dialect error envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ollagate_core::ModelEntry;

    #[test]
    fn test_listing_from_cloud() {
        let listing = ListResponse::from_cloud(&[CloudModel {
            id: "gpt-4o".to_string(),
            created: 1_700_000_000,
        }]);
        let value = serde_json::to_value(&listing).unwrap();
        let entry = &value["models"][0];
        assert_eq!(entry["name"], "gpt-4o");
        assert_eq!(entry["model"], "gpt-4o");
        assert_eq!(entry["modified_at"], "2023-11-14T22:13:20Z");
        assert_eq!(entry["size"], 0);
        assert_eq!(entry["digest"], "");
    }

    #[test]
    fn test_show_from_default_view() {
        let show = ShowResponse::from_view(&ModelView::fallback());
        let value = serde_json::to_value(&show).unwrap();
        assert_eq!(value["details"]["format"], "gguf");
        assert_eq!(value["model_info"]["general.architecture"], "llama");
        assert_eq!(value["model_info"]["llama.context_length"], 0);
        assert_eq!(value["capabilities"], json!(["completion", "tools"]));
        assert!(value.get("license").is_none());
        assert!(value.get("template").is_none());
    }

    #[test]
    fn test_show_context_length() {
        let mut entry = ModelEntry::new("tiny");
        entry.input_tokens = Some(1000);
        entry.output_tokens = Some(24);
        let show = ShowResponse::from_view(&ModelView::new(&entry, None));
        assert_eq!(show.model_info["llama.context_length"], json!(1024));
    }

    #[test]
    fn test_show_request_name_alias() {
        let req: ShowRequest = serde_json::from_str(r#"{"name":"legacy"}"#).unwrap();
        assert_eq!(req.effective_model(), "legacy");
        let req: ShowRequest = serde_json::from_str(r#"{"model":"m","name":"n"}"#).unwrap();
        assert_eq!(req.effective_model(), "m");
        let req: ShowRequest = serde_json::from_str(r#"{"model":null,"name":"n"}"#).unwrap();
        assert_eq!(req.effective_model(), "n");
    }

    #[test]
    fn test_error_envelope() {
        let value = serde_json::to_value(ErrorResponse::new("Invalid model name")).unwrap();
        assert_eq!(value, json!({"error": "Invalid model name"}));
    }
}
