//! Integration tests for loading the model registry from disk.

use std::io::Write;

use ollagate_core::{Capability, ModelRegistry, RegistryError, default_capabilities};
use tempfile::{NamedTempFile, TempDir};

fn write_models_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_models_file() {
    let file = write_models_file(
        "bases:
  - name: gpt-4
    capabilities: [completion, tools, vision]
    input_tokens: 100000
    output_tokens: 8000
models:
  - name: gpt-4.1-mini
    base: gpt-4
  - name: gpt-4o
    base: gpt-4
    capabilities: [completion]
",
    );

    let registry = ModelRegistry::load(file.path()).unwrap();
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.bases().len(), 1);

    let mini = registry.get_model("gpt-4.1-mini").unwrap();
    assert_eq!(mini.effective_context_length(), 108_000);
    assert!(mini.effective_capabilities().contains(&Capability::Vision));

    let gpt4o = registry.get_model("gpt-4o").unwrap();
    assert_eq!(
        gpt4o.effective_capabilities().into_iter().collect::<Vec<_>>(),
        vec![Capability::Completion]
    );
}

#[test]
fn test_load_missing_file_is_read_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("models.yml");

    let err = ModelRegistry::load(&path).unwrap_err();
    assert!(matches!(err, RegistryError::Read { .. }));
    assert!(err.to_string().contains("models.yml"));
}

#[test]
fn test_load_optional_missing_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let registry = ModelRegistry::load_optional(&dir.path().join("absent.yml")).unwrap();

    assert!(registry.is_empty());
    let view = registry.resolve_or_default("gpt-4.1-mini");
    assert_eq!(view.effective_capabilities(), default_capabilities());
}

#[test]
fn test_load_optional_malformed_file_fails() {
    let file = write_models_file("models:\n  - name: [unterminated\n");
    assert!(matches!(
        ModelRegistry::load_optional(file.path()),
        Err(RegistryError::Parse(_))
    ));
}

#[test]
fn test_empty_file_is_empty_registry() {
    let file = write_models_file("{}\n");
    let registry = ModelRegistry::load(file.path()).unwrap();
    assert!(registry.is_empty());
    assert!(registry.bases().is_empty());
}
