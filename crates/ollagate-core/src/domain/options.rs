//! Generation options and the decoder for client-supplied option maps.
//!
//! Local-dialect clients send sampling and runner settings as a free-form
//! JSON object (`"options": {"temperature": 0.2, "num_ctx": 8192}`). The
//! decoder maps each known wire key onto a field of [`GenerationOptions`]
//! through a static table, coercing the JSON value to the field's kind.
//!
//! Unknown keys are logged and skipped. A value of the wrong type aborts
//! the whole decode; the caller's defaults are never partially modified.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

/// Sampling and runner settings for one request.
///
/// Built fresh from [`GenerationOptions::default`] for every request, then
/// overridden from the client's option map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    // Runner options, fixed when a model is loaded.
    pub num_ctx: i64,
    pub num_batch: i64,
    /// `-1` lets the runtime decide how many layers to offload.
    pub num_gpu: i64,
    pub main_gpu: i64,
    pub use_mmap: Option<bool>,
    /// `0` lets the runtime decide.
    pub num_thread: i64,

    // Predict options, applied per request.
    pub num_keep: i64,
    /// `-1` picks a random seed.
    pub seed: i64,
    /// `-1` means generate until a stop condition.
    pub num_predict: i64,
    pub top_k: i64,
    pub top_p: f32,
    pub min_p: f32,
    pub typical_p: f32,
    pub repeat_last_n: i64,
    pub temperature: f32,
    pub repeat_penalty: f32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
    pub stop: Vec<String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            num_ctx: 4096,
            num_batch: 512,
            num_gpu: -1,
            main_gpu: 0,
            use_mmap: None,
            num_thread: 0,

            // a small num_keep avoids losing the prompt head on context shifts
            num_keep: 4,
            seed: -1,
            num_predict: -1,
            top_k: 40,
            top_p: 0.9,
            min_p: 0.0,
            typical_p: 1.0,
            repeat_last_n: 64,
            temperature: 0.8,
            repeat_penalty: 1.1,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
            stop: Vec::new(),
        }
    }
}

/// Errors raised while decoding an option map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("option \"{key}\" must be of type {expected}")]
    WrongType { key: String, expected: OptionKind },

    #[error("option \"{0}\" must be an array of strings")]
    MixedArray(String),
}

impl OptionsError {
    /// The wire key whose value failed to decode.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::WrongType { key, .. } | Self::MixedArray(key) => key,
        }
    }
}

/// The declared kind of an option field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Integer,
    Float,
    OptionalBoolean,
    StringArray,
}

impl std::fmt::Display for OptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::OptionalBoolean => "boolean",
            Self::StringArray => "array",
        })
    }
}

/// How a decoded value is written into the record.
#[derive(Clone, Copy)]
enum Setter {
    Integer(fn(&mut GenerationOptions, i64)),
    Float(fn(&mut GenerationOptions, f32)),
    OptionalBoolean(fn(&mut GenerationOptions, Option<bool>)),
    StringArray(fn(&mut GenerationOptions, Vec<String>)),
}

/// Wire key → setter, built once.
static OPTION_TABLE: LazyLock<HashMap<&'static str, Setter>> = LazyLock::new(|| {
    HashMap::from([
        ("num_ctx", Setter::Integer(|o, v| o.num_ctx = v)),
        ("num_batch", Setter::Integer(|o, v| o.num_batch = v)),
        ("num_gpu", Setter::Integer(|o, v| o.num_gpu = v)),
        ("main_gpu", Setter::Integer(|o, v| o.main_gpu = v)),
        ("use_mmap", Setter::OptionalBoolean(|o, v| o.use_mmap = v)),
        ("num_thread", Setter::Integer(|o, v| o.num_thread = v)),
        ("num_keep", Setter::Integer(|o, v| o.num_keep = v)),
        ("seed", Setter::Integer(|o, v| o.seed = v)),
        ("num_predict", Setter::Integer(|o, v| o.num_predict = v)),
        ("top_k", Setter::Integer(|o, v| o.top_k = v)),
        ("top_p", Setter::Float(|o, v| o.top_p = v)),
        ("min_p", Setter::Float(|o, v| o.min_p = v)),
        ("typical_p", Setter::Float(|o, v| o.typical_p = v)),
        ("repeat_last_n", Setter::Integer(|o, v| o.repeat_last_n = v)),
        ("temperature", Setter::Float(|o, v| o.temperature = v)),
        ("repeat_penalty", Setter::Float(|o, v| o.repeat_penalty = v)),
        ("presence_penalty", Setter::Float(|o, v| o.presence_penalty = v)),
        ("frequency_penalty", Setter::Float(|o, v| o.frequency_penalty = v)),
        ("stop", Setter::StringArray(|o, v| o.stop = v)),
    ])
});

/// Result of a successful decode.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedOptions {
    pub options: GenerationOptions,
    /// Keys that matched no known option and were skipped.
    pub unknown_keys: Vec<String>,
}

fn wrong_type(key: &str, expected: OptionKind) -> OptionsError {
    OptionsError::WrongType {
        key: key.to_string(),
        expected,
    }
}

/// JSON numbers may arrive as floats; whole-valued ones are accepted.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::float_cmp
)]
fn coerce_integer(key: &str, value: &Value) -> Result<i64, OptionsError> {
    if let Some(n) = value.as_i64() {
        return Ok(n);
    }
    match value.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Ok(f as i64)
        }
        _ => Err(wrong_type(key, OptionKind::Integer)),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn coerce_float(key: &str, value: &Value) -> Result<f32, OptionsError> {
    value
        .as_f64()
        .map(|f| f as f32)
        .ok_or_else(|| wrong_type(key, OptionKind::Float))
}

fn coerce_bool(key: &str, value: &Value) -> Result<bool, OptionsError> {
    value
        .as_bool()
        .ok_or_else(|| wrong_type(key, OptionKind::OptionalBoolean))
}

fn coerce_string_array(key: &str, value: &Value) -> Result<Vec<String>, OptionsError> {
    let items = value
        .as_array()
        .ok_or_else(|| wrong_type(key, OptionKind::StringArray))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| OptionsError::MixedArray(key.to_string()))
        })
        .collect()
}

fn apply(
    options: &mut GenerationOptions,
    key: &str,
    setter: Setter,
    value: &Value,
) -> Result<(), OptionsError> {
    match setter {
        Setter::Integer(set) => set(options, coerce_integer(key, value)?),
        Setter::Float(set) => set(options, coerce_float(key, value)?),
        Setter::OptionalBoolean(set) => set(options, Some(coerce_bool(key, value)?)),
        Setter::StringArray(set) => set(options, coerce_string_array(key, value)?),
    }
    Ok(())
}

/// Decode `overrides` on top of `defaults`.
///
/// Decoding works on a copy of `defaults`; on error nothing is committed
/// and the returned error names the offending key.
pub fn decode_options(
    defaults: &GenerationOptions,
    overrides: &Map<String, Value>,
) -> Result<DecodedOptions, OptionsError> {
    let mut scratch = defaults.clone();
    let mut unknown_keys = Vec::new();

    for (key, value) in overrides {
        let Some(setter) = OPTION_TABLE.get(key.as_str()) else {
            warn!(option = %key, "invalid option provided");
            unknown_keys.push(key.clone());
            continue;
        };
        if value.is_null() {
            continue;
        }
        apply(&mut scratch, key, *setter, value)?;
    }

    Ok(DecodedOptions {
        options: scratch,
        unknown_keys,
    })
}

impl GenerationOptions {
    /// Decode a client option map over the built-in defaults.
    pub fn from_map(overrides: &Map<String, Value>) -> Result<DecodedOptions, OptionsError> {
        decode_options(&Self::default(), overrides)
    }
}
