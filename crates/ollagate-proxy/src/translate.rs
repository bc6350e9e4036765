//! Local-dialect to cloud-dialect chat request translation.
//!
//! The local extras (`options`, `keep_alive`) are consumed here and never
//! reach the backend. Options the client explicitly supplied fill in the
//! matching cloud fields the request left unset, and the registry's
//! output-token budget for the model overrides `max_tokens` when non-zero.

use ollagate_core::{GenerationOptions, ModelRegistry, OptionsError};
use serde_json::{Map, Value};
use tracing::debug;

use crate::models::{ChatCompletionRequest, CloudChatRequest};

/// Output-token budget configured for `model`, or 0 when it is unknown.
pub fn output_budget(registry: &ModelRegistry, model: &str) -> u32 {
    registry
        .get_model(model)
        .map_or(0, |view| view.effective_output_tokens())
}

/// A non-null value the client set for `key`.
fn supplied<'a>(options: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    options.get(key).filter(|v| !v.is_null())
}

/// Translate an inbound chat request into the backend request.
///
/// Fails only when `options` holds a value of the wrong type.
pub fn translate_chat_request(
    request: ChatCompletionRequest,
    registry: &ModelRegistry,
) -> Result<CloudChatRequest, OptionsError> {
    let ChatCompletionRequest {
        model,
        messages,
        stream,
        mut max_tokens,
        mut temperature,
        mut top_p,
        mut seed,
        mut stop,
        mut presence_penalty,
        mut frequency_penalty,
        options,
        keep_alive,
        extra,
    } = request;

    if let Some(keep_alive) = keep_alive {
        debug!(model = %model, keep_alive = %keep_alive, "Ignoring keep_alive for cloud backend");
    }

    if let Some(raw) = options.as_ref() {
        let decoded = GenerationOptions::from_map(raw)?;
        let opts = decoded.options;

        // Floats are taken from the raw map; the decoded record narrows them to f32.
        let float = |key: &str| supplied(raw, key).and_then(Value::as_f64);
        temperature = temperature.or_else(|| float("temperature"));
        top_p = top_p.or_else(|| float("top_p"));
        presence_penalty = presence_penalty.or_else(|| float("presence_penalty"));
        frequency_penalty = frequency_penalty.or_else(|| float("frequency_penalty"));

        if seed.is_none() && supplied(raw, "seed").is_some() {
            seed = Some(opts.seed);
        }
        if stop.is_none() && supplied(raw, "stop").is_some() {
            stop = Some(Value::from(opts.stop));
        }
        if max_tokens.is_none() && opts.num_predict > 0 {
            max_tokens = u64::try_from(opts.num_predict).ok();
        }
    }

    let budget = output_budget(registry, &model);
    if budget > 0 {
        debug!(model = %model, max_tokens = budget, "Applying output token budget");
        max_tokens = Some(u64::from(budget));
    }

    Ok(CloudChatRequest {
        model,
        messages,
        stream,
        max_tokens,
        temperature,
        top_p,
        seed,
        stop,
        presence_penalty,
        frequency_penalty,
        extra,
    })
}
