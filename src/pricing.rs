//! Pricing table and token estimation
//!
//! Static per-model pricing in USD per million tokens, plus a heuristic
//! token-count approximation. The heuristic is not a tokenizer: it blends
//! a character-based and a word-based estimate, with tighter densities for
//! the coder model since source code tokenizes more densely.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::config::{CODER_MODEL, DEFAULT_MODEL};

/// Per-model pricing in USD per million tokens
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    pub input_price: f64,
    pub output_price: f64,
}

static PRICING: Lazy<HashMap<&'static str, ModelPricing>> = Lazy::new(|| {
    HashMap::from([
        (
            DEFAULT_MODEL,
            ModelPricing {
                input_price: 0.14,
                output_price: 0.28,
            },
        ),
        (
            CODER_MODEL,
            ModelPricing {
                input_price: 0.14,
                output_price: 0.28,
            },
        ),
    ])
});

/// Look up pricing for a model id
pub fn pricing_for(model: &str) -> Option<ModelPricing> {
    PRICING.get(model).copied()
}

/// Estimate the USD cost of a completed call.
///
/// Unknown models cost exactly 0.0 (not an error). Known models compute
/// token-proportional cost rounded to 6 decimal places.
pub fn estimate_cost(model: &str, prompt_tokens: u32, completion_tokens: u32) -> f64 {
    let Some(pricing) = pricing_for(model) else {
        return 0.0;
    };
    let cost = (f64::from(prompt_tokens) / 1_000_000.0) * pricing.input_price
        + (f64::from(completion_tokens) / 1_000_000.0) * pricing.output_price;
    (cost * 1_000_000.0).round() / 1_000_000.0
}

/// Approximate the token count of a text for a given model.
///
/// Averages a character-based estimate (chars / divisor) and a word-based
/// estimate (words * multiplier), returning the ceiling of the mean.
pub fn count_tokens(model: &str, text: &str) -> u32 {
    let (divisor, multiplier) = if model == CODER_MODEL {
        (3.0, 1.5)
    } else {
        (4.0, 1.3)
    };

    let char_estimate = text.chars().count() as f64 / divisor;
    let word_estimate = text.split_whitespace().count() as f64 * multiplier;
    ((char_estimate + word_estimate) / 2.0).ceil() as u32
}
