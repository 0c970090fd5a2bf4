//! Token accounting for a turn, and its price.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

/// Tokens consumed by one or more model calls.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_read_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_creation_tokens: Option<u32>,
}

impl Usage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens.saturating_add(output_tokens),
            ..Self::default()
        }
    }
}

fn add_opt(acc: &mut Option<u32>, more: Option<u32>) {
    if let Some(n) = more {
        let slot = acc.get_or_insert(0);
        *slot = slot.saturating_add(n);
    }
}

impl AddAssign for Usage {
    fn add_assign(&mut self, rhs: Usage) {
        self.input_tokens = self.input_tokens.saturating_add(rhs.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(rhs.output_tokens);
        self.total_tokens = self.total_tokens.saturating_add(rhs.total_tokens);
        add_opt(&mut self.cache_read_tokens, rhs.cache_read_tokens);
        add_opt(&mut self.cache_creation_tokens, rhs.cache_creation_tokens);
    }
}

/// Estimated USD cost of a [`Usage`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct Cost {
    pub input_cost: f64,
    pub output_cost: f64,
    pub total_cost: f64,
}

impl Cost {
    /// Prices are per million tokens.
    pub fn from_usage(usage: &Usage, input_price_per_m: f64, output_price_per_m: f64) -> Self {
        let per_token = |tokens: u32, price: f64| f64::from(tokens) * price / 1_000_000.0;
        let input_cost = per_token(usage.input_tokens, input_price_per_m);
        let output_cost = per_token(usage.output_tokens, output_price_per_m);
        Self {
            input_cost,
            output_cost,
            total_cost: input_cost + output_cost,
        }
    }
}
