// SPDX-FileCopyrightText: 2026 Glance Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response-token budget planning.
//!
//! Given the prompts and optional image of an outgoing request, decides how
//! many tokens may be spent on the response within a fixed context ceiling.
//! The budget is advisory: it bounds what is *requested* from the API and
//! never truncates the prompt itself.

use crate::estimator::{estimate_image_tokens, estimate_text_tokens};

/// Planning parameters, loaded from configuration.
#[derive(Debug, Clone)]
pub struct BudgetParams {
    /// Fixed total context ceiling in tokens.
    pub total_ceiling: u32,
    /// Reserve subtracted up front for wire overhead and estimate error.
    pub buffer_tokens: u32,
    /// Minimum response tokens requested no matter how full the context is.
    pub response_floor: u32,
    /// Maximum response tokens requested no matter how empty the context is.
    pub response_ceiling: u32,
}

impl Default for BudgetParams {
    fn default() -> Self {
        Self {
            total_ceiling: 32_000,
            buffer_tokens: 1_500,
            response_floor: 1_000,
            response_ceiling: 4_000,
        }
    }
}

/// The planned token split for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBudget {
    pub system_tokens: u32,
    pub user_tokens: u32,
    pub image_tokens: u32,
    pub buffer_tokens: u32,
    /// Tokens to request for the response, always within
    /// `[response_floor, response_ceiling]`.
    pub response_tokens: u32,
}

/// Plans the response-token budget for one request.
///
/// Pure function: estimates the cost of each input, derives what remains of
/// the ceiling, and clamps the remainder into the configured floor/ceiling
/// range. The clamp guarantees a sane request even when the inputs alone
/// blow past the ceiling.
pub fn plan(
    system_prompt: &str,
    user_prompt: &str,
    image: Option<&[u8]>,
    params: &BudgetParams,
) -> TokenBudget {
    let system_tokens = estimate_text_tokens(system_prompt);
    let user_tokens = estimate_text_tokens(user_prompt);
    let image_tokens = image.map(estimate_image_tokens).unwrap_or(0);

    let available = params.total_ceiling as i64
        - system_tokens as i64
        - user_tokens as i64
        - image_tokens as i64
        - params.buffer_tokens as i64;

    let response_tokens = (params.response_floor as i64)
        .max((params.response_ceiling as i64).min(available)) as u32;

    TokenBudget {
        system_tokens,
        user_tokens,
        image_tokens,
        buffer_tokens: params.buffer_tokens,
        response_tokens,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_inputs_get_the_full_ceiling() {
        let budget = plan("You are helpful.", "What is this?", None, &BudgetParams::default());
        assert_eq!(budget.response_tokens, 4_000);
        assert_eq!(budget.image_tokens, 0);
    }

    #[test]
    fn absent_image_costs_nothing() {
        let budget = plan("sys", "user", None, &BudgetParams::default());
        assert_eq!(budget.image_tokens, 0);
    }

    #[test]
    fn large_image_is_charged_by_tier() {
        let image = vec![0u8; 400 * 1024];
        let budget = plan("sys", "user", Some(&image), &BudgetParams::default());
        assert_eq!(budget.image_tokens, 1_000);
    }

    #[test]
    fn adversarially_large_inputs_still_clamp_to_floor() {
        // System prompt alone estimated at ~10x the ceiling.
        let huge = "word ".repeat(300_000);
        let budget = plan(&huge, &huge, None, &BudgetParams::default());
        assert_eq!(budget.response_tokens, 1_000);
    }

    #[test]
    fn response_is_always_within_bounds() {
        let params = BudgetParams::default();
        let cases: &[(String, usize)] = &[
            (String::new(), 0),
            ("short prompt".into(), 50 * 1024),
            ("medium ".repeat(2_000), 150 * 1024),
            ("long ".repeat(50_000), 500 * 1024),
        ];
        for (text, image_size) in cases {
            let image = vec![0u8; *image_size];
            let budget = plan(text, text, Some(&image), &params);
            assert!(budget.response_tokens >= params.response_floor);
            assert!(budget.response_tokens <= params.response_ceiling);
        }
    }

    #[test]
    fn mid_range_budget_is_the_exact_remainder() {
        // Pick a ceiling where the remainder lands strictly between floor
        // and ceiling, so no clamp applies.
        let params = BudgetParams {
            total_ceiling: 5_000,
            buffer_tokens: 500,
            response_floor: 1_000,
            response_ceiling: 4_000,
        };
        let budget = plan("", "", None, &params);
        assert_eq!(budget.response_tokens, 4_000);

        let long = "word ".repeat(2_000); // ~2860 tokens estimated
        let budget = plan(&long, "", None, &params);
        let expected = 5_000 - budget.system_tokens as i64 - 500;
        assert_eq!(budget.response_tokens as i64, expected);
    }
}
