// SPDX-FileCopyrightText: 2026 Glance Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token budgeting for the Glance request pipeline.
//!
//! Two layers: [`estimator`] turns text and image blobs into heuristic token
//! counts, and [`planner`] turns those counts into a clamped response-token
//! budget for one request. Both are pure; neither touches the network.

pub mod estimator;
pub mod planner;

pub use estimator::{estimate_image_tokens, estimate_text_tokens};
pub use planner::{BudgetParams, TokenBudget, plan};
