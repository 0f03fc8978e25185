// SPDX-FileCopyrightText: 2026 Glance Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt assembly for outgoing requests.
//!
//! The system prompt pins the model to the four-field JSON contract the
//! normalizer expects. It can be replaced wholesale from configuration;
//! per-request custom instructions are appended either way.

use glance_core::AskRequest;

/// The default system prompt demanding strict structured output.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a screen assistant. The user shares a screenshot of what they are working on, plus an optional question, and you help with whatever is on screen: code, errors, documents, settings, anything.

You MUST respond with ONLY a valid JSON object, no text before or after it, with exactly this structure:

{
    "response": "Your main answer (markdown **bold** and *italic* allowed)",
    "code_blocks": [
        {"language": "python", "code": "print('example')", "description": "What this code does"}
    ],
    "links": [
        {"url": "https://example.com", "title": "Link title", "description": "Why it is relevant"}
    ],
    "suggested_questions": ["A short follow-up question?", "Another one?"]
}

Rules:
- All four fields are required; use empty arrays when there is nothing to put in them.
- Put code in code_blocks and URLs in links, never inline in response.
- Provide 3-4 suggested_questions specific to what is on screen.
- Escape quotes properly inside JSON strings."#;

/// Sentence used as the user prompt when the question is empty.
const ANALYZE_SCREEN_PROMPT: &str =
    "Describe what is on the screen and point out anything that needs attention.";

/// The configurable prompt surface of the pipeline.
#[derive(Debug, Clone)]
pub struct PromptSet {
    /// System prompt; replaced wholesale when configured.
    pub system_prompt: String,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl PromptSet {
    /// The system prompt for one request: the configured prompt plus the
    /// request's custom instructions, if any.
    pub fn system_prompt_for(&self, request: &AskRequest) -> String {
        match request
            .custom_instructions
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(instructions) => {
                format!("{}\n\nAdditional instructions:\n{instructions}", self.system_prompt)
            }
            None => self.system_prompt.clone(),
        }
    }
}

/// The user prompt for one request. An empty question becomes a fixed
/// analyze-the-screen prompt; with an image attached, the question is
/// framed against the screenshot.
pub fn user_prompt_for(request: &AskRequest) -> String {
    let question = request.question.trim();
    if question.is_empty() {
        return ANALYZE_SCREEN_PROMPT.to_string();
    }
    if request.image.is_some() {
        format!("Analyze the screenshot and answer: \"{question}\"")
    } else {
        question.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_system_prompt_demands_all_four_fields() {
        for field in ["response", "code_blocks", "links", "suggested_questions"] {
            assert!(DEFAULT_SYSTEM_PROMPT.contains(field), "missing {field}");
        }
    }

    #[test]
    fn custom_instructions_are_appended() {
        let prompts = PromptSet::default();
        let request = AskRequest {
            custom_instructions: Some("Answer in French.".into()),
            ..Default::default()
        };
        let system = prompts.system_prompt_for(&request);
        assert!(system.starts_with(DEFAULT_SYSTEM_PROMPT));
        assert!(system.ends_with("Answer in French."));
    }

    #[test]
    fn blank_custom_instructions_are_ignored() {
        let prompts = PromptSet::default();
        let request = AskRequest {
            custom_instructions: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(prompts.system_prompt_for(&request), DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn empty_question_becomes_the_analyze_prompt() {
        let request = AskRequest {
            image: Some(vec![1, 2, 3]),
            ..Default::default()
        };
        assert_eq!(user_prompt_for(&request), ANALYZE_SCREEN_PROMPT);
    }

    #[test]
    fn question_with_image_is_framed_against_the_screenshot() {
        let request = AskRequest {
            question: "What is this error?".into(),
            image: Some(vec![1, 2, 3]),
            ..Default::default()
        };
        assert_eq!(
            user_prompt_for(&request),
            "Analyze the screenshot and answer: \"What is this error?\""
        );
    }

    #[test]
    fn question_without_image_passes_through() {
        let request = AskRequest {
            question: "What is a borrow checker?".into(),
            ..Default::default()
        };
        assert_eq!(user_prompt_for(&request), "What is a borrow checker?");
    }
}
