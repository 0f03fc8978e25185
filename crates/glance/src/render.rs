// SPDX-FileCopyrightText: 2026 Glance Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal rendering of structured answers.

use colored::Colorize;

use glance_core::StructuredAnswer;

/// Prints the four answer fields: response text, labeled code panels,
/// links, and numbered follow-up questions.
pub fn render_answer(answer: &StructuredAnswer) {
    println!("{}", answer.response);

    for block in &answer.code_blocks {
        println!();
        println!("{} {}", "---".dimmed(), block.language.bold());
        println!("{}", block.code);
        if !block.description.is_empty() {
            println!("{}", block.description.dimmed());
        }
    }

    if !answer.links.is_empty() {
        println!();
        println!("{}", "Links".bold());
        for link in &answer.links {
            if link.description.is_empty() {
                println!("  {} - {}", link.title, link.url.blue().underline());
            } else {
                println!(
                    "  {} - {} ({})",
                    link.title,
                    link.url.blue().underline(),
                    link.description.dimmed()
                );
            }
        }
    }

    if !answer.suggested_questions.is_empty() {
        println!();
        println!("{}", "Follow-ups".bold());
        for (index, question) in answer.suggested_questions.iter().enumerate() {
            println!("  {}. {question}", index + 1);
        }
    }
}
