//! Prompt templates for the question view
//!
//! Each request carries the modal title shown while waiting and the prompt
//! sent to the model.

use crate::catalog::{Approach, Question};

/// What the user asked the assistant for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistKind {
    /// A nudge in the right direction, no code
    Hint,
    /// Line-by-line walkthrough of one approach's code
    Explain {
        /// Index into the question's approaches
        approach: usize,
    },
    /// A new approach not already listed
    Suggest,
}

/// A composed request ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistRequest {
    pub kind: AssistKind,
    /// Modal title
    pub title: String,
    pub prompt: String,
}

impl AssistRequest {
    /// Compose the prompt for `kind`, or `None` if the approach does not exist
    pub fn compose(kind: AssistKind, question: &Question) -> Option<Self> {
        let (title, prompt) = match kind {
            AssistKind::Hint => ("AI Generated Hint".to_string(), hint(question)),
            AssistKind::Explain { approach } => {
                let approach = question.approaches.get(approach)?;
                (format!("Explanation for: {}", approach.title), explain(question, approach))
            }
            AssistKind::Suggest => ("Suggested Alternative Approach".to_string(), suggest(question)),
        };
        Some(Self { kind, title, prompt })
    }
}

pub fn hint(question: &Question) -> String {
    format!(
        "I'm a programmer trying to solve the coding problem \"{}\". Give me a high-level hint \
         to get started. Do not give me the code. Just give one or two sentences to point me \
         in the right direction.",
        question.name
    )
}

pub fn explain(question: &Question, approach: &Approach) -> String {
    format!(
        "I'm a programmer learning C++. Please explain the following code for the problem \
         \"{}\" in a clear, line-by-line format. Explain the purpose of key variables and logic \
         blocks.\n\n```cpp\n{}\n```",
        question.name, approach.code
    )
}

pub fn suggest(question: &Question) -> String {
    let existing =
        question.approaches.iter().map(|a| a.title.as_str()).collect::<Vec<_>>().join(", ");
    format!(
        "For the coding problem \"{}\", the current known approaches are: {}. Suggest a \
         different, valid approach to solve this problem. Describe the strategy and provide a \
         clean, well-commented C++ implementation for this new approach. Format the response \
         with a \"Strategy:\" section and a \"Code:\" section.",
        question.name, existing
    )
}
