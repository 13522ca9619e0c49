//! Grounded prompt composition.

use crate::config::Prompts;
use crate::session::Exchange;
use std::collections::HashMap;

/// Builds the prompt sent to the generator. Pure: the same inputs always give
/// the same prompt.
#[derive(Debug, Clone, Default)]
pub struct PromptComposer {
    prompts: Prompts,
}

impl PromptComposer {
    pub fn new(prompts: Prompts) -> Self {
        Self { prompts }
    }

    /// The phrase the model is told to answer with when the passages do not cover the question.
    pub fn fallback(&self) -> &str {
        &self.prompts.qa.fallback
    }

    /// Compose a prompt from retrieved passages (in retrieval order), the
    /// question, and the last `max_history` exchanges.
    pub fn compose(
        &self,
        passages: &[String],
        question: &str,
        history: &[Exchange],
        max_history: usize,
    ) -> String {
        let qa = &self.prompts.qa;

        let mut system_vars = HashMap::new();
        system_vars.insert("fallback".to_string(), qa.fallback.clone());
        let system = self.prompts.render_with_custom(&qa.system, &system_vars);

        let passages_block = passages
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let mut vars = HashMap::new();
                vars.insert("number".to_string(), (i + 1).to_string());
                vars.insert("text".to_string(), text.clone());
                Prompts::render(&qa.passage, &vars)
            })
            .collect::<Vec<_>>()
            .join("\n");

        let recent = &history[history.len().saturating_sub(max_history)..];
        let history_block = if recent.is_empty() {
            String::new()
        } else {
            let exchanges = recent
                .iter()
                .map(|exchange| {
                    let mut vars = HashMap::new();
                    vars.insert("question".to_string(), exchange.question.clone());
                    vars.insert("answer".to_string(), exchange.answer.clone());
                    Prompts::render(&qa.exchange, &vars)
                })
                .collect::<Vec<_>>()
                .join("\n\n");
            format!("\nConversation so far:\n{}\n", exchanges)
        };

        let mut vars = HashMap::new();
        vars.insert("system".to_string(), system);
        vars.insert("passages".to_string(), passages_block);
        vars.insert("history".to_string(), history_block);
        vars.insert("question".to_string(), question.to_string());

        self.prompts.render_with_custom(&qa.user, &vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FALLBACK_ANSWER;

    fn exchanges(n: usize) -> Vec<Exchange> {
        (0..n)
            .map(|i| Exchange::new(format!("question {}", i), format!("answer {}", i)))
            .collect()
    }

    #[test]
    fn test_passages_are_numbered_in_order() {
        let composer = PromptComposer::default();
        let prompt = composer.compose(
            &["Dogs are mammals too.".to_string(), "Cats are mammals.".to_string()],
            "Are dogs mammals?",
            &[],
            6,
        );

        let first = prompt.find("[1] Dogs are mammals too.").unwrap();
        let second = prompt.find("[2] Cats are mammals.").unwrap();
        assert!(first < second);
        assert!(prompt.contains("Question: Are dogs mammals?"));
        assert!(prompt.contains(FALLBACK_ANSWER));
        assert!(!prompt.contains("{{"));
        assert!(!prompt.contains("Conversation so far"));
    }

    #[test]
    fn test_history_window_keeps_most_recent() {
        let composer = PromptComposer::default();
        let prompt = composer.compose(&["text".to_string()], "next?", &exchanges(10), 3);

        for i in 0..7 {
            assert!(!prompt.contains(&format!("Q: question {}\n", i)), "{}", i);
        }
        let positions: Vec<usize> = (7..10)
            .map(|i| prompt.find(&format!("Q: question {}\nA: answer {}", i, i)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_zero_history_window() {
        let composer = PromptComposer::default();
        let prompt = composer.compose(&["text".to_string()], "q", &exchanges(4), 0);
        assert!(!prompt.contains("question 3"));
    }

    #[test]
    fn test_passage_text_is_verbatim() {
        let composer = PromptComposer::default();
        let tricky = "Use {{question}} literally, and {{fallback}}.";
        let prompt = composer.compose(&[tricky.to_string()], "real question", &[], 6);
        assert!(prompt.contains(tricky));
    }

    #[test]
    fn test_deterministic() {
        let composer = PromptComposer::default();
        let history = exchanges(2);
        let a = composer.compose(&["x".to_string()], "q", &history, 6);
        let b = composer.compose(&["x".to_string()], "q", &history, 6);
        assert_eq!(a, b);
    }
}
