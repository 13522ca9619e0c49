//! Prompt templates for tubechat.
//!
//! Prompts can be customized by placing a `qa.toml` file in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// The exact answer the model is told to give when the passages do not cover a question.
pub const FALLBACK_ANSWER: &str =
    "I don't know — the video transcript does not contain that information.";

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Prompts {
    pub qa: QaPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for grounded question answering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QaPrompts {
    /// Grounding instruction placed at the top of every prompt.
    pub system: String,
    /// Layout of a single numbered passage.
    pub passage: String,
    /// Layout of a single previous exchange.
    pub exchange: String,
    /// Overall prompt layout.
    pub user: String,
    /// Answer emitted when the context is insufficient.
    pub fallback: String,
}

impl Default for QaPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are an assistant that answers questions about a video using ONLY the numbered transcript passages below.

Rules:
- Use only information stated in the passages. Do not use outside knowledge, even if you know the answer.
- If the passages do not contain the answer, reply with exactly: "{{fallback}}"
- Cite the passage numbers you relied on, for example [2].
- Keep answers concise."#
                .to_string(),

            passage: "[{{number}}] {{text}}".to_string(),

            exchange: "Q: {{question}}\nA: {{answer}}".to_string(),

            user: r#"{{system}}

Transcript passages:
{{passages}}
{{history}}
Question: {{question}}

Answer:"#
                .to_string(),

            fallback: FALLBACK_ANSWER.to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let qa_path = custom_path.join("qa.toml");
            if qa_path.exists() {
                let content = std::fs::read_to_string(&qa_path)?;
                prompts.qa = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Single pass: substituted values are never scanned again, so transcript text
    /// that happens to contain `{{...}}` is left alone. Unknown placeholders are kept.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find("{{") {
            result.push_str(&rest[..open]);
            let after_open = &rest[open + 2..];
            match after_open.find("}}") {
                Some(close) => {
                    let key = &after_open[..close];
                    match vars.get(key) {
                        Some(value) => result.push_str(value),
                        None => {
                            result.push_str("{{");
                            result.push_str(key);
                            result.push_str("}}");
                        }
                    }
                    rest = &after_open[close + 2..];
                }
                None => {
                    result.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }

        result.push_str(rest);
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.qa.system.contains("{{fallback}}"));
        assert!(prompts.qa.system.contains("ONLY"));
        assert_eq!(prompts.qa.fallback, FALLBACK_ANSWER);
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_render_does_not_rescan_values() {
        let mut vars = HashMap::new();
        vars.insert("text".to_string(), "literal {{question}}".to_string());
        vars.insert("question".to_string(), "injected".to_string());

        let result = Prompts::render("{{text}} / {{missing}} / {{question}}", &vars);
        assert_eq!(result, "literal {{question}} / {{missing}} / injected");
    }

    #[test]
    fn test_provided_vars_override_custom() {
        let mut prompts = Prompts::default();
        prompts
            .variables
            .insert("channel".to_string(), "config".to_string());

        let mut vars = HashMap::new();
        vars.insert("channel".to_string(), "call".to_string());
        assert_eq!(prompts.render_with_custom("{{channel}}", &vars), "call");
        assert_eq!(prompts.render_with_custom("{{channel}}", &HashMap::new()), "config");
    }

    #[test]
    fn test_load_custom_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("qa.toml"),
            "fallback = \"Not covered by this video.\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.qa.fallback, "Not covered by this video.");
        // Fields absent from the file keep their defaults
        assert!(prompts.qa.system.contains("{{fallback}}"));
    }
}
