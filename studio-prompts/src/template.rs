//! `{{variable}}` substitution for prompt text.

use std::collections::BTreeMap;
use std::fmt;

/// Result alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur while rendering templates.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TemplateError {
    /// A required variable was not provided.
    #[error("missing required variable: {name}")]
    MissingVariable {
        /// Name of the missing variable.
        name: String,
    },

    /// A `{{` was never closed.
    #[error("unterminated placeholder starting at byte {offset}")]
    Unterminated {
        /// Byte offset of the opening braces.
        offset: usize,
    },
}

/// Values substituted into a template.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PromptVars {
    values: BTreeMap<String, String>,
}

impl PromptVars {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variable.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.set(name, value);
        self
    }

    /// Adds a variable only when a value is present.
    #[must_use]
    pub fn with_opt<T: fmt::Display>(mut self, name: impl Into<String>, value: Option<T>) -> Self {
        if let Some(value) = value {
            self.set(name, value);
        }
        self
    }

    /// Sets a variable in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl fmt::Display) {
        self.values.insert(name.into(), value.to_string());
    }

    /// Returns a variable value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// Prompt text with `{{name}}` placeholders.
///
/// Placeholders listed as required must be supplied at render time; any other
/// placeholder without a value renders as an empty string.
///
/// # Examples
///
/// ```
/// use studio_prompts::template::{PromptTemplate, PromptVars};
///
/// let template = PromptTemplate::new("Ideas about {{niche}} for {{platform}}")
///     .require(&["niche"]);
/// let vars = PromptVars::new().with("niche", "home espresso").with("platform", "TikTok");
/// assert_eq!(
///     template.render(&vars).unwrap(),
///     "Ideas about home espresso for TikTok"
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptTemplate {
    text: &'static str,
    required: Vec<&'static str>,
}

impl PromptTemplate {
    /// Wraps static prompt text.
    #[must_use]
    pub const fn new(text: &'static str) -> Self {
        Self {
            text,
            required: Vec::new(),
        }
    }

    /// Declares variables that must be present at render time.
    #[must_use]
    pub fn require(mut self, names: &[&'static str]) -> Self {
        self.required.extend_from_slice(names);
        self
    }

    /// Returns the raw template text.
    #[must_use]
    pub const fn text(&self) -> &'static str {
        self.text
    }

    /// Returns the placeholder names in order of first appearance.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Unterminated`] when a placeholder is not closed.
    pub fn placeholders(&self) -> TemplateResult<Vec<String>> {
        let mut names = Vec::new();
        for segment in segments(self.text) {
            if let Segment::Placeholder(name) = segment? {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_owned());
                }
            }
        }
        Ok(names)
    }

    /// Renders the template with the supplied variables.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MissingVariable`] if a required variable is not
    /// set, or [`TemplateError::Unterminated`] for malformed template text.
    pub fn render(&self, vars: &PromptVars) -> TemplateResult<String> {
        if let Some(missing) = self.required.iter().find(|name| vars.get(name).is_none()) {
            return Err(TemplateError::MissingVariable {
                name: (*missing).to_owned(),
            });
        }

        let mut out = String::with_capacity(self.text.len());
        for segment in segments(self.text) {
            match segment? {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => out.push_str(vars.get(name).unwrap_or_default()),
            }
        }
        Ok(out)
    }
}

impl fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text)
    }
}

enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

fn segments(text: &str) -> impl Iterator<Item = TemplateResult<Segment<'_>>> {
    let mut rest = text;
    let mut consumed = 0;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let Some(open) = rest.find("{{") else {
            let literal = rest;
            rest = "";
            return Some(Ok(Segment::Literal(literal)));
        };
        if open > 0 {
            let literal = &rest[..open];
            rest = &rest[open..];
            consumed += open;
            return Some(Ok(Segment::Literal(literal)));
        }
        let Some(close) = rest.find("}}") else {
            let offset = consumed;
            rest = "";
            return Some(Err(TemplateError::Unterminated { offset }));
        };
        let name = rest[2..close].trim();
        rest = &rest[close + 2..];
        consumed += close + 2;
        Some(Ok(Segment::Placeholder(name)))
    })
}
