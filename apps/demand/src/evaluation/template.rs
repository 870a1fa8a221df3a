//! Named prompt templates with `{{ variable }}` placeholders.
//!
//! A template file in the templates folder overrides the built-in body, so the
//! rubric wording can be tuned without a rebuild.

use std::path::Path;

use tracing::info;

use crate::errors::AppError;

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    name: String,
    body: String,
}

impl PromptTemplate {
    pub fn inline(name: &str, body: &str) -> Self {
        Self {
            name: name.to_string(),
            body: body.to_string(),
        }
    }

    /// Loads `<templates_dir>/<name>`, falling back to `builtin` when the file is absent.
    pub fn load(templates_dir: &Path, name: &str, builtin: &str) -> Result<Self, AppError> {
        let path = templates_dir.join(name);
        if !path.exists() {
            return Ok(Self::inline(name, builtin));
        }
        let body = std::fs::read_to_string(&path).map_err(|e| AppError::io(&path, e))?;
        info!("Using prompt template {}", path.display());
        Ok(Self {
            name: name.to_string(),
            body,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Substitutes `{{ key }}` (inner whitespace optional) in a single pass.
    /// Unknown placeholders are left untouched; substituted text is never rescanned.
    pub fn render(&self, vars: &[(&str, &str)]) -> String {
        let mut out = String::with_capacity(self.body.len());
        let mut rest = self.body.as_str();

        while let Some(open) = rest.find("{{") {
            out.push_str(&rest[..open]);
            let after_open = &rest[open + 2..];
            let Some(close) = after_open.find("}}") else {
                out.push_str(&rest[open..]);
                return out;
            };

            let key = after_open[..close].trim();
            match vars.iter().find(|(k, _)| *k == key) {
                Some((_, value)) => out.push_str(value),
                None => out.push_str(&rest[open..open + 2 + close + 2]),
            }
            rest = &after_open[close + 2..];
        }

        out.push_str(rest);
        out
    }
}
