//! Declarative guardrail and link-attachment rules.
//!
//! Both components are pure functions over static rule tables: the
//! [`GuardrailClassifier`] decides whether a turn short-circuits retrieval
//! entirely (safety, greeting, out-of-scope), and the [`LinkScorer`] decides
//! whether an authoritative reference link is appended to a generated answer.
//! Rule tables ship with built-in defaults and can be overridden from a TOML
//! file at startup; a load or validation failure is fatal.

/// Guardrail classification (safety / greeting / out-of-scope).
pub mod guardrail;
/// Weighted-phrase link relevance scoring.
pub mod links;

pub use guardrail::{GuardrailClassifier, GuardrailConfig, GuardrailOutcome};
pub use links::{LinkHit, LinkRule, LinkScorer, PhraseWeight};

use counselor_core::{CounselorError, CounselorResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The full rule set: guardrails plus link rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSet {
    /// Guardrail trigger phrases and response templates.
    #[serde(default)]
    pub guardrails: GuardrailConfig,
    /// Link-attachment rules; replaces the built-in table when non-empty.
    #[serde(default = "LinkRule::default_rules")]
    pub links: Vec<LinkRule>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            guardrails: GuardrailConfig::default(),
            links: LinkRule::default_rules(),
        }
    }
}

impl RuleSet {
    /// Load a rule set from a TOML file, falling back to built-in defaults
    /// when `path` is `None`. Errors are [`CounselorError::Config`] and must
    /// abort startup.
    pub fn load(path: Option<&Path>) -> CounselorResult<Self> {
        let rules = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    CounselorError::Config(format!(
                        "Cannot read rules file {}: {e}",
                        path.display()
                    ))
                })?;
                toml::from_str(&raw).map_err(|e| {
                    CounselorError::Config(format!(
                        "Invalid rules file {}: {e}",
                        path.display()
                    ))
                })?
            }
            None => Self::default(),
        };
        rules.validate()?;
        Ok(rules)
    }

    /// Validate the rule set. Called by [`RuleSet::load`]; also usable on a
    /// hand-built set.
    pub fn validate(&self) -> CounselorResult<()> {
        for rule in &self.links {
            if rule.url.trim().is_empty() || rule.title.trim().is_empty() {
                return Err(CounselorError::Config(format!(
                    "Link rule '{}' is missing a title or url",
                    rule.category
                )));
            }
            if rule.phrases.is_empty() {
                return Err(CounselorError::Config(format!(
                    "Link rule '{}' has no trigger phrases",
                    rule.category
                )));
            }
            if rule.phrases.iter().any(|p| p.weight == 0 || p.text.trim().is_empty()) {
                return Err(CounselorError::Config(format!(
                    "Link rule '{}' has an empty or zero-weight phrase",
                    rule.category
                )));
            }
        }
        if self.guardrails.safety_triggers.is_empty() {
            return Err(CounselorError::Config(
                "Guardrail config has no safety triggers".to_string(),
            ));
        }
        Ok(())
    }
}
