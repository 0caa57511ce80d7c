//! Line classification: merge matching rules across tiers into one attribute set.

use std::sync::Arc;

use thiserror::Error;

use super::rules::{StyleRule, StyleTable, Tier};
use super::types::Attributes;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    /// No rule in any tier matched. Only possible with a table lacking a catch-all default.
    #[error("no style rule matched {text:?}; the rule table has no catch-all default")]
    ClassificationGap { text: String },
}

/// Classifies line text against a shared, immutable [`StyleTable`].
#[derive(Debug, Clone)]
pub struct Classifier {
    table: Arc<StyleTable>,
}

impl Classifier {
    pub fn new(table: StyleTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    pub const fn from_shared(table: Arc<StyleTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &StyleTable {
        &self.table
    }

    /// Final display attributes for `text`.
    ///
    /// The text is trimmed and lower-cased, then each tier contributes its
    /// first matching rule, merged in `Default → Primary → Override` order.
    ///
    /// # Errors
    /// Returns [`ClassifyError::ClassificationGap`] if no tier matched.
    pub fn classify(&self, text: &str) -> Result<Attributes, ClassifyError> {
        let matched = self.explain(text);
        if matched.is_empty() {
            return Err(ClassifyError::ClassificationGap {
                text: text.to_string(),
            });
        }
        let mut attributes = Attributes::new();
        for rule in matched {
            attributes.merge(rule.attributes());
        }
        Ok(attributes)
    }

    /// The rule selected in each tier that matched, in merge order.
    pub fn explain(&self, text: &str) -> Vec<&StyleRule> {
        let normalized = normalize_text(text);
        Tier::ALL
            .iter()
            .filter_map(|tier| {
                self.table
                    .tier(*tier)
                    .iter()
                    .find(|rule| rule.matches(&normalized))
            })
            .collect()
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(StyleTable::standard())
    }
}

fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase()
}
