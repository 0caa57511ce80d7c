//! Style rule table: ordered pattern → tier → attribute rules.

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use super::types::{AttrValue, Attributes, FontWeight, Rgb, TextDecoration};

/// Precedence class of a rule. Later tiers overwrite earlier ones key by key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Default,
    Primary,
    Override,
}

impl Tier {
    /// Tiers in merge order.
    pub const ALL: [Self; 3] = [Self::Default, Self::Primary, Self::Override];

    const fn index(self) -> usize {
        match self {
            Self::Default => 0,
            Self::Primary => 1,
            Self::Override => 2,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Primary => write!(f, "primary"),
            Self::Override => write!(f, "override"),
        }
    }
}

/// Errors raised while building a rule table from user input.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("invalid rule pattern '{pattern}': {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid color '{0}', expected #RRGGBB")]
    Color(String),

    #[error("rule file parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single compiled rule.
#[derive(Debug, Clone)]
pub struct StyleRule {
    pattern: Regex,
    tier: Tier,
    attributes: Attributes,
}

impl StyleRule {
    /// Compile a rule. Patterns are unanchored regular expressions.
    ///
    /// # Errors
    /// Returns [`RuleError::Regex`] if the pattern does not compile.
    pub fn new(pattern: &str, tier: Tier, attributes: Attributes) -> Result<Self, RuleError> {
        let pattern = Regex::new(pattern).map_err(|source| RuleError::Regex {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            pattern,
            tier,
            attributes,
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub const fn tier(&self) -> Tier {
        self.tier
    }

    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Whether the pattern occurs anywhere in `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Rules grouped per tier, each group kept in declaration order.
#[derive(Debug, Clone, Default)]
pub struct StyleTable {
    tiers: [Vec<StyleRule>; 3],
}

impl StyleTable {
    /// An empty table. Classifying with it always reports a gap.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in keyword table.
    pub fn standard() -> Self {
        let color = |hex: &str| {
            Attributes::new().with(AttrValue::Color(
                Rgb::from_hex(hex).expect("built-in colors are valid hex"),
            ))
        };

        let mut table = Self::new();
        for (keyword, hex) in [
            ("todo", "#A8C023"),
            ("idea", "#5FB8C0"),
            ("redo", "#C0547E"),
            ("info", "#FFD000"),
            ("talk", "#AE61FF"),
            ("task", "#FF942A"),
            ("hold", "#BDBDC0"),
        ] {
            table.push_builtin(keyword, Tier::Primary, color(hex));
        }
        table.push_builtin(
            r"\*",
            Tier::Override,
            color("#7b7b7b").with(AttrValue::TextDecoration(TextDecoration::LineThrough)),
        );
        table.push_builtin(
            r"\|",
            Tier::Override,
            Attributes::new().with(AttrValue::FontWeight(FontWeight::Bold)),
        );
        table.push_builtin(
            "",
            Tier::Default,
            color("#B2B3B8")
                .with(AttrValue::FontWeight(FontWeight::Normal))
                .with(AttrValue::TextDecoration(TextDecoration::None)),
        );
        table
    }

    /// Build a table from a JSON rule list.
    ///
    /// ```json
    /// [
    ///   { "pattern": "bug", "tier": "primary", "color": "#FF0000" },
    ///   { "pattern": "", "tier": "default", "color": "#B2B3B8", "weight": "normal" }
    /// ]
    /// ```
    ///
    /// # Errors
    /// Returns a [`RuleError`] for malformed JSON, patterns or colors.
    pub fn from_json(json: &str) -> Result<Self, RuleError> {
        let entries: Vec<RuleEntry> = serde_json::from_str(json)?;
        let mut table = Self::new();
        for entry in entries {
            let mut attributes = Attributes::new();
            if let Some(hex) = entry.color {
                let rgb = Rgb::from_hex(&hex).ok_or(RuleError::Color(hex))?;
                attributes.set(AttrValue::Color(rgb));
            }
            if let Some(weight) = entry.weight {
                attributes.set(AttrValue::FontWeight(weight));
            }
            if let Some(decoration) = entry.decoration {
                attributes.set(AttrValue::TextDecoration(decoration));
            }
            table.push(StyleRule::new(&entry.pattern, entry.tier, attributes)?);
        }
        Ok(table)
    }

    /// Append a rule to the end of its tier.
    pub fn push(&mut self, rule: StyleRule) {
        self.tiers[rule.tier.index()].push(rule);
    }

    /// Rules of one tier, in declaration order.
    pub fn tier(&self, tier: Tier) -> &[StyleRule] {
        &self.tiers[tier.index()]
    }

    /// All rules, tier by tier in merge order.
    pub fn rules(&self) -> impl Iterator<Item = &StyleRule> {
        self.tiers.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.tiers.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push_builtin(&mut self, pattern: &str, tier: Tier, attributes: Attributes) {
        let rule = StyleRule::new(pattern, tier, attributes).expect("built-in patterns compile");
        self.push(rule);
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleEntry {
    pattern: String,
    tier: Tier,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    weight: Option<FontWeight>,
    #[serde(default)]
    decoration: Option<TextDecoration>,
}
