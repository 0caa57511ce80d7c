//! Keyword styling.
//!
//! This module handles:
//! - The ordered style rule table (per tier, declaration order)
//! - Classifying a line's text into merged display attributes

mod classify;
mod rules;
mod types;

pub use classify::{ClassifyError, Classifier};
pub use rules::{RuleError, StyleRule, StyleTable, Tier};
pub use types::{AttrName, AttrValue, Attributes, FontWeight, Rgb, TextDecoration};
