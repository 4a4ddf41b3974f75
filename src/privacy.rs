//! Privacy redaction applied to everything before it leaves the process.
//!
//! Two tag vocabularies are recognized, each replaced by a fixed placeholder:
//!
//! | Markers | Placeholder |
//! |---------|-------------|
//! | `<private>…</private>` | `[private content removed]` |
//! | `<claude-mem-context>…</claude-mem-context>` | `[system context removed]` |
//!
//! Matching is case-insensitive, crosses newlines, and is non-greedy. An opening
//! marker without a closing marker is left verbatim, so unterminated secret spans
//! are not redacted.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

pub const PRIVATE_PLACEHOLDER: &str = "[private content removed]";
pub const CONTEXT_PLACEHOLDER: &str = "[system context removed]";

static PRIVATE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<private>.*?</private>").unwrap());
static CONTEXT_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<claude-mem-context>.*?</claude-mem-context>").unwrap()
});

/// Number of well-formed spans of each kind found in a text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TagCounts {
    pub private: usize,
    pub context: usize,
}

impl TagCounts {
    pub fn total(&self) -> usize {
        self.private + self.context
    }
}

/// Stateless stripper. All methods are pure functions of their input.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrivacyTagStripper;

impl PrivacyTagStripper {
    pub fn new() -> Self {
        Self
    }

    /// Replace every well-formed span with its placeholder.
    ///
    /// Secret spans are replaced first, so a context span nested inside a
    /// secret span disappears with it.
    pub fn strip_from_text(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        let without_private = PRIVATE_TAG.replace_all(text, PRIVATE_PLACEHOLDER);
        CONTEXT_TAG
            .replace_all(&without_private, CONTEXT_PLACEHOLDER)
            .into_owned()
    }

    /// Recursively strip string leaves, preserving the shape of the tree.
    pub fn strip_from_json(&self, value: &Value) -> Value {
        match value {
            Value::String(s) => Value::String(self.strip_from_text(s)),
            Value::Array(items) => {
                Value::Array(items.iter().map(|item| self.strip_from_json(item)).collect())
            }
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, item)| (key.clone(), self.strip_from_json(item)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    /// True if nothing but whitespace survives stripping.
    pub fn is_fully_private(&self, text: &str) -> bool {
        self.strip_from_text(text).trim().is_empty()
    }

    pub fn has_privacy_tags(&self, text: &str) -> bool {
        PRIVATE_TAG.is_match(text) || CONTEXT_TAG.is_match(text)
    }

    /// Spans that [`strip_from_text`](Self::strip_from_text) would replace.
    ///
    /// Context spans are counted after secret spans are removed, matching the
    /// replacement order.
    pub fn count_privacy_tags(&self, text: &str) -> TagCounts {
        let without_private = PRIVATE_TAG.replace_all(text, PRIVATE_PLACEHOLDER);
        TagCounts {
            private: PRIVATE_TAG.find_iter(text).count(),
            context: CONTEXT_TAG.find_iter(&without_private).count(),
        }
    }
}
