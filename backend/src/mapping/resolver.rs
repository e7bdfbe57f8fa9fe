//! Resolves schema fields and submitted answers into the token → value
//! mapping applied to the template.

use super::tokens::{bracketed_label, normalize_tokens, TokenSet};
use super::Mapping;
use common::model::answer::{AnswerBody, AnswerValue};
use common::model::document::{ParseResult, ParsedPlaceholder};
use common::model::placeholder::Placeholder;
use common::model::schema::{Field, Schema};
use log::debug;
use std::collections::HashMap;

/// Placeholder metadata of one document, keyed by placeholder key.
#[derive(Debug, Default)]
pub struct PlaceholderIndex<'a> {
    parsed: HashMap<&'a str, &'a ParsedPlaceholder>,
    labels: HashMap<&'a str, &'a str>,
}

impl<'a> PlaceholderIndex<'a> {
    /// Builds the index from the parse result and the persisted placeholder rows.
    pub fn new(parse_result: Option<&'a ParseResult>, placeholders: &'a [Placeholder]) -> Self {
        let mut index = Self::default();
        if let Some(parsed) = parse_result {
            for placeholder in &parsed.placeholders {
                index.parsed.entry(placeholder.key.as_str()).or_insert(placeholder);
                index
                    .labels
                    .entry(placeholder.key.as_str())
                    .or_insert(placeholder.label.as_str());
            }
        }
        for placeholder in placeholders {
            index
                .labels
                .insert(placeholder.key.as_str(), placeholder.label.as_str());
        }
        index
    }

    fn parsed(&self, key: &str) -> Option<&'a ParsedPlaceholder> {
        self.parsed.get(key).copied()
    }

    fn label(&self, key: &str) -> Option<&'a str> {
        self.labels.get(key).copied()
    }
}

/// Normalized tokens captured for a placeholder during parsing.
fn captured_tokens(placeholder: &ParsedPlaceholder) -> TokenSet {
    let mut tokens = TokenSet::new();
    for raw in &placeholder.tokens {
        tokens.extend(normalize_tokens(raw));
    }
    tokens
}

/// Candidate tokens of one field: explicit targets first, then the parse-time
/// metadata of the field's own key, then a bracketed label.
fn field_tokens(field: &Field, index: &PlaceholderIndex<'_>) -> TokenSet {
    let mut tokens = TokenSet::new();

    for target in &field.targets {
        tokens.extend(normalize_tokens(target));
        if let Some(placeholder) = index.parsed(target.trim()) {
            tokens.extend(captured_tokens(placeholder));
        }
    }
    if !tokens.is_empty() {
        return tokens;
    }

    if let Some(placeholder) = index.parsed(&field.key) {
        tokens.extend(captured_tokens(placeholder));
        if tokens.is_empty() {
            if let Some(token) = bracketed_label(&placeholder.label) {
                tokens.insert(token);
            }
        }
    }
    if !tokens.is_empty() {
        return tokens;
    }

    let label = index
        .label(&field.key)
        .filter(|label| !label.trim().is_empty())
        .unwrap_or(field.label.as_str());
    if let Some(token) = bracketed_label(label) {
        tokens.insert(token);
    }
    tokens
}

/// Computes the token → value mapping for a document.
///
/// Fields are visited in schema order and a token keeps the value of the first
/// field that claims it. Fields without an answer, with a null answer, or
/// without any resolvable token contribute nothing.
pub fn resolve_mapping(
    schema: &Schema,
    answers: &AnswerBody,
    index: &PlaceholderIndex<'_>,
) -> Mapping {
    let mut mapping = Mapping::new();

    for field in schema.fields() {
        let Some(value) = answers.get(&field.key).and_then(AnswerValue::fill_text) else {
            continue;
        };

        let tokens = field_tokens(field, index);
        if tokens.is_empty() {
            debug!("field {} resolved to no tokens", field.key);
            continue;
        }
        for token in tokens {
            if !mapping.insert_if_absent(token.as_str(), value.as_str()) {
                debug!("token {} already claimed, skipped for field {}", token, field.key);
            }
        }
    }

    mapping
}
