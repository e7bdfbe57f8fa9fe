//! Derives the literal tokens a raw placeholder string may appear as inside a
//! template's text.

/// Three or more consecutive underscores mark a blank line.
const BLANK_LINE: &str = "___";

fn has_underscore_run(value: &str) -> bool {
    value.contains(BLANK_LINE)
}

/// Inner text of a fully bracketed `[...]` string.
fn bracket_inner(value: &str) -> Option<&str> {
    value.strip_prefix('[')?.strip_suffix(']')
}

/// Insertion-ordered, de-duplicated token collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSet(Vec<String>);

impl TokenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: impl Into<String>) -> bool {
        let token = token.into();
        if token.is_empty() || self.0.contains(&token) {
            return false;
        }
        self.0.push(token);
        true
    }

    pub fn extend(&mut self, other: TokenSet) {
        for token in other.0 {
            self.insert(token);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for TokenSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Normalizes a field target, placeholder key or label into candidate tokens.
///
/// A run of three or more underscores makes the string itself a token, and a
/// fully bracketed string is a token together with its inner text when that
/// inner text is a blank line. Only when neither applies, `SNAKE_CASE` keys
/// become `[SNAKE CASE]` and multi-word strings are bracketed. Single words
/// yield nothing.
pub fn normalize_tokens(raw: &str) -> TokenSet {
    let mut tokens = TokenSet::new();
    let value = raw.trim();
    if value.is_empty() {
        return tokens;
    }

    if has_underscore_run(value) {
        tokens.insert(value);
    }

    if let Some(inner) = bracket_inner(value) {
        tokens.insert(value);
        let inner = inner.trim();
        if !inner.is_empty() && has_underscore_run(inner) {
            tokens.insert(inner);
        }
    }

    if !tokens.is_empty() {
        return tokens;
    }

    if value.contains('_') {
        let display = value.replace('_', " ");
        let display = display.trim();
        if !display.is_empty() {
            tokens.insert(format!("[{display}]"));
        }
    } else if value.contains(' ') {
        tokens.insert(format!("[{value}]"));
    }

    tokens
}

/// Bracketed token for a human readable label, e.g. `Company Name` becomes
/// `[Company Name]`. Already bracketed labels are kept as they are.
pub fn bracketed_label(label: &str) -> Option<String> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    if bracket_inner(label).is_some() {
        return Some(label.to_string());
    }
    Some(format!("[{label}]"))
}
