use serde::{Deserialize, Serialize};

/// A named blank detected in an uploaded template, persisted once per
/// `(document, key)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    /// Machine identifier, e.g. `company_name`.
    pub key: String,
    /// Human readable label, e.g. `Company Name`.
    pub label: String,
}
