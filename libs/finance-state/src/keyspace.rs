//! Key naming for conversation state
//!
//! Every per-user record lives under `<prefix>:<user id>`.

use serde::{Deserialize, Serialize};

/// Key prefixes, one per kind of per-user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeySpace {
    pub expense_prefix: String,
    pub status_prefix: String,
}

impl Default for KeySpace {
    fn default() -> Self {
        Self {
            expense_prefix: "expense".to_string(),
            status_prefix: "status".to_string(),
        }
    }
}

/// Key of one record, e.g. `expense:42`
pub fn scoped_key(prefix: &str, id: &str) -> String {
    format!("{}:{}", prefix, id)
}
