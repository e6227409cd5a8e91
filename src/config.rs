//! Validator configuration.
//!
//! Rules are application configuration, usually kept next to the form they
//! describe. A config file is a JSON object:
//!
//! ```json
//! {
//!   "rules": {
//!     "name": "required|alphanumerical|maxlen,30",
//!     "newsletter": "checkbox|integer",
//!     "notes": null
//!   },
//!   "separator": " ",
//!   "html_separator": "<br />"
//! }
//! ```
//!
//! Separators are optional. A `null` rule is kept as "no check defined" so
//! the field is rejected rather than silently skipped.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default separator for [`Validator::all_errors`](crate::Validator::all_errors).
pub const DEFAULT_SEPARATOR: &str = " ";

/// Default separator for [`Validator::all_errors_html`](crate::Validator::all_errors_html).
pub const DEFAULT_HTML_SEPARATOR: &str = "<br />";

/// Rules mapping plus error rendering options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Field name to rule string; `null` means no rule.
    #[serde(default)]
    pub rules: IndexMap<String, Option<String>>,
    /// Separator between messages in plain error text.
    #[serde(default = "default_separator")]
    pub separator: String,
    /// Separator between messages in HTML error text.
    #[serde(default = "default_html_separator")]
    pub html_separator: String,
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

fn default_html_separator() -> String {
    DEFAULT_HTML_SEPARATOR.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rules: IndexMap::new(),
            separator: default_separator(),
            html_separator: default_html_separator(),
        }
    }
}

impl Config {
    /// Parse a config from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }
}
