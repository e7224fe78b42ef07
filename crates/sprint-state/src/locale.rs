//! Localized labels
//!
//! Dictionaries are served as `key -> language -> text`. Lookups try the
//! active language, then the fallback language, then a caller default.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Localized dictionary: key -> language -> text
pub type LocalizedDict = HashMap<String, HashMap<String, String>>;

/// Message and attribute lookup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locales {
    /// Active language
    pub language: String,
    /// Language tried when the active one has no entry
    pub fallback_language: String,
    /// Message templates: key -> language -> template with `{0}`..`{n}`
    #[serde(default)]
    pub messages: LocalizedDict,
    /// Named attribute dictionaries (e.g. `short_units`, `descriptions`)
    #[serde(default)]
    pub attributes: HashMap<String, LocalizedDict>,
}

impl Locales {
    /// Create empty locales for a language
    #[must_use]
    pub fn new(language: impl Into<String>, fallback_language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            fallback_language: fallback_language.into(),
            messages: LocalizedDict::new(),
            attributes: HashMap::new(),
        }
    }

    /// With message templates
    #[must_use]
    pub fn with_messages(mut self, messages: LocalizedDict) -> Self {
        self.messages = messages;
        self
    }

    /// With a named attribute dictionary
    #[must_use]
    pub fn with_attributes(mut self, namespace: impl Into<String>, dict: LocalizedDict) -> Self {
        self.attributes.insert(namespace.into(), dict);
        self
    }

    /// Look up `key` in `dict`, or return `fallback`
    #[must_use]
    pub fn retrieve(&self, dict: &LocalizedDict, key: &str, fallback: &str) -> String {
        self.lookup(dict, key)
            .map_or_else(|| fallback.to_string(), str::to_string)
    }

    /// Look up `key` in a named attribute dictionary
    #[must_use]
    pub fn attribute(&self, namespace: &str, key: &str) -> Option<String> {
        self.attributes
            .get(namespace)
            .and_then(|dict| self.lookup(dict, key))
            .map(str::to_string)
    }

    /// Render a message template with positional arguments
    ///
    /// Unknown keys render as the key itself.
    #[must_use]
    pub fn message(&self, key: &str, args: &[&str]) -> String {
        let Some(template) = self.lookup(&self.messages, key) else {
            return key.to_string();
        };
        args.iter()
            .enumerate()
            .fold(template.to_string(), |text, (index, arg)| {
                text.replace(&format!("{{{index}}}"), arg)
            })
    }

    fn lookup<'a>(&self, dict: &'a LocalizedDict, key: &str) -> Option<&'a str> {
        let entry = dict.get(key)?;
        entry
            .get(&self.language)
            .or_else(|| entry.get(&self.fallback_language))
            .map(String::as_str)
    }
}
