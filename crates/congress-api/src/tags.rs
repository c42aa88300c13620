//! Validated tag store shared by applications, devices and gateways.
//!
//! Tag names and values are limited to letters, digits and `-_+@ ,.=:`.
//! Names are matched case-insensitively; they are stored lower-cased so the
//! JSON sent to the backend carries one spelling per name.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Punctuation allowed in tag names and values besides ASCII letters and digits.
const TAG_PUNCTUATION: &[char] = &['-', '_', '+', '@', ' ', ',', '.', '=', ':'];

/// Whether `text` only uses characters the backend accepts in tags.
pub fn is_valid_tag_text(text: &str) -> bool {
    text.chars()
        .all(|c| c.is_ascii_alphanumeric() || TAG_PUNCTUATION.contains(&c))
}

/// Key/value annotations attached to an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a tag. Returns `false` and leaves the store untouched when the
    /// name or value contains a disallowed character.
    pub fn set(&mut self, name: &str, value: &str) -> bool {
        if !is_valid_tag_text(name) || !is_valid_tag_text(value) {
            return false;
        }
        self.0.insert(name.to_lowercase(), value.to_owned());
        true
    }

    /// Look up a tag by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Remove a tag, returning its previous value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<'de> Deserialize<'de> for Tags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // The backend may answer `null` for an untagged entity.
        let raw = Option::<BTreeMap<String, String>>::deserialize(deserializer)?;
        Ok(Self(
            raw.unwrap_or_default()
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect(),
        ))
    }
}

/// An entity that carries [`Tags`].
pub trait Tagged {
    fn tags(&self) -> &Tags;

    fn tags_mut(&mut self) -> &mut Tags;

    /// See [`Tags::set`].
    fn set_tag(&mut self, name: &str, value: &str) -> bool {
        self.tags_mut().set(name, value)
    }

    /// Tag value by case-insensitive name, `""` when unset.
    fn tag(&self, name: &str) -> &str {
        self.tags().get(name).unwrap_or("")
    }
}
