//! Locators and versioned locator tables.
//!
//! A [`Locator`] is a symbolic query evaluated relative to a scope. Page
//! objects never hard-code selector strings; they ask the session's
//! [`LocatorTable`] for `component -> key` entries, so a new application
//! release only needs a new table.
//!
//! Table values are plain strings. Most are selectors; a few are attribute
//! names (`itemText`, `level`) and are read with [`LocatorTable::value`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::result::{PagekitError, PagekitResult};

/// Built-in locator table for application release 1.61.0
const BUILTIN_1_61_0: &str = include_str!("../locators/1.61.0.yaml");

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selector {
    /// CSS selector (e.g., ".monaco-list-row")
    Css(String),
    /// XPath selector (e.g., ".//span[text()='foo']")
    XPath(String),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(selector: impl Into<String>) -> Self {
        Self::XPath(selector.into())
    }

    /// Classify a raw table string the way WebDriver clients do:
    /// strings starting with `/`, `./` or `(` are XPath, anything else is CSS.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with('/') || raw.starts_with("./") || raw.starts_with('(') {
            Self::XPath(raw.to_string())
        } else {
            Self::Css(raw.to_string())
        }
    }

    /// The raw selector string
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Css(s) | Self::XPath(s) => s,
        }
    }

    /// Replace every `{name}` placeholder with `value`
    #[must_use]
    pub fn fill(&self, name: &str, value: &str) -> Self {
        let pattern = format!("{{{name}}}");
        match self {
            Self::Css(s) => Self::Css(s.replace(&pattern, value)),
            Self::XPath(s) => Self::XPath(s.replace(&pattern, value)),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css={s}"),
            Self::XPath(s) => write!(f, "xpath={s}"),
        }
    }
}

/// A named selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    selector: Selector,
    name: Option<String>,
}

impl Locator {
    /// Create a locator with a CSS selector
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::Css(selector.into()))
    }

    /// Create a locator from a selector
    #[must_use]
    pub const fn from_selector(selector: Selector) -> Self {
        Self {
            selector,
            name: None,
        }
    }

    /// Create a locator from a raw table string
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        Self::from_selector(Selector::parse(raw))
    }

    /// Attach a human-readable name used in error messages
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Fill a `{name}` placeholder
    #[must_use]
    pub fn fill(&self, name: &str, value: &str) -> Self {
        Self {
            selector: self.selector.fill(name, value),
            name: self.name.clone(),
        }
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Get the name, if any
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} ({})", self.selector),
            None => write!(f, "{}", self.selector),
        }
    }
}

/// Locator strings for one application release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorTable {
    /// Application release the table targets
    pub version: String,
    /// `component -> key -> raw string`
    pub components: BTreeMap<String, BTreeMap<String, String>>,
}

impl LocatorTable {
    /// Versions with a table compiled into the crate
    pub const BUILTIN_VERSIONS: &'static [&'static str] = &["1.61.0"];

    /// Load a built-in table
    pub fn builtin(version: &str) -> PagekitResult<Self> {
        match version {
            "1.61.0" => Self::from_yaml(BUILTIN_1_61_0),
            other => Err(PagekitError::UnknownVersion {
                version: other.to_string(),
            }),
        }
    }

    /// Parse a table from YAML
    pub fn from_yaml(source: &str) -> PagekitResult<Self> {
        Ok(serde_yaml_ng::from_str(source)?)
    }

    /// Parse a table from JSON
    pub fn from_json(source: &str) -> PagekitResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Load a table from a `.yaml`, `.yml` or `.json` file
    pub fn from_path(path: impl AsRef<Path>) -> PagekitResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&source),
            _ => Self::from_yaml(&source),
        }
    }

    /// Raw string for `component.key`
    pub fn value(&self, component: &str, key: &str) -> PagekitResult<&str> {
        self.components
            .get(component)
            .and_then(|keys| keys.get(key))
            .map(String::as_str)
            .ok_or_else(|| PagekitError::LocatorMissing {
                component: component.to_string(),
                key: key.to_string(),
            })
    }

    /// Locator for `component.key`, named after the entry
    pub fn locator(&self, component: &str, key: &str) -> PagekitResult<Locator> {
        let raw = self.value(component, key)?;
        Ok(Locator::parse(raw).named(format!("{component}.{key}")))
    }

    /// Whether the table has an entry for `component.key`
    #[must_use]
    pub fn contains(&self, component: &str, key: &str) -> bool {
        self.value(component, key).is_ok()
    }

    /// Overlay entries from another table (later wins)
    #[must_use]
    pub fn merged(mut self, overrides: &Self) -> Self {
        for (component, keys) in &overrides.components {
            let target = self.components.entry(component.clone()).or_default();
            for (key, value) in keys {
                let _ = target.insert(key.clone(), value.clone());
            }
        }
        self
    }
}
