//! Theme presets and style resolution.
//!
//! A theme maps semantic style keys (`header`, `error`, `table.header`, ...) to
//! style descriptors such as `"bold white on #3b82f6"`. Descriptors are opaque
//! here; only the renderer interprets them.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const DARK: &[(&str, &str)] = &[
    ("accent", "bold white on #3b82f6"),
    ("rule", "dim"),
    ("success", "bold green"),
    ("info", "bold cyan"),
    ("warning", "bold yellow"),
    ("error", "bold red"),
    ("panel", "cyan"),
    ("header", "bold white on #0ea5e9"),
    ("table.header", "bold magenta"),
    ("key", "bold green"),
    ("value", "white"),
    ("code.border", "magenta"),
    ("event.INFO", "cyan"),
    ("event.SUCCESS", "green"),
    ("event.WARNING", "yellow"),
    ("event.ERROR", "red"),
];

const LIGHT: &[(&str, &str)] = &[
    ("accent", "bold black on #93c5fd"),
    ("rule", "grey66"),
    ("success", "green"),
    ("info", "blue"),
    ("warning", "dark_orange"),
    ("error", "red"),
    ("panel", "blue"),
    ("header", "bold black on #7dd3fc"),
    ("table.header", "bold purple"),
    ("key", "blue"),
    ("value", "black"),
    ("code.border", "purple"),
    ("event.INFO", "blue"),
    ("event.SUCCESS", "green"),
    ("event.WARNING", "dark_orange"),
    ("event.ERROR", "red"),
];

const MONO: &[(&str, &str)] = &[
    ("accent", "reverse"),
    ("rule", "dim"),
    ("success", "bold"),
    ("info", "bold"),
    ("warning", "bold"),
    ("error", "bold"),
    ("panel", "white"),
    ("header", "reverse"),
    ("table.header", "bold"),
    ("key", "bold"),
    ("value", "white"),
    ("code.border", "white"),
    ("event.INFO", "white"),
    ("event.SUCCESS", "white"),
    ("event.WARNING", "white"),
    ("event.ERROR", "white"),
];

/// Built-in theme presets
///
/// Deserializes through [`FromStr`], so config files accept any casing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ThemeName {
    #[default]
    Dark,
    Light,
    Mono,
}

impl ThemeName {
    pub const ALL: [ThemeName; 3] = [ThemeName::Dark, ThemeName::Light, ThemeName::Mono];

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeName::Dark => "dark",
            ThemeName::Light => "light",
            ThemeName::Mono => "mono",
        }
    }

    /// Syntax highlighting theme for code blocks; mono leaves code plain.
    pub fn syntax_theme(self) -> Option<&'static str> {
        match self {
            ThemeName::Dark => Some("base16-ocean.dark"),
            ThemeName::Light => Some("InspiredGitHub"),
            ThemeName::Mono => None,
        }
    }

    fn preset(self) -> &'static [(&'static str, &'static str)] {
        match self {
            ThemeName::Dark => DARK,
            ThemeName::Light => LIGHT,
            ThemeName::Mono => MONO,
        }
    }
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for ThemeName {
    type Error = Error;

    fn try_from(name: String) -> Result<Self> {
        name.parse()
    }
}

impl FromStr for ThemeName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "dark" => Ok(ThemeName::Dark),
            "light" => Ok(ThemeName::Light),
            "mono" => Ok(ThemeName::Mono),
            _ => {
                let choices: Vec<&str> = ThemeName::ALL.iter().map(|t| t.as_str()).collect();
                Err(Error::InvalidConfiguration(format!(
                    "Unknown theme '{s}'. Choose from: {}",
                    choices.join(", ")
                )))
            }
        }
    }
}

/// Ordered mapping from semantic style key to style descriptor.
///
/// The key set is open: overrides may introduce keys no preset defines.
/// Lookups of absent keys return `None`, which callers pass to the renderer
/// as "use your default style".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleMap(IndexMap<String, String>);

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Look up `key`, falling back to `default` when the theme does not define it.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn insert(&mut self, key: impl Into<String>, descriptor: impl Into<String>) {
        self.0.insert(key.into(), descriptor.into());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
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

    /// Overlay `overrides` on top of this map; override values win.
    fn merge(&mut self, overrides: &StyleMap) {
        for (key, descriptor) in overrides.iter() {
            self.insert(key, descriptor);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StyleMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A resolved theme: preset name plus the merged style map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    name: ThemeName,
    styles: StyleMap,
}

impl Theme {
    pub fn name(&self) -> ThemeName {
        self.name
    }

    pub fn styles(&self) -> &StyleMap {
        &self.styles
    }

    pub fn style(&self, key: &str) -> Option<&str> {
        self.styles.get(key)
    }

    pub fn style_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.styles.get_or(key, default)
    }
}

/// Unmodified preset styles for `name`.
pub fn preset(name: ThemeName) -> StyleMap {
    name.preset().iter().copied().collect()
}

/// Resolve a theme by name and merge `overrides` on top of the preset.
pub fn resolve(name: &str, overrides: Option<&StyleMap>) -> Result<Theme> {
    let name: ThemeName = name.parse()?;
    Ok(resolve_preset(name, overrides))
}

pub fn resolve_preset(name: ThemeName, overrides: Option<&StyleMap>) -> Theme {
    let mut styles = preset(name);
    if let Some(overrides) = overrides {
        styles.merge(overrides);
    }
    Theme { name, styles }
}
