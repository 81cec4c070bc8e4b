//! Configuration loading and parsing.
//!
//! Parses `oxbuf.toml` (or an override path supplied by the binary). Every section and field is
//! optional; absent values take the defaults below. A missing file yields the defaults silently,
//! a file that fails to parse yields the defaults with a `warn` under target `config`. Unknown
//! fields are ignored so newer files keep loading on older builds.
//!
//! ```toml
//! [history]
//! max_depth = 1000   # 0 keeps every entry
//! coalesce = true    # merge typed characters into one undo step
//!
//! [syntax]
//! default_language = "plain"
//! [[syntax.languages]]
//! name = "lua"
//! extensions = ["lua"]
//! keywords = ["local", "function", "end"]
//! line_comment = "--"
//!
//! [io]
//! line_ending = "detect"   # or "lf" / "crlf"
//! ```

use anyhow::Result;
use core_syntax::LanguageSpec;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    #[serde(default = "HistoryConfig::default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "HistoryConfig::default_coalesce")]
    pub coalesce: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: Self::default_max_depth(),
            coalesce: Self::default_coalesce(),
        }
    }
}

impl HistoryConfig {
    const fn default_max_depth() -> usize {
        1000
    }
    const fn default_coalesce() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SyntaxConfig {
    /// Used when a file's extension matches no language.
    #[serde(default = "SyntaxConfig::default_language")]
    pub default_language: String,
    /// Added to the built-in languages; an entry with a built-in name replaces it.
    #[serde(default)]
    pub languages: Vec<LanguageSpec>,
}

impl Default for SyntaxConfig {
    fn default() -> Self {
        Self {
            default_language: Self::default_language(),
            languages: Vec::new(),
        }
    }
}

impl SyntaxConfig {
    fn default_language() -> String {
        "plain".to_string()
    }
}

/// Terminator used when saving.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LineEndingPolicy {
    /// Keep whatever style the file was loaded with.
    #[default]
    Detect,
    Lf,
    Crlf,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct IoConfig {
    #[serde(default)]
    pub line_ending: LineEndingPolicy,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub syntax: SyntaxConfig,
    #[serde(default)]
    pub io: IoConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>,    // original file string (optional)
    pub source: Option<PathBuf>, // path the file was read from
    pub file: ConfigFile,       // parsed (or default) data
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from("oxbuf.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("oxbuf").join("oxbuf.toml");
    }
    PathBuf::from("oxbuf.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match parse(&content) {
        Ok(file) => {
            info!(
                target: "config",
                path = %path.display(),
                languages = file.syntax.languages.len(),
                max_depth = file.history.max_depth,
                "config_loaded"
            );
            Ok(Config {
                raw: Some(content),
                source: Some(path),
                file,
            })
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}

/// Parse TOML text into a [`ConfigFile`].
pub fn parse(content: &str) -> Result<ConfigFile> {
    Ok(toml::from_str::<ConfigFile>(content)?)
}
