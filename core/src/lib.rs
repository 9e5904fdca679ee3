//! libcin-core
//!
//! Table-driven input method core shared by every CIN-style table (Array30,
//! Boshiamy, Cangjie, Dayi, Phonetic, ...).
//!
//! A table goes through `parse_cin` and `apply_quirks` exactly once per load and
//! is then shared (`Arc<Table>`) by any number of sessions. Each session owns an
//! `ImeContext` and an input method chain built by `ImeSession::activate`.
//!
//! Public API:
//! - `Table` / `parse_cin` / `ParseError` - CIN text to structured table
//! - `apply_quirks` / `normalized` - dialect normalization
//! - `GlobMatcher` - wildcard lookup over `%chardef`
//! - `GenInp2` - the composition state machine
//! - `ImeContext`, `KeyEvent`, `KeyResult` - per-keystroke data exchange
//! - `ImeSession` - module + ordered add-ons + context for one input session
//! - `Config` - TOML configuration and default behavior options
use serde::{Deserialize, Serialize};

pub mod table;
pub use table::{ChardefMap, Scalar, Table, TableError};

pub mod cin_parser;
pub use cin_parser::{parse_cin, ParseError};

pub mod quirks;
pub use quirks::{apply_quirks, normalized};

pub mod trie;
pub use trie::TrieNode;

pub mod glob;
pub use glob::GlobMatcher;

pub mod phrases;
pub use phrases::PhraseBook;

pub mod context;
pub use context::{CrossHint, ImeContext, State};

pub mod ime;
pub use ime::{
    AddonKind, CandidateList, CrossQueryAddon, EventKind, GenInp2, ImeSession, InputMethod, Key,
    KeyEvent, KeyResult, ModuleKind, Options, PageDirection, PunctuationsAddon, RelatedTextAddon,
    SpaceAutoUp,
};

/// Engine-wide configuration.
///
/// Table-specific behavior comes from the table directives; this config only
/// supplies the defaults underneath them plus session-level choices (which
/// module and which add-ons wrap it).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Module used when a session does not ask for a known one.
    pub default_module: String,

    /// Add-ons wrapped around the module, innermost first.
    pub addons: Vec<String>,

    /// Glob and partial matches stop after this many pages of candidates.
    pub max_match_pages: usize,

    /// Placeholder glyph used by `%quick` tables for an empty slot.
    pub null_candidate: String,

    /// Capacity of the per-session glob result cache.
    pub max_cache_size: usize,

    // Session flags copied into every new context.
    pub allow_related_text: bool,
    pub allow_ctrl_phrase: bool,

    /// Behavior options applied before the table's own directives.
    pub defaults: Options,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_module: "GenInp2".to_string(),
            addons: vec![
                "RelatedText".to_string(),
                "CrossQuery".to_string(),
                "Punctuations".to_string(),
            ],
            max_match_pages: 20,
            // U+25A1, as used by the gcin ar30 table.
            null_candidate: "\u{25a1}".to_string(),
            max_cache_size: 256,
            allow_related_text: false,
            allow_ctrl_phrase: false,
            defaults: Options::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Maximum number of candidates a glob or partial match may collect.
    pub fn match_limit(&self, page_size: usize) -> usize {
        self.max_match_pages.max(1) * page_size.max(1)
    }
}

/// Utility helpers.
pub mod utils {
    /// Normalize input strings (NFC) and trim whitespace.
    pub fn normalize(s: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        s.nfc().collect::<String>().trim().to_string()
    }

    /// Parse an integer the way table authors write them: decimal or `0x` hex.
    pub fn parse_int(s: &str) -> Option<i64> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            i64::from_str_radix(hex, 16).ok()
        } else {
            s.parse().ok()
        }
    }
}
