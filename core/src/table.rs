//! Structured table model.
//!
//! A `Table` is the parsed form of a CIN text file. Mandatory scalars get typed
//! fields; every other `%name value` line is kept in `directives` so quirks and
//! the engine can read them by name. Block sections keep their declaration
//! order where it matters (`%chardef`) and are otherwise sorted maps.
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::cin_parser::ParseError;

/// Value of a scalar `%name [value]` directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scalar {
    /// `%name` (true) or `%name false`.
    Flag(bool),
    /// `%name value`.
    Text(String),
}

impl Scalar {
    /// Loose truthiness used for behavior switches.
    ///
    /// Tables write switches as bare directives, `true`/`false`, `yes`/`no`
    /// or `1`/`0`.
    pub fn is_true(&self) -> bool {
        match self {
            Scalar::Flag(b) => *b,
            Scalar::Text(s) => {
                let s = s.trim().to_ascii_lowercase();
                !(s.is_empty() || s == "0" || s == "false" || s == "no")
            }
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            Scalar::Flag(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Flag(b) => write!(f, "{}", b),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

/// Ordered `%chardef` map: key -> candidates, iterated in declaration order.
///
/// Lookups go through a hash index; iteration order is the order keys first
/// appeared in the table, which is what wildcard matching reports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(
    from = "Vec<(String, Vec<String>)>",
    into = "Vec<(String, Vec<String>)>"
)]
pub struct ChardefMap {
    entries: Vec<(String, Vec<String>)>,
    index: AHashMap<String, usize>,
}

impl ChardefMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one candidate to `key`, creating the entry on first use.
    pub fn push(&mut self, key: &str, candidate: impl Into<String>) {
        match self.index.get(key) {
            Some(&i) => self.entries[i].1.push(candidate.into()),
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), vec![candidate.into()]));
            }
        }
    }

    /// Replace (or add) all candidates for `key`.
    pub fn insert(&mut self, key: impl Into<String>, candidates: Vec<String>) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 = candidates,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, candidates));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.index.get(key).map(|&i| self.entries[i].1.as_slice())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of candidates over all keys.
    pub fn candidate_count(&self) -> usize {
        self.entries.iter().map(|(_, v)| v.len()).sum()
    }
}

impl PartialEq for ChardefMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for ChardefMap {}

impl From<Vec<(String, Vec<String>)>> for ChardefMap {
    fn from(list: Vec<(String, Vec<String>)>) -> Self {
        let mut map = ChardefMap::new();
        for (key, candidates) in list {
            for c in candidates {
                map.push(&key, c);
            }
        }
        map
    }
}

impl From<ChardefMap> for Vec<(String, Vec<String>)> {
    fn from(map: ChardefMap) -> Self {
        map.entries
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ChardefMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ChardefMap::new();
        for (k, v) in iter {
            let k = k.into();
            map.push(&k, v);
        }
        map
    }
}

/// A string-valued block such as `%keyname` or `%quick`.
pub type Block = BTreeMap<String, String>;

/// Parsed input method table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    /// English (or ASCII) name, `%ename`.
    pub ename: String,
    /// Display name, `%cname` (or legacy `%prompt`).
    pub cname: String,
    /// Ordered selection keys, `%selkey`.
    pub selkey: String,
    /// Original multi-locale name when `%ename` was written as
    /// `label:locale;label:locale`.
    pub intlname: Option<String>,

    /// Every other scalar directive, by name as written.
    pub directives: BTreeMap<String, Scalar>,

    /// `%keyname`: key -> display glyph.
    pub keyname: Block,
    /// `%chardef`: key sequence -> candidates.
    pub chardef: ChardefMap,
    /// `%quick` (gcin): shortcut candidates while composing.
    pub quick: Option<Block>,
    /// `%quickkey` (xcin/OpenVanilla spelling of `%quick`).
    pub quickkey: Option<Block>,
    /// `%KEYSTROKE_REMAP`: candidates on explicit conversion.
    pub keystroke_remap: Option<Block>,
    /// `%KEYGROUPS`: group name -> member keys.
    pub keygroups: Option<Block>,
    /// Legacy blocks kept as-is (`sel1st`, `octagram`, `symboldef`).
    pub extra_blocks: BTreeMap<String, Block>,
}

impl Table {
    /// Look up a scalar directive.
    pub fn directive(&self, name: &str) -> Option<&Scalar> {
        self.directives.get(name)
    }

    /// Whether a directive is declared and truthy.
    pub fn flag(&self, name: &str) -> bool {
        self.directives.get(name).map(Scalar::is_true).unwrap_or(false)
    }

    pub fn set_directive(&mut self, name: &str, value: Scalar) {
        self.directives.insert(name.to_string(), value);
    }

    pub fn remove_directive(&mut self, name: &str) -> Option<Scalar> {
        self.directives.remove(name)
    }

    /// Keys that finalize a composition, `%endkey`. Empty when undeclared.
    pub fn endkey(&self) -> &str {
        self.directives
            .get("endkey")
            .and_then(Scalar::as_text)
            .unwrap_or("")
    }

    /// Maximum composition length, `%max_keystroke`. Zero means unlimited.
    pub fn max_keystroke(&self) -> usize {
        self.directives
            .get("max_keystroke")
            .and_then(Scalar::as_text)
            .and_then(crate::utils::parse_int)
            .filter(|n| *n > 0)
            .map(|n| n as usize)
            .unwrap_or(0)
    }

    /// Whether keys keep the case they were written with.
    pub fn keep_key_case(&self) -> bool {
        self.flag("keep_key_case")
    }

    /// Apply this table's key case rule to typed text.
    pub fn normalize_key(&self, key: &str) -> String {
        if self.keep_key_case() {
            key.to_string()
        } else {
            key.to_uppercase()
        }
    }

    /// Display form of a composition: every key mapped through `%keyname`.
    pub fn display_keys(&self, composition: &str) -> String {
        let mut out = String::new();
        for c in composition.chars() {
            let mut buf = [0u8; 4];
            let k: &str = c.encode_utf8(&mut buf);
            match self.keyname.get(k) {
                Some(glyph) => out.push_str(glyph),
                None => out.push(c),
            }
        }
        out
    }

    /// Parse and normalize table text in one step.
    pub fn from_cin(text: &str) -> Result<Self, ParseError> {
        let mut table = crate::cin_parser::parse_cin(text)?;
        crate::quirks::apply_quirks(&mut table);
        Ok(table)
    }

    /// Read, parse and normalize a table file.
    pub fn load_cin<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_cin(&text)?)
    }

    pub fn to_json(&self) -> Result<String, TableError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, TableError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Compact binary snapshot.
    pub fn to_bincode(&self) -> Result<Vec<u8>, TableError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bincode(bytes: &[u8]) -> Result<Self, TableError> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Write a bincode snapshot to disk.
    pub fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<(), TableError> {
        std::fs::write(path, self.to_bincode()?)?;
        Ok(())
    }

    pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let bytes = std::fs::read(path)?;
        Self::from_bincode(&bytes)
    }
}

/// Failure while loading or (de)serializing a table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table {
            ename: "Sample".into(),
            cname: "範例".into(),
            selkey: "123".into(),
            ..Default::default()
        };
        table.keyname.insert("A".into(), "日".into());
        table.keyname.insert("B".into(), "月".into());
        table.chardef.push("AB", "明");
        table.chardef.push("A", "日");
        table.chardef.push("AB", "朋");
        table.set_directive("max_keystroke", Scalar::Text("5".into()));
        table
    }

    #[test]
    fn test_chardef_keeps_declaration_order() {
        let table = sample();
        let keys: Vec<&str> = table.chardef.keys().collect();
        assert_eq!(keys, vec!["AB", "A"]);
        assert_eq!(table.chardef.get("AB").unwrap(), &["明", "朋"]);
        assert_eq!(table.chardef.candidate_count(), 3);
    }

    #[test]
    fn test_scalar_truthiness() {
        assert!(Scalar::Flag(true).is_true());
        assert!(!Scalar::Flag(false).is_true());
        assert!(Scalar::Text("1".into()).is_true());
        assert!(Scalar::Text("any".into()).is_true());
        assert!(!Scalar::Text("0".into()).is_true());
        assert!(!Scalar::Text("No".into()).is_true());
    }

    #[test]
    fn test_accessors() {
        let mut table = sample();
        assert_eq!(table.max_keystroke(), 5);
        assert_eq!(table.endkey(), "");
        assert_eq!(table.display_keys("AB?"), "日月?");
        assert_eq!(table.normalize_key("a"), "A");
        table.set_directive("keep_key_case", Scalar::Flag(true));
        assert_eq!(table.normalize_key("a"), "a");
    }

    #[test]
    fn test_json_snapshot() {
        let table = sample();
        let json = table.to_json().unwrap();
        let back = Table::from_json(&json).unwrap();
        assert_eq!(back, table);
        assert_eq!(back.chardef.get("AB").unwrap(), &["明", "朋"]);
    }

    #[test]
    fn test_bincode_snapshot() {
        let table = sample();
        let bytes = table.to_bincode().unwrap();
        let back = Table::from_bincode(&bytes).unwrap();
        assert_eq!(back, table);
        // the hash index is rebuilt on load
        assert!(back.chardef.contains_key("A"));
    }

    #[test]
    fn test_errors_keep_their_source() {
        use std::error::Error;

        let err: TableError = crate::cin_parser::parse_cin("%ename x\n").unwrap_err().into();
        assert!(matches!(err, TableError::Parse(_)));
        assert!(err.to_string().starts_with("parse error: "));
        assert!(err.source().is_some());

        let err = Table::from_json("{").unwrap_err();
        assert!(matches!(err, TableError::Json(_)));
        let err = Table::from_bincode(&[1, 2]).unwrap_err();
        assert!(matches!(err, TableError::Bincode(_)));
        let err = Table::load_snapshot("/nonexistent/libcin/table.bin").unwrap_err();
        assert!(matches!(err, TableError::Io(_)));
        assert!(err.to_string().starts_with("io error: "));
    }
}
