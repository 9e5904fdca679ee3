//! CIN table text parser.
//!
//! Line grammar:
//! - `#...` comment
//! - `%name` / `%name value` scalar directive
//! - `%block begin` ... `KEY VALUE` ... `%block end` block directive
//!
//! The parser keeps the table close to its text form; dialect fixes are the job
//! of `quirks`. On failure no partial table is returned.
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::table::{Block, ChardefMap, Scalar, Table};
use crate::utils;

static DIRECTIVE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^%(\w+)(?:\s+(\S+))?").expect("directive pattern"));
static DATA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\S+)\s+(\S+)").expect("data pattern"));
static LOCALE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([^:;]+):([^:;]+);?").expect("locale pattern"));

/// Directives that open a `begin`/`end` block.
const BLOCK_NAMES: &[&str] = &[
    "keyname",
    "chardef",
    "quick",
    "quickkey",
    "sel1st",
    "octagram",
    "symboldef",
    "KEYSTROKE_REMAP",
    "KEYGROUPS",
];

/// Fatal table problem.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}{message}", line_prefix(.line))]
pub struct ParseError {
    /// 1-based line, or `None` for whole-table validation failures.
    pub line: Option<usize>,
    pub message: String,
}

impl ParseError {
    fn at(line: usize, message: impl Into<String>) -> Self {
        Self {
            line: Some(line),
            message: message.into(),
        }
    }

    fn table(message: impl Into<String>) -> Self {
        Self {
            line: None,
            message: message.into(),
        }
    }
}

fn line_prefix(line: &Option<usize>) -> String {
    line.map(|l| format!("line {}: ", l)).unwrap_or_default()
}

/// Raw section collected while scanning.
#[derive(Default)]
struct Sections {
    chardef: Option<ChardefMap>,
    blocks: std::collections::BTreeMap<String, Block>,
}

impl Sections {
    fn exists(&self, name: &str) -> bool {
        if name == "chardef" {
            self.chardef.is_some()
        } else {
            self.blocks.contains_key(name)
        }
    }

    fn open(&mut self, name: &str) {
        if name == "chardef" {
            self.chardef = Some(ChardefMap::new());
        } else {
            self.blocks.insert(name.to_string(), Block::new());
        }
    }

    fn add(&mut self, name: &str, key: &str, value: &str) {
        if name == "chardef" {
            if let Some(chardef) = self.chardef.as_mut() {
                chardef.push(key, value);
            }
        } else if let Some(block) = self.blocks.get_mut(name) {
            block.entry(key.to_string()).or_default().push_str(value);
        }
    }
}

/// Parse CIN table text into a `Table`.
///
/// Mandatory: `%ename`, `%cname` (or `%prompt`), `%selkey`, `%keyname` and
/// `%chardef`. A missing `%chardef end` at end of input is accepted.
pub fn parse_cin(text: &str) -> Result<Table, ParseError> {
    let mut directives = std::collections::BTreeMap::new();
    let mut sections = Sections::default();
    let mut running: Option<String> = None;
    let mut last_line = 0;

    for (idx, raw) in text.split('\n').enumerate() {
        let lineno = idx + 1;
        last_line = lineno;
        let line = raw.strip_suffix('\r').unwrap_or(raw);

        if line.starts_with('#') {
            continue;
        }

        if let Some(caps) = DIRECTIVE_RE.captures(line) {
            let name = &caps[1];
            let arg = caps.get(2).map(|m| m.as_str());

            if BLOCK_NAMES.contains(&name) {
                match arg {
                    Some("begin") => {
                        if let Some(open) = &running {
                            return Err(ParseError::at(
                                lineno,
                                format!("previous section has no end: {}", open),
                            ));
                        }
                        if sections.exists(name) {
                            return Err(ParseError::at(
                                lineno,
                                format!("section already exists: {}", name),
                            ));
                        }
                        sections.open(name);
                        running = Some(name.to_string());
                    }
                    Some("end") => {
                        if running.is_none() {
                            return Err(ParseError::at(
                                lineno,
                                format!("end before begin: {}", name),
                            ));
                        }
                        running = None;
                    }
                    other => {
                        return Err(ParseError::at(
                            lineno,
                            format!("should be begin/end: {}", other.unwrap_or("")),
                        ));
                    }
                }
            } else {
                if let Some(open) = &running {
                    return Err(ParseError::at(
                        lineno,
                        format!("previous section has no end: {}", open),
                    ));
                }
                let value = match arg {
                    None => Scalar::Flag(true),
                    Some("false") => Scalar::Flag(false),
                    Some(v) => Scalar::Text(utils::normalize(v)),
                };
                directives.insert(name.to_string(), value);
            }
            continue;
        }

        let Some(block) = running.as_deref() else {
            continue;
        };
        let Some(caps) = DATA_RE.captures(line) else {
            // malformed data lines are skipped
            continue;
        };
        let keep_case = directives
            .get("keep_key_case")
            .map(Scalar::is_true)
            .unwrap_or(false);
        let fold = |s: &str| {
            if keep_case {
                s.to_string()
            } else {
                s.to_uppercase()
            }
        };
        let key = fold(&caps[1]);
        let value = if block == "KEYGROUPS" {
            fold(&caps[2])
        } else {
            caps[2].to_string()
        };
        sections.add(block, &key, &value);
    }

    if let Some(open) = running {
        if open != "chardef" {
            return Err(ParseError::at(
                last_line,
                format!("previous section has no end: {}", open),
            ));
        }
        debug!("chardef section not closed; accepted");
    }

    build_table(directives, sections)
}

fn build_table(
    mut directives: std::collections::BTreeMap<String, Scalar>,
    mut sections: Sections,
) -> Result<Table, ParseError> {
    if !directives.contains_key("cname") {
        if let Some(prompt) = directives.get("prompt").cloned() {
            directives.insert("cname".to_string(), prompt);
        }
    }

    for name in ["ename", "cname", "selkey"] {
        if !directives.contains_key(name) {
            return Err(ParseError::table(format!(
                "missing mandatory section: %{}",
                name
            )));
        }
    }
    for name in ["keyname", "chardef"] {
        if !sections.exists(name) {
            return Err(ParseError::table(format!(
                "missing mandatory section: %{}",
                name
            )));
        }
    }

    let mut take_name = |name: &str| match directives.remove(name) {
        Some(Scalar::Text(s)) => Ok(s),
        _ => Err(ParseError::table(format!("missing valid name: %{}", name))),
    };
    let ename = take_name("ename")?;
    let cname = take_name("cname")?;
    let selkey = match directives.remove("selkey") {
        Some(Scalar::Text(s)) => s,
        // a bare %selkey declares no selection keys
        _ => String::new(),
    };

    let (ename, intlname) = match english_name(&ename) {
        Some(en) => (en, Some(ename)),
        None => (ename, None),
    };

    let mut table = Table {
        ename,
        cname,
        selkey,
        intlname,
        directives,
        keyname: sections.blocks.remove("keyname").unwrap_or_default(),
        chardef: sections.chardef.take().unwrap_or_default(),
        quick: sections.blocks.remove("quick"),
        quickkey: sections.blocks.remove("quickkey"),
        keystroke_remap: sections.blocks.remove("KEYSTROKE_REMAP"),
        keygroups: sections.blocks.remove("KEYGROUPS"),
        extra_blocks: Default::default(),
    };
    table.extra_blocks = sections.blocks;

    debug!(
        ename = %table.ename,
        keys = table.chardef.len(),
        "parsed table"
    );
    Ok(table)
}

/// English label of a `label:locale;label:locale` name, if it has one.
fn english_name(ename: &str) -> Option<String> {
    if !ename.contains(':') || !ename.contains(';') {
        return None;
    }
    LOCALE_RE
        .captures_iter(ename)
        .find(|caps| &caps[2] == "en")
        .map(|caps| caps[1].to_string())
}
