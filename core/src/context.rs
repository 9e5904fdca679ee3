//! Per-session input context.
//!
//! The `ImeContext` struct is a simple data container with public fields that
//! the host and the input method exchange. After each keystroke the host reads
//! the fields to update its UI; on `KeyResult::Commit` it must read `commit`
//! before the next keystroke.
//!
//! One context per input session. It is never shared between sessions.
use std::fmt;
use std::sync::Arc;

use crate::ime::candidates::CandidateList;
use crate::phrases::PhraseBook;
use crate::table::Table;

/// Composition engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    /// Accumulating keystrokes.
    #[default]
    Composition,
    /// Candidates are shown and the user is selecting or paging.
    Candidates,
}

/// How a committed character is typed in another table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossHint {
    /// The committed character.
    pub text: String,
    /// Its keys in the other table, through that table's `%keyname`.
    pub keys: String,
    /// `%cname` of the other table.
    pub label: String,
}

impl fmt::Display for CrossHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.text, self.keys, self.label)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImeContext {
    /// Raw typed keys (after the table's case rule).
    pub composition: String,

    /// Composition mapped through `%keyname`, for display.
    pub keystroke: String,

    /// Candidates for the current composition.
    pub candidates: CandidateList,

    pub state: State,

    /// Text produced by the last commit.
    pub commit: String,

    /// Set when the last keystroke was rejected (host should beep).
    pub wrong: bool,

    /// `now/total` page indicator, empty for a single page.
    pub page_prompt: String,

    /// Selection keys of the active table.
    pub selkey: String,

    /// The active module computes candidates while typing.
    pub auto_compose: bool,

    // Host permissions for add-ons.
    pub allow_related_text: bool,
    pub allow_ctrl_phrase: bool,

    /// Follow-up characters offered after a commit.
    pub related: Vec<String>,

    /// Related-text dictionary.
    pub phrases: Arc<PhraseBook>,

    /// Table to look committed characters up in; `None` turns the lookup off.
    pub cross_table: Option<Arc<Table>>,

    /// Set after a single-character commit found in `cross_table`.
    pub cross_hint: Option<CrossHint>,
}

impl ImeContext {
    /// Create a new empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the commit text, leaving it empty.
    pub fn take_commit(&mut self) -> String {
        std::mem::take(&mut self.commit)
    }

    /// Check if there's text to commit.
    pub fn has_commit(&self) -> bool {
        !self.commit.is_empty()
    }

    pub fn has_composition(&self) -> bool {
        !self.composition.is_empty()
    }

    /// Nothing is being composed or offered.
    pub fn is_idle(&self) -> bool {
        self.composition.is_empty()
            && self.keystroke.is_empty()
            && self.candidates.is_empty()
            && self.related.is_empty()
    }

    /// Position of `key` in the selection keys, compared without case.
    pub fn selection_index(&self, key: &str) -> Option<usize> {
        let mut chars = key.chars();
        let (Some(k), None) = (chars.next(), chars.next()) else {
            return None;
        };
        self.selkey
            .chars()
            .position(|s| s == k || s.to_lowercase().eq(k.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_commit() {
        let mut ctx = ImeContext::new();
        ctx.commit = "對".into();
        assert!(ctx.has_commit());
        assert_eq!(ctx.take_commit(), "對");
        assert!(!ctx.has_commit());
    }

    #[test]
    fn test_defaults() {
        let ctx = ImeContext::new();
        assert_eq!(ctx.state, State::Composition);
        assert!(ctx.is_idle());
        assert!(!ctx.wrong);
    }

    #[test]
    fn test_selection_index() {
        let mut ctx = ImeContext::new();
        ctx.selkey = "asdf".into();
        assert_eq!(ctx.selection_index("d"), Some(2));
        assert_eq!(ctx.selection_index("D"), Some(2));
        assert_eq!(ctx.selection_index("x"), None);
        assert_eq!(ctx.selection_index("as"), None);
    }
}
