//! General table-driven input method.
//!
//! `GenInp2` turns keystrokes into commits using one `Table`. It has two
//! states: `Composition` while keys are collected and `Candidates` once a
//! composition was converted and the user is choosing. With auto-compose on,
//! candidates are computed on every key and selection keys work in both
//! states.
//!
//! A key may be a composition key, an end key and a selection key at once
//! (Phonetic `3467`, Array30 digits). The order of checks is:
//! 1. the key completes a `%chardef` entry and is an end key: append, convert
//! 2. candidates are shown and the key is a selection key: commit
//! 3. the key composes (in `%keyname`, a wildcard, or completes an entry)
//! 4. Space converts
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use ahash::AHashMap;
use once_cell::unsync::OnceCell;
use tracing::{debug, warn};

use super::candidates::{CandidateList, PageDirection};
use super::key_event::{Key, KeyEvent};
use super::method::{InputMethod, KeyResult};
use super::options::{Options, SpaceAutoUp};
use crate::context::{ImeContext, State};
use crate::glob::{self, GlobMatcher};
use crate::table::{Block, Table};
use crate::trie::TrieNode;
use crate::Config;

/// Keyboard columns used to lay out partial matches, one slot per column.
const QWER_KEYS_BY_COLUMN: [&str; 10] = [
    "1qaz", "2wsx", "3edc", "4rfv", "5tgb", "6yhn", "7ujm", "8ik,", "9ol.", "0p;/",
];

/// Page size when a table declares no selection keys.
const DEFAULT_PAGE_SIZE: usize = 10;

fn qwer_column(c: char) -> Option<usize> {
    let c = c.to_ascii_lowercase();
    QWER_KEYS_BY_COLUMN.iter().position(|col| col.contains(c))
}

fn page_direction(key: &Key) -> Option<PageDirection> {
    match key {
        Key::ArrowLeft | Key::ArrowUp | Key::PageUp | Key::Char('<') => {
            Some(PageDirection::Backward)
        }
        Key::ArrowRight | Key::ArrowDown | Key::PageDown | Key::Char('>') => {
            Some(PageDirection::Forward)
        }
        _ => None,
    }
}

/// `%quick` / `%KEYSTROKE_REMAP` with values split into single characters.
type Override = AHashMap<String, Vec<Option<String>>>;

fn split_block(block: &Block, null: Option<&str>) -> Override {
    block
        .iter()
        .map(|(key, value)| {
            let list = value
                .chars()
                .map(|c| {
                    let s = c.to_string();
                    if Some(s.as_str()) == null {
                        None
                    } else {
                        Some(s)
                    }
                })
                .collect();
            (key.clone(), list)
        })
        .collect()
}

/// The general input method.
pub struct GenInp2 {
    table: Arc<Table>,
    opts: Options,
    /// Selection keys under the table's case rule.
    selkey: Vec<char>,
    endkey: Vec<char>,
    /// Zero means unlimited.
    max_composition: usize,
    /// Consulted while composing (`%quick`).
    quick: Option<Override>,
    /// Consulted on explicit conversion (`%KEYSTROKE_REMAP`).
    remap: Option<Override>,
    /// Group name -> member keys, sorted by group name.
    keygroups: BTreeMap<String, String>,
    null_candidate: String,
    match_pages: usize,
    /// Built on first use; only partial and unique matching need it.
    trie: OnceCell<TrieNode>,
    glob: GlobMatcher,
}

impl GenInp2 {
    pub const NAME: &'static str = "GenInp2";

    pub fn new(table: Arc<Table>, config: &Config) -> Self {
        let opts = Options::from_table(&config.defaults, &table);
        let selkey = table.normalize_key(&table.selkey).chars().collect();
        let endkey = table.normalize_key(table.endkey()).chars().collect();
        let quick = table
            .quick
            .as_ref()
            .map(|b| split_block(b, Some(config.null_candidate.as_str())));
        let remap = table.keystroke_remap.as_ref().map(|b| split_block(b, None));
        let keygroups = table.keygroups.clone().unwrap_or_default();

        debug!(
            table = %table.ename,
            ?opts,
            quick = quick.is_some(),
            remap = remap.is_some(),
            "GenInp2 created"
        );

        Self {
            max_composition: table.max_keystroke(),
            table,
            opts,
            selkey,
            endkey,
            quick,
            remap,
            keygroups,
            null_candidate: config.null_candidate.clone(),
            match_pages: config.max_match_pages.max(1),
            trie: OnceCell::new(),
            glob: GlobMatcher::new(config.max_cache_size),
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Candidates per page: one per selection key.
    pub fn page_size(&self) -> usize {
        if self.selkey.is_empty() {
            DEFAULT_PAGE_SIZE
        } else {
            self.selkey.len()
        }
    }

    /// Upper bound on glob and partial match results.
    pub fn match_limit(&self) -> usize {
        self.match_pages * self.page_size()
    }

    /// Glyph shown for placeholder candidates.
    pub fn null_candidate(&self) -> &str {
        &self.null_candidate
    }

    /// `(hits, misses)` of the wildcard result cache.
    pub fn glob_cache_stats(&self) -> (usize, usize) {
        self.glob.cache_stats()
    }

    fn trie(&self) -> &TrieNode {
        self.trie
            .get_or_init(|| TrieNode::from_chardef(&self.table.chardef))
    }

    /// Typed text of a key under the table's case rule.
    fn key_text(&self, key: &Key) -> Option<String> {
        key.text().map(|text| self.table.normalize_key(&text))
    }

    // ---- results ----

    fn result_processed(&self, ctx: &ImeContext) -> KeyResult {
        debug!(composition = %ctx.composition, state = ?ctx.state, "processed");
        KeyResult::Absorb
    }

    fn result_ignore(&self) -> KeyResult {
        KeyResult::Ignore
    }

    fn result_commit(&self, ctx: &ImeContext) -> KeyResult {
        debug!(commit = %ctx.commit, "commit");
        KeyResult::Commit
    }

    /// Reject a key: flag the context and, per options, drop the composition.
    fn result_error(&self, ctx: &mut ImeContext, key: &str) -> KeyResult {
        debug!(key, composition = %ctx.composition, "error");
        if self.opts.auto_reset || (self.opts.space_reset && key == " ") {
            self.reset(ctx);
        }
        ctx.wrong = true;
        KeyResult::Absorb
    }

    // ---- context helpers ----

    fn reset(&self, ctx: &mut ImeContext) {
        ctx.state = State::Composition;
        ctx.composition.clear();
        ctx.keystroke.clear();
        ctx.commit.clear();
        self.clear_candidates(ctx);
        ctx.selkey = self.table.selkey.clone();
        ctx.auto_compose = self.opts.auto_compose || self.quick.is_some();
    }

    fn clear_candidates(&self, ctx: &mut ImeContext) {
        ctx.candidates = CandidateList::new(self.page_size());
        ctx.page_prompt.clear();
    }

    fn update_candidates(&self, ctx: &mut ImeContext) {
        ctx.page_prompt = ctx.candidates.page_prompt();
    }

    fn update_composition(&self, ctx: &mut ImeContext) {
        ctx.keystroke = self.table.display_keys(&ctx.composition);
        self.prepare_candidates(ctx, true);
    }

    fn enter_candidates(&self, ctx: &mut ImeContext, keep_index: bool) {
        ctx.state = State::Candidates;
        if !keep_index {
            ctx.candidates.reset_page();
            self.update_candidates(ctx);
        }
    }

    fn leave_candidates(&self, ctx: &mut ImeContext) {
        ctx.state = State::Composition;
        ctx.candidates.reset_page();
        self.update_candidates(ctx);
    }

    fn cycle_candidates(&self, ctx: &mut ImeContext, direction: PageDirection) -> bool {
        let old = ctx.candidates.start();
        if !ctx.candidates.cycle(direction) {
            return false;
        }
        debug!(?direction, old, new = ctx.candidates.start(), "cycle candidates");
        self.update_candidates(ctx);
        true
    }

    // ---- candidate lookup ----

    /// Fill `ctx.candidates` for the current composition.
    ///
    /// `autocompose_stage` is true while typing and false on explicit
    /// conversion; each stage has its own override map.
    fn prepare_candidates(&self, ctx: &mut ImeContext, autocompose_stage: bool) -> bool {
        let key = ctx.composition.clone();
        self.clear_candidates(ctx);
        if key.is_empty() {
            return false;
        }

        let quick_hit = self
            .quick
            .as_ref()
            .map(|q| q.contains_key(&key))
            .unwrap_or(false);
        // without auto-compose only %quick may show candidates while typing
        if autocompose_stage && !self.opts.auto_compose && !quick_hit {
            return false;
        }

        let try_glob = self.opts.wild_enable && glob::is_glob_pattern(&key);
        let override_map = if try_glob {
            None
        } else if autocompose_stage {
            self.quick.as_ref()
        } else {
            self.remap.as_ref()
        };
        let overridden = override_map.and_then(|m| m.get(&key));

        let items: Vec<Option<String>> = if try_glob {
            debug!(pattern = %key, "prepare candidates: glob");
            self.glob
                .collect(&self.table.chardef, &key, self.match_limit())
                .into_iter()
                .map(Some)
                .collect()
        } else if let Some(list) = overridden {
            debug!(key = %key, "prepare candidates: override");
            list.clone()
        } else if self.opts.auto_compose && self.opts.partial_match && autocompose_stage {
            debug!(key = %key, "prepare candidates: partial match");
            self.partial_group_candidates(&key)
        } else {
            debug!(key = %key, "prepare candidates: exact match");
            self.table
                .chardef
                .get(&key)
                .map(|list| list.iter().cloned().map(Some).collect())
                .unwrap_or_default()
        };

        ctx.candidates.set_candidates(items);
        self.update_candidates(ctx);
        !ctx.candidates.is_empty()
    }

    /// Exact matches first, then one candidate of a longer key per keyboard
    /// column, then the rest in free slots. At most one page unless the exact
    /// matches alone fill more.
    fn partial_group_candidates(&self, prefix: &str) -> Vec<Option<String>> {
        let Some(node) = self.trie().find(prefix) else {
            return Vec::new();
        };
        let page_size = self.page_size();

        let mut slots: Vec<Option<String>> = node
            .data()
            .unwrap_or(&[])
            .iter()
            .cloned()
            .map(Some)
            .collect();
        if slots.len() >= page_size {
            return slots;
        }
        slots.resize(page_size, None);

        let mut remains: VecDeque<String> = VecDeque::new();
        for (suffix, candidates) in node.descendants() {
            let column = suffix
                .chars()
                .next()
                .and_then(qwer_column)
                .filter(|&col| col < page_size);
            match column {
                Some(col) if slots[col].is_none() => {
                    slots[col] = candidates.first().cloned();
                    remains.extend(candidates.iter().skip(1).cloned());
                }
                _ => remains.extend(candidates.iter().cloned()),
            }
        }

        for slot in slots.iter_mut() {
            if slot.is_none() {
                *slot = remains.pop_front();
            }
        }
        while matches!(slots.last(), Some(None)) {
            slots.pop();
        }
        debug!(prefix, count = slots.len(), "partial match");
        slots
    }

    /// The composition has one candidate and no longer key extends it.
    fn is_unique_candidate(&self, ctx: &ImeContext) -> bool {
        self.trie()
            .find(&ctx.composition)
            .map(|node| node.is_leaf() && node.data().map(|d| d.len() == 1).unwrap_or(false))
            .unwrap_or(false)
    }

    // ---- composition ----

    fn is_end_key(&self, key: &str) -> bool {
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => self.endkey.contains(&c),
            _ => false,
        }
    }

    fn is_composition_key(&self, key: &str) -> bool {
        if self.table.keyname.contains_key(key) {
            return true;
        }
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => self.opts.wild_enable && glob::is_glob_key(c),
            _ => false,
        }
    }

    /// Appending `key` yields a `%chardef` entry (Array30 `W1`, ...).
    fn can_do_composition(&self, ctx: &ImeContext, key: &str) -> bool {
        let mut candidate = ctx.composition.clone();
        candidate.push_str(key);
        self.table.chardef.contains_key(&candidate)
    }

    fn is_full_composition(&self, ctx: &ImeContext) -> bool {
        self.max_composition > 0 && ctx.composition.chars().count() >= self.max_composition
    }

    fn key_group(&self, key: &str) -> Option<&str> {
        self.keygroups
            .iter()
            .find(|(_, members)| members.contains(key))
            .map(|(name, _)| name.as_str())
    }

    /// Rebuild the composition with `key` in `group`, one key per group in
    /// group order. Fails when a composed key belongs to no group.
    fn compose_by_groups(&self, ctx: &mut ImeContext, group: &str, key: &str) -> bool {
        let mut by_group: BTreeMap<&str, String> = BTreeMap::new();
        for c in ctx.composition.chars() {
            let Some(g) = self.key_group(&c.to_string()) else {
                return false;
            };
            by_group.insert(g, c.to_string());
        }
        by_group.insert(group, key.to_string());
        ctx.composition = by_group.into_values().collect();
        debug!(composition = %ctx.composition, "composition by groups");
        true
    }

    fn add_composition(&self, ctx: &mut ImeContext, key: &str) -> bool {
        if self.is_full_composition(ctx) {
            return false;
        }
        let grouped = match self.key_group(key) {
            Some(group) => self.compose_by_groups(ctx, group, key),
            None => false,
        };
        if !grouped {
            ctx.composition.push_str(key);
        }
        debug!(composition = %ctx.composition, "add composition");
        self.update_composition(ctx);
        true
    }

    fn del_composition(&self, ctx: &mut ImeContext) -> bool {
        if ctx.composition.pop().is_none() {
            return false;
        }
        debug!(composition = %ctx.composition, "delete composition");
        self.update_composition(ctx);
        true
    }

    // ---- commit ----

    fn commit_text(&self, ctx: &mut ImeContext, index: usize) -> bool {
        let text = match ctx.candidates.items().get(index) {
            None => {
                warn!(index, total = ctx.candidates.len(), "commit index out of range");
                return false;
            }
            Some(None) => {
                warn!(index, "cannot commit a placeholder candidate");
                return false;
            }
            Some(Some(text)) => text.clone(),
        };
        self.reset(ctx);
        ctx.commit = text;
        true
    }

    fn selection_index(&self, key: &str) -> Option<usize> {
        if self.opts.selkey_shift && key == " " {
            return Some(0);
        }
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => self.selkey.iter().position(|&s| s == c),
            _ => None,
        }
    }

    fn is_selection_key(&self, key: &str) -> bool {
        self.selection_index(key).is_some()
    }

    fn select_commit(&self, ctx: &mut ImeContext, key: &str) -> bool {
        let Some(offset) = self.selection_index(key) else {
            return false;
        };
        let index = ctx.candidates.start() + offset;
        debug!(key, index, "select commit");
        if index >= ctx.candidates.len() {
            return false;
        }
        self.commit_text(ctx, index)
    }

    fn commit_first(&self, ctx: &mut ImeContext) -> bool {
        let index = ctx.candidates.start();
        self.commit_text(ctx, index)
    }

    fn return_commit_first(&self, ctx: &mut ImeContext, key: &str) -> KeyResult {
        if self.commit_first(ctx) {
            self.result_commit(ctx)
        } else {
            self.result_error(ctx, key)
        }
    }

    // ---- transitions ----

    /// Space over a candidate list. `from_convert` is true when the same Space
    /// just converted the composition.
    fn process_space(&self, ctx: &mut ImeContext, from_convert: bool) -> KeyResult {
        let commit = if self.opts.space_first_full && self.is_full_composition(ctx) {
            true
        } else if from_convert && !self.opts.auto_compose {
            // the list was not visible before this Space
            false
        } else if from_convert && self.quick.is_some() {
            // %quick showed different candidates while typing
            false
        } else if self.opts.space_autoup == SpaceAutoUp::Any {
            true
        } else if from_convert {
            if self.cycle_candidates(ctx, PageDirection::Forward) {
                false
            } else {
                self.opts.space_autoup == SpaceAutoUp::Yes
            }
        } else if ctx.candidates.has_next_page() {
            self.cycle_candidates(ctx, PageDirection::Forward);
            false
        } else {
            true
        };
        debug!(from_convert, commit, "process space");

        if commit {
            self.return_commit_first(ctx, " ")
        } else {
            self.result_processed(ctx)
        }
    }

    fn convert_composition(&self, ctx: &mut ImeContext, key: &str) -> KeyResult {
        if !ctx.has_composition() {
            return self.result_ignore();
        }
        if !self.prepare_candidates(ctx, false) {
            return self.result_error(ctx, key);
        }
        self.enter_candidates(ctx, false);

        if ctx.candidates.len() == 1 {
            return self.return_commit_first(ctx, key);
        }
        if key == " " {
            return self.process_space(ctx, true);
        }
        self.result_processed(ctx)
    }

    fn process_composition_key(&self, ctx: &mut ImeContext, key: &Key) -> KeyResult {
        match key {
            Key::Backspace | Key::Delete => {
                if self.del_composition(ctx) {
                    self.result_processed(ctx)
                } else {
                    self.result_ignore()
                }
            }
            Key::Escape => {
                if ctx.has_composition() {
                    self.reset(ctx);
                    self.result_processed(ctx)
                } else {
                    self.result_ignore()
                }
            }
            _ => {
                if let Some(direction) = page_direction(key) {
                    if self.cycle_candidates(ctx, direction) {
                        self.enter_candidates(ctx, true);
                        return self.result_processed(ctx);
                    }
                    return self.result_ignore();
                }
                match self.key_text(key) {
                    Some(k) => self.compose_key(ctx, &k),
                    None => self.result_ignore(),
                }
            }
        }
    }

    fn compose_key(&self, ctx: &mut ImeContext, key: &str) -> KeyResult {
        let completes_entry = self.can_do_composition(ctx, key);
        if completes_entry {
            if self.is_end_key(key) {
                if !self.add_composition(ctx, key) {
                    return self.result_error(ctx, key);
                }
                return self.convert_composition(ctx, key);
            }
        } else if self.is_selection_key(key) && !ctx.candidates.is_empty() {
            if self.select_commit(ctx, key) {
                return self.result_commit(ctx);
            }
            return self.result_error(ctx, key);
        }

        let composing = self.is_composition_key(key);
        if composing || completes_entry {
            if !self.add_composition(ctx, key) {
                return self.result_error(ctx, key);
            }
            if self.opts.commit_on_full && self.is_full_composition(ctx) {
                return self.convert_composition(ctx, key);
            }
            if self.opts.unique_auto && self.is_unique_candidate(ctx) {
                return self.convert_composition(ctx, key);
            }
            // implicit end key (Array30 W1..W0)
            if !composing {
                return self.convert_composition(ctx, key);
            }
            return self.result_processed(ctx);
        }

        if key == " " {
            return self.convert_composition(ctx, key);
        }
        self.result_ignore()
    }

    fn process_candidates_key(&self, ctx: &mut ImeContext, key: &Key) -> KeyResult {
        match key {
            Key::Escape => {
                self.reset(ctx);
                self.result_processed(ctx)
            }
            Key::Backspace | Key::Delete => {
                self.leave_candidates(ctx);
                self.del_composition(ctx);
                self.result_processed(ctx)
            }
            _ => {
                if let Some(direction) = page_direction(key) {
                    if self.cycle_candidates(ctx, direction) {
                        return self.result_processed(ctx);
                    }
                    return self.result_ignore();
                }
                let Some(k) = self.key_text(key) else {
                    return self.result_ignore();
                };
                if self.is_selection_key(&k) {
                    if self.select_commit(ctx, &k) {
                        return self.result_commit(ctx);
                    }
                    return self.result_error(ctx, &k);
                }
                if k == " " {
                    return self.process_space(ctx, false);
                }
                if !self.is_composition_key(&k) {
                    return self.result_ignore();
                }
                // Commit, then keep typing: the key starts the next composition.
                // This is the one commit that returns with a non-empty
                // composition; hosts must not assume a clean buffer here.
                if self.opts.auto_upchar && self.commit_first(ctx) {
                    self.add_composition(ctx, &k);
                    return self.result_commit(ctx);
                }
                self.result_error(ctx, &k)
            }
        }
    }
}

impl InputMethod for GenInp2 {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn reset_context(&mut self, ctx: &mut ImeContext) {
        self.reset(ctx);
    }

    fn keystroke(&mut self, ctx: &mut ImeContext, ev: &KeyEvent) -> KeyResult {
        ctx.wrong = false;
        ctx.commit.clear();
        debug!(key = %ev.key, code = %ev.code, state = ?ctx.state, "keystroke");
        if !ev.is_key_down() || ev.has_ctrl_alt_meta() {
            return self.result_ignore();
        }

        let key = ev.logical_key();
        match ctx.state {
            State::Composition => self.process_composition_key(ctx, &key),
            State::Candidates => self.process_candidates_key(ctx, &key),
        }
    }
}
