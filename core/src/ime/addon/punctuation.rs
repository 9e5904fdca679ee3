//! Ctrl + punctuation commits full-width punctuation.
use phf::phf_map;
use tracing::debug;

use crate::context::ImeContext;
use crate::ime::key_event::KeyEvent;
use crate::ime::method::{InputMethod, KeyResult};

static CTRL_PHRASES: phf::Map<&'static str, &'static str> = phf_map! {
    "," => "\u{ff0c}",
    "." => "\u{3002}",
    "'" => "\u{3001}",
    ";" => "\u{ff1b}",
    "/" => "\u{ff1f}",
    "[" => "\u{300c}",
    "]" => "\u{300d}",
};

static CTRL_SHIFT_PHRASES: phf::Map<&'static str, &'static str> = phf_map! {
    ":" => "\u{ff1a}",
    "?" => "\u{ff1f}",
    "{" => "\u{ff5b}",
    "}" => "\u{ff5d}",
    "!" => "\u{ff01}",
    "(" => "\u{ff08}",
    ")" => "\u{ff09}",
};

pub struct PunctuationsAddon {
    inner: Box<dyn InputMethod>,
}

impl PunctuationsAddon {
    pub const NAME: &'static str = "Punctuations";

    pub fn new(inner: Box<dyn InputMethod>) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &dyn InputMethod {
        self.inner.as_ref()
    }

    /// Full-width punctuation for a Ctrl (+Shift) key, if any.
    pub fn phrase_for(ev: &KeyEvent) -> Option<&'static str> {
        let table = if ev.shift {
            &CTRL_SHIFT_PHRASES
        } else {
            &CTRL_PHRASES
        };
        table.get(ev.key.as_str()).copied()
    }
}

impl InputMethod for PunctuationsAddon {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn init(&mut self, ctx: &mut ImeContext) {
        self.inner.init(ctx);
    }

    fn reset_context(&mut self, ctx: &mut ImeContext) {
        self.inner.reset_context(ctx);
    }

    fn keystroke(&mut self, ctx: &mut ImeContext, ev: &KeyEvent) -> KeyResult {
        if !ctx.allow_ctrl_phrase || !ev.is_key_down() || !ev.ctrl || ev.alt || ev.meta {
            return self.inner.keystroke(ctx, ev);
        }
        let Some(phrase) = Self::phrase_for(ev) else {
            return self.inner.keystroke(ctx, ev);
        };

        debug!(key = %ev.key, phrase, "ctrl phrase");
        // a commit leaves nothing composed
        self.inner.reset_context(ctx);
        ctx.related.clear();
        ctx.commit = phrase.to_string();
        KeyResult::Commit
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::ime::gen_inp::GenInp2;
    use crate::table::Table;
    use crate::Config;

    const TABLE: &str = "\
%ename Test
%cname 測試
%selkey 123
%keyname begin
a 日
%keyname end
%chardef begin
a 中
%chardef end
";

    fn setup(allow: bool) -> (PunctuationsAddon, ImeContext) {
        let table = Arc::new(Table::from_cin(TABLE).unwrap());
        let mut addon = PunctuationsAddon::new(Box::new(GenInp2::new(table, &Config::default())));
        let mut ctx = ImeContext::new();
        ctx.allow_ctrl_phrase = allow;
        addon.init(&mut ctx);
        (addon, ctx)
    }

    #[test]
    fn test_ctrl_comma() {
        let (mut addon, mut ctx) = setup(true);
        let r = addon.keystroke(&mut ctx, &KeyEvent::new(",").ctrl());
        assert_eq!(r, KeyResult::Commit);
        assert_eq!(ctx.commit, "，");
    }

    #[test]
    fn test_ctrl_shift_table() {
        let (mut addon, mut ctx) = setup(true);
        let r = addon.keystroke(&mut ctx, &KeyEvent::new("!").shift().ctrl());
        assert_eq!(r, KeyResult::Commit);
        assert_eq!(ctx.commit, "！");
        // comma is not in the shifted table
        let r = addon.keystroke(&mut ctx, &KeyEvent::new(",").shift().ctrl());
        assert_eq!(r, KeyResult::Ignore);
    }

    #[test]
    fn test_discards_composition() {
        let (mut addon, mut ctx) = setup(true);
        addon.keystroke(&mut ctx, &KeyEvent::new("a"));
        assert_eq!(ctx.composition, "A");
        addon.keystroke(&mut ctx, &KeyEvent::new("[").ctrl());
        assert_eq!(ctx.commit, "「");
        assert!(ctx.composition.is_empty());
        assert!(ctx.candidates.is_empty());
    }

    #[test]
    fn test_not_allowed() {
        let (mut addon, mut ctx) = setup(false);
        let r = addon.keystroke(&mut ctx, &KeyEvent::new(",").ctrl());
        assert_eq!(r, KeyResult::Ignore);
        assert!(ctx.commit.is_empty());
    }
}
