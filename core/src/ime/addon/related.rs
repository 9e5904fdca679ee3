//! Related text: offer follow-up characters after a commit.
//!
//! After the wrapped method commits and leaves the context empty, the
//! characters the phrase book lists for the committed text are put in
//! `ImeContext::related` (one page at most). The next key decides: a selection
//! key commits from that list and offers the next round, anything else drops
//! the list and goes to the wrapped method.
use tracing::debug;

use crate::context::ImeContext;
use crate::ime::key_event::KeyEvent;
use crate::ime::method::{InputMethod, KeyResult};

pub struct RelatedTextAddon {
    inner: Box<dyn InputMethod>,
}

impl RelatedTextAddon {
    pub const NAME: &'static str = "RelatedText";

    pub fn new(inner: Box<dyn InputMethod>) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &dyn InputMethod {
        self.inner.as_ref()
    }

    /// Fill `ctx.related` from the phrase book entry of the last commit.
    fn find_related(&self, ctx: &mut ImeContext) -> bool {
        let page = ctx.selkey.chars().count();
        let related: Vec<String> = match ctx.phrases.lookup(&ctx.commit) {
            Some(chars) => chars.chars().take(page).map(String::from).collect(),
            None => return false,
        };
        debug!(commit = %ctx.commit, count = related.len(), "related text");
        ctx.related = related;
        !ctx.related.is_empty()
    }
}

impl InputMethod for RelatedTextAddon {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn init(&mut self, ctx: &mut ImeContext) {
        ctx.related.clear();
        self.inner.init(ctx);
    }

    fn reset_context(&mut self, ctx: &mut ImeContext) {
        ctx.related.clear();
        self.inner.reset_context(ctx);
    }

    fn keystroke(&mut self, ctx: &mut ImeContext, ev: &KeyEvent) -> KeyResult {
        if !ctx.allow_related_text || ev.has_ctrl_alt_meta() || ev.key == "Shift" {
            return self.inner.keystroke(ctx, ev);
        }

        if ev.is_key_down() && !ctx.related.is_empty() {
            let related = std::mem::take(&mut ctx.related);
            if ev.shift || ctx.auto_compose {
                let key = ev.unshifted_key();
                let picked = ctx
                    .selection_index(&key)
                    .and_then(|index| related.get(index));
                if let Some(text) = picked {
                    ctx.commit = text.clone();
                    ctx.wrong = false;
                    self.find_related(ctx);
                    return KeyResult::Commit;
                }
            }
        }

        let result = self.inner.keystroke(ctx, ev);
        if result == KeyResult::Commit && ctx.is_idle() {
            self.find_related(ctx);
        }
        result
    }
}
