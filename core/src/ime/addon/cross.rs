//! Cross query: after a single character is committed, show how to type it
//! in another table.
//!
//! The host picks the other table through `ImeContext::cross_table`. The
//! add-on keeps a reverse index (character -> first `%chardef` key that
//! produces it) for that table and rebuilds it when the table changes.
use std::sync::Arc;

use ahash::AHashMap;
use tracing::debug;

use crate::context::{CrossHint, ImeContext};
use crate::ime::key_event::KeyEvent;
use crate::ime::method::{InputMethod, KeyResult};
use crate::table::Table;

/// Character -> key sequence, for one table.
struct ReverseIndex {
    table: Arc<Table>,
    keys: AHashMap<String, String>,
}

impl ReverseIndex {
    fn build(table: Arc<Table>) -> Self {
        let mut keys: AHashMap<String, String> = AHashMap::new();
        for (key, candidates) in table.chardef.iter() {
            for candidate in candidates {
                if candidate.chars().count() != 1 {
                    continue;
                }
                // the first key in table order wins
                keys.entry(candidate.clone())
                    .or_insert_with(|| key.to_string());
            }
        }
        debug!(table = %table.ename, chars = keys.len(), "cross query index built");
        Self { table, keys }
    }

    fn hint(&self, text: &str) -> Option<CrossHint> {
        self.keys.get(text).map(|key| CrossHint {
            text: text.to_string(),
            keys: self.table.display_keys(key),
            label: self.table.cname.clone(),
        })
    }
}

pub struct CrossQueryAddon {
    inner: Box<dyn InputMethod>,
    index: Option<ReverseIndex>,
}

impl CrossQueryAddon {
    pub const NAME: &'static str = "CrossQuery";

    pub fn new(inner: Box<dyn InputMethod>) -> Self {
        Self { inner, index: None }
    }

    pub fn inner(&self) -> &dyn InputMethod {
        self.inner.as_ref()
    }

    /// Index for `table`, rebuilt only when the context points elsewhere.
    fn index_for(&mut self, table: &Arc<Table>) -> &ReverseIndex {
        let stale = self
            .index
            .as_ref()
            .map_or(true, |index| !Arc::ptr_eq(&index.table, table));
        if stale {
            self.index = None;
        }
        self.index
            .get_or_insert_with(|| ReverseIndex::build(table.clone()))
    }
}

impl InputMethod for CrossQueryAddon {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn init(&mut self, ctx: &mut ImeContext) {
        ctx.cross_hint = None;
        self.inner.init(ctx);
    }

    fn reset_context(&mut self, ctx: &mut ImeContext) {
        ctx.cross_hint = None;
        self.inner.reset_context(ctx);
    }

    fn keystroke(&mut self, ctx: &mut ImeContext, ev: &KeyEvent) -> KeyResult {
        ctx.cross_hint = None;
        let Some(table) = ctx.cross_table.clone() else {
            self.index = None;
            return self.inner.keystroke(ctx, ev);
        };

        let result = self.inner.keystroke(ctx, ev);
        if result == KeyResult::Commit && ctx.commit.chars().count() == 1 {
            ctx.cross_hint = self.index_for(&table).hint(&ctx.commit);
            debug!(commit = %ctx.commit, hint = ?ctx.cross_hint, "cross query");
        }
        result
    }
}
