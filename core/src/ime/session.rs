//! Input sessions.
//!
//! An `ImeSession` pairs one input method chain (module plus add-ons) with the
//! `ImeContext` it mutates. The table behind the module is shared; everything
//! else belongs to the session.
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::addon::AddonKind;
use super::gen_inp::GenInp2;
use super::key_event::KeyEvent;
use super::method::{InputMethod, KeyResult};
use crate::context::ImeContext;
use crate::phrases::PhraseBook;
use crate::table::Table;
use crate::Config;

/// Composition modules known by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModuleKind {
    #[default]
    GenInp2,
}

impl ModuleKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            GenInp2::NAME => Some(ModuleKind::GenInp2),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ModuleKind::GenInp2 => GenInp2::NAME,
        }
    }

    fn build(self, table: Arc<Table>, config: &Config) -> Box<dyn InputMethod> {
        match self {
            ModuleKind::GenInp2 => Box::new(GenInp2::new(table, config)),
        }
    }
}

/// One input session: an input method chain and its context.
pub struct ImeSession {
    method: Box<dyn InputMethod>,
    module: ModuleKind,
    context: ImeContext,
}

impl ImeSession {
    /// Build `module` over `table`, wrap it with `addons` in order and start a
    /// fresh context.
    ///
    /// Unknown module names fall back to `config.default_module`, then to
    /// `GenInp2`. Unknown add-ons are skipped.
    pub fn activate<S: AsRef<str>>(
        table: Arc<Table>,
        module: &str,
        addons: &[S],
        config: &Config,
    ) -> Self {
        let kind = match ModuleKind::from_name(module) {
            Some(kind) => kind,
            None => {
                let fallback = ModuleKind::from_name(&config.default_module).unwrap_or_default();
                warn!(module, fallback = fallback.name(), "unknown input module");
                fallback
            }
        };

        let mut method = kind.build(table.clone(), config);
        for name in addons {
            let name = name.as_ref();
            match AddonKind::from_name(name) {
                Some(addon) => method = addon.wrap(method),
                None => warn!(addon = name, "unknown add-on, skipped"),
            }
        }

        let mut context = ImeContext::new();
        context.allow_related_text = config.allow_related_text;
        context.allow_ctrl_phrase = config.allow_ctrl_phrase;
        method.init(&mut context);

        info!(table = %table.ename, module = kind.name(), "session activated");
        Self {
            method,
            module: kind,
            context,
        }
    }

    /// Activate with the module and add-ons named in `config`.
    pub fn from_config(table: Arc<Table>, config: &Config) -> Self {
        Self::activate(table, &config.default_module, &config.addons, config)
    }

    /// Use `phrases` for related text.
    pub fn with_phrases(mut self, phrases: Arc<PhraseBook>) -> Self {
        self.context.phrases = phrases;
        self
    }

    /// Show how committed characters are typed in `table`.
    pub fn with_cross_query(mut self, table: Arc<Table>) -> Self {
        self.context.cross_table = Some(table);
        self
    }

    pub fn module(&self) -> ModuleKind {
        self.module
    }

    /// Name of the outermost method in the chain.
    pub fn method_name(&self) -> &str {
        self.method.name()
    }

    /// Deliver one key event.
    pub fn process_key(&mut self, ev: &KeyEvent) -> KeyResult {
        self.context.commit.clear();
        self.context.wrong = false;
        let result = self.method.keystroke(&mut self.context, ev);
        debug!(key = %ev.key, ?result, "session key");
        result
    }

    /// Take committed text, leaving it empty.
    pub fn take_commit(&mut self) -> String {
        self.context.take_commit()
    }

    pub fn context(&self) -> &ImeContext {
        &self.context
    }

    /// Host-side access (permission flags, phrase book).
    pub fn context_mut(&mut self) -> &mut ImeContext {
        &mut self.context
    }

    /// Drop whatever is being composed.
    pub fn reset(&mut self) {
        self.method.reset_context(&mut self.context);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
%ename Test
%cname 測試
%selkey 123
%keyname begin
a 日
%keyname end
%chardef begin
a 中
a 申
%chardef end
";

    fn table() -> Arc<Table> {
        Arc::new(Table::from_cin(TABLE).unwrap())
    }

    #[test]
    fn test_module_names() {
        assert_eq!(ModuleKind::from_name("GenInp2"), Some(ModuleKind::GenInp2));
        assert_eq!(ModuleKind::from_name("RelatedText"), None);
    }

    #[test]
    fn test_unknown_module_falls_back() {
        let config = Config::default();
        let session = ImeSession::activate(table(), "NoSuchModule", &[] as &[&str], &config);
        assert_eq!(session.module(), ModuleKind::GenInp2);
        assert_eq!(session.method_name(), "GenInp2");
    }

    #[test]
    fn test_addons_wrap_in_order() {
        let config = Config::default();
        let session =
            ImeSession::activate(table(), "GenInp2", &["RelatedText", "Bogus", "Punctuations"], &config);
        assert_eq!(session.method_name(), "Punctuations");
    }

    #[test]
    fn test_process_and_take_commit() {
        let config = Config::default();
        let mut session = ImeSession::from_config(table(), &config);
        assert_eq!(session.process_key(&KeyEvent::new("a")), KeyResult::Absorb);
        assert_eq!(session.context().candidates.len(), 2);
        assert_eq!(session.process_key(&KeyEvent::new("2")), KeyResult::Commit);
        assert_eq!(session.take_commit(), "申");
        assert!(session.context().commit.is_empty());
    }

    #[test]
    fn test_flags_and_reset() {
        let config = Config {
            allow_ctrl_phrase: true,
            ..Config::default()
        };
        let mut session = ImeSession::from_config(table(), &config);
        assert!(session.context().allow_ctrl_phrase);
        session.process_key(&KeyEvent::new("a"));
        session.reset();
        assert!(session.context().is_idle());
    }
}
