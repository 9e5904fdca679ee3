//! Input method trait and keystroke results.
//!
//! A session drives one `InputMethod`: the composition module itself, or an
//! add-on wrapping it. Add-ons are input methods holding an inner one.
use super::key_event::KeyEvent;
use crate::context::ImeContext;

/// Result of processing a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum KeyResult {
    /// Key was consumed; nothing to commit.
    Absorb = 0,
    /// Text was committed; read it from `ImeContext::commit`.
    Commit = 1,
    /// Key is not meaningful to the input method; the host handles it.
    Ignore = 2,
}

impl KeyResult {
    /// Numeric code exchanged with hosts.
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(KeyResult::Absorb),
            1 => Some(KeyResult::Commit),
            2 => Some(KeyResult::Ignore),
            _ => None,
        }
    }
}

/// Input method interface.
///
/// The method holds table data and configuration only; everything that
/// changes per keystroke lives in the `ImeContext` passed in.
pub trait InputMethod {
    /// Get a human-readable name for this input method (for logging).
    fn name(&self) -> &str;

    /// Prepare a fresh context for this method.
    fn init(&mut self, ctx: &mut ImeContext) {
        self.reset_context(ctx);
    }

    /// Drop any composition in progress.
    fn reset_context(&mut self, ctx: &mut ImeContext);

    /// Process one key event.
    fn keystroke(&mut self, ctx: &mut ImeContext, ev: &KeyEvent) -> KeyResult;
}
