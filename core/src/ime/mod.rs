//! Input method components.
//!
//! ## Architecture
//!
//! - **Key events**: host keyboard events and the normalized `Key`
//! - **Candidates**: candidate list with fixed-size pages
//! - **Options**: behavior switches resolved from config defaults and table directives
//! - **InputMethod**: the trait every module and add-on implements
//! - **GenInp2**: the table-driven composition state machine
//! - **Add-ons**: related text, cross-table lookup and Ctrl punctuation wrappers
//! - **Session**: one method chain plus its context
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use libcin_core::{Config, ImeSession, KeyEvent, KeyResult, Table};
//!
//! let table = Arc::new(Table::load_cin("array30.cin").unwrap());
//! let mut session = ImeSession::from_config(table, &Config::default());
//!
//! for key in ["a", "1"] {
//!     if session.process_key(&KeyEvent::new(key)) == KeyResult::Commit {
//!         println!("{}", session.take_commit());
//!     }
//! }
//! ```

pub mod addon;
pub mod candidates;
pub mod gen_inp;
pub mod key_event;
pub mod method;
pub mod options;
pub mod session;

pub use addon::{AddonKind, CrossQueryAddon, PunctuationsAddon, RelatedTextAddon};
pub use candidates::{CandidateList, PageDirection};
pub use gen_inp::GenInp2;
pub use key_event::{EventKind, Key, KeyEvent};
pub use method::{InputMethod, KeyResult};
pub use options::{Options, SpaceAutoUp};
pub use session::{ImeSession, ModuleKind};
