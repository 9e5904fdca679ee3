//! `cintool type`: drive an input session from key names.
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use libcin_core::{Config, ImeSession, KeyEvent, KeyResult, PhraseBook, Table};
use serde::Serialize;

/// One line of output per key.
#[derive(Serialize)]
struct Step<'a> {
    key: &'a str,
    result: u8,
    composition: &'a str,
    keystroke: &'a str,
    candidates: Vec<String>,
    page: &'a str,
    commit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
    wrong: bool,
}

/// Parse `Ctrl+Shift+x` style names. The last part is the key itself, so
/// `Ctrl++` is Ctrl with `+`.
pub fn parse_key(name: &str) -> KeyEvent {
    let mut rest = name;
    let (mut ctrl, mut alt, mut shift, mut meta) = (false, false, false, false);
    loop {
        if let Some(r) = rest.strip_prefix("Ctrl+") {
            ctrl = true;
            rest = r;
        } else if let Some(r) = rest.strip_prefix("Alt+") {
            alt = true;
            rest = r;
        } else if let Some(r) = rest.strip_prefix("Shift+") {
            shift = true;
            rest = r;
        } else if let Some(r) = rest.strip_prefix("Meta+") {
            meta = true;
            rest = r;
        } else {
            break;
        }
    }

    let mut ev = KeyEvent::new(rest);
    ev.ctrl = ctrl;
    ev.alt = alt;
    ev.meta = meta;
    ev.shift |= shift;
    ev
}

pub fn run(
    table: Table,
    config: &Config,
    phrases: Option<&Path>,
    cross: Option<Table>,
    keys: &[String],
    json: bool,
) -> Result<()> {
    let mut session = ImeSession::from_config(Arc::new(table), config);
    if let Some(path) = phrases {
        let book = PhraseBook::load_json(path)
            .with_context(|| format!("cannot load {}", path.display()))?;
        session = session.with_phrases(Arc::new(book));
    }
    if let Some(cross) = cross {
        session = session.with_cross_query(Arc::new(cross));
    }

    let mut committed = String::new();
    for key in keys {
        let result = session.process_key(&parse_key(key));
        let commit = if result == KeyResult::Commit {
            session.take_commit()
        } else {
            String::new()
        };
        committed.push_str(&commit);

        let ctx = session.context();
        let null = &config.null_candidate;
        let mut candidates = ctx.candidates.display_window(null);
        if candidates.is_empty() {
            candidates = ctx.related.clone();
        }
        let step = Step {
            key,
            result: result.code(),
            composition: &ctx.composition,
            keystroke: &ctx.keystroke,
            candidates,
            page: &ctx.page_prompt,
            commit,
            hint: ctx.cross_hint.as_ref().map(ToString::to_string),
            wrong: ctx.wrong,
        };

        if json {
            println!("{}", serde_json::to_string(&step)?);
        } else {
            println!(
                "{:<10} {:?} [{}] {} {} {}{}{}",
                step.key,
                result,
                step.keystroke,
                step.candidates.join(" "),
                step.page,
                if step.commit.is_empty() { String::new() } else { format!("=> {}", step.commit) },
                if step.wrong { " (!)" } else { "" },
                step.hint.as_deref().map(|h| format!(" ({h})")).unwrap_or_default(),
            );
        }
    }

    if !json {
        println!("committed: {committed}");
    }
    Ok(())
}
