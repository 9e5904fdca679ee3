//! Sessions with add-ons, activated from configuration.
use std::sync::Arc;

use libcin_core::{Config, CrossHint, ImeSession, KeyEvent, KeyResult, PhraseBook, Table};

const TABLE: &str = "\
%ename Cangjie
%cname 倉頡
%selkey 123456789
%keyname begin
a 日
b 月
l 中
%keyname end
%chardef begin
l 中
a 日
a 曰
b 中國
%chardef end
";

const ARRAY: &str = "\
%ename Array30
%cname 行列
%selkey 1234567890
%keyname begin
d 3^
i 8v
%keyname end
%chardef begin
i 中國
id 中
%chardef end
";

fn session(config: &Config) -> ImeSession {
    let mut book = PhraseBook::new();
    book.insert("中", "國文");
    book.insert("國", "家");
    ImeSession::from_config(Arc::new(Table::from_cin(TABLE).unwrap()), config)
        .with_phrases(Arc::new(book))
}

fn permissive() -> Config {
    Config::from_toml_str(
        r#"
        allow_related_text = true
        allow_ctrl_phrase = true
        "#,
    )
    .unwrap()
}

#[test]
fn related_text_follows_commit() {
    let mut s = session(&permissive());
    s.process_key(&KeyEvent::new("l"));
    assert_eq!(s.process_key(&KeyEvent::new(" ")), KeyResult::Commit);
    assert_eq!(s.take_commit(), "中");
    assert_eq!(s.context().related, vec!["國", "文"]);

    assert_eq!(s.process_key(&KeyEvent::new("1")), KeyResult::Commit);
    assert_eq!(s.take_commit(), "國");
    assert_eq!(s.context().related, vec!["家"]);
}

#[test]
fn related_text_needs_permission() {
    let mut s = session(&Config::default());
    s.process_key(&KeyEvent::new("l"));
    s.process_key(&KeyEvent::new(" "));
    assert_eq!(s.take_commit(), "中");
    assert!(s.context().related.is_empty());
}

#[test]
fn ctrl_punctuation() {
    let mut s = session(&permissive());
    assert_eq!(s.process_key(&KeyEvent::new(".").ctrl()), KeyResult::Commit);
    assert_eq!(s.take_commit(), "。");
    // without the add-on permission Ctrl keys go to the host
    let mut s = session(&Config::default());
    assert_eq!(s.process_key(&KeyEvent::new(".").ctrl()), KeyResult::Ignore);
}

#[test]
fn addon_list_from_config() {
    let config = Config::from_toml_str(
        r#"
        default_module = "NoSuchModule"
        addons = ["Punctuations"]
        allow_ctrl_phrase = true
        "#,
    )
    .unwrap();
    let s = session(&config);
    assert_eq!(s.method_name(), "Punctuations");
    assert_eq!(s.module().name(), "GenInp2");
}

#[test]
fn default_options_from_config() {
    let config = Config::from_toml_str(
        r#"
        [defaults]
        space_autoup = "yes"
        "#,
    )
    .unwrap();
    let mut s = session(&config);
    s.process_key(&KeyEvent::new("a"));
    assert_eq!(s.process_key(&KeyEvent::new(" ")), KeyResult::Commit);
    assert_eq!(s.take_commit(), "日");
}

#[test]
fn commit_is_cleared_by_next_key() {
    let mut s = session(&Config::default());
    s.process_key(&KeyEvent::new("l"));
    s.process_key(&KeyEvent::new(" "));
    assert!(s.context().has_commit());
    s.process_key(&KeyEvent::new("a"));
    assert!(!s.context().has_commit());
    assert_eq!(s.context().composition, "A");
}

fn cross_session() -> ImeSession {
    session(&Config::default()).with_cross_query(Arc::new(Table::from_cin(ARRAY).unwrap()))
}

#[test]
fn cross_query_shows_keys_in_other_table() {
    let mut s = cross_session();
    s.process_key(&KeyEvent::new("l"));
    assert_eq!(s.process_key(&KeyEvent::new(" ")), KeyResult::Commit);
    assert_eq!(s.take_commit(), "中");
    assert_eq!(
        s.context().cross_hint,
        Some(CrossHint {
            text: "中".into(),
            keys: "8v3^".into(),
            label: "行列".into(),
        })
    );
}

#[test]
fn cross_query_miss_leaves_no_hint() {
    let mut s = cross_session();
    s.process_key(&KeyEvent::new("a"));
    assert_eq!(s.process_key(&KeyEvent::new("1")), KeyResult::Commit);
    assert_eq!(s.take_commit(), "日");
    assert!(s.context().cross_hint.is_none());
}

#[test]
fn cross_query_skips_phrases() {
    let mut s = cross_session();
    s.process_key(&KeyEvent::new("b"));
    assert_eq!(s.process_key(&KeyEvent::new(" ")), KeyResult::Commit);
    assert_eq!(s.take_commit(), "中國");
    assert!(s.context().cross_hint.is_none());
}

#[test]
fn cross_query_needs_a_table() {
    let mut s = session(&Config::default());
    s.process_key(&KeyEvent::new("l"));
    s.process_key(&KeyEvent::new(" "));
    assert_eq!(s.take_commit(), "中");
    assert!(s.context().cross_hint.is_none());
}
