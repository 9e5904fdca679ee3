//! Property tests for engine and table invariants.
use std::sync::Arc;

use libcin_core::{
    normalized, parse_cin, CandidateList, Config, GenInp2, ImeContext, InputMethod, KeyEvent,
    KeyResult, PageDirection, Scalar, State, Table,
};
use proptest::prelude::*;

const TABLE: &str = "\
%ename Prop
%cname 性質
%selkey 123
%max_keystroke 3
%keyname begin
a 日
b 月
c 金
%keyname end
%chardef begin
a 一
a 二
a 三
a 四
ab 甲
ab 乙
abc 丙
b 丁
ca 戊
cc 己
cc 庚
cc 辛
cc 壬
%chardef end
";

fn key_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "a", "b", "c", "1", "2", "3", " ", "?", "*", "Backspace", "Escape", "ArrowLeft",
        "ArrowRight", "PageDown", "<", ">",
    ])
}

fn engine(extra: &str) -> (GenInp2, ImeContext) {
    let text = TABLE.replace("%max_keystroke 3\n", &format!("%max_keystroke 3\n{}", extra));
    let table = Arc::new(Table::from_cin(&text).unwrap());
    let mut im = GenInp2::new(table, &Config::default());
    let mut ctx = ImeContext::new();
    im.init(&mut ctx);
    (im, ctx)
}

proptest! {
    #[test]
    fn composition_stays_bounded(keys in prop::collection::vec(key_strategy(), 0..40)) {
        let (mut im, mut ctx) = engine("");
        for key in keys {
            im.keystroke(&mut ctx, &KeyEvent::new(key));
            prop_assert!(ctx.composition.chars().count() <= 3);
            prop_assert!(matches!(ctx.state, State::Composition | State::Candidates));
            if ctx.state == State::Candidates {
                prop_assert!(!ctx.candidates.is_empty());
            }
            let page = ctx.candidates.page_size();
            prop_assert_eq!(ctx.candidates.start() % page, 0);
            prop_assert!(ctx.candidates.is_empty() || ctx.candidates.start() < ctx.candidates.len());
        }
    }

    #[test]
    fn commit_leaves_clean_context(keys in prop::collection::vec(key_strategy(), 0..40)) {
        let (mut im, mut ctx) = engine("%AUTO_UPCHAR false\n");
        for key in keys {
            if im.keystroke(&mut ctx, &KeyEvent::new(key)) == KeyResult::Commit {
                prop_assert!(!ctx.commit.is_empty());
                prop_assert!(ctx.composition.is_empty());
                prop_assert!(ctx.candidates.is_empty());
                prop_assert_eq!(ctx.state, State::Composition);
            }
        }
    }

    #[test]
    fn auto_upchar_commit_starts_one_key(keys in prop::collection::vec(key_strategy(), 0..40)) {
        let (mut im, mut ctx) = engine("");
        for key in keys {
            if im.keystroke(&mut ctx, &KeyEvent::new(key)) == KeyResult::Commit {
                // either a plain commit or the commit plus the key that caused it
                prop_assert!(ctx.composition.chars().count() <= 1);
                prop_assert_eq!(ctx.state, State::Composition);
            }
        }
    }

    #[test]
    fn paging_window_never_empty(
        len in 1usize..60,
        page in 1usize..11,
        moves in prop::collection::vec(any::<bool>(), 0..30),
    ) {
        let mut list = CandidateList::new(page);
        list.set_candidates((0..len).map(|i| Some(i.to_string())).collect());
        for forward in moves {
            let dir = if forward { PageDirection::Forward } else { PageDirection::Backward };
            let moved = list.cycle(dir);
            prop_assert_eq!(moved, len > page);
            prop_assert!(!list.window().is_empty());
            prop_assert_eq!(list.start() % page, 0);
            prop_assert!(list.start() < len);
        }
    }

    #[test]
    fn quirks_are_idempotent(
        style in prop::sample::select(vec!["", "0", "1", "2", "4", "8", "x"]),
        selkey in prop::sample::select(vec!["123456789", "1234567890", "0123456789", "asdfghjkl"]),
        flag in 0i64..0x400,
        fingerprint in any::<bool>(),
        shift_autoup in any::<bool>(),
    ) {
        let mut table = Table {
            ename: "T".into(),
            cname: "測".into(),
            selkey: selkey.into(),
            ..Default::default()
        };
        table.chardef.push("CA", if fingerprint { "夕" } else { "他" });
        if !style.is_empty() {
            table.set_directive("space_style", Scalar::Text(style.into()));
        }
        if shift_autoup {
            table.set_directive("SELKEY_SHIFT", Scalar::Flag(true));
            table.set_directive("SPACE_AUTOUP", Scalar::Flag(true));
        }
        table.set_directive("flag", Scalar::Text(format!("0x{:x}", flag)));

        let once = normalized(&table);
        prop_assert_eq!(normalized(&once), once);
    }

    #[test]
    fn mandatory_fields_round_trip(
        ename in "[A-Za-z][A-Za-z0-9_]{0,11}",
        cname in "[\u{4e00}-\u{4fff}]{1,4}",
        selkey in "[0-9a-z;,./]{1,10}",
    ) {
        // a literal `false` reads as a switch, not a name
        prop_assume!(ename != "false" && selkey != "false");
        let text = format!(
            "%ename {}\n%cname {}\n%selkey {}\n%keyname begin\na 日\n%keyname end\n%chardef begin\na 日\n%chardef end\n",
            ename, cname, selkey
        );
        let table = parse_cin(&text).unwrap();
        prop_assert_eq!(table.ename, ename);
        prop_assert_eq!(table.cname, cname);
        prop_assert_eq!(table.selkey, selkey);
    }
}
