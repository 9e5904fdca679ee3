//! Table loading: parsing, validation and dialect normalization.
use libcin_core::{apply_quirks, normalized, parse_cin, Scalar, Table};

const BOSHIAMY: &str = "\
# Boshiamy as shipped by gcin
%gen_inp
%ename liu
%cname 嘸蝦米
%selkey 1234567890
%space_style 1
%keyname begin
a a
c c
%keyname end
%chardef begin
a 對
a 兌
ca 夕
%chardef end
";

const ARRAY30: &str = "\
%ename Array30
%cname 行列30
%selkey 1234567890
%keyname begin
w 1^
x 2v
%keyname end
%quickkey begin
w 對□年
%quickkey end
%chardef begin
w 五
w1 文
";

#[test]
fn parse_minimal_table() {
    let text = "%ename Test\n%cname 測試\n%selkey 123\n\
                %keyname begin\na 日\n%keyname end\n\
                %chardef begin\na 對\n%chardef end\n";
    let table = parse_cin(text).unwrap();
    assert_eq!(table.ename, "Test");
    assert_eq!(table.cname, "測試");
    assert_eq!(table.selkey, "123");
    assert_eq!(table.chardef.get("A"), Some(&["對".to_string()][..]));
}

#[test]
fn missing_chardef_is_fatal() {
    let text = "%ename Test\n%cname 測試\n%selkey 123\n%keyname begin\na 日\n%keyname end\n";
    let err = parse_cin(text).unwrap_err();
    assert!(err.message.contains("chardef"), "{}", err);
    assert_eq!(err.line, None);
}

#[test]
fn missing_mandatory_scalars() {
    for missing in ["ename", "cname", "selkey"] {
        let mut text = String::new();
        for (name, value) in [("ename", "T"), ("cname", "測"), ("selkey", "123")] {
            if name != missing {
                text.push_str(&format!("%{} {}\n", name, value));
            }
        }
        text.push_str("%keyname begin\na 日\n%keyname end\n%chardef begin\na 日\n%chardef end\n");
        let err = parse_cin(&text).unwrap_err();
        assert!(err.message.contains(missing), "{}: {}", missing, err);
    }
}

#[test]
fn prompt_is_legacy_cname() {
    let text = "%ename T\n%prompt 舊名\n%selkey 1\n\
                %keyname begin\na 日\n%keyname end\n%chardef begin\na 日\n%chardef end\n";
    assert_eq!(parse_cin(text).unwrap().cname, "舊名");
}

#[test]
fn unclosed_block_reports_line() {
    let text = "%ename T\n%cname 測\n%selkey 1\n%keyname begin\na 日\n%chardef begin\n";
    let err = parse_cin(text).unwrap_err();
    assert_eq!(err.line, Some(6));
    assert!(err.to_string().starts_with("line 6:"));
}

#[test]
fn unclosed_chardef_is_accepted() {
    let table = parse_cin(ARRAY30).unwrap();
    assert_eq!(table.chardef.len(), 2);
}

#[test]
fn scalar_values() {
    let text = "%ename T\n%cname 測\n%selkey 1\n%AUTO_COMPOSE false\n%WILD_ENABLE\n%max_keystroke 5\n\
                %keyname begin\na 日\n%keyname end\n%chardef begin\na 日\n%chardef end\n";
    let table = parse_cin(text).unwrap();
    assert_eq!(table.directive("AUTO_COMPOSE"), Some(&Scalar::Flag(false)));
    assert_eq!(table.directive("WILD_ENABLE"), Some(&Scalar::Flag(true)));
    assert_eq!(table.max_keystroke(), 5);
}

#[test]
fn boshiamy_dialect_rewritten() {
    let table = Table::from_cin(BOSHIAMY).unwrap();
    assert_eq!(table.selkey, "0123456789");
    assert_eq!(table.directive("SPACE_AUTOUP"), Some(&Scalar::Text("any".into())));
    assert!(table.flag("SPACE_RESET"));
    assert!(table.directive("SELKEY_SHIFT").is_none());
    assert!(table.directive("space_style").is_none());
}

#[test]
fn lookalike_table_not_rewritten_as_boshiamy() {
    // same glyph under CA, but an unknown selection key order
    let text = BOSHIAMY.replace("%selkey 1234567890", "%selkey asdfghjkl;");
    let table = Table::from_cin(&text).unwrap();
    assert_eq!(table.selkey, "asdfghjkl;");
    // the generic gcin space_style rewrite still applies
    assert!(table.flag("SELKEY_SHIFT"));
}

#[test]
fn array30_quickkey_becomes_quick() {
    let table = Table::from_cin(ARRAY30).unwrap();
    let quick = table.quick.as_ref().unwrap();
    assert_eq!(quick.get("W").map(String::as_str), Some("對□年"));
}

#[test]
fn gcin_flag_bits() {
    let text = "%ename T\n%cname 測\n%selkey 1\n%flag 0x190\n\
                %keyname begin\na 日\n%keyname end\n%chardef begin\na 日\n%chardef end\n";
    let table = Table::from_cin(text).unwrap();
    assert!(table.flag("flag_unique_auto_send"));
    assert!(table.flag("flag_disp_partial_match"));
    assert!(table.flag("flag_press_full_auto_send"));
    assert!(table.flag("AUTO_COMPOSE"));
    assert!(table.flag("AUTO_FULLUP"));
}

#[test]
fn normalization_is_idempotent() {
    for text in [BOSHIAMY, ARRAY30] {
        let once = normalized(&parse_cin(text).unwrap());
        let mut twice = once.clone();
        apply_quirks(&mut twice);
        assert_eq!(once, twice);
    }
}

#[test]
fn snapshots_keep_candidate_order() {
    let table = Table::from_cin(BOSHIAMY).unwrap();
    let json = Table::from_json(&table.to_json().unwrap()).unwrap();
    let bin = Table::from_bincode(&table.to_bincode().unwrap()).unwrap();
    assert_eq!(json, table);
    assert_eq!(bin, table);
    assert_eq!(bin.chardef.get("A").unwrap(), &["對", "兌"]);
}
