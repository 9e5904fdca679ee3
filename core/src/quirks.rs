//! Fixes for known table dialects.
//!
//! Tables come from xcin, gcin, OpenVanilla, iBus and friends, and they do not
//! agree on how to spell the same behavior. Each quirk rewrites one dialect
//! into the canonical directives the engine reads. Every quirk is idempotent,
//! so running the whole pass again is a no-op.
use tracing::{debug, warn};

use crate::table::{Scalar, Table};
use crate::utils;

/// Selection keys seen in the wild for Boshiamy-style tables.
const BOSHIAMY_SELKEYS: &[&str] = &["123456789", "1234567890", "0123456789"];
const BOSHIAMY_SELKEY: &str = "0123456789";
/// 夕, expected under key `ca` in every Boshiamy table.
const BOSHIAMY_GLYPH: &str = "\u{5915}";

/// gcin `%flag` bits.
const GCIN_FLAGS: &[(&str, i64)] = &[
    ("flag_keep_key_case", 0x01),
    ("flag_gtab_sym_kbm", 0x02),
    ("flag_phrase_auto_skip_endkey", 0x04),
    ("flag_auto_select_by_phrase", 0x08),
    ("flag_disp_partial_match", 0x10),
    ("flag_disp_full_match", 0x20),
    ("flag_vertical_selection", 0x40),
    ("flag_press_full_auto_send", 0x80),
    ("flag_unique_auto_send", 0x100),
    ("flag_keypad_input_key", 0x200),
];

/// gcin flags with an xcin equivalent.
const GCIN_TO_XCIN: &[(&str, &str)] = &[
    ("flag_disp_partial_match", "AUTO_COMPOSE"),
    ("flag_disp_full_match", "AUTO_COMPOSE"),
    ("flag_press_full_auto_send", "AUTO_FULLUP"),
];

/// Apply all quirks in place. Call once per load, before sharing the table.
pub fn apply_quirks(table: &mut Table) {
    general_quirks(table);
    array30_quirks(table);
    // must run before gcin_quirks consumes space_style
    boshiamy_quirks(table);
    gcin_quirks(table);
}

/// Pure form of `apply_quirks`.
pub fn normalized(table: &Table) -> Table {
    let mut t = table.clone();
    apply_quirks(&mut t);
    t
}

fn general_quirks(table: &mut Table) {
    // a bare %endkey declares no end keys
    if let Some(Scalar::Flag(true)) = table.directive("endkey") {
        debug!("quirks: bare %endkey -> empty");
        table.set_directive("endkey", Scalar::Text(String::new()));
    }
}

fn array30_quirks(table: &mut Table) {
    // %quickkey (xcin 2.3, OpenVanilla) and %quick (gcin) mean the same thing.
    if table.quick.is_none() {
        if let Some(quickkey) = table.quickkey.take() {
            debug!("quirks: %quickkey -> %quick");
            table.quick = Some(quickkey);
        }
    }
}

fn boshiamy_quirks(table: &mut Table) -> bool {
    let ca = table.normalize_key("ca");
    let fingerprint = table
        .chardef
        .get(&ca)
        .map(|list| list.iter().any(|c| c.contains(BOSHIAMY_GLYPH)))
        .unwrap_or(false);
    if !fingerprint {
        return false;
    }

    let dialect = match table.directive("space_style") {
        Some(style) => style.as_text().map(str::trim) == Some("1"),
        None => table.flag("SELKEY_SHIFT") && table.flag("SPACE_AUTOUP"),
    };
    if !dialect {
        return false;
    }

    // Space cannot be written in %selkey, so these tables shift selection by
    // one and let Space pick the first candidate. Only rewrite orderings we
    // know; other tables may mean it.
    if !BOSHIAMY_SELKEYS.contains(&table.selkey.as_str()) {
        return false;
    }

    debug!(from = %table.selkey, to = BOSHIAMY_SELKEY, "quirks: boshiamy selkey");
    table.selkey = BOSHIAMY_SELKEY.to_string();
    table.remove_directive("SELKEY_SHIFT");
    table.remove_directive("space_style");
    table.set_directive("SPACE_AUTOUP", Scalar::Text("any".to_string()));
    table.set_directive("SPACE_RESET", Scalar::Flag(true));
    true
}

fn gcin_quirks(table: &mut Table) {
    if let Some(style) = table.directive("space_style").cloned() {
        match style.as_text().and_then(utils::parse_int) {
            // none / nofull: keep what the table says
            Some(0) | Some(4) => {}
            // any (Boshiamy)
            Some(1) => {
                table.set_directive("SPACE_AUTOUP", Scalar::Text("any".to_string()));
                table.set_directive("SELKEY_SHIFT", Scalar::Flag(true));
                table.set_directive("SPACE_RESET", Scalar::Flag(true));
            }
            // full (Simplex)
            Some(2) => table.set_directive("AUTO_FULLUP", Scalar::Flag(true)),
            // dayi: input 2, select 1
            Some(8) => table.set_directive("SELKEY_SHIFT", Scalar::Flag(true)),
            _ => warn!(space_style = %style, table = %table.ename, "unknown space_style"),
        }
    }

    let flag = table
        .directive("flag")
        .and_then(Scalar::as_text)
        .and_then(utils::parse_int)
        .unwrap_or(0);
    for (name, bit) in GCIN_FLAGS {
        if flag & bit != 0 {
            debug!("quirks: gcin flag {}", name);
            table.set_directive(name, Scalar::Flag(true));
        }
    }

    for (gcin, xcin) in GCIN_TO_XCIN {
        if table.flag(gcin) {
            debug!("quirks: {} -> {}", gcin, xcin);
            table.set_directive(xcin, Scalar::Flag(true));
        }
    }
}
