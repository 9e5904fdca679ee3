//! Behavior options of the composition engine.
//!
//! Defaults come from `Config::defaults`; a table may override any of them with
//! the matching directive (`%AUTO_COMPOSE`, `%SPACE_AUTOUP any`, ...).
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::table::{Scalar, Table};

/// What Space does once candidates are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpaceAutoUp {
    /// Page through candidates; keep the list open when there is nothing to
    /// page.
    #[default]
    No,
    /// Page through candidates; commit the first one on the last page.
    Yes,
    /// Always commit the first candidate.
    Any,
}

impl SpaceAutoUp {
    /// Interpret a `%SPACE_AUTOUP` directive. Unknown values yield `None`.
    pub fn from_scalar(value: &Scalar) -> Option<Self> {
        match value {
            Scalar::Flag(true) => Some(SpaceAutoUp::Yes),
            Scalar::Flag(false) => Some(SpaceAutoUp::No),
            Scalar::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "false" | "no" | "0" => Some(SpaceAutoUp::No),
                "true" | "yes" | "1" => Some(SpaceAutoUp::Yes),
                "any" | "2" => Some(SpaceAutoUp::Any),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Compute candidates while typing.
    pub auto_compose: bool,
    /// A composition key typed over a candidate list commits the first
    /// candidate and starts a new composition.
    pub auto_upchar: bool,
    /// Convert as soon as the composition reaches `%max_keystroke`.
    pub commit_on_full: bool,
    pub space_autoup: SpaceAutoUp,
    /// Space selects the first candidate (index 0) like a selection key.
    pub selkey_shift: bool,
    /// An error on Space clears the composition.
    pub space_reset: bool,
    /// Any error clears the composition.
    pub auto_reset: bool,
    /// `?` and `*` act as wildcards.
    pub wild_enable: bool,
    /// Convert when the composition has exactly one candidate and no longer
    /// keys extend it.
    pub unique_auto: bool,
    /// Show candidates of longer keys, one per keyboard column.
    pub partial_match: bool,
    /// Space commits the first candidate when the composition is full.
    pub space_first_full: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            auto_compose: true,
            auto_upchar: true,
            commit_on_full: false,
            space_autoup: SpaceAutoUp::No,
            selkey_shift: false,
            space_reset: true,
            auto_reset: false,
            wild_enable: true,
            unique_auto: false,
            partial_match: false,
            space_first_full: false,
        }
    }
}

impl Options {
    /// Overlay a table's directives on top of `defaults`.
    pub fn from_table(defaults: &Options, table: &Table) -> Self {
        let mut opts = defaults.clone();
        let switches: [(&str, &mut bool); 10] = [
            ("AUTO_COMPOSE", &mut opts.auto_compose),
            ("AUTO_UPCHAR", &mut opts.auto_upchar),
            ("AUTO_FULLUP", &mut opts.commit_on_full),
            ("SELKEY_SHIFT", &mut opts.selkey_shift),
            ("SPACE_RESET", &mut opts.space_reset),
            ("AUTO_RESET", &mut opts.auto_reset),
            ("WILD_ENABLE", &mut opts.wild_enable),
            ("flag_unique_auto_send", &mut opts.unique_auto),
            ("flag_disp_partial_match", &mut opts.partial_match),
            ("space_auto_first_full", &mut opts.space_first_full),
        ];
        for (name, slot) in switches {
            if let Some(value) = table.directive(name) {
                *slot = value.is_true();
            }
        }

        if let Some(value) = table.directive("SPACE_AUTOUP") {
            opts.space_autoup = match SpaceAutoUp::from_scalar(value) {
                Some(v) => v,
                None => {
                    warn!(value = %value, table = %table.ename, "unknown SPACE_AUTOUP value");
                    SpaceAutoUp::No
                }
            };
        }
        opts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = Options::default();
        assert!(opts.auto_compose);
        assert!(opts.auto_upchar);
        assert!(opts.space_reset);
        assert!(opts.wild_enable);
        assert!(!opts.commit_on_full);
        assert_eq!(opts.space_autoup, SpaceAutoUp::No);
    }

    #[test]
    fn test_table_overrides() {
        let mut table = Table::default();
        table.set_directive("AUTO_COMPOSE", Scalar::Flag(false));
        table.set_directive("AUTO_FULLUP", Scalar::Flag(true));
        table.set_directive("SPACE_AUTOUP", Scalar::Text("any".into()));
        table.set_directive("flag_unique_auto_send", Scalar::Flag(true));
        let opts = Options::from_table(&Options::default(), &table);
        assert!(!opts.auto_compose);
        assert!(opts.commit_on_full);
        assert!(opts.unique_auto);
        assert_eq!(opts.space_autoup, SpaceAutoUp::Any);
        // untouched
        assert!(opts.wild_enable);
    }

    #[test]
    fn test_space_autoup_values() {
        let parse = |s: &str| SpaceAutoUp::from_scalar(&Scalar::Text(s.into()));
        assert_eq!(SpaceAutoUp::from_scalar(&Scalar::Flag(true)), Some(SpaceAutoUp::Yes));
        assert_eq!(parse("0"), Some(SpaceAutoUp::No));
        assert_eq!(parse("YES"), Some(SpaceAutoUp::Yes));
        assert_eq!(parse("2"), Some(SpaceAutoUp::Any));
        assert_eq!(parse("maybe"), None);

        let mut table = Table::default();
        table.set_directive("SPACE_AUTOUP", Scalar::Text("maybe".into()));
        let opts = Options::from_table(&Options::default(), &table);
        assert_eq!(opts.space_autoup, SpaceAutoUp::No);
    }
}
