//! Add-ons wrapping an input method.
//!
//! An add-on is itself an `InputMethod` that owns the next method in the
//! chain. It sees every event first and either handles it or passes it on.
//! A session wraps its module with the configured add-ons in list order, so
//! the last one listed sees events first.

pub mod cross;
pub mod punctuation;
pub mod related;

pub use cross::CrossQueryAddon;
pub use punctuation::PunctuationsAddon;
pub use related::RelatedTextAddon;

use super::method::InputMethod;

/// Add-ons known by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddonKind {
    RelatedText,
    Punctuations,
    CrossQuery,
}

impl AddonKind {
    /// Look up an add-on by its configured name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "RelatedText" | "AddonRelatedText" => Some(AddonKind::RelatedText),
            "Punctuations" | "AddonPunctuations" => Some(AddonKind::Punctuations),
            "CrossQuery" | "AddonCrossQuery" => Some(AddonKind::CrossQuery),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AddonKind::RelatedText => RelatedTextAddon::NAME,
            AddonKind::Punctuations => PunctuationsAddon::NAME,
            AddonKind::CrossQuery => CrossQueryAddon::NAME,
        }
    }

    /// Wrap `inner` with this add-on.
    pub fn wrap(self, inner: Box<dyn InputMethod>) -> Box<dyn InputMethod> {
        match self {
            AddonKind::RelatedText => Box::new(RelatedTextAddon::new(inner)),
            AddonKind::Punctuations => Box::new(PunctuationsAddon::new(inner)),
            AddonKind::CrossQuery => Box::new(CrossQueryAddon::new(inner)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(AddonKind::from_name("RelatedText"), Some(AddonKind::RelatedText));
        assert_eq!(AddonKind::from_name("AddonPunctuations"), Some(AddonKind::Punctuations));
        assert_eq!(AddonKind::from_name("Query"), None);
        assert_eq!(AddonKind::from_name("AddonCrossQuery"), Some(AddonKind::CrossQuery));
        assert_eq!(AddonKind::Punctuations.name(), "Punctuations");
    }
}
