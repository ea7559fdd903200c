//! Terminal identity canonicalization
//!
//! `TERM_PROGRAM` and the OS-reported frontmost process name rarely agree
//! textually ("iTerm.app" vs "iTerm2", "vscode" vs "Code"), so both sides are
//! reduced to a canonical key and compared through alias classes.

use once_cell::sync::Lazy;
use std::collections::{BTreeSet, HashMap};

/// Equivalence classes of canonical terminal keys.
///
/// Every member of a class maps to the whole class, so lookups are symmetric
/// (`warp` and `warpterminal` both yield the same set).
const ALIAS_CLASSES: &[&[&str]] = &[
    &["appleterminal", "terminal"],
    &["iterm", "iterm2", "itermapp"],
    &["ghostty"],
    &["wezterm"],
    &["alacritty"],
    &["kitty"],
    &["warp", "warpterminal"],
    &["vscode", "code", "visualstudiocode"],
];

static ALIAS_TABLE: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let mut table = HashMap::new();
    for class in ALIAS_CLASSES {
        for key in *class {
            table.insert(*key, *class);
        }
    }
    table
});

/// Canonicalize an application or terminal name.
///
/// Lowercases, strips a trailing `.app`, then drops everything that is not
/// an ASCII letter or digit. Absent input maps to the empty key.
pub fn normalize(raw: Option<&str>) -> String {
    let lower = raw.unwrap_or_default().to_lowercase();
    let stem = lower.strip_suffix(".app").unwrap_or(&lower);
    stem.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// Canonical keys considered the same terminal as `key` (always includes `key`)
pub fn aliases_of(key: &str) -> BTreeSet<String> {
    match ALIAS_TABLE.get(key) {
        Some(class) => class.iter().map(|k| (*k).to_string()).collect(),
        None => BTreeSet::from([key.to_string()]),
    }
}

/// Whether `candidate` names the same terminal as `key`; both must already be canonical
pub fn is_alias(key: &str, candidate: &str) -> bool {
    match ALIAS_TABLE.get(key) {
        Some(class) => class.contains(&candidate),
        None => key == candidate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(keys: &[&str]) -> BTreeSet<String> {
        keys.iter().map(|k| (*k).to_string()).collect()
    }

    #[test]
    fn test_normalize_strips_app_suffix_and_case() {
        assert_eq!(normalize(Some("iTerm.app")), "iterm");
        assert_eq!(normalize(Some("ITERM")), "iterm");
        assert_eq!(normalize(Some("Apple_Terminal")), "appleterminal");
        assert_eq!(normalize(Some("Visual Studio Code")), "visualstudiocode");
        assert_eq!(normalize(Some("WezTerm.APP")), "wezterm");
    }

    #[test]
    fn test_normalize_only_strips_trailing_suffix() {
        assert_eq!(normalize(Some("my.app.runner")), "myapprunner");
        assert_eq!(normalize(Some(".app")), "");
    }

    #[test]
    fn test_normalize_empty_and_absent() {
        assert_eq!(normalize(None), "");
        assert_eq!(normalize(Some("")), "");
        assert_eq!(normalize(Some("  -- ")), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "iTerm.app",
            "Apple_Terminal",
            "warp-terminal",
            "kitty",
            "Ünïcode Term.app",
            "a.app.app",
            "",
            "ghostty 1.0",
        ];
        for input in inputs {
            let once = normalize(Some(input));
            assert_eq!(normalize(Some(once.as_str())), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_aliases_reflexive_for_known_and_unknown() {
        for key in ["iterm", "itermapp", "terminal", "kitty", "vscode", "code", "foot", ""] {
            assert!(aliases_of(key).contains(key), "key: {key:?}");
        }
    }

    #[test]
    fn test_unknown_terminal_is_singleton() {
        assert_eq!(aliases_of("foot"), set(&["foot"]));
        assert!(is_alias("foot", "foot"));
        assert!(!is_alias("foot", "kitty"));
    }

    #[test]
    fn test_warp_is_bidirectional() {
        let expected = set(&["warp", "warpterminal"]);
        assert_eq!(aliases_of("warp"), expected);
        assert_eq!(aliases_of("warpterminal"), expected);
    }

    #[test]
    fn test_iterm_family() {
        let expected = set(&["iterm", "iterm2", "itermapp"]);
        assert_eq!(aliases_of("iterm"), expected);
        assert_eq!(aliases_of("iterm2"), expected);
        assert!(is_alias(&normalize(Some("iTerm.app")), &normalize(Some("iTerm2"))));
    }

    #[test]
    fn test_editor_terminal_family() {
        assert!(is_alias("vscode", "code"));
        assert!(is_alias("vscode", &normalize(Some("Visual Studio Code"))));
        assert!(!is_alias("vscode", "terminal"));
    }

    #[test]
    fn test_default_terminal() {
        assert!(is_alias(&normalize(Some("Apple_Terminal")), "terminal"));
    }
}
