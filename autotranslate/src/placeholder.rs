//! Placeholder escaping around machine translation.
//!
//! Game strings embed substitution tokens such as `{PLAYER.NAME}`. Translation
//! services happily translate or reshape those, so before a string is sent
//! out every distinct `{NAME}` is replaced by a positional `{0}`, `{1}`, ...
//! token, and the names are restored afterwards from the same
//! [`PlaceholderSet`].
//!
//! Indices follow first-occurrence order, so the same input always produces
//! the same escaped text and set.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref PLACEHOLDER_REGEX: Regex = Regex::new(r"\{([^{}]+)\}").unwrap();
    // Translators like to wrap restored tokens in no-break spaces.
    static ref INDEX_REGEX: Regex = Regex::new(r"\x{00A0}*\{(\d+)\}\x{00A0}*").unwrap();
}

/// Distinct placeholder names found in one string, in first-occurrence order.
/// The position of a name is the index it is escaped to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderSet {
    names: Vec<String>,
}

impl PlaceholderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `name` if not present and returns its index.
    pub fn insert(&mut self, name: &str) -> usize {
        match self.index_of(name) {
            Some(i) => i,
            None => {
                self.names.push(name.to_string());
                self.names.len() - 1
            }
        }
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// Replaces every `{NAME}` in `input` with `{i}`, `i` being the index of
/// `NAME` in the returned set.
///
/// # Example
///
/// ```rust
/// use autotranslate::placeholder::{escape, unescape};
///
/// let (escaped, set) = escape("{HERO} hits {TARGET}, {HERO} wins");
/// assert_eq!(escaped, "{0} hits {1}, {0} wins");
/// assert_eq!(unescape(&escaped, &set), "{HERO} hits {TARGET}, {HERO} wins");
/// ```
pub fn escape(input: &str) -> (String, PlaceholderSet) {
    let mut set = PlaceholderSet::new();
    for caps in PLACEHOLDER_REGEX.captures_iter(input) {
        set.insert(&caps[1]);
    }
    if set.is_empty() {
        return (input.to_string(), set);
    }

    let escaped = PLACEHOLDER_REGEX.replace_all(input, |caps: &Captures| {
        match set.index_of(&caps[1]) {
            Some(i) => format!("{{{}}}", i),
            None => caps[0].to_string(),
        }
    });
    (escaped.into_owned(), set)
}

/// Restores the names recorded in `set`, dropping no-break spaces directly
/// around each restored token. Indices the set does not know are left alone.
pub fn unescape(input: &str, set: &PlaceholderSet) -> String {
    if set.is_empty() {
        return input.to_string();
    }

    INDEX_REGEX
        .replace_all(input, |caps: &Captures| {
            let name = caps[1].parse::<usize>().ok().and_then(|i| set.name(i));
            match name {
                Some(name) => format!("{{{}}}", name),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
