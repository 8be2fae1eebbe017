//! Text normalization.
//!
//! Queries, thesaurus segments and frequency tables all share one textual
//! form: ASCII only, lowercase, alphanumeric words separated by single
//! spaces. [`normalize_text`] produces that form in two steps:
//!
//! 1. Unicode NFD decomposition, removal of non-ASCII characters, collapsing
//!    of control characters, repeated spaces and line breaks.
//! 2. Every run of non-alphanumeric characters becomes a single space, then
//!    the text is lowercased and trimmed.
//!
//! # Examples
//!
//! ```
//! use lexpand::analysis::normalize::normalize_text;
//!
//! assert_eq!(normalize_text("  Café  au-Lait!! "), "cafe au lait");
//! ```

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static CONTROL_CHARACTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x00-\x09\x0E-\x19][\x00-\x09\x0E-\x20]*").unwrap());
static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ ]{2,}").unwrap());
static NEW_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ ]?[\n\x0A-\x0D][\n\x0A-\x0D ]*").unwrap());
static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ ]?[^ 0-9a-zA-Z][^0-9a-zA-Z]*").unwrap());
static HYPHENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-_.\x{2022}]").unwrap());

/// Normalizes free text into the canonical query form.
///
/// The expansion engine only depends on this trait, so callers can plug in a
/// different normalization policy as long as it agrees with the one used to
/// build the thesaurus and the frequency tables.
pub trait TextNormalizer: Send + Sync {
    /// Normalize the given text.
    fn normalize(&self, text: &str) -> String;

    /// Get the name of this normalizer for logging.
    fn name(&self) -> &'static str;
}

/// The default normalizer, backed by [`normalize_text`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiNormalizer;

impl AsciiNormalizer {
    pub fn new() -> Self {
        AsciiNormalizer
    }
}

impl TextNormalizer for AsciiNormalizer {
    fn normalize(&self, text: &str) -> String {
        normalize_text(text)
    }

    fn name(&self) -> &'static str {
        "ascii"
    }
}

/// First normalization step: ASCII folding and whitespace cleanup.
///
/// Line breaks survive this step (collapsed to a single `\n`).
pub fn normalize_whitespace(text: &str) -> String {
    let ascii: String = text.nfd().filter(char::is_ascii).collect();
    let text = CONTROL_CHARACTERS.replace_all(&ascii, " ");
    let text = SPACES.replace_all(&text, " ");
    let text = NEW_LINES.replace_all(&text, "\n");
    text.trim().to_string()
}

/// Second normalization step: punctuation removal and lowercasing.
pub fn normalize_punctuation(text: &str) -> String {
    let text = NON_ALPHANUMERIC.replace_all(text, " ");
    text.to_lowercase().trim().to_string()
}

/// Normalize text into lowercase alphanumeric words separated by single spaces.
pub fn normalize_text(text: &str) -> String {
    normalize_punctuation(&normalize_whitespace(text))
}

/// Normalize text after removing hyphens, underscores, dots and bullets, so
/// that `"e-mail"` and `"email"` meet.
pub fn normalize_hyphens(text: &str) -> String {
    let text = normalize_whitespace(text);
    normalize_text(&HYPHENS.replace_all(&text, ""))
}

/// Normalize text after splitting camel-case words (`"PlayStation"` becomes
/// `"play station"`).
pub fn normalize_multiword(text: &str) -> String {
    let text = normalize_whitespace(text);
    let mut split = String::with_capacity(text.len() + 8);
    let mut previous: Option<char> = None;
    for letter in text.chars() {
        if letter.is_ascii_uppercase() && previous.is_some_and(|p| p.is_ascii_lowercase()) {
            split.push(' ');
        }
        split.push(letter);
        previous = Some(letter);
    }
    normalize_punctuation(&split)
}

/// Which alias variants [`normalize_aliases`] generates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AliasOptions {
    /// Spell `&` out as `" "`, `""`, `" and "`, `" n "` and `"n"`.
    pub ampersand: bool,
    /// Add the [`normalize_hyphens`] variant.
    pub hyphens: bool,
    /// Add the [`normalize_multiword`] variant.
    pub multiword: bool,
    /// Complete joined/spaced acronym pairs.
    pub acronyms: bool,
}

impl Default for AliasOptions {
    fn default() -> Self {
        Self {
            ampersand: true,
            hyphens: true,
            multiword: true,
            acronyms: true,
        }
    }
}

/// Normalize a set of raw aliases of one entity into the set of surface forms
/// under which it can be found.
///
/// Empty aliases are discarded.
pub fn normalize_aliases<I, S>(aliases_raw: I, options: AliasOptions) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut aliases = BTreeSet::new();

    for alias_raw in aliases_raw {
        let alias_raw = alias_raw.as_ref();
        let mut variants = vec![alias_raw.to_string()];

        if options.ampersand && alias_raw.contains('&') {
            let parts: Vec<&str> = alias_raw.trim().split('&').collect();
            for joiner in [" ", "", " and ", " n ", "n"] {
                variants.push(parts.join(joiner));
            }
        }

        for variant in &variants {
            aliases.insert(normalize_text(variant));
            if options.hyphens {
                aliases.insert(normalize_hyphens(variant));
            }
            if options.multiword {
                aliases.insert(normalize_multiword(variant));
            }
        }
    }

    if options.acronyms {
        let mut completions = Vec::new();
        for alias in aliases.iter().filter(|alias| alias.contains(' ')) {
            let initials: Vec<String> = alias
                .split(' ')
                .filter_map(|word| word.chars().next())
                .map(String::from)
                .collect();
            let joined = initials.concat();
            let spaced = initials.join(" ");

            if aliases.contains(&joined) {
                if !aliases.contains(&spaced) {
                    completions.push(spaced);
                }
            } else if aliases.contains(&spaced) {
                completions.push(joined);
            }
        }
        aliases.extend(completions);
    }

    aliases.remove("");
    aliases
}
