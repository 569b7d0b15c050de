/// Anchor Token System for protecting format placeholders during machine translation
///
/// Anchor tokens are opaque strings substituted for format placeholders (`{name}`,
/// `%(name)s`, ...) before text is sent to a machine translation system, so the
/// provider cannot translate or rearrange the placeholder itself.
///
/// Format: `__PH{index}__` where index counts from 0 within one string.
/// Examples: `__PH0__`, `__PH1__`, `__PH12__`.
///
/// The trailing `__` makes every token terminate unambiguously, so no token is a
/// prefix of another (`__PH1__` vs `__PH10__`).
use regex::Regex;
use std::sync::LazyLock;

/// Brace form `{name}` first, then percent form `%(name)s`. The two alternatives
/// start with different characters, so a match of one can never be a partial
/// match of the other.
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\w+\}|%\(\w+\)[sdfr]").expect("placeholder pattern"));

const ANCHOR_PREFIX: &str = "__PH";

/// An anchor token stands in for one placeholder occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorToken {
    /// Index stamped into the token
    pub index: usize,
    /// The unique anchor token string
    pub token: String,
    /// The exact placeholder text it replaced, delimiters included
    pub placeholder: String,
}

impl AnchorToken {
    /// Create a new anchor token for `placeholder`
    pub fn new(index: usize, placeholder: &str) -> Self {
        AnchorToken {
            index,
            token: format!("__PH{}__", index),
            placeholder: placeholder.to_string(),
        }
    }
}

/// Text with its placeholders replaced by anchor tokens, plus the mapping needed
/// to undo the replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedText {
    /// Text safe to submit to a translation provider
    pub masked: String,
    /// One anchor per placeholder occurrence, in source order
    pub anchors: Vec<AnchorToken>,
}

impl ProtectedText {
    /// Put the original placeholders back into a translation of `self.masked`
    pub fn restore(&self, translated: &str) -> String {
        restore_placeholders(translated, &self.anchors)
    }

    pub fn has_placeholders(&self) -> bool {
        !self.anchors.is_empty()
    }
}

/// Replace placeholders with anchor tokens in text
///
/// Scans left to right; every full match of a recognized placeholder gets the next
/// anchor token. Partial or malformed syntax such as `{}`, `{ name }` or `%(name)x`
/// is left untouched, as is every character outside a match.
///
/// Token indices that already occur literally in `text` are skipped, so an anchor
/// never collides with user content. If a token still turns up somewhere it was
/// not inserted, e.g. `__PH0{a}` masking to `__PH0__PH0__`, masking starts over
/// with longer indices.
///
/// # Example
/// ```ignore
/// let protected = protect_placeholders("Hello {name}, you have {count} messages");
/// assert_eq!(protected.masked, "Hello __PH0__, you have __PH1__ messages");
/// assert_eq!(protected.anchors.len(), 2);
/// ```
pub fn protect_placeholders(text: &str) -> ProtectedText {
    let mut first_index = 0;
    loop {
        let (protected, inserted_at) = mask_from(text, first_index);
        let found_at: Vec<usize> = anchor_matches(&protected.masked, &protected.anchors)
            .into_iter()
            .map(|(start, _)| start)
            .collect();
        if found_at == inserted_at {
            return protected;
        }
        // Every retry adds a digit to the indices. Once they are longer than any
        // digit run in `text`, a token only matches where it was inserted.
        first_index = (first_index + 1) * 10;
    }
}

/// Mask `text` with indices counting from `first_index`. Also returns the byte
/// offset of every inserted token in the masked text.
fn mask_from(text: &str, first_index: usize) -> (ProtectedText, Vec<usize>) {
    let mut masked = String::with_capacity(text.len());
    let mut anchors = Vec::new();
    let mut inserted_at = Vec::new();
    let mut next_index = first_index;
    let mut last_end = 0;

    for found in PLACEHOLDER_RE.find_iter(text) {
        masked.push_str(&text[last_end..found.start()]);

        let anchor = loop {
            let candidate = AnchorToken::new(next_index, found.as_str());
            next_index += 1;
            if !text.contains(&candidate.token) {
                break candidate;
            }
        };

        inserted_at.push(masked.len());
        masked.push_str(&anchor.token);
        anchors.push(anchor);
        last_end = found.end();
    }
    masked.push_str(&text[last_end..]);

    (ProtectedText { masked, anchors }, inserted_at)
}

/// Leftmost, non-overlapping occurrences of the tokens of `anchors` in `text`
fn anchor_matches<'a>(text: &str, anchors: &'a [AnchorToken]) -> Vec<(usize, &'a AnchorToken)> {
    let mut matches = Vec::new();
    let mut pos = 0;
    while let Some(offset) = text[pos..].find(ANCHOR_PREFIX) {
        let start = pos + offset;
        match anchors
            .iter()
            .find(|anchor| text[start..].starts_with(&anchor.token))
        {
            Some(anchor) => {
                matches.push((start, anchor));
                pos = start + anchor.token.len();
            }
            None => pos = start + 1,
        }
    }
    matches
}

/// Recover placeholders from anchor tokens in translated text
///
/// Reverses [`protect_placeholders`]. The text is scanned once, so a restored
/// placeholder is never itself rescanned for tokens. Tokens may appear in any order
/// or more than once. A token the provider dropped is simply absent from the output,
/// and token-like text that is not in `anchors` is left as it is.
///
/// # Example
/// ```ignore
/// let protected = protect_placeholders("{sender} sent %(count)d messages");
/// let translated = "__PH1__ mensajes de __PH0__";
/// assert_eq!(
///     restore_placeholders(translated, &protected.anchors),
///     "%(count)d mensajes de {sender}"
/// );
/// ```
pub fn restore_placeholders(text: &str, anchors: &[AnchorToken]) -> String {
    let mut restored = String::with_capacity(text.len());
    let mut last_end = 0;
    for (start, anchor) in anchor_matches(text, anchors) {
        restored.push_str(&text[last_end..start]);
        restored.push_str(&anchor.placeholder);
        last_end = start + anchor.token.len();
    }
    restored.push_str(&text[last_end..]);
    restored
}

/// All recognized placeholders in `text`, sorted, duplicates kept
///
/// Two strings carry the same placeholders exactly when their lists are equal.
pub fn extract_placeholders(text: &str) -> Vec<String> {
    let mut placeholders: Vec<String> = PLACEHOLDER_RE
        .find_iter(text)
        .map(|found| found.as_str().to_string())
        .collect();
    placeholders.sort();
    placeholders
}
