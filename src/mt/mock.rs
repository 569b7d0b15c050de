//! Mock Machine Translator for testing
//!
//! This module provides a deterministic, API-free translator for testing the
//! catalog pipeline without API keys or network access. It also backs the
//! `--mock` flag of the command line tool.
//!
//! # Example
//!
//! ```ignore
//! use po_translator::mt::{MachineTranslator, MockTranslator, MockMode};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslator::new(MockMode::Suffix);
//!     let result = mock.translate("hello", "en", "fr").await.unwrap();
//!     assert_eq!(result, "hello_fr");
//!     assert_eq!(mock.call_count(), 1);
//! }
//! ```

use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::MachineTranslator;
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock, Mutex};

static ANCHOR_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__PH\d+__").expect("anchor pattern"));

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append locale suffix: "hello" → "hello_fr"
    /// This preserves anchor tokens perfectly for testing
    Suffix,

    /// Use predefined mappings for realistic translations
    /// (text, target_locale) → translation
    Mappings(HashMap<(String, String), String>),

    /// Simulate word reordering (for testing word-order-changing languages like Japanese)
    /// Reverses the order of words separated by spaces
    Reorder,

    /// Simulate API errors
    Error(String),

    /// Behave like `Suffix` until the given call (1-based), which fails
    FailOnCall(usize),

    /// Simulate a provider that swallows anchor tokens
    DropAnchors,

    /// No-op: return input unchanged
    NoOp,
}

/// Mock translator that simulates various translation scenarios
///
/// Clones share the call log, so a test can hand a clone to the pipeline and
/// inspect the original afterwards.
#[derive(Debug, Clone)]
pub struct MockTranslator {
    mode: MockMode,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockTranslator {
    /// Create a new MockTranslator with the given mode
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            calls: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of `translate` calls received so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Texts received so far, in call order
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Apply translation logic based on the mode
    fn apply_translation(&self, call: usize, text: &str, target: &str) -> MtResult<String> {
        match &self.mode {
            MockMode::Suffix => Ok(format!("{}_{}", text, target)),
            MockMode::Mappings(map) => {
                let key = (text.to_string(), target.to_string());
                Ok(map
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| format!("{}_{}", text, target)))
            }
            MockMode::Reorder => {
                let words: Vec<&str> = text.split_whitespace().rev().collect();
                Ok(words.join(" "))
            }
            MockMode::Error(msg) => Err(MtError::TranslationError(msg.clone())),
            MockMode::FailOnCall(failing) if call == *failing => Err(
                MtError::TranslationError(format!("simulated failure on call {}", call)),
            ),
            MockMode::FailOnCall(_) => Ok(format!("{}_{}", text, target)),
            MockMode::DropAnchors => Ok(ANCHOR_TOKEN_RE.replace_all(text, "").into_owned()),
            MockMode::NoOp => Ok(text.to_string()),
        }
    }
}

#[async_trait]
impl MachineTranslator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        _source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(text.to_string());
        }
        self.apply_translation(call, text, target_locale)
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== Suffix Mode Tests ==========

    #[tokio::test]
    async fn test_suffix_single_translation() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let result = mock.translate("hello", "en", "fr").await.unwrap();
        assert_eq!(result, "hello_fr");
    }

    #[tokio::test]
    async fn test_suffix_preserves_anchor_tokens() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let result = mock
            .translate("__PH0__ sent __PH1__ message", "en", "fr")
            .await
            .unwrap();
        assert_eq!(result, "__PH0__ sent __PH1__ message_fr");
    }

    #[tokio::test]
    async fn test_suffix_different_targets() {
        let mock = MockTranslator::new(MockMode::Suffix);
        assert_eq!(mock.translate("hello", "en", "fr").await.unwrap(), "hello_fr");
        assert_eq!(mock.translate("hello", "en", "ru").await.unwrap(), "hello_ru");
        assert_eq!(mock.translate("hello", "en", "de").await.unwrap(), "hello_de");
    }

    // ========== Mapping Mode Tests ==========

    #[tokio::test]
    async fn test_mapping_single_translation() {
        let mut map = HashMap::new();
        map.insert(
            ("hello".to_string(), "fr".to_string()),
            "bonjour".to_string(),
        );

        let mock = MockTranslator::new(MockMode::Mappings(map));
        assert_eq!(mock.translate("hello", "en", "fr").await.unwrap(), "bonjour");
    }

    #[tokio::test]
    async fn test_mapping_fallback_to_suffix() {
        let mock = MockTranslator::new(MockMode::Mappings(HashMap::new()));
        let result = mock.translate("unknown", "en", "fr").await.unwrap();
        assert_eq!(result, "unknown_fr");
    }

    // ========== Other Modes ==========

    #[tokio::test]
    async fn test_reorder_reverses_words() {
        let mock = MockTranslator::new(MockMode::Reorder);
        let result = mock.translate("__PH0__ sent __PH1__", "en", "ja").await.unwrap();
        assert_eq!(result, "__PH1__ sent __PH0__");
    }

    #[tokio::test]
    async fn test_error_mode() {
        let mock = MockTranslator::new(MockMode::Error("quota".to_string()));
        match mock.translate("hello", "en", "fr").await {
            Err(MtError::TranslationError(msg)) => assert_eq!(msg, "quota"),
            _ => panic!("Expected TranslationError"),
        }
    }

    #[tokio::test]
    async fn test_fail_on_call() {
        let mock = MockTranslator::new(MockMode::FailOnCall(2));
        assert!(mock.translate("one", "en", "fr").await.is_ok());
        assert!(mock.translate("two", "en", "fr").await.is_err());
        assert!(mock.translate("three", "en", "fr").await.is_ok());
    }

    #[tokio::test]
    async fn test_drop_anchors() {
        let mock = MockTranslator::new(MockMode::DropAnchors);
        let result = mock.translate("Hi __PH0__!", "en", "fr").await.unwrap();
        assert_eq!(result, "Hi !");
    }

    #[tokio::test]
    async fn test_noop() {
        let mock = MockTranslator::new(MockMode::NoOp);
        assert_eq!(mock.translate("hello", "en", "fr").await.unwrap(), "hello");
    }

    // ========== Call Log ==========

    #[tokio::test]
    async fn test_call_log_shared_between_clones() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let clone = mock.clone();
        clone.translate("a", "en", "fr").await.unwrap();
        clone.translate("b", "en", "fr").await.unwrap();
        assert_eq!(mock.call_count(), 2);
        assert_eq!(mock.requests(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_provider_name() {
        let mock = MockTranslator::new(MockMode::Suffix);
        assert_eq!(mock.provider_name(), "Mock Translator");
    }
}
