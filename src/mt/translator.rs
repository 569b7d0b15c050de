//! Machine Translation trait and utilities
//!
//! This module defines the `MachineTranslator` trait for provider abstraction,
//! so the catalog pipeline can run against DeepL, a mock, or any other backend
//! without being coupled to one of them.
//!
//! # Example
//!
//! ```ignore
//! use po_translator::mt::{DeepLProvider, MachineTranslator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = DeepLProvider::new("your-key:fx".to_string())?;
//!     let result = provider.translate("Hello, world!", "en", "es").await?;
//!     println!("{}", result); // "¡Hola, mundo!"
//!     Ok(())
//! }
//! ```

use crate::mt::error::{MtError, MtResult};
use async_trait::async_trait;

/// Generic trait for machine translation providers
///
/// Implementations of this trait handle the actual translation work,
/// whether through an API (DeepL) or deterministic logic (Mock).
///
/// Methods are async to support I/O-bound operations like network requests.
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate a single text string from source to target locale
    ///
    /// # Arguments
    ///
    /// * `text` - The text to translate
    /// * `source_locale` - Source language code (e.g., "en", "en-US")
    /// * `target_locale` - Target language code (e.g., "es", "pt-BR")
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The translated text
    /// * `Err(MtError)` - If translation fails
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String>;

    /// Get the name of this translation provider
    ///
    /// Used for logging to identify which provider handled a translation.
    fn provider_name(&self) -> &str;
}

/// Reduce a locale code to its upper-cased base language
///
/// - `en-US` → `EN`
/// - `en_us` → `EN`
/// - `zh-Hans` → `ZH`
/// - `de` → `DE`
///
/// DeepL only accepts base languages as the source language.
pub fn source_language_code(locale: &str) -> String {
    locale
        .split(['-', '_'])
        .next()
        .unwrap_or(locale)
        .to_uppercase()
}

/// Upper-case a locale code, keeping any region or script variant
///
/// - `es` → `ES`
/// - `pt-br` → `PT-BR`
/// - `en_gb` → `EN-GB`
///
/// Target languages such as `EN-GB` or `PT-BR` are distinct DeepL targets, so the
/// variant is kept.
pub fn target_language_code(locale: &str) -> String {
    locale.replace('_', "-").to_uppercase()
}

/// Validate that a locale code is in acceptable format
///
/// Checks that the locale code contains only alphanumeric characters,
/// hyphens, and underscores.
///
/// # Example
///
/// ```ignore
/// validate_locale("en")?; // OK
/// validate_locale("en-US")?; // OK
/// validate_locale("invalid@code").unwrap_err(); // Error
/// ```
pub fn validate_locale(locale: &str) -> MtResult<()> {
    if locale.is_empty() {
        return Err(MtError::InvalidLocale("Locale code is empty".to_string()));
    }

    if !locale
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(MtError::InvalidLocale(format!(
            "Invalid characters in locale code: {}",
            locale
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_language_code_with_region() {
        assert_eq!(source_language_code("en-US"), "EN");
        assert_eq!(source_language_code("en-us"), "EN");
        assert_eq!(source_language_code("fr_FR"), "FR");
    }

    #[test]
    fn test_source_language_code_with_script() {
        assert_eq!(source_language_code("zh-Hans"), "ZH");
        assert_eq!(source_language_code("sr-Latn"), "SR");
    }

    #[test]
    fn test_source_language_code_already_simple() {
        assert_eq!(source_language_code("en"), "EN");
        assert_eq!(source_language_code("DE"), "DE");
    }

    #[test]
    fn test_target_language_code_keeps_variant() {
        assert_eq!(target_language_code("es"), "ES");
        assert_eq!(target_language_code("pt-br"), "PT-BR");
        assert_eq!(target_language_code("en_gb"), "EN-GB");
    }

    #[test]
    fn test_validate_locale_valid_codes() {
        assert!(validate_locale("en").is_ok());
        assert!(validate_locale("en-US").is_ok());
        assert!(validate_locale("zh-Hans").is_ok());
        assert!(validate_locale("de_DE").is_ok());
    }

    #[test]
    fn test_validate_locale_invalid_codes() {
        assert!(validate_locale("").is_err());
        assert!(validate_locale("en@invalid").is_err());
        assert!(validate_locale("fr#bad").is_err());
        assert!(validate_locale("es!error").is_err());
    }

    #[test]
    fn test_validate_locale_error_messages() {
        match validate_locale("en@US") {
            Err(MtError::InvalidLocale(msg)) => {
                assert!(msg.contains("Invalid characters"));
            }
            _ => panic!("Expected InvalidLocale error"),
        }
    }
}
