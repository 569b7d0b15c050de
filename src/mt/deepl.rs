//! DeepL API provider for machine translation
//!
//! This module integrates with the DeepL API v2 to provide real machine
//! translation.
//!
//! # Authentication
//!
//! The provider is constructed with an explicit API key. Keys ending in `:fx`
//! belong to the free plan and are sent to `api-free.deepl.com`; every other key
//! goes to `api.deepl.com`. Looking the key up in the environment is left to the
//! caller.
//!
//! # Example
//!
//! ```ignore
//! use po_translator::mt::{DeepLProvider, MachineTranslator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = DeepLProvider::new(std::env::var("DEEPL_API_KEY")?)?;
//!     let result = provider.translate("Hello, world!", "en", "de").await?;
//!     println!("{}", result);
//!     Ok(())
//! }
//! ```

use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::{
    MachineTranslator, source_language_code, target_language_code, validate_locale,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

const FREE_API_URL: &str = "https://api-free.deepl.com/v2/translate";
const PRO_API_URL: &str = "https://api.deepl.com/v2/translate";

/// DeepL answers 456 when the account's character quota is used up
const QUOTA_EXCEEDED: u16 = 456;

#[derive(Serialize)]
struct TranslateRequest<'a> {
    text: [&'a str; 1],
    source_lang: String,
    target_lang: String,
}

#[derive(Deserialize)]
struct TranslateResponse {
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
struct Translation {
    text: String,
}

/// DeepL API v2 provider
///
/// Sends one request per text; there is no batching, caching or retrying.
#[derive(Clone)]
pub struct DeepLProvider {
    /// API key for authentication
    api_key: String,
    /// HTTP client for async requests
    client: reqwest::Client,
    /// Endpoint of the `translate` call
    base_url: String,
}

impl DeepLProvider {
    /// Maximum request body size accepted by DeepL
    const MAX_TEXT_BYTES: usize = 128 * 1024;

    /// Create a new DeepLProvider with an explicit API key
    ///
    /// # Returns
    ///
    /// * `Ok(Self)` - New provider instance
    /// * `Err(MtError)` - If API key is empty or HTTP client creation fails
    pub fn new(api_key: String) -> MtResult<Self> {
        if api_key.trim().is_empty() {
            return Err(MtError::ConfigError("API key cannot be empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| MtError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = if Self::is_free_key(&api_key) {
            FREE_API_URL
        } else {
            PRO_API_URL
        };

        Ok(Self {
            api_key,
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Point the provider at another `translate` endpoint, such as a proxy
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn is_free_key(api_key: &str) -> bool {
        api_key.trim_end().ends_with(":fx")
    }

    /// Map a non-success HTTP status to the matching error
    fn status_error(status: StatusCode, body: String) -> MtError {
        if status.as_u16() == QUOTA_EXCEEDED {
            MtError::QuotaExceeded(format!("DeepL quota exceeded ({}): {}", status, body))
        } else if status.is_client_error() {
            MtError::ConfigError(format!("API client error ({}): {}", status, body))
        } else {
            MtError::TranslationError(format!("API server error ({}): {}", status, body))
        }
    }
}

impl std::fmt::Debug for DeepLProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepLProvider")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for DeepLProvider {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String> {
        validate_locale(source_locale)?;
        validate_locale(target_locale)?;

        // Nothing to translate; spare the request and the quota.
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        if text.len() > Self::MAX_TEXT_BYTES {
            return Err(MtError::TranslationError(format!(
                "Text exceeds maximum length of {} bytes",
                Self::MAX_TEXT_BYTES
            )));
        }

        let body = TranslateRequest {
            text: [text],
            source_lang: source_language_code(source_locale),
            target_lang: target_language_code(target_locale),
        };

        let response = self
            .client
            .post(&self.base_url)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("DeepL-Auth-Key {}", self.api_key),
            )
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Self::status_error(status, error_text));
        }

        let parsed: TranslateResponse = response.json().await.map_err(|e| {
            MtError::TranslationError(format!("Failed to parse API response: {}", e))
        })?;

        parsed
            .translations
            .into_iter()
            .next()
            .map(|translation| translation.text)
            .ok_or_else(|| {
                MtError::TranslationError(
                    "Invalid API response: empty 'translations' array".to_string(),
                )
            })
    }

    fn provider_name(&self) -> &str {
        "DeepL"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== Initialization Tests ==========

    #[test]
    fn test_new_with_valid_key() {
        let provider = DeepLProvider::new("test-api-key".to_string());
        assert!(provider.is_ok());
        assert_eq!(provider.unwrap().provider_name(), "DeepL");
    }

    #[test]
    fn test_new_with_empty_key() {
        match DeepLProvider::new("".to_string()) {
            Err(MtError::ConfigError(msg)) => assert!(msg.contains("empty")),
            _ => panic!("Expected ConfigError"),
        }
    }

    #[test]
    fn test_new_with_whitespace_key() {
        assert!(DeepLProvider::new("   ".to_string()).is_err());
    }

    // ========== Endpoint Selection ==========

    #[test]
    fn test_free_key_uses_free_endpoint() {
        let provider = DeepLProvider::new("0000-1111:fx".to_string()).unwrap();
        assert_eq!(provider.base_url(), FREE_API_URL);
    }

    #[test]
    fn test_pro_key_uses_pro_endpoint() {
        let provider = DeepLProvider::new("0000-1111".to_string()).unwrap();
        assert_eq!(provider.base_url(), PRO_API_URL);
    }

    #[test]
    fn test_with_base_url() {
        let provider = DeepLProvider::new("key".to_string())
            .unwrap()
            .with_base_url("http://127.0.0.1:9/v2/translate");
        assert_eq!(provider.base_url(), "http://127.0.0.1:9/v2/translate");
    }

    // ========== Status Mapping ==========

    #[test]
    fn test_status_error_mapping() {
        let quota = StatusCode::from_u16(QUOTA_EXCEEDED).unwrap();
        assert!(matches!(
            DeepLProvider::status_error(quota, String::new()),
            MtError::QuotaExceeded(_)
        ));
        assert!(matches!(
            DeepLProvider::status_error(StatusCode::FORBIDDEN, String::new()),
            MtError::ConfigError(_)
        ));
        assert!(matches!(
            DeepLProvider::status_error(StatusCode::SERVICE_UNAVAILABLE, String::new()),
            MtError::TranslationError(_)
        ));
    }

    // ========== Request Body ==========

    #[test]
    fn test_request_body_shape() {
        let body = TranslateRequest {
            text: ["Hello __PH0__"],
            source_lang: source_language_code("en-us"),
            target_lang: target_language_code("pt-br"),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "text": ["Hello __PH0__"],
                "source_lang": "EN",
                "target_lang": "PT-BR"
            })
        );
    }

    #[test]
    fn test_response_parsing() {
        let parsed: TranslateResponse = serde_json::from_str(
            r#"{"translations":[{"detected_source_language":"EN","text":"Hallo Welt"}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.translations[0].text, "Hallo Welt");
    }

    // ========== Validation Tests ==========

    #[tokio::test]
    async fn test_translate_empty_text() {
        let provider = DeepLProvider::new("test-key".to_string()).unwrap();
        assert_eq!(provider.translate("", "en", "de").await.unwrap(), "");
        assert_eq!(provider.translate("  ", "en", "de").await.unwrap(), "  ");
    }

    #[tokio::test]
    async fn test_translate_invalid_source_locale() {
        let provider = DeepLProvider::new("test-key".to_string()).unwrap();
        let result = provider.translate("hello", "invalid@code", "de").await;
        assert!(matches!(result, Err(MtError::InvalidLocale(_))));
    }

    #[tokio::test]
    async fn test_translate_invalid_target_locale() {
        let provider = DeepLProvider::new("test-key".to_string()).unwrap();
        let result = provider.translate("hello", "en", "invalid#code").await;
        assert!(matches!(result, Err(MtError::InvalidLocale(_))));
    }

    #[tokio::test]
    async fn test_translate_text_too_long() {
        let provider = DeepLProvider::new("test-key".to_string()).unwrap();
        let long_text = "x".repeat(DeepLProvider::MAX_TEXT_BYTES + 1);
        match provider.translate(&long_text, "en", "de").await {
            Err(MtError::TranslationError(msg)) => assert!(msg.contains("exceeds maximum")),
            _ => panic!("Expected TranslationError"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let provider = DeepLProvider::new("test-key".to_string())
            .unwrap()
            .with_base_url("http://127.0.0.1:9/v2/translate");
        let result = provider.translate("hello", "en", "de").await;
        assert!(matches!(result, Err(MtError::NetworkError(_))));
    }

    // ========== Debug Implementation Test ==========

    #[test]
    fn test_debug_output() {
        let provider = DeepLProvider::new("test-key".to_string()).unwrap();
        let debug_str = format!("{:?}", provider);
        assert!(debug_str.contains("***"));
        assert!(!debug_str.contains("test-key"));
    }

    // ========== Integration Tests (require real API key) ==========

    #[tokio::test]
    #[ignore] // Run with: cargo test -- --ignored
    async fn test_real_api_single_translation() {
        let Ok(key) = std::env::var("DEEPL_API_KEY") else {
            eprintln!("Skipping: DEEPL_API_KEY not set");
            return;
        };

        let provider = DeepLProvider::new(key).unwrap();
        let result = provider.translate("Hello", "en", "de").await.unwrap();
        assert!(!result.is_empty());
    }

    #[tokio::test]
    #[ignore] // Run with: cargo test -- --ignored
    async fn test_real_api_preserves_anchor_tokens() {
        let Ok(key) = std::env::var("DEEPL_API_KEY") else {
            eprintln!("Skipping: DEEPL_API_KEY not set");
            return;
        };

        let provider = DeepLProvider::new(key).unwrap();
        let result = provider
            .translate("__PH0__ sent __PH1__ messages", "en", "fr")
            .await
            .unwrap();
        assert!(result.contains("__PH0__"));
        assert!(result.contains("__PH1__"));
    }

    #[tokio::test]
    #[ignore] // Run with: cargo test -- --ignored
    async fn test_real_api_invalid_key() {
        let provider = DeepLProvider::new("invalid-key-xyz:fx".to_string()).unwrap();
        let result = provider.translate("hello", "en", "de").await;
        assert!(matches!(result, Err(MtError::ConfigError(_))));
    }
}
